//! Type mapping from Swagger primitives to proto3 scalars

use swagger2proto_common::ScalarType;

/// Maps Swagger `type`/`format` pairs to ScalarType
pub struct TypeMapper;

impl TypeMapper {
    /// Map a primitive type and optional format to a scalar
    ///
    /// Unknown or missing formats fall back to the widest scalar of the
    /// type: `int64` for integers, `double` for numbers.
    ///
    /// # Examples
    /// ```
    /// use swagger2proto_parser::TypeMapper;
    /// use swagger2proto_common::ScalarType;
    ///
    /// assert_eq!(TypeMapper::map_type("integer", Some("int32")), Some(ScalarType::Int32));
    /// assert_eq!(TypeMapper::map_type("integer", None), Some(ScalarType::Int64));
    /// assert_eq!(TypeMapper::map_type("string", Some("byte")), Some(ScalarType::Bytes));
    /// assert_eq!(TypeMapper::map_type("object", None), None);
    /// ```
    pub fn map_type(schema_type: &str, format: Option<&str>) -> Option<ScalarType> {
        let scalar = match schema_type {
            "integer" => match format {
                Some("int32") => ScalarType::Int32,
                Some("uint32") => ScalarType::Uint32,
                Some("uint64") => ScalarType::Uint64,
                Some("sint32") => ScalarType::Sint32,
                Some("sint64") => ScalarType::Sint64,
                Some("fixed32") => ScalarType::Fixed32,
                Some("fixed64") => ScalarType::Fixed64,
                _ => ScalarType::Int64,
            },
            "number" => match format {
                Some("float") => ScalarType::Float,
                Some("int32") => ScalarType::Int32,
                Some("int64") => ScalarType::Int64,
                _ => ScalarType::Double,
            },
            "string" => match format {
                Some("byte") | Some("binary") => ScalarType::Bytes,
                _ => ScalarType::String,
            },
            "boolean" => ScalarType::Bool,
            "file" => ScalarType::Bytes,
            _ => return None,
        };
        Some(scalar)
    }
}
