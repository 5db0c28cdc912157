//! Swagger 2.0 type definitions
//!
//! Covers the parts of the document that influence proto generation.
//! Maps keep document order; callers sort where output order matters.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Swagger document root
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiDefinition {
    /// Swagger version (e.g., "2.0")
    #[serde(default)]
    pub swagger: String,

    /// API metadata
    #[serde(default)]
    pub info: Info,

    #[serde(default)]
    pub host: Option<String>,

    /// Prefix for every path, used in HTTP annotations
    #[serde(rename = "basePath")]
    #[serde(default)]
    pub base_path: Option<String>,

    /// API paths (endpoints)
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,

    /// Schema definitions
    #[serde(default)]
    pub definitions: IndexMap<String, Schema>,

    /// Reusable parameters (`#/parameters/...`)
    #[serde(default)]
    pub parameters: IndexMap<String, Parameter>,

    /// Reusable responses (`#/responses/...`)
    #[serde(default)]
    pub responses: IndexMap<String, Response>,

    /// File level proto options
    #[serde(rename = "x-global-options")]
    #[serde(default)]
    pub global_options: IndexMap<String, Value>,
}

/// API information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub description: Option<String>,
}

/// Operations available on a single path
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(default)]
    pub get: Option<Operation>,

    #[serde(default)]
    pub put: Option<Operation>,

    #[serde(default)]
    pub post: Option<Operation>,

    #[serde(default)]
    pub delete: Option<Operation>,

    #[serde(default)]
    pub options: Option<Operation>,

    #[serde(default)]
    pub head: Option<Operation>,

    #[serde(default)]
    pub patch: Option<Operation>,

    /// Parameters shared by every operation on the path
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

impl PathItem {
    /// Operations paired with their lower-case verb, in a fixed verb order
    pub fn operations(&self) -> Vec<(&'static str, &Operation)> {
        [
            ("get", &self.get),
            ("put", &self.put),
            ("post", &self.post),
            ("delete", &self.delete),
            ("options", &self.options),
            ("head", &self.head),
            ("patch", &self.patch),
        ]
        .into_iter()
        .filter_map(|(verb, op)| op.as_ref().map(|op| (verb, op)))
        .collect()
    }
}

/// HTTP operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "operationId")]
    #[serde(default)]
    pub operation_id: Option<String>,

    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub parameters: Vec<Parameter>,

    /// Responses keyed by status code or `default`
    #[serde(default)]
    pub responses: IndexMap<String, Response>,

    #[serde(default)]
    pub tags: Vec<String>,
}

/// Operation parameter
///
/// Body parameters carry a `schema`; every other location describes its
/// value inline with `type`, `format`, `items` and `enum`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(default)]
    pub name: String,

    /// Location: path, query, header, formData, body
    #[serde(rename = "in")]
    #[serde(default)]
    pub location: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub schema: Option<Schema>,

    #[serde(rename = "type")]
    #[serde(default)]
    pub param_type: Option<String>,

    #[serde(default)]
    pub format: Option<String>,

    #[serde(default)]
    pub items: Option<Box<Schema>>,

    #[serde(rename = "enum")]
    #[serde(default)]
    pub enum_values: Vec<Value>,

    /// Reference to a reusable parameter
    #[serde(rename = "$ref")]
    #[serde(default)]
    pub ref_path: Option<String>,
}

impl Parameter {
    /// Schema describing the parameter value
    pub fn value_schema(&self) -> Schema {
        if let Some(ref schema) = self.schema {
            return schema.clone();
        }

        Schema {
            schema_type: self.param_type.clone(),
            format: self.format.clone(),
            items: self.items.clone(),
            enum_values: self.enum_values.clone(),
            description: self.description.clone(),
            ..Schema::default()
        }
    }
}

/// Response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub schema: Option<Schema>,

    /// Reference to a reusable response
    #[serde(rename = "$ref")]
    #[serde(default)]
    pub ref_path: Option<String>,
}

/// Schema definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Type: string, number, integer, boolean, array, object, file
    #[serde(rename = "type")]
    #[serde(default)]
    pub schema_type: Option<String>,

    /// Format (e.g., int32, int64, byte)
    #[serde(default)]
    pub format: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Reference
    #[serde(rename = "$ref")]
    #[serde(default)]
    pub ref_path: Option<String>,

    /// Properties (for object type), in document order
    #[serde(default)]
    pub properties: IndexMap<String, Schema>,

    #[serde(default)]
    pub required: Vec<String>,

    /// Items schema (for array type)
    #[serde(default)]
    pub items: Option<Box<Schema>>,

    #[serde(rename = "additionalProperties")]
    #[serde(default)]
    pub additional_properties: Option<AdditionalProperties>,

    #[serde(rename = "enum")]
    #[serde(default)]
    pub enum_values: Vec<Value>,

    #[serde(rename = "allOf")]
    #[serde(default)]
    pub all_of: Vec<Schema>,

    /// Explicit field number for this property
    #[serde(rename = "x-proto-tag")]
    #[serde(default)]
    pub proto_tag: Option<u32>,
}

/// `additionalProperties` is either a flag or a value schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(Box<Schema>),
}

/// The one shape a schema node takes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchemaKind<'a> {
    Reference(&'a str),
    Enum(&'a [Value]),
    Object,
    /// `additionalProperties` schema without fixed properties
    Map(&'a Schema),
    Array(Option<&'a Schema>),
    Primitive(&'a str),
    /// No type and nothing to infer one from
    Untyped,
}

impl Schema {
    /// Classify the node
    ///
    /// A `$ref` wins over everything else, then `enum`. Nodes without a
    /// `type` are inferred from `properties`, `items` or
    /// `additionalProperties`.
    pub fn kind(&self) -> SchemaKind<'_> {
        if let Some(ref reference) = self.ref_path {
            return SchemaKind::Reference(reference);
        }
        if !self.enum_values.is_empty() {
            return SchemaKind::Enum(&self.enum_values);
        }

        match self.schema_type.as_deref() {
            Some("object") => match self.map_values() {
                Some(values) if self.properties.is_empty() && self.all_of.is_empty() => {
                    SchemaKind::Map(values)
                }
                _ => SchemaKind::Object,
            },
            Some("array") => SchemaKind::Array(self.items.as_deref()),
            Some(t @ ("string" | "integer" | "number" | "boolean" | "file")) => {
                SchemaKind::Primitive(t)
            }
            Some(_) => SchemaKind::Untyped,
            None => {
                if !self.properties.is_empty() || !self.all_of.is_empty() {
                    SchemaKind::Object
                } else if self.items.is_some() {
                    SchemaKind::Array(self.items.as_deref())
                } else if let Some(values) = self.map_values() {
                    SchemaKind::Map(values)
                } else {
                    SchemaKind::Untyped
                }
            }
        }
    }

    fn map_values(&self) -> Option<&Schema> {
        match self.additional_properties {
            Some(AdditionalProperties::Schema(ref schema)) => Some(schema),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(json: &str) -> Schema {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_schema_kinds() {
        assert_eq!(
            schema(r##"{"$ref": "#/definitions/Pet", "type": "object"}"##).kind(),
            SchemaKind::Reference("#/definitions/Pet")
        );
        assert!(matches!(
            schema(r#"{"type": "string", "enum": ["a", "b"]}"#).kind(),
            SchemaKind::Enum(values) if values.len() == 2
        ));
        assert_eq!(schema(r#"{"type": "object"}"#).kind(), SchemaKind::Object);
        assert_eq!(
            schema(r#"{"type": "integer"}"#).kind(),
            SchemaKind::Primitive("integer")
        );
        assert_eq!(schema(r#"{}"#).kind(), SchemaKind::Untyped);
        assert_eq!(schema(r#"{"type": "null"}"#).kind(), SchemaKind::Untyped);
    }

    #[test]
    fn test_inferred_kinds() {
        assert_eq!(
            schema(r#"{"properties": {"a": {"type": "string"}}}"#).kind(),
            SchemaKind::Object
        );
        assert!(matches!(
            schema(r#"{"items": {"type": "string"}}"#).kind(),
            SchemaKind::Array(Some(_))
        ));
        assert!(matches!(
            schema(r#"{"type": "object", "additionalProperties": {"type": "integer"}}"#).kind(),
            SchemaKind::Map(_)
        ));
        assert_eq!(
            schema(r#"{"type": "object", "additionalProperties": true}"#).kind(),
            SchemaKind::Object
        );
    }

    #[test]
    fn test_properties_keep_document_order() {
        let s = schema(
            r#"{"properties": {"zeta": {"type": "string"}, "alpha": {"type": "string"}, "mid": {"type": "string"}}}"#,
        );
        let names: Vec<&str> = s.properties.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_path_item_operations_in_fixed_order() {
        let item: PathItem = serde_json::from_str(
            r#"{"patch": {}, "get": {}, "delete": {}, "post": {}}"#,
        )
        .unwrap();
        let verbs: Vec<&str> = item.operations().into_iter().map(|(v, _)| v).collect();
        assert_eq!(verbs, vec!["get", "post", "delete", "patch"]);
    }

    #[test]
    fn test_parameter_value_schema() {
        let param: Parameter = serde_json::from_str(
            r#"{"name": "limit", "in": "query", "type": "integer", "format": "int32"}"#,
        )
        .unwrap();
        let value = param.value_schema();
        assert_eq!(value.schema_type.as_deref(), Some("integer"));
        assert_eq!(value.format.as_deref(), Some("int32"));
    }
}
