//! Schema node translation
//!
//! Objects become messages with one field per property, enums become proto
//! enums with a zero sentinel, arrays become `repeated` fields and
//! references are replaced by the type they resolve to. Inline objects and
//! enums are nested inside the message that uses them.

use super::converter::{Declaration, TranslationContext};
use super::types::{Schema, SchemaKind};
use crate::naming::{field_name, message_name, EnumValueNamer};
use crate::type_mapper::TypeMapper;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashSet;
use swagger2proto_common::{
    Enum, EnumValue, Field, FieldType, GeneratorError, Message, Result, ScalarType, STRUCT_PROTO,
};
use tracing::{debug, warn};

/// Type used for schema nodes without a recognizable shape
const UNTYPED: &str = "google.protobuf.Value";

/// `allOf` chains deeper than this are treated as cyclic
const MAX_ALL_OF_DEPTH: usize = 32;

/// Largest field number proto3 accepts
const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// Field numbers reserved for the protobuf implementation
const RESERVED_FIELD_NUMBERS: std::ops::RangeInclusive<u32> = 19000..=19999;

impl<'a> TranslationContext<'a> {
    /// Translate a top-level definition
    pub fn translate_definition(&mut self, name: &str, schema: &Schema) -> Result<Declaration> {
        let type_name = message_name(name);
        match schema.kind() {
            SchemaKind::Enum(values) => Ok(Declaration::Enum(build_enum(&type_name, values))),
            _ => self.standalone_message(&type_name, schema).map(Declaration::Message),
        }
    }

    /// A message for any schema node
    ///
    /// Objects map to their properties. Arrays are wrapped as
    /// `repeated T items = 1`, everything else as `T value = 1`.
    pub(crate) fn standalone_message(&mut self, name: &str, schema: &Schema) -> Result<Message> {
        let mark = self.reference_mark();
        let mut message = Message::new(name);
        match schema.kind() {
            SchemaKind::Object => return self.build_message(name, schema),
            SchemaKind::Array(items) => {
                let untyped = Schema::default();
                let items = items.unwrap_or(&untyped);
                let field = self.field(&mut message, "items", items, 1)?;
                message.fields.push(Field {
                    repeated: true,
                    ..field
                });
            }
            _ => {
                let field = self.field(&mut message, "value", schema, 1)?;
                message.fields.push(field);
            }
        }
        self.check_shadowing(&message, mark)?;
        Ok(message)
    }

    /// Build a message from an object schema
    ///
    /// Fields are numbered from 1 in property order unless a property sets
    /// `x-proto-tag`.
    pub(crate) fn build_message(&mut self, name: &str, schema: &Schema) -> Result<Message> {
        let mark = self.reference_mark();
        let mut message = Message::new(name);
        let properties = self.collect_properties(name, schema, 0)?;

        let mut names = HashSet::new();
        let mut numbers = HashSet::new();
        for (index, (property, property_schema)) in properties.iter().enumerate() {
            let number = match property_schema.proto_tag {
                Some(tag) => check_field_number(name, property, tag)?,
                None => index as u32 + 1,
            };
            let field = self.field(&mut message, property, property_schema, number)?;

            if !names.insert(field.name.clone()) {
                return Err(GeneratorError::collision(
                    format!("message {}", name),
                    field.name,
                ));
            }
            if !numbers.insert(field.number) {
                return Err(GeneratorError::collision(
                    format!("message {} field numbers", name),
                    field.number.to_string(),
                ));
            }
            message.fields.push(field);
        }

        self.check_shadowing(&message, mark)?;
        debug!(message = %name, fields = message.fields.len(), "built message");
        Ok(message)
    }

    /// Position in the list of local references seen so far
    pub(crate) fn reference_mark(&self) -> usize {
        self.local_references.len()
    }

    /// Fail when a declaration nested in `message` hides a top-level type
    ///
    /// Checks every local reference made since `mark`, which covers the
    /// fields of `message` and of everything nested in it. Inside the
    /// message protoc would resolve such a reference to the nested type.
    pub(crate) fn check_shadowing(&self, message: &Message, mark: usize) -> Result<()> {
        let shadowed = self.local_references[mark..].iter().find(|referenced| {
            message.messages.iter().any(|m| m.name == **referenced)
                || message.enums.iter().any(|e| e.name == **referenced)
        });
        match shadowed {
            Some(name) => Err(GeneratorError::collision(
                format!("message {} (nested type hides a referenced definition)", message.name),
                name.clone(),
            )),
            None => Ok(()),
        }
    }

    /// One field of `owner` for a property or parameter
    ///
    /// Nested declarations the field needs are added to `owner`.
    pub(crate) fn field(
        &mut self,
        owner: &mut Message,
        property: &str,
        schema: &Schema,
        number: u32,
    ) -> Result<Field> {
        let (field_type, repeated) = self.field_type(owner, property, schema)?;
        let name = field_name(property);
        let json_name = (self.options.custom_options && name != property).then(|| property.to_string());

        Ok(Field {
            name,
            field_type,
            number,
            repeated,
            json_name,
        })
    }

    /// Type of a field and whether it is repeated
    fn field_type(
        &mut self,
        owner: &mut Message,
        property: &str,
        schema: &Schema,
    ) -> Result<(FieldType, bool)> {
        let location = format!("{}.{}", owner.name, property);

        match schema.kind() {
            SchemaKind::Reference(reference) => {
                let resolved = self.resolve(reference, &location)?;
                if resolved.is_local() {
                    self.local_references.push(resolved.qualified_name.clone());
                }
                Ok((FieldType::Named(resolved.qualified_name), false))
            }
            SchemaKind::Enum(values) => {
                let nested = build_enum(&message_name(property), values);
                let name = nested.name.clone();
                add_nested_enum(owner, nested)?;
                Ok((FieldType::Named(name), false))
            }
            SchemaKind::Object => {
                let nested = self.build_message(&message_name(property), schema)?;
                let name = nested.name.clone();
                add_nested_message(owner, nested)?;
                Ok((FieldType::Named(name), false))
            }
            SchemaKind::Map(values) => {
                let value = self.single_value_type(owner, property, values)?;
                Ok((
                    FieldType::Map {
                        key: ScalarType::String,
                        value: Box::new(value),
                    },
                    false,
                ))
            }
            SchemaKind::Array(items) => {
                let untyped = Schema::default();
                let item = self.single_value_type(owner, property, items.unwrap_or(&untyped))?;
                Ok((item, true))
            }
            SchemaKind::Primitive(primitive) => {
                let scalar = TypeMapper::map_type(primitive, schema.format.as_deref())
                    .unwrap_or(ScalarType::String);
                Ok((FieldType::Scalar(scalar), false))
            }
            SchemaKind::Untyped => {
                warn!(field = %location, "schema has no recognizable type, using {}", UNTYPED);
                self.imports.insert(STRUCT_PROTO.to_string());
                Ok((FieldType::Named(UNTYPED.to_string()), false))
            }
        }
    }

    /// Type of a map value or array item
    ///
    /// proto3 has no nested repeated or map values; those get wrapped in a
    /// nested `<Property>Value` message.
    fn single_value_type(
        &mut self,
        owner: &mut Message,
        property: &str,
        schema: &Schema,
    ) -> Result<FieldType> {
        let (field_type, repeated) = self.field_type(owner, property, schema)?;
        if !repeated && !matches!(field_type, FieldType::Map { .. }) {
            return Ok(field_type);
        }

        let wrapper_name = format!("{}Value", message_name(property));
        let mut wrapper = Message::new(&wrapper_name);
        wrapper.fields.push(Field {
            name: "value".to_string(),
            field_type,
            number: 1,
            repeated,
            json_name: None,
        });
        add_nested_message(owner, wrapper)?;
        Ok(FieldType::Named(wrapper_name))
    }

    /// Properties of an object, with `allOf` members merged in order
    fn collect_properties(
        &self,
        name: &str,
        schema: &Schema,
        depth: usize,
    ) -> Result<IndexMap<String, Schema>> {
        let mut properties = IndexMap::new();

        for member in &schema.all_of {
            let member = match member.ref_path {
                Some(ref reference) => {
                    if depth >= MAX_ALL_OF_DEPTH {
                        return Err(GeneratorError::Generation(format!(
                            "allOf of {} is cyclic at {}",
                            name, reference
                        )));
                    }
                    self.local_definition(reference).ok_or_else(|| {
                        GeneratorError::unresolved(
                            reference.as_str(),
                            format!("{} allOf (only local definitions can be merged)", name),
                        )
                    })?
                }
                None => member,
            };
            properties.extend(self.collect_properties(name, member, depth + 1)?);
        }

        properties.extend(
            schema
                .properties
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        Ok(properties)
    }
}

/// An explicit `x-proto-tag`, rejected outside the numbers proto3 allows
fn check_field_number(message: &str, property: &str, tag: u32) -> Result<u32> {
    if tag == 0 || tag > MAX_FIELD_NUMBER || RESERVED_FIELD_NUMBERS.contains(&tag) {
        return Err(GeneratorError::Generation(format!(
            "x-proto-tag {} of {}.{} is not a valid field number",
            tag, message, property
        )));
    }
    Ok(tag)
}

/// Build an enum with its zero sentinel
fn build_enum(name: &str, labels: &[Value]) -> Enum {
    let mut namer = EnumValueNamer::new(name);
    let mut values = vec![EnumValue {
        name: namer.sentinel(),
        number: 0,
    }];

    for (i, label) in labels.iter().enumerate() {
        let label = match label {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        values.push(EnumValue {
            name: namer.value(&label, i + 1),
            number: i as i32 + 1,
        });
    }

    Enum {
        name: name.to_string(),
        values,
    }
}

fn add_nested_message(owner: &mut Message, nested: Message) -> Result<()> {
    if let Some(existing) = owner.messages.iter().find(|m| m.name == nested.name) {
        if *existing == nested {
            return Ok(());
        }
        return Err(GeneratorError::collision(
            format!("message {}", owner.name),
            nested.name,
        ));
    }
    if owner.enums.iter().any(|e| e.name == nested.name) {
        return Err(GeneratorError::collision(
            format!("message {}", owner.name),
            nested.name,
        ));
    }
    owner.messages.push(nested);
    Ok(())
}

fn add_nested_enum(owner: &mut Message, nested: Enum) -> Result<()> {
    if let Some(existing) = owner.enums.iter().find(|e| e.name == nested.name) {
        if *existing == nested {
            return Ok(());
        }
        return Err(GeneratorError::collision(
            format!("message {}", owner.name),
            nested.name,
        ));
    }
    if owner.messages.iter().any(|m| m.name == nested.name) {
        return Err(GeneratorError::collision(
            format!("message {}", owner.name),
            nested.name,
        ));
    }
    owner.enums.push(nested);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swagger::{ApiDefinition, GenerateOptions, SwaggerParser};

    fn api(yaml: &str) -> ApiDefinition {
        SwaggerParser::from_yaml(yaml).unwrap().into_definition()
    }

    fn message(api: &ApiDefinition, options: &GenerateOptions, name: &str) -> Result<Message> {
        let mut ctx = TranslationContext::new(api, options);
        match ctx.translate_definition(name, &api.definitions[name])? {
            Declaration::Message(m) => Ok(m),
            Declaration::Enum(e) => panic!("expected a message, got enum {}", e.name),
        }
    }

    fn field_summary(message: &Message) -> Vec<(String, String, u32, bool)> {
        message
            .fields
            .iter()
            .map(|f| (f.name.clone(), f.field_type.to_string(), f.number, f.repeated))
            .collect()
    }

    #[test]
    fn test_object_fields_follow_property_order() {
        let api = api(r#"
definitions:
  Pet:
    type: object
    properties:
      name: {type: string}
      id: {type: integer, format: int64}
      age: {type: integer, format: int32}
      weight: {type: number}
      photo: {type: string, format: byte}
      vaccinated: {type: boolean}
"#);
        let pet = message(&api, &GenerateOptions::default(), "Pet").unwrap();
        assert_eq!(
            field_summary(&pet),
            vec![
                ("name".to_string(), "string".to_string(), 1, false),
                ("id".to_string(), "int64".to_string(), 2, false),
                ("age".to_string(), "int32".to_string(), 3, false),
                ("weight".to_string(), "double".to_string(), 4, false),
                ("photo".to_string(), "bytes".to_string(), 5, false),
                ("vaccinated".to_string(), "bool".to_string(), 6, false),
            ]
        );
    }

    #[test]
    fn test_numbering_is_stable_across_runs() {
        let api = api(r#"
definitions:
  Order:
    properties:
      zeta: {type: string}
      alpha: {type: string}
"#);
        let options = GenerateOptions::default();
        let first = message(&api, &options, "Order").unwrap();
        let second = message(&api, &options, "Order").unwrap();
        assert_eq!(first, second);
        assert_eq!(first.fields[0].name, "zeta");
        assert_eq!(first.fields[0].number, 1);
    }

    #[test]
    fn test_nested_declarations() {
        let api = api(r##"
definitions:
  Owner:
    type: object
    properties:
      address:
        type: object
        properties:
          street: {type: string}
      status:
        type: string
        enum: [active, on hold]
      pets:
        type: array
        items: {$ref: "#/definitions/Pet"}
      tags:
        type: array
        items: {type: string}
      labels:
        type: object
        additionalProperties: {type: string}
  Pet: {type: object}
"##);
        let owner = message(&api, &GenerateOptions::default(), "Owner").unwrap();
        assert_eq!(
            field_summary(&owner),
            vec![
                ("address".to_string(), "Address".to_string(), 1, false),
                ("status".to_string(), "Status".to_string(), 2, false),
                ("pets".to_string(), "Pet".to_string(), 3, true),
                ("tags".to_string(), "string".to_string(), 4, true),
                ("labels".to_string(), "map<string, string>".to_string(), 5, false),
            ]
        );

        assert_eq!(owner.messages.len(), 1);
        assert_eq!(owner.messages[0].name, "Address");
        assert_eq!(owner.messages[0].fields[0].name, "street");

        let status = &owner.enums[0];
        let values: Vec<(&str, i32)> = status
            .values
            .iter()
            .map(|v| (v.name.as_str(), v.number))
            .collect();
        assert_eq!(
            values,
            vec![("STATUS_UNSPECIFIED", 0), ("ACTIVE", 1), ("ON_HOLD", 2)]
        );
    }

    #[test]
    fn test_top_level_enum_and_wrappers() {
        let api = api(r##"
definitions:
  Color: {type: string, enum: [red, green]}
  Names: {type: array, items: {type: string}}
  Count: {type: integer, format: int32}
  Alias: {$ref: "#/definitions/Color"}
"##);
        let options = GenerateOptions::default();
        let mut ctx = TranslationContext::new(&api, &options);

        match ctx.translate_definition("Color", &api.definitions["Color"]).unwrap() {
            Declaration::Enum(e) => {
                assert_eq!(e.values.len(), 3);
                assert_eq!(e.values[0].name, "COLOR_UNSPECIFIED");
            }
            other => panic!("expected enum, got {:?}", other),
        }

        let names = message(&api, &options, "Names").unwrap();
        assert_eq!(
            field_summary(&names),
            vec![("items".to_string(), "string".to_string(), 1, true)]
        );
        let count = message(&api, &options, "Count").unwrap();
        assert_eq!(
            field_summary(&count),
            vec![("value".to_string(), "int32".to_string(), 1, false)]
        );
        let alias = message(&api, &options, "Alias").unwrap();
        assert_eq!(
            field_summary(&alias),
            vec![("value".to_string(), "Color".to_string(), 1, false)]
        );
    }

    #[test]
    fn test_missing_type_falls_back_to_value() {
        let api = api(r#"
definitions:
  Event:
    properties:
      payload: {description: anything goes}
      id: {type: string}
"#);
        let options = GenerateOptions::default();
        let mut ctx = TranslationContext::new(&api, &options);
        let event = match ctx.translate_definition("Event", &api.definitions["Event"]).unwrap() {
            Declaration::Message(m) => m,
            other => panic!("expected message, got {:?}", other),
        };
        assert_eq!(event.fields[0].field_type.to_string(), "google.protobuf.Value");
        assert!(ctx.imports.contains(STRUCT_PROTO));
    }

    #[test]
    fn test_nested_arrays_and_map_of_arrays_are_wrapped() {
        let api = api(r#"
definitions:
  Grid:
    properties:
      rows:
        type: array
        items: {type: array, items: {type: integer}}
      groups:
        type: object
        additionalProperties: {type: array, items: {type: string}}
"#);
        let grid = message(&api, &GenerateOptions::default(), "Grid").unwrap();
        assert_eq!(
            field_summary(&grid),
            vec![
                ("rows".to_string(), "RowsValue".to_string(), 1, true),
                ("groups".to_string(), "map<string, GroupsValue>".to_string(), 2, false),
            ]
        );
        assert_eq!(
            field_summary(&grid.messages[0]),
            vec![("value".to_string(), "int64".to_string(), 1, true)]
        );
    }

    #[test]
    fn test_proto_tag_and_collisions() {
        let api = api(r#"
definitions:
  Tagged:
    properties:
      a: {type: string, x-proto-tag: 10}
      b: {type: string}
  Clash:
    properties:
      first-name: {type: string}
      first_name: {type: string}
  NumberClash:
    properties:
      a: {type: string, x-proto-tag: 2}
      b: {type: string}
"#);
        let options = GenerateOptions::default();
        let tagged = message(&api, &options, "Tagged").unwrap();
        assert_eq!(tagged.fields[0].number, 10);
        assert_eq!(tagged.fields[1].number, 2);

        let err = message(&api, &options, "Clash").unwrap_err();
        assert!(matches!(err, GeneratorError::NameCollision { ref name, .. } if name == "first_name"));

        let err = message(&api, &options, "NumberClash").unwrap_err();
        assert!(matches!(err, GeneratorError::NameCollision { ref name, .. } if name == "2"));
    }

    #[test]
    fn test_proto_tag_out_of_range() {
        let api = api(r#"
definitions:
  Zero:
    properties:
      a: {type: string, x-proto-tag: 0}
  Reserved:
    properties:
      a: {type: string, x-proto-tag: 19500}
  TooLarge:
    properties:
      a: {type: string, x-proto-tag: 536870912}
  Largest:
    properties:
      a: {type: string, x-proto-tag: 536870911}
"#);
        let options = GenerateOptions::default();
        for name in ["Zero", "Reserved", "TooLarge"] {
            let err = message(&api, &options, name).unwrap_err();
            assert!(matches!(err, GeneratorError::Generation(_)), "{}: {:?}", name, err);
        }
        let largest = message(&api, &options, "Largest").unwrap();
        assert_eq!(largest.fields[0].number, 536870911);
    }

    #[test]
    fn test_nested_type_hiding_a_reference() {
        let api = api(r##"
definitions:
  Pet:
    properties:
      name: {type: string}
  Owner:
    properties:
      pet:
        type: object
        properties:
          color: {type: string}
      favorite: {$ref: "#/definitions/Pet"}
  Keeper:
    properties:
      cage:
        type: object
        properties:
          resident: {$ref: "#/definitions/Pet"}
          pet: {type: string, enum: [cat, dog]}
"##);
        let options = GenerateOptions::default();

        let err = message(&api, &options, "Owner").unwrap_err();
        assert!(matches!(err, GeneratorError::NameCollision { ref name, .. } if name == "Pet"));

        // the nested enum hides Pet from Keeper.Cage.resident
        let err = message(&api, &options, "Keeper").unwrap_err();
        assert!(
            matches!(err, GeneratorError::NameCollision { ref scope, ref name } if name == "Pet" && scope.starts_with("message Cage"))
        );
    }

    #[test]
    fn test_sibling_enums_name_values_independently() {
        let api = api(r#"
definitions:
  Paint:
    properties:
      primary: {type: string, enum: [red, blue]}
      accent: {type: string, enum: [red]}
"#);
        let paint = message(&api, &GenerateOptions::default(), "Paint").unwrap();
        let names: Vec<Vec<&str>> = paint
            .enums
            .iter()
            .map(|e| e.values.iter().map(|v| v.name.as_str()).collect())
            .collect();
        assert_eq!(
            names,
            vec![
                vec!["PRIMARY_UNSPECIFIED", "RED", "BLUE"],
                vec!["ACCENT_UNSPECIFIED", "RED"],
            ]
        );
    }

    #[test]
    fn test_all_of_merges_properties() {
        let api = api(r##"
definitions:
  Base:
    properties:
      id: {type: string}
  Dog:
    allOf:
      - {$ref: "#/definitions/Base"}
      - properties:
          breed: {type: string}
    properties:
      good: {type: boolean}
"##);
        let dog = message(&api, &GenerateOptions::default(), "Dog").unwrap();
        let names: Vec<&str> = dog.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "breed", "good"]);
    }

    #[test]
    fn test_json_name_only_with_custom_options() {
        let api = api(r#"
definitions:
  Person:
    properties:
      first-name: {type: string}
      age: {type: integer}
"#);
        let plain = message(&api, &GenerateOptions::default(), "Person").unwrap();
        assert_eq!(plain.fields[0].json_name, None);

        let annotated = message(&api, &GenerateOptions::with_custom_options(true), "Person").unwrap();
        assert_eq!(annotated.fields[0].json_name.as_deref(), Some("first-name"));
        assert_eq!(annotated.fields[1].json_name, None);
    }
}
