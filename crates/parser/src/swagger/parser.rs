//! Swagger document decoding

use super::types::{ApiDefinition, Schema};
use crate::naming::capitalize;
use serde_json::Value;
use std::fs;
use std::path::Path;
use swagger2proto_common::{GeneratorError, Result};

/// Serialization of a source document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Guess the format from a file extension, YAML unless it says `.json`
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => DocumentFormat::Json,
            _ => DocumentFormat::Yaml,
        }
    }
}

/// Swagger document parser
///
/// Reads Swagger 2.0 documents from JSON or YAML. A file that holds a bare
/// schema (no `swagger`, `paths` or `definitions` key) is wrapped as a
/// document with a single definition named after the file.
#[derive(Debug)]
pub struct SwaggerParser {
    definition: ApiDefinition,
}

impl SwaggerParser {
    /// Load a document from a file path
    ///
    /// # Example
    /// ```rust,ignore
    /// let parser = SwaggerParser::from_file("fixtures/petstore.yaml")?;
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            GeneratorError::Parse(format!("Failed to read Swagger file {}: {}", path.display(), e))
        })?;

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        Self::from_source(&content, DocumentFormat::from_path(path), name)
    }

    /// Parse a document from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_source(json, DocumentFormat::Json, "")
    }

    /// Parse a document from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Self::from_source(yaml, DocumentFormat::Yaml, "")
    }

    /// Parse a document, `name` names the definition of a bare schema
    pub fn from_source(content: &str, format: DocumentFormat, name: &str) -> Result<Self> {
        let value: Value = match format {
            DocumentFormat::Json => serde_json::from_str(content).map_err(|e| {
                GeneratorError::Parse(format!("Failed to parse Swagger JSON: {}", e))
            })?,
            DocumentFormat::Yaml => {
                // goes through serde_yaml::Value so integer keys (`200:`) become strings
                let yaml: serde_yaml::Value = serde_yaml::from_str(content).map_err(|e| {
                    GeneratorError::Parse(format!("Failed to parse Swagger YAML: {}", e))
                })?;
                serde_json::to_value(yaml).map_err(|e| {
                    GeneratorError::Parse(format!("Unsupported YAML structure: {}", e))
                })?
            }
        };

        let definition = if is_document(&value) || name.is_empty() {
            serde_json::from_value(value).map_err(|e| {
                GeneratorError::Parse(format!("Invalid Swagger document: {}", e))
            })?
        } else {
            let schema: Schema = serde_json::from_value(value)
                .map_err(|e| GeneratorError::Parse(format!("Invalid schema in {}: {}", name, e)))?;
            let mut definition = ApiDefinition::default();
            definition.definitions.insert(capitalize(name), schema);
            definition
        };

        Ok(Self { definition })
    }

    /// Get reference to the parsed document
    pub fn definition(&self) -> &ApiDefinition {
        &self.definition
    }

    pub fn into_definition(self) -> ApiDefinition {
        self.definition
    }
}

fn is_document(value: &Value) -> bool {
    match value {
        Value::Object(map) => ["swagger", "paths", "definitions", "info"]
            .iter()
            .any(|key| map.contains_key(*key)),
        // an empty YAML document decodes to null
        Value::Null => true,
        _ => false,
    }
}
