//! proto3 intermediate representation
//!
//! The parser fills a [`ProtoFile`] from a Swagger document and the
//! generator serializes it to text. Declarations keep the order in which
//! they were added.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Import for `google.protobuf.Empty`
pub const EMPTY_PROTO: &str = "google/protobuf/empty.proto";

/// Import for `google.protobuf.Value`
pub const STRUCT_PROTO: &str = "google/protobuf/struct.proto";

/// Import for the `google.api.http` method option
pub const ANNOTATIONS_PROTO: &str = "google/api/annotations.proto";

/// One translation unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProtoFile {
    pub package: String,

    /// Imported files, de-duplicated and sorted
    pub imports: BTreeSet<String>,

    /// File level options (`option go_package = "...";`)
    pub options: Vec<ProtoOption>,

    pub messages: Vec<Message>,
    pub enums: Vec<Enum>,
    pub services: Vec<Service>,
}

impl ProtoFile {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            ..Self::default()
        }
    }

    /// Record an imported file. Empty names are ignored.
    pub fn add_import(&mut self, file: impl Into<String>) {
        let file = file.into();
        if !file.is_empty() {
            self.imports.insert(file);
        }
    }

    /// Whether a top-level message or enum with this name was already added
    pub fn has_declaration(&self, name: &str) -> bool {
        self.messages.iter().any(|m| m.name == name) || self.enums.iter().any(|e| e.name == name)
    }
}

/// A file level option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtoOption {
    pub name: String,
    pub value: OptionValue,
}

/// Option constant, rendered the way proto3 expects it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OptionValue {
    String(String),
    Bool(bool),
    Number(String),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::String(s) => write!(f, "\"{}\"", escape(s)),
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Escape a string for use inside a double-quoted proto literal
pub fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// A message declaration with its nested declarations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub name: String,
    pub fields: Vec<Field>,
    pub messages: Vec<Message>,
    pub enums: Vec<Enum>,
}

impl Message {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A message field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
    pub number: u32,
    pub repeated: bool,

    /// `[json_name = "..."]`, only set in custom options mode
    pub json_name: Option<String>,
}

/// Type of a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    Scalar(ScalarType),

    /// A message or enum, possibly package qualified
    Named(String),

    Map {
        key: ScalarType,
        value: Box<FieldType>,
    },
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Scalar(s) => write!(f, "{}", s),
            FieldType::Named(name) => write!(f, "{}", name),
            FieldType::Map { key, value } => write!(f, "map<{}, {}>", key, value),
        }
    }
}

/// proto3 scalar value types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Bool,
    String,
    Bytes,
}

impl ScalarType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarType::Double => "double",
            ScalarType::Float => "float",
            ScalarType::Int32 => "int32",
            ScalarType::Int64 => "int64",
            ScalarType::Uint32 => "uint32",
            ScalarType::Uint64 => "uint64",
            ScalarType::Sint32 => "sint32",
            ScalarType::Sint64 => "sint64",
            ScalarType::Fixed32 => "fixed32",
            ScalarType::Fixed64 => "fixed64",
            ScalarType::Bool => "bool",
            ScalarType::String => "string",
            ScalarType::Bytes => "bytes",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An enum declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Enum {
    pub name: String,
    pub values: Vec<EnumValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValue {
    pub name: String,
    pub number: i32,
}

/// A gRPC service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    pub rpcs: Vec<Rpc>,
}

/// An RPC method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rpc {
    pub name: String,
    pub request: String,
    pub response: String,

    /// `google.api.http` binding, only set in custom options mode
    pub http: Option<HttpRule>,
}

/// HTTP binding of an RPC
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRule {
    /// Lower-case HTTP verb
    pub method: String,
    pub path: String,

    /// Request field carrying the HTTP body
    pub body: Option<String>,
}
