//! Swagger 2.0 document parsing and translation to proto3
//!
//! ## Pipeline
//! 1. [`SwaggerParser`] decodes JSON or YAML into an [`ApiDefinition`]
//! 2. [`convert_swagger_to_proto_file`] walks definitions (sorted by name)
//!    and paths (sorted by template) into a `ProtoFile`
//! 3. The generator crate renders the `ProtoFile` as proto3 text
//!
//! ## Usage
//! ```rust,ignore
//! use swagger2proto_parser::swagger::{convert_swagger_to_proto_file, GenerateOptions, SwaggerParser};
//!
//! let parser = SwaggerParser::from_file("petstore.yaml")?;
//! let conversion = convert_swagger_to_proto_file(parser.definition(), &GenerateOptions::default())?;
//! ```

mod converter;
mod loader;
mod parser;
mod schema;
mod service;
mod types;

pub use converter::{
    convert_swagger_to_proto_file, Conversion, Declaration, ExternalDependency, GenerateOptions,
    TranslationContext,
};
pub use loader::{DocumentLoader, FsDocumentLoader};
pub use parser::{DocumentFormat, SwaggerParser};
pub use types::*;
