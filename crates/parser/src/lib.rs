//! Swagger 2.0 parsing and translation to the proto3 IR
//!
//! This crate turns a Swagger document into a `ProtoFile` (see
//! `swagger2proto_common`), ready for rendering.
//!
//! ## Translation Strategy
//!
//! - `definitions` become top-level messages and enums
//! - `paths` become RPCs of a single service, one request message each
//! - `$ref`s are mapped to qualified proto type names; references into
//!   other documents become imports
//!
//! Names are derived deterministically:
//! - `GET /queue/{id}/enqueue_player` → `GetQueueIdEnqueuePlayer`
//! - enum label `foo & bar` → `FOO_AND_BAR`

pub mod naming;
pub mod reference;
pub mod swagger;
mod type_mapper;

pub use reference::{resolve_ref, ReferenceResolver, ResolvedType};
pub use swagger::{
    convert_swagger_to_proto_file, ApiDefinition, Conversion, DocumentLoader, ExternalDependency,
    FsDocumentLoader, GenerateOptions, SwaggerParser,
};
pub use type_mapper::TypeMapper;

use swagger2proto_common::Result;

/// Parse a Swagger document and translate it in one step
///
/// # Arguments
/// * `path` - JSON or YAML document on disk
/// * `options` - Generation knobs
pub fn parse_swagger_file<P: AsRef<std::path::Path>>(
    path: P,
    options: &GenerateOptions,
) -> Result<Conversion> {
    let parser = SwaggerParser::from_file(path)?;
    convert_swagger_to_proto_file(parser.definition(), options)
}
