//! proto3 generation for Swagger documents
//!
//! This crate renders the `ProtoFile` produced by the parser crate as
//! proto3 source text. Output is a pure function of the document and the
//! options: the same input always yields byte-identical text.

mod render;
mod templates;
mod tree;

pub use render::{render_enum, render_field, render_message, render_option, render_service};
pub use tree::{ProtoTree, ProtoTreeGenerator};

use serde::Serialize;
use swagger2proto_common::{GeneratorError, ProtoFile, Result};
use swagger2proto_parser::{
    convert_swagger_to_proto_file, ApiDefinition, ExternalDependency, GenerateOptions,
};
use tera::{Context, Tera};
use tracing::debug;

/// Generated proto text plus the files it imports from other documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedProto {
    pub content: String,

    /// External documents, sorted by proto file name
    pub dependencies: Vec<ExternalDependency>,
}

/// Template context of one proto file
#[derive(Serialize)]
struct Layout<'a> {
    package: &'a str,
    imports: Vec<&'a str>,
    options: Vec<String>,
    blocks: Vec<String>,
}

/// Proto generator
///
/// Holds the loaded templates, reuse one instance for many documents.
pub struct ProtoGenerator {
    tera: Tera,
}

impl ProtoGenerator {
    pub fn new() -> Result<Self> {
        let tera = templates::load_templates()?;
        Ok(Self { tera })
    }

    /// Translate and render a document
    pub fn generate(&self, api: &ApiDefinition, options: &GenerateOptions) -> Result<GeneratedProto> {
        let conversion = convert_swagger_to_proto_file(api, options)?;
        let content = self.render(&conversion.file)?;
        debug!(
            package = %conversion.file.package,
            messages = conversion.file.messages.len(),
            enums = conversion.file.enums.len(),
            dependencies = conversion.dependencies.len(),
            "generated proto file"
        );

        Ok(GeneratedProto {
            content,
            dependencies: conversion.dependencies,
        })
    }

    /// Render a proto file
    ///
    /// Messages come first, then enums, then services.
    pub fn render(&self, file: &ProtoFile) -> Result<String> {
        let mut blocks: Vec<String> = file.messages.iter().map(render_message).collect();
        blocks.extend(file.enums.iter().map(render_enum));
        blocks.extend(file.services.iter().map(render_service));

        let layout = Layout {
            package: &file.package,
            imports: file.imports.iter().map(String::as_str).collect(),
            options: file.options.iter().map(render_option).collect(),
            blocks,
        };

        let context = Context::from_serialize(&layout)
            .map_err(|e| GeneratorError::Generation(format!("Template context error: {}", e)))?;
        self.tera
            .render(templates::PROTO_TEMPLATE, &context)
            .map_err(|e| GeneratorError::Generation(format!("Template error: {:?}", e)))
    }
}

/// Generate proto3 text for a document
///
/// # Arguments
/// * `api` - Parsed Swagger document
/// * `custom_options` - Emit `google.api.http` rules and `json_name` options
pub fn generate_proto(api: &ApiDefinition, custom_options: bool) -> Result<GeneratedProto> {
    generate_with_options(api, &GenerateOptions::with_custom_options(custom_options))
}

/// Same as [`generate_proto`], returning only the UTF-8 bytes
pub fn generate_proto_bytes(api: &ApiDefinition, custom_options: bool) -> Result<Vec<u8>> {
    Ok(generate_proto(api, custom_options)?.content.into_bytes())
}

pub fn generate_with_options(api: &ApiDefinition, options: &GenerateOptions) -> Result<GeneratedProto> {
    ProtoGenerator::new()?.generate(api, options)
}
