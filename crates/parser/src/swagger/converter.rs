//! Converts a Swagger document to the proto3 IR
//!
//! Definitions are translated in lexicographic order, then paths (also
//! sorted) become the service. The result only depends on the document and
//! the options.

use super::types::{ApiDefinition, Schema};
use crate::naming::{package_name, service_name};
use crate::reference::{ReferenceResolver, ResolvedType};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use swagger2proto_common::{
    Enum, GeneratorError, Message, OptionValue, ProtoFile, ProtoOption, Result, ANNOTATIONS_PROTO,
};
use tracing::{debug, warn};

/// Knobs of one generation call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Annotate RPCs with `google.api.http` and fields with `json_name`
    pub custom_options: bool,

    /// Package override, derived from the document title when absent
    pub package: Option<String>,

    /// Directory of the document relative to the root document
    pub base_dir: String,
}

impl GenerateOptions {
    pub fn with_custom_options(custom_options: bool) -> Self {
        Self {
            custom_options,
            ..Self::default()
        }
    }
}

/// A proto file the translation unit imports
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExternalDependency {
    /// Proto file to import (e.g. `commons/name.proto`)
    pub proto_file: String,

    /// Package of the imported types
    pub package: String,

    /// Source document: a path relative to the root document or a URL
    pub document: String,
}

/// Output of [`convert_swagger_to_proto_file`]
#[derive(Debug, Clone)]
pub struct Conversion {
    pub file: ProtoFile,

    /// External files, sorted by proto file name
    pub dependencies: Vec<ExternalDependency>,
}

/// A translated top-level declaration
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Message(Message),
    Enum(Enum),
}

/// State threaded through one translation
///
/// Nothing in here outlives the call that created it.
pub struct TranslationContext<'a> {
    pub(crate) api: &'a ApiDefinition,
    pub(crate) options: &'a GenerateOptions,
    resolver: ReferenceResolver,
    pub(crate) imports: BTreeSet<String>,
    dependencies: BTreeMap<String, ExternalDependency>,
    /// Type names of local references, in the order fields were built
    pub(crate) local_references: Vec<String>,
}

impl<'a> TranslationContext<'a> {
    pub fn new(api: &'a ApiDefinition, options: &'a GenerateOptions) -> Self {
        Self {
            api,
            options,
            resolver: ReferenceResolver::with_base_dir(&options.base_dir),
            imports: BTreeSet::new(),
            dependencies: BTreeMap::new(),
            local_references: Vec::new(),
        }
    }

    /// Resolve a schema reference found at `location`
    ///
    /// Local references must name an existing definition. External ones
    /// are recorded as imports.
    pub(crate) fn resolve(&mut self, reference: &str, location: &str) -> Result<ResolvedType> {
        let resolved = self
            .resolver
            .resolve(reference, Some(&self.api.definitions))
            .map_err(|e| relocate(e, location))?;

        if resolved.is_local() {
            if let Some(name) = reference.strip_prefix("#/definitions/") {
                if !self.api.definitions.contains_key(name) {
                    return Err(GeneratorError::unresolved(
                        reference,
                        format!("{} (no such definition)", location),
                    ));
                }
            }
            return Ok(resolved);
        }

        self.imports.insert(resolved.owning_file.clone());
        if !self.dependencies.contains_key(&resolved.owning_file) {
            let document = self
                .resolver
                .source_document(reference)
                .map_err(|e| relocate(e, location))?
                .unwrap_or_default();
            self.dependencies.insert(
                resolved.owning_file.clone(),
                ExternalDependency {
                    proto_file: resolved.owning_file.clone(),
                    package: resolved.package().to_string(),
                    document,
                },
            );
        }
        Ok(resolved)
    }

    /// Follow `#/definitions/...` to the schema it names
    pub(crate) fn local_definition(&self, reference: &str) -> Option<&'a Schema> {
        let api = self.api;
        reference
            .strip_prefix("#/definitions/")
            .and_then(|name| api.definitions.get(name))
    }
}

/// Convert a Swagger document to a ProtoFile
pub fn convert_swagger_to_proto_file(
    api: &ApiDefinition,
    options: &GenerateOptions,
) -> Result<Conversion> {
    let package = options
        .package
        .clone()
        .unwrap_or_else(|| package_name(&api.info.title));

    let mut file = ProtoFile::new(package);
    file.options = file_options(api);

    let mut ctx = TranslationContext::new(api, options);

    let mut names: Vec<&String> = api.definitions.keys().collect();
    names.sort();
    for name in names {
        let declaration = ctx.translate_definition(name, &api.definitions[name])?;
        let declared = match &declaration {
            Declaration::Message(m) => &m.name,
            Declaration::Enum(e) => &e.name,
        };
        if file.has_declaration(declared) {
            return Err(GeneratorError::collision(
                format!("package {:?}", file.package),
                declared.clone(),
            ));
        }
        debug!(definition = %name, declaration = %declared, "translated definition");

        match declaration {
            Declaration::Message(m) => file.messages.push(m),
            Declaration::Enum(e) => file.enums.push(e),
        }
    }

    let service_name = service_name(&file.package);
    let service = ctx.translate_paths(&service_name, &mut file)?;
    if !service.rpcs.is_empty() {
        if options.custom_options {
            file.add_import(ANNOTATIONS_PROTO);
        }
        file.services.push(service);
    }

    for import in std::mem::take(&mut ctx.imports) {
        file.add_import(import);
    }

    Ok(Conversion {
        file,
        dependencies: ctx.dependencies.into_values().collect(),
    })
}

/// `x-global-options`, sorted by option name
fn file_options(api: &ApiDefinition) -> Vec<ProtoOption> {
    let mut options: Vec<ProtoOption> = api
        .global_options
        .iter()
        .filter_map(|(name, value)| {
            let value = match value {
                Value::String(s) => OptionValue::String(s.clone()),
                Value::Bool(b) => OptionValue::Bool(*b),
                Value::Number(n) => OptionValue::Number(n.to_string()),
                other => {
                    warn!(option = %name, value = %other, "ignoring non-scalar global option");
                    return None;
                }
            };
            Some(ProtoOption {
                name: name.clone(),
                value,
            })
        })
        .collect();
    options.sort_by(|a, b| a.name.cmp(&b.name));
    options
}

/// Replace the resolver's reason with where the reference was found
fn relocate(err: GeneratorError, location: &str) -> GeneratorError {
    match err {
        GeneratorError::UnresolvedReference { reference, context } => {
            GeneratorError::unresolved(reference, format!("{} ({})", location, context))
        }
        other => other,
    }
}
