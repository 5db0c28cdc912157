//! `$ref` resolution
//!
//! Every reference is classified once into a [`Reference`] and then mapped
//! to the proto type it names plus the proto file that declares it:
//!
//! | Reference | Qualified name | Owning file |
//! |-----------|----------------|-------------|
//! | `#/definitions/Name` | `Name` | (local) |
//! | `http://host/commons/name.json#/definitions/Name` | `commons.name.Name` | `commons/name.proto` |
//! | `http://host/commons/name.json` | `commons.Name` | `commons/name.proto` |
//! | `../../commons/names/Name.json#/definitions/Name` | `commons.names.name.Name` | `commons/names/name.proto` |

use crate::naming::{capitalize, message_name};
use crate::swagger::Schema;
use indexmap::IndexMap;
use swagger2proto_common::{GeneratorError, Result};
use tracing::debug;
use url::Url;

/// Target of a reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType {
    /// Package-then-type path, never empty
    pub qualified_name: String,

    /// Proto file declaring the type, empty when it is local
    pub owning_file: String,
}

impl ResolvedType {
    fn local(name: String) -> Self {
        Self {
            qualified_name: name,
            owning_file: String::new(),
        }
    }

    pub fn is_local(&self) -> bool {
        self.owning_file.is_empty()
    }

    /// Package part of the qualified name
    pub fn package(&self) -> &str {
        self.qualified_name
            .rsplit_once('.')
            .map(|(package, _)| package)
            .unwrap_or("")
    }
}

/// Shape of a reference string
#[derive(Debug, Clone, PartialEq)]
pub enum Reference<'a> {
    /// `#/definitions/Name`
    Local { fragment: &'a str },

    /// `http://host/dir/file.json[#fragment]`
    Url {
        url: Url,
        fragment: Option<&'a str>,
    },

    /// `dir/file.json[#fragment]`, relative to the current document
    File {
        path: &'a str,
        fragment: Option<&'a str>,
    },
}

impl<'a> Reference<'a> {
    /// Classify a reference string
    pub fn parse(reference: &'a str) -> Result<Self> {
        if reference.trim().is_empty() {
            return Err(GeneratorError::unresolved(reference, "empty reference"));
        }

        let (document, fragment) = match reference.split_once('#') {
            Some((document, fragment)) => (document, Some(fragment).filter(|f| !f.is_empty())),
            None => (reference, None),
        };

        if document.is_empty() {
            return match fragment {
                Some(fragment) if last_segment(fragment).is_some() => {
                    Ok(Reference::Local { fragment })
                }
                _ => Err(GeneratorError::unresolved(
                    reference,
                    "fragment does not name a definition",
                )),
            };
        }

        match Url::parse(document) {
            Ok(url) if url.has_host() => Ok(Reference::Url { url, fragment }),
            Ok(_) => Err(GeneratorError::unresolved(reference, "URL has no host")),
            Err(_) => Ok(Reference::File {
                path: document,
                fragment,
            }),
        }
    }
}

/// Resolves references found in one document
///
/// Relative file references are taken relative to `base_dir`, the
/// directory of the document being translated (empty for the root).
#[derive(Debug, Clone, Default)]
pub struct ReferenceResolver {
    base_dir: Vec<String>,
}

impl ReferenceResolver {
    /// Resolver for the root document
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver for a document living in `dir` (e.g. `commons/names`)
    pub fn with_base_dir(dir: &str) -> Self {
        Self {
            base_dir: normalize_path(&[], dir),
        }
    }

    /// Resolve a reference to its qualified type and owning file
    ///
    /// Fragment-only references never gain a package prefix. When
    /// `local_defs` is given and lacks the name the reference is still
    /// treated as local to the current translation unit.
    pub fn resolve(
        &self,
        reference: &str,
        local_defs: Option<&IndexMap<String, Schema>>,
    ) -> Result<ResolvedType> {
        let resolved = match Reference::parse(reference)? {
            Reference::Local { fragment } => {
                let name = last_segment(fragment).unwrap_or_default();
                if !local_defs.is_some_and(|defs| defs.contains_key(&name)) {
                    debug!(reference, "reference not among local definitions");
                }
                ResolvedType::local(message_name(&name))
            }
            Reference::Url { url, fragment } => {
                let segments: Vec<String> = url
                    .path_segments()
                    .map(|segments| {
                        segments
                            .filter(|s| !s.is_empty())
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default();
                qualify(reference, &segments, fragment)?
            }
            Reference::File { path, fragment } => {
                let segments = normalize_path(&self.base_dir, path);
                qualify(reference, &segments, fragment)?
            }
        };

        debug!(
            reference,
            qualified_name = %resolved.qualified_name,
            owning_file = %resolved.owning_file,
            "resolved reference"
        );
        Ok(resolved)
    }

    /// Location of the document a reference points into
    ///
    /// File references give a path relative to the root document, URLs
    /// give the URL without fragment, local references give `None`.
    pub fn source_document(&self, reference: &str) -> Result<Option<String>> {
        Ok(match Reference::parse(reference)? {
            Reference::Local { .. } => None,
            Reference::Url { mut url, .. } => {
                url.set_fragment(None);
                Some(url.to_string())
            }
            Reference::File { path, .. } => Some(normalize_path(&self.base_dir, path).join("/")),
        })
    }
}

/// Resolve against the root document
///
/// ```
/// use swagger2proto_parser::reference::resolve_ref;
///
/// let resolved = resolve_ref("http://host/commons/name.json#/definitions/Name", None).unwrap();
/// assert_eq!(resolved.qualified_name, "commons.name.Name");
/// assert_eq!(resolved.owning_file, "commons/name.proto");
/// ```
pub fn resolve_ref(
    reference: &str,
    local_defs: Option<&IndexMap<String, Schema>>,
) -> Result<ResolvedType> {
    ReferenceResolver::new().resolve(reference, local_defs)
}

/// Build the qualified name and owning file from a document path
fn qualify(reference: &str, segments: &[String], fragment: Option<&str>) -> Result<ResolvedType> {
    let Some((file, dirs)) = segments.split_last() else {
        return Err(GeneratorError::unresolved(reference, "no document path"));
    };

    let stem = match file.rfind('.') {
        Some(i) if i > 0 => &file[..i],
        _ => file.as_str(),
    };
    if stem.is_empty() {
        return Err(GeneratorError::unresolved(reference, "no document name"));
    }

    let mut package: Vec<String> = dirs.iter().map(|d| package_segment(d)).collect();
    let type_name = match fragment.and_then(last_segment) {
        Some(name) => {
            package.push(package_segment(stem));
            message_name(&name)
        }
        None => message_name(&capitalize(stem)),
    };

    let mut qualified = package;
    qualified.push(type_name);

    let mut owning = dirs.to_vec();
    owning.push(format!("{}.proto", stem.to_lowercase()));

    Ok(ResolvedType {
        qualified_name: qualified.join("."),
        owning_file: owning.join("/"),
    })
}

/// Apply `path` to `base`, dropping `.` and popping on `..`
///
/// `..` above the root is ignored.
fn normalize_path(base: &[String], path: &str) -> Vec<String> {
    let mut segments = base.to_vec();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other.to_string()),
        }
    }
    segments
}

/// Last JSON pointer segment of a fragment, unescaped
fn last_segment(fragment: &str) -> Option<String> {
    fragment
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
}

fn package_segment(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}
