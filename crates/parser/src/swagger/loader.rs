//! Loading of referenced documents

use super::parser::SwaggerParser;
use super::types::ApiDefinition;
use std::path::{Path, PathBuf};
use swagger2proto_common::{GeneratorError, Result};
use tracing::debug;

/// Source of the documents an external `$ref` points at
///
/// Paths are relative to the root document, as recorded in
/// `ExternalDependency::document`.
pub trait DocumentLoader {
    fn load(&self, document: &str) -> Result<ApiDefinition>;
}

/// Loads documents from a directory on disk
#[derive(Debug, Clone)]
pub struct FsDocumentLoader {
    root: PathBuf,
}

impl FsDocumentLoader {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DocumentLoader for FsDocumentLoader {
    fn load(&self, document: &str) -> Result<ApiDefinition> {
        if document.contains("://") {
            return Err(GeneratorError::Parse(format!(
                "Remote document {} cannot be loaded from {}",
                document,
                self.root.display()
            )));
        }

        let path = self.root.join(document);
        debug!(path = %path.display(), "loading referenced document");
        Ok(SwaggerParser::from_file(path)?.into_definition())
    }
}
