//! Generation of a document and the documents it references

use crate::{GeneratedProto, ProtoGenerator};
use std::collections::{BTreeMap, HashSet, VecDeque};
use swagger2proto_common::Result;
use swagger2proto_parser::{ApiDefinition, DocumentLoader, ExternalDependency, GenerateOptions};
use tracing::{debug, warn};

/// Generates one proto file per document reachable through `$ref`
///
/// Documents are visited breadth-first, each once. URL dependencies are
/// never fetched; they are reported by [`ProtoTreeGenerator::skipped`].
pub struct ProtoTreeGenerator<L: DocumentLoader> {
    loader: L,
    generator: ProtoGenerator,
    options: GenerateOptions,
}

/// Output of [`ProtoTreeGenerator::generate`]
#[derive(Debug, Clone, Default)]
pub struct ProtoTree {
    /// Proto file name to content
    pub files: BTreeMap<String, String>,

    /// Dependencies that were not generated (remote documents)
    pub skipped: Vec<ExternalDependency>,
}

impl<L: DocumentLoader> ProtoTreeGenerator<L> {
    pub fn new(loader: L, options: GenerateOptions) -> Result<Self> {
        Ok(Self {
            loader,
            generator: ProtoGenerator::new()?,
            options,
        })
    }

    /// Generate `root` as `root_file` and every local document it needs
    pub fn generate(&self, root: &ApiDefinition, root_file: &str) -> Result<ProtoTree> {
        let mut tree = ProtoTree::default();
        let mut seen: HashSet<String> = HashSet::from([root_file.to_string()]);
        let mut queue: VecDeque<ExternalDependency> = VecDeque::new();

        let GeneratedProto {
            content,
            dependencies,
        } = self.generator.generate(root, &self.options)?;
        tree.files.insert(root_file.to_string(), content);
        queue.extend(dependencies);

        while let Some(dependency) = queue.pop_front() {
            if !seen.insert(dependency.proto_file.clone()) {
                continue;
            }
            if dependency.document.contains("://") {
                warn!(document = %dependency.document, "not fetching remote document");
                tree.skipped.push(dependency);
                continue;
            }

            debug!(
                document = %dependency.document,
                proto_file = %dependency.proto_file,
                "generating dependency"
            );
            let api = self.loader.load(&dependency.document)?;
            let options = GenerateOptions {
                custom_options: self.options.custom_options,
                package: Some(dependency.package.clone()),
                base_dir: parent_dir(&dependency.document).to_string(),
            };
            let generated = self.generator.generate(&api, &options)?;
            tree.files.insert(dependency.proto_file.clone(), generated.content);
            queue.extend(generated.dependencies);
        }

        Ok(tree)
    }
}

fn parent_dir(document: &str) -> &str {
    document.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}
