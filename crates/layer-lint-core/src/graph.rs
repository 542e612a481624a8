//! Dependency graph construction.
//!
//! Reads every discovered file, classifies it, extracts its imports and
//! resolves each one to a classified target. Per-file work runs on a
//! rayon pool; a file that cannot be read or classified becomes an issue
//! violation and never stops the others.

use rayon::prelude::*;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use tracing::debug;

use crate::classifier::{Classification, FileRole, Layer, LayerClassifier, ModuleId};
use crate::extractor::{extract_imports, ImportKind};
use crate::policy::Policy;
use crate::resolver::{Resolution, Resolver};
use crate::rule::RuleId;
use crate::source::SourceReader;
use crate::types::{Location, Severity, Suggestion, Violation};

/// Where an import edge points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Resolved project-relative path, for internal targets.
    pub path: Option<String>,
    /// Target layer (`External`/`Unresolved` when not a project file).
    pub layer: Layer,
    /// Target module, for targets under a modules layer.
    pub module: Option<ModuleId>,
    /// Target role.
    pub role: FileRole,
    /// Whether the target is its module's public entry.
    pub is_public_entry: bool,
}

impl Target {
    fn outside(layer: Layer) -> Self {
        Self {
            path: None,
            layer,
            module: None,
            role: FileRole::Unclassified,
            is_public_entry: false,
        }
    }
}

/// A directed import from one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEdge {
    /// Raw specifier as written.
    pub specifier: String,
    /// 1-based line of the specifier.
    pub line: usize,
    /// 1-based column of the specifier.
    pub column: usize,
    /// Statement kind.
    pub kind: ImportKind,
    /// Resolved target.
    pub target: Target,
}

/// A readable source file and its outgoing edges.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Project-relative, `/`-separated path.
    pub path: String,
    /// Layer of the file.
    pub layer: Layer,
    /// Module of the file, under a modules layer.
    pub module: Option<ModuleId>,
    /// Role of the file.
    pub role: FileRole,
    /// Raw text.
    pub content: String,
    /// Imports in source order.
    pub imports: Vec<ImportEdge>,
}

impl SourceFile {
    /// Location of an edge in this file.
    #[must_use]
    pub fn edge_location(&self, edge: &ImportEdge) -> Location {
        Location::new(&self.path, edge.line, edge.column)
    }
}

/// The full set of source files and resolved edges.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    files: Vec<SourceFile>,
    inventory: Vec<String>,
    modules: BTreeSet<ModuleId>,
    issues: Vec<Violation>,
}

impl Graph {
    /// Readable files, sorted by path.
    #[must_use]
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    /// Every discovered path, readable or not, sorted.
    #[must_use]
    pub fn inventory(&self) -> &[String] {
        &self.inventory
    }

    /// Every module observed in the inventory.
    #[must_use]
    pub fn modules(&self) -> &BTreeSet<ModuleId> {
        &self.modules
    }

    /// I/O and classification violations raised while building.
    #[must_use]
    pub fn issues(&self) -> &[Violation] {
        &self.issues
    }

    /// Looks up a readable file by path.
    #[must_use]
    pub fn file(&self, path: &str) -> Option<&SourceFile> {
        self.files
            .binary_search_by(|f| f.path.as_str().cmp(path))
            .ok()
            .map(|i| &self.files[i])
    }

    /// All edges with their source files.
    pub fn edges(&self) -> impl Iterator<Item = (&SourceFile, &ImportEdge)> {
        self.files
            .iter()
            .flat_map(|f| f.imports.iter().map(move |e| (f, e)))
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.files.iter().map(|f| f.imports.len()).sum()
    }
}

struct FileOutcome {
    file: Option<SourceFile>,
    module: Option<ModuleId>,
    issues: Vec<Violation>,
}

/// Builds a [`Graph`] from discovered paths.
pub struct GraphBuilder<'a> {
    policy: &'a Policy,
    project_root: &'a Path,
    reader: &'a dyn SourceReader,
}

impl<'a> GraphBuilder<'a> {
    /// Creates a builder reading files below `project_root`.
    #[must_use]
    pub fn new(policy: &'a Policy, project_root: &'a Path, reader: &'a dyn SourceReader) -> Self {
        Self {
            policy,
            project_root,
            reader,
        }
    }

    /// Builds the graph. `paths` are project-relative and `/`-separated;
    /// their order does not affect the result.
    #[must_use]
    pub fn build(&self, paths: Vec<String>) -> Graph {
        let mut inventory = paths;
        inventory.sort();
        inventory.dedup();

        let known: HashSet<String> = inventory.iter().cloned().collect();
        let classifier = LayerClassifier::new(self.policy);
        let resolver = Resolver::new(self.policy, self.project_root, &known, self.reader);

        let outcomes: Vec<FileOutcome> = inventory
            .par_iter()
            .map(|path| self.process(path, &classifier, &resolver))
            .collect();

        let mut graph = Graph {
            inventory,
            ..Graph::default()
        };
        for outcome in outcomes {
            if let Some(module) = outcome.module {
                graph.modules.insert(module);
            }
            if let Some(file) = outcome.file {
                graph.files.push(file);
            }
            graph.issues.extend(outcome.issues);
        }
        graph.files.sort_by(|a, b| a.path.cmp(&b.path));
        graph.issues.sort_by(Violation::report_order);
        graph
    }

    fn process(
        &self,
        path: &str,
        classifier: &LayerClassifier<'_>,
        resolver: &Resolver<'_>,
    ) -> FileOutcome {
        let mut issues = Vec::new();
        let (identity, error) = classifier.classify_lenient(path);
        if let Some(error) = error {
            issues.push(
                RuleId::ClassificationError
                    .violation(Severity::Error, Location::path(path), error.to_string())
                    .with_suggestion(Suggestion::new(
                        "move the file into a module directory or out of the modules root",
                    )),
            );
        }

        let content = match self.reader.read(&self.project_root.join(path)) {
            Ok(content) => content,
            Err(err) => {
                debug!(path, error = %err, "Failed to read file");
                issues.push(RuleId::IoError.violation(
                    Severity::Error,
                    Location::path(path),
                    format!("failed to read file: {err}"),
                ));
                return FileOutcome {
                    file: None,
                    module: identity.module,
                    issues,
                };
            }
        };

        let imports = extract_imports(&content)
            .into_iter()
            .map(|spec| {
                let target = self.target(classifier, resolver.resolve(path, &spec.specifier));
                ImportEdge {
                    specifier: spec.specifier,
                    line: spec.line,
                    column: spec.column,
                    kind: spec.kind,
                    target,
                }
            })
            .collect::<Vec<_>>();
        debug!(path, imports = imports.len(), layer = %identity.layer, "Processed file");

        let Classification {
            layer,
            module,
            role,
        } = identity;
        FileOutcome {
            file: Some(SourceFile {
                path: path.to_string(),
                layer,
                module: module.clone(),
                role,
                content,
                imports,
            }),
            module,
            issues,
        }
    }

    fn target(&self, classifier: &LayerClassifier<'_>, resolution: Resolution) -> Target {
        match resolution {
            Resolution::Internal(path) => {
                let (c, _) = classifier.classify_lenient(&path);
                Target {
                    is_public_entry: c.is_public_entry(&path),
                    layer: c.layer,
                    module: c.module,
                    role: c.role,
                    path: Some(path),
                }
            }
            Resolution::External => Target::outside(Layer::External),
            Resolution::Unresolved => Target::outside(Layer::Unresolved),
        }
    }
}
