//! Maps project-relative paths to `(layer, module, role)` identities.

use serde::Serialize;
use std::fmt;
use std::path::Path;

use crate::policy::{LayerDef, Policy};

/// Functional category of a file, derived from its stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileRole {
    /// Presentation component.
    Ui,
    /// State container.
    Store,
    /// I/O adapter.
    Service,
    /// Type declarations.
    Types,
    /// The module's public entry (`index`).
    PublicApi,
    /// No role convention matched.
    Unclassified,
}

impl FileRole {
    /// Policy name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ui => "ui",
            Self::Store => "store",
            Self::Service => "service",
            Self::Types => "types",
            Self::PublicApi => "public-api",
            Self::Unclassified => "unclassified",
        }
    }

    /// Parses a policy role name. `index` is accepted for the public entry.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ui" => Some(Self::Ui),
            "store" => Some(Self::Store),
            "service" => Some(Self::Service),
            "types" => Some(Self::Types),
            "public-api" | "public_api" | "index" => Some(Self::PublicApi),
            _ => None,
        }
    }
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Layer identity of a file or an import target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Under a configured layer root.
    Classified {
        /// Layer name.
        name: String,
        /// Layer rank; higher layers may import lower ones.
        rank: usize,
    },
    /// Inside the project but under no layer root.
    Unclassified,
    /// An external package.
    External,
    /// A specifier that could not be resolved to a file.
    Unresolved,
}

impl Layer {
    fn from_def(def: &LayerDef) -> Self {
        Self::Classified {
            name: def.name.clone(),
            rank: def.rank,
        }
    }

    /// Rank of a classified layer.
    #[must_use]
    pub fn rank(&self) -> Option<usize> {
        match self {
            Self::Classified { rank, .. } => Some(*rank),
            _ => None,
        }
    }

    /// Name of the layer, or of the sentinel.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Classified { name, .. } => name,
            Self::Unclassified => "unclassified",
            Self::External => "external",
            Self::Unresolved => "unresolved",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A module under a modules layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId {
    /// Module name, the path segment after the modules root.
    pub name: String,
    /// Project-relative module directory.
    pub dir: String,
}

/// Identity of a classified path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Layer of the path.
    pub layer: Layer,
    /// Module, for paths under a modules layer.
    pub module: Option<ModuleId>,
    /// Role from the file stem.
    pub role: FileRole,
}

impl Classification {
    /// Whether the path is its module's public entry: a public-api file
    /// directly in the module directory.
    #[must_use]
    pub fn is_public_entry(&self, path: &str) -> bool {
        self.role == FileRole::PublicApi
            && self
                .module
                .as_ref()
                .is_some_and(|m| parent_dir(path) == m.dir)
    }
}

/// A path does not fit the expected layout.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassificationError {
    /// A file sits directly in a modules root instead of a module directory.
    #[error("`{path}` sits directly in modules root `{root}` of layer `{layer}`; expected {root}/<module>/...")]
    MissingModuleSegment {
        /// Offending path.
        path: String,
        /// The modules root.
        root: String,
        /// Layer name.
        layer: String,
    },
}

/// Classifies paths against the layer roots of a [`Policy`].
#[derive(Debug)]
pub struct LayerClassifier<'p> {
    policy: &'p Policy,
    roots: Vec<(&'p str, &'p LayerDef)>,
}

impl<'p> LayerClassifier<'p> {
    /// Creates a classifier for the given policy.
    #[must_use]
    pub fn new(policy: &'p Policy) -> Self {
        let mut roots: Vec<(&str, &LayerDef)> = policy
            .layers()
            .iter()
            .flat_map(|layer| layer.roots.iter().map(move |r| (r.as_str(), layer)))
            .collect();
        // Stable: among equal roots the first configured layer stays first.
        roots.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Self { policy, roots }
    }

    /// Classifies a project-relative, `/`-separated path.
    ///
    /// # Errors
    ///
    /// Returns [`ClassificationError::MissingModuleSegment`] for a file
    /// directly inside a modules root.
    pub fn classify(&self, path: &str) -> Result<Classification, ClassificationError> {
        let role = self.role_of(path);
        let Some((root, def)) = self.layer_match(path) else {
            return Ok(Classification {
                layer: Layer::Unclassified,
                module: None,
                role,
            });
        };

        let module = if def.modules {
            Some(module_of(path, root, def)?)
        } else {
            None
        };

        Ok(Classification {
            layer: Layer::from_def(def),
            module,
            role,
        })
    }

    /// Classifies a path, falling back to a module-less identity when the
    /// layout is malformed. The error, if any, is returned alongside.
    #[must_use]
    pub fn classify_lenient(&self, path: &str) -> (Classification, Option<ClassificationError>) {
        match self.classify(path) {
            Ok(c) => (c, None),
            Err(e) => {
                let layer = self
                    .layer_match(path)
                    .map_or(Layer::Unclassified, |(_, def)| Layer::from_def(def));
                let fallback = Classification {
                    layer,
                    module: None,
                    role: self.role_of(path),
                };
                (fallback, Some(e))
            }
        }
    }

    /// Role of a path from its file stem.
    #[must_use]
    pub fn role_of(&self, path: &str) -> FileRole {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        Path::new(file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .map_or(FileRole::Unclassified, |stem| {
                self.policy.roles().role_for_stem(stem)
            })
    }

    fn layer_match(&self, path: &str) -> Option<(&'p str, &'p LayerDef)> {
        self.roots
            .iter()
            .find(|(root, _)| is_under(path, root))
            .copied()
    }
}

fn module_of(path: &str, root: &str, def: &LayerDef) -> Result<ModuleId, ClassificationError> {
    let rest = path
        .get(root.len()..)
        .map(|r| r.trim_start_matches('/'))
        .unwrap_or_default();
    match rest.split_once('/') {
        Some((name, _)) if !name.is_empty() => Ok(ModuleId {
            name: name.to_string(),
            dir: format!("{root}/{name}"),
        }),
        _ => Err(ClassificationError::MissingModuleSegment {
            path: path.to_string(),
            root: root.to_string(),
            layer: def.name.clone(),
        }),
    }
}

/// Whether `path` equals `dir` or lies below it, on segment boundaries.
pub(crate) fn is_under(path: &str, dir: &str) -> bool {
    dir.is_empty()
        || path == dir
        || path
            .strip_prefix(dir)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Parent directory of a `/`-separated path (empty at the top level).
pub(crate) fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(dir, _)| dir)
}
