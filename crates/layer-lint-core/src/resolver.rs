//! Specifier resolution, mirroring a bundler's relative and alias rules.

use path_clean::PathClean;
use std::collections::HashSet;
use std::path::{Component, Path};

use crate::classifier::parent_dir;
use crate::policy::Policy;
use crate::source::SourceReader;

/// Where an import specifier points.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// A file inside the project (project-relative, `/`-separated).
    Internal(String),
    /// An external package.
    External,
    /// An internal-looking specifier with no matching file.
    Unresolved,
}

/// Resolves specifiers against the discovered file set, falling back to
/// the reader for files that were not scanned.
pub struct Resolver<'a> {
    policy: &'a Policy,
    project_root: &'a Path,
    known: &'a HashSet<String>,
    reader: &'a dyn SourceReader,
}

impl<'a> Resolver<'a> {
    /// Creates a resolver. `known` holds every discovered source path.
    #[must_use]
    pub fn new(
        policy: &'a Policy,
        project_root: &'a Path,
        known: &'a HashSet<String>,
        reader: &'a dyn SourceReader,
    ) -> Self {
        Self {
            policy,
            project_root,
            known,
            reader,
        }
    }

    /// Resolves `specifier` as imported from `importer`.
    #[must_use]
    pub fn resolve(&self, importer: &str, specifier: &str) -> Resolution {
        let candidate = if is_relative(specifier) {
            let base = parent_dir(importer);
            if base.is_empty() {
                normalize(specifier)
            } else {
                normalize(&format!("{base}/{specifier}"))
            }
        } else if let Some(target) = self.expand_alias(specifier) {
            normalize(&target)
        } else if specifier.starts_with('/') {
            return Resolution::Unresolved;
        } else {
            return Resolution::External;
        };

        candidate
            .and_then(|path| self.probe(&path))
            .map_or(Resolution::Unresolved, Resolution::Internal)
    }

    fn expand_alias(&self, specifier: &str) -> Option<String> {
        self.policy.aliases().iter().find_map(|alias| {
            alias.strip(specifier).map(|rest| match (alias.target.is_empty(), rest.is_empty()) {
                (_, true) => alias.target.clone(),
                (true, false) => rest.to_string(),
                (false, false) => format!("{}/{rest}", alias.target),
            })
        })
    }

    fn probe(&self, path: &str) -> Option<String> {
        let extensions = &self.policy.analyzer().extensions;
        std::iter::once(path.to_string())
            .chain(extensions.iter().map(|ext| format!("{path}.{ext}")))
            .chain(extensions.iter().map(|ext| {
                if path.is_empty() {
                    format!("index.{ext}")
                } else {
                    format!("{path}/index.{ext}")
                }
            }))
            .find(|p| self.exists(p))
    }

    /// A discovered source file, or any other file on disk below the
    /// project root (sources outside the scanned root, excluded sources,
    /// stylesheets and other assets).
    fn exists(&self, path: &str) -> bool {
        !path.is_empty()
            && (self.known.contains(path) || self.reader.is_file(&self.project_root.join(path)))
    }
}

fn is_relative(specifier: &str) -> bool {
    matches!(specifier, "." | "..") || specifier.starts_with("./") || specifier.starts_with("../")
}

/// Lexically normalises a project-relative path. `None` if it escapes
/// the project root.
fn normalize(path: &str) -> Option<String> {
    let cleaned = Path::new(path).clean();
    let mut parts = Vec::new();
    for component in cleaned.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?.to_string()),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FsReader;

    fn known(paths: &[&str]) -> HashSet<String> {
        paths.iter().map(|p| (*p).to_string()).collect()
    }

    fn resolve(files: &HashSet<String>, importer: &str, spec: &str) -> Resolution {
        let policy = Policy::builtin().unwrap();
        Resolver::new(&policy, Path::new("/nonexistent-project"), files, &FsReader)
            .resolve(importer, spec)
    }

    fn internal(path: &str) -> Resolution {
        Resolution::Internal(path.to_string())
    }

    #[test]
    fn relative_specifiers_probe_extensions_then_index() {
        let files = known(&[
            "src/core/db.ts",
            "src/core/api/index.ts",
            "src/app/main.tsx",
        ]);
        assert_eq!(resolve(&files, "src/app/main.tsx", "../core/db"), internal("src/core/db.ts"));
        assert_eq!(resolve(&files, "src/app/main.tsx", "../core/db.ts"), internal("src/core/db.ts"));
        assert_eq!(
            resolve(&files, "src/app/main.tsx", "../core/api"),
            internal("src/core/api/index.ts")
        );
        assert_eq!(resolve(&files, "src/app/main.tsx", "./missing"), Resolution::Unresolved);
    }

    #[test]
    fn escaping_the_project_is_unresolved() {
        let files = known(&["src/a.ts"]);
        assert_eq!(resolve(&files, "src/a.ts", "../../outside"), Resolution::Unresolved);
    }

    #[test]
    fn longest_alias_wins() {
        let files = known(&["src/core/db.ts", "src/core/core/db.ts"]);
        // `@core/db` must use `@core` → src/core, not `@` → src
        assert_eq!(resolve(&files, "src/app/main.ts", "@core/db"), internal("src/core/db.ts"));
        assert_eq!(resolve(&files, "src/app/main.ts", "@/core/db"), internal("src/core/db.ts"));
    }

    #[test]
    fn alias_requires_segment_boundary() {
        let files = known(&["src/core/db.ts"]);
        assert_eq!(resolve(&files, "src/app/main.ts", "@corelib/x"), Resolution::External);
        assert_eq!(resolve(&files, "src/app/main.ts", "@scope/pkg"), Resolution::External);
    }

    #[test]
    fn bare_and_absolute_specifiers() {
        let files = known(&[]);
        assert_eq!(resolve(&files, "src/a.ts", "react"), Resolution::External);
        assert_eq!(resolve(&files, "src/a.ts", "node:http"), Resolution::External);
        assert_eq!(resolve(&files, "src/a.ts", "/abs/path"), Resolution::Unresolved);
    }

    #[test]
    fn existing_non_source_files_resolve() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src/app")).unwrap();
        std::fs::write(dir.path().join("src/app/style.css"), "").unwrap();
        let policy = Policy::builtin().unwrap();
        let files = known(&["src/app/main.ts"]);
        let resolver = Resolver::new(&policy, dir.path(), &files, &FsReader);
        assert_eq!(resolver.resolve("src/app/main.ts", "./style.css"), internal("src/app/style.css"));
        assert_eq!(resolver.resolve("src/app/main.ts", "./other.css"), Resolution::Unresolved);
    }

    #[test]
    fn undiscovered_source_files_on_disk_resolve() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src/app/api")).unwrap();
        std::fs::write(dir.path().join("src/app/main.ts"), "").unwrap();
        std::fs::write(dir.path().join("src/app/api/index.tsx"), "").unwrap();
        let policy = Policy::builtin().unwrap();
        let files = known(&["src/shared/a.ts"]);
        let resolver = Resolver::new(&policy, dir.path(), &files, &FsReader);
        assert_eq!(resolver.resolve("src/shared/a.ts", "../app/main"), internal("src/app/main.ts"));
        assert_eq!(
            resolver.resolve("src/shared/a.ts", "../app/api"),
            internal("src/app/api/index.tsx")
        );
        assert_eq!(resolver.resolve("src/shared/a.ts", "../app"), Resolution::Unresolved);
    }

    #[test]
    fn dot_specifier_resolves_directory_index() {
        let files = known(&["src/shared/index.ts", "src/shared/fmt.ts"]);
        assert_eq!(resolve(&files, "src/shared/fmt.ts", "."), internal("src/shared/index.ts"));
    }
}
