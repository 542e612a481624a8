//! Declarative architecture policy.
//!
//! # Architecture
//!
//! ```text
//! TOML text
//!   ↓ serde (DTO layer, carries built-in defaults)
//! dto::PolicyDto
//!   ↓ loader: validate + normalise + compile
//! Policy (immutable, shared by reference for the whole run)
//! ```

use miette::Diagnostic;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod dto;
pub mod loader;
pub mod model;

pub use model::{
    AnalyzerSettings, Alias, LayerDef, ModuleSettings, Policy, RoleConventions, RoleRule,
    RuleSettings, TextPattern,
};

/// Default policy file written by `layer-lint init`.
///
/// Parsing it yields the same policy as [`Policy::builtin`].
pub const DEFAULT_POLICY: &str = r#"# layer-lint policy
#
# Layers are ranked in declaration order, lowest first. A file may import
# files of its own layer or of any lower layer, never of a higher one.

[analyzer]
root = "src"
extensions = ["ts", "tsx", "js", "jsx", "mjs", "cjs"]
ignore_dirs = ["node_modules", "dist", "build", "coverage", ".git"]
exclude = []
respect_gitignore = true

[[layers]]
name = "shared"
roots = ["src/shared"]

[[layers]]
name = "core"
roots = ["src/core"]

[[layers]]
name = "modules"
roots = ["src/modules"]
modules = true

[[layers]]
name = "app"
roots = ["src/app"]

[aliases]
"@" = "src"
"@shared" = "src/shared"
"@core" = "src/core"
"@modules" = "src/modules"
"@app" = "src/app"

[roles]
ui = ["ui"]
store = ["store"]
service = ["service"]
types = ["types"]
public-api = ["index"]

[modules]
required = ["ui", "store", "service", "public-api"]
allow_public_api = true

[[role-rules]]
name = "store-no-network"
role = "store"
patterns = ["fetch(", "XMLHttpRequest", "new WebSocket("]
deny_imports = ["axios", "node:http", "node:https"]
message = "store files must not perform network calls; move I/O into the module service"
severity = "error"

[[role-rules]]
name = "ui-no-core"
role = "ui"
deny_layers = ["core"]
message = "UI files must not import the core layer; go through the module store or service"
severity = "error"

[[role-rules]]
name = "ui-no-network"
role = "ui"
patterns = ["fetch("]
deny_imports = ["axios"]
message = "UI files must not perform network calls"
severity = "error"

[[role-rules]]
name = "service-no-business-logic"
role = "service"
regex = ['\bswitch\s*\(', '\bfor\s*\(', '\bwhile\s*\(']
message = "service files should stay thin adapters; move control-flow-heavy logic into core"
severity = "warning"

[[role-rules]]
name = "types-declarations-only"
role = "types"
regex = ['(?m)^[ \t]*(export[ \t]+)?(default[ \t]+)?(async[ \t]+)?(function|class)[ \t]']
message = "types files should only declare types and interfaces"
severity = "warning"

[structure]
forbidden = []

# [rules.cross-module-import]
# enabled = true
# severity = "error"
"#;

/// Fatal policy errors. Any of these aborts the run with exit code 2.
#[derive(Debug, Error, Diagnostic)]
pub enum PolicyError {
    /// The policy file could not be read.
    #[error("failed to read policy file {}", path.display())]
    #[diagnostic(code(layer_lint::policy::io))]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The policy file is not valid TOML or has unknown keys.
    #[error("failed to parse policy: {0}")]
    #[diagnostic(
        code(layer_lint::policy::parse),
        help("run `layer-lint init` to write a commented default policy")
    )]
    Parse(#[from] toml::de::Error),

    /// No layers were declared.
    #[error("policy declares no layers")]
    #[diagnostic(
        code(layer_lint::policy::no_layers),
        help("add at least one [[layers]] entry")
    )]
    NoLayers,

    /// A layer name appears twice, so the order contradicts itself.
    #[error("cyclic layer order: layer `{name}` is declared more than once")]
    #[diagnostic(
        code(layer_lint::policy::cyclic_order),
        help("each layer must appear exactly once in [[layers]]")
    )]
    CyclicOrder {
        /// Repeated layer name.
        name: String,
    },

    /// A required name is empty.
    #[error("{context}: name must not be empty")]
    #[diagnostic(code(layer_lint::policy::empty_name))]
    EmptyName {
        /// Where the error occurred (e.g., "layers[0].name").
        context: String,
    },

    /// A path is not a clean project-relative path.
    #[error("{context}: invalid path `{value}`: {reason}")]
    #[diagnostic(
        code(layer_lint::policy::invalid_path),
        help("paths are relative to the project directory and use `/` separators")
    )]
    InvalidPath {
        /// Where the error occurred.
        context: String,
        /// The offending value.
        value: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A role name is not one of the known roles.
    #[error("{context}: unknown role `{value}`, expected: ui, store, service, types, public-api")]
    #[diagnostic(code(layer_lint::policy::unknown_role))]
    UnknownRole {
        /// Where the error occurred.
        context: String,
        /// The offending value.
        value: String,
    },

    /// A layer reference names no declared layer.
    #[error("{context}: unknown layer `{value}`")]
    #[diagnostic(code(layer_lint::policy::unknown_layer))]
    UnknownLayer {
        /// Where the error occurred.
        context: String,
        /// The offending value.
        value: String,
    },

    /// A regular expression failed to compile.
    #[error("{context}: invalid regex: {source}")]
    #[diagnostic(code(layer_lint::policy::invalid_regex))]
    InvalidRegex {
        /// Where the error occurred.
        context: String,
        /// Compile error.
        #[source]
        source: regex::Error,
    },

    /// A glob pattern failed to compile.
    #[error("{context}: invalid glob `{value}`: {source}")]
    #[diagnostic(code(layer_lint::policy::invalid_glob))]
    InvalidGlob {
        /// Where the error occurred.
        context: String,
        /// The offending value.
        value: String,
        /// Compile error.
        #[source]
        source: glob::PatternError,
    },

    /// A role rule declares nothing to check.
    #[error("role-rule `{name}` declares no patterns, regex, deny_imports or deny_layers")]
    #[diagnostic(code(layer_lint::policy::empty_role_rule))]
    EmptyRoleRule {
        /// Rule name.
        name: String,
    },

    /// Two role rules share a name.
    #[error("role-rule `{name}` is declared more than once")]
    #[diagnostic(code(layer_lint::policy::duplicate_role_rule))]
    DuplicateRoleRule {
        /// Rule name.
        name: String,
    },

    /// A file stem is assigned to two roles.
    #[error("file stem `{stem}` is assigned to more than one role")]
    #[diagnostic(code(layer_lint::policy::duplicate_role_stem))]
    DuplicateRoleStem {
        /// The stem.
        stem: String,
    },

    /// A `[rules.<name>]` table names no configurable rule.
    #[error("[rules.{name}]: unknown rule")]
    #[diagnostic(
        code(layer_lint::policy::unknown_rule),
        help("run `layer-lint list-rules` to see configurable rules")
    )]
    UnknownRule {
        /// The offending key.
        name: String,
    },
}

impl Policy {
    /// Parses and validates a policy from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, PolicyError> {
        let dto: dto::PolicyDto = toml::from_str(content)?;
        loader::load(dto)
    }

    /// Reads, parses and validates a policy file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is invalid.
    pub fn from_file(path: &Path) -> Result<Self, PolicyError> {
        let content = std::fs::read_to_string(path).map_err(|source| PolicyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// The built-in default policy.
    ///
    /// # Errors
    ///
    /// Never fails for the shipped defaults; the `Result` mirrors
    /// [`Policy::from_toml_str`].
    pub fn builtin() -> Result<Self, PolicyError> {
        Self::from_toml_str("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::FileRole;

    #[test]
    fn builtin_policy_is_valid() {
        let policy = Policy::builtin().unwrap();
        let names: Vec<_> = policy.layers().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["shared", "core", "modules", "app"]);
        assert_eq!(
            policy.modules().required,
            [
                FileRole::Ui,
                FileRole::Store,
                FileRole::Service,
                FileRole::PublicApi
            ]
        );
    }

    #[test]
    fn default_policy_text_matches_builtin() {
        let written = Policy::from_toml_str(DEFAULT_POLICY).unwrap();
        let builtin = Policy::builtin().unwrap();
        assert_eq!(written.layers(), builtin.layers());
        assert_eq!(written.aliases(), builtin.aliases());
        let rule_names = |p: &Policy| {
            p.role_rules()
                .iter()
                .map(|r| (r.name.clone(), r.text.len(), r.severity))
                .collect::<Vec<_>>()
        };
        assert_eq!(rule_names(&written), rule_names(&builtin));
    }

    #[test]
    fn from_file_reports_missing_file() {
        let err = Policy::from_file(Path::new("/nonexistent/layer-lint.toml")).unwrap_err();
        assert!(matches!(err, PolicyError::Io { .. }));
    }

    #[test]
    fn parse_error_is_reported() {
        let err = Policy::from_toml_str("[[layers]\n").unwrap_err();
        assert!(matches!(err, PolicyError::Parse(_)));
    }
}
