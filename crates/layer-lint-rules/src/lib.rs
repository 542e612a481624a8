//! # layer-lint-rules
//!
//! Built-in boundary rules for layer-lint.
//!
//! ## Available Rules
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | LL001 | layer-direction | Imports must not point from a lower layer to a higher one |
//! | LL002 | cross-module-import | Modules import each other only through the public entry |
//! | LL003 | required-files | Every module directory contains the required role files |
//! | LL004 | role-content | Role files avoid role-forbidden code and imports |
//! | LL005 | forbidden-path | Declared forbidden paths do not exist |
//!
//! `LL900 io-error` and `LL901 classification-error` are raised by the
//! graph builder itself and are always on.
//!
//! ## Usage
//!
//! ```ignore
//! use layer_lint_core::Analyzer;
//! use layer_lint_rules::all_rules;
//!
//! let analyzer = Analyzer::builder()
//!     .project_root(".")
//!     .rules(all_rules())
//!     .build()?;
//!
//! let result = analyzer.analyze();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cross_module;
pub mod forbidden_paths;
pub mod layer_direction;
pub mod presets;
pub mod required_files;
pub mod role_content;

pub use cross_module::CrossModuleImport;
pub use forbidden_paths::ForbiddenPaths;
pub use layer_direction::LayerDirection;
pub use presets::{all_rules, rules_by_name, UnknownRuleError};
pub use required_files::RequiredFiles;
pub use role_content::RoleContent;

// Re-export core types for convenience
pub use layer_lint_core::{
    Analyzer, AnalyzerBuilder, LintResult, Location, Policy, Rule, RuleBox, RuleContext, RuleId,
    Severity, Suggestion, Violation,
};

#[cfg(test)]
pub(crate) mod test_support {
    use layer_lint_core::{Graph, GraphBuilder, MemoryReader, Policy, Rule, RuleContext, Violation};
    use std::path::Path;

    /// Builds a graph from in-memory files.
    pub fn graph(policy: &Policy, files: &[(&str, &str)]) -> Graph {
        let reader = files
            .iter()
            .fold(MemoryReader::new(), |r, (path, content)| r.with_file(*path, *content));
        GraphBuilder::new(policy, Path::new(""), &reader).build(reader.paths())
    }

    /// Runs one rule against in-memory files under the given policy.
    pub fn run(rule: &dyn Rule, policy: &Policy, files: &[(&str, &str)]) -> Vec<Violation> {
        let graph = graph(policy, files);
        let ctx = RuleContext {
            graph: &graph,
            policy,
            project_root: Path::new(""),
        };
        rule.evaluate(&ctx)
    }

    /// Policy from TOML, panicking on invalid input.
    pub fn policy(toml: &str) -> Policy {
        Policy::from_toml_str(toml).expect("valid policy")
    }

    /// The built-in policy.
    pub fn builtin() -> Policy {
        Policy::builtin().expect("builtin policy")
    }
}
