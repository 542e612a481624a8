//! # layer-lint-core
//!
//! Core engine for checking layered-architecture boundaries in
//! JavaScript/TypeScript source trees.
//!
//! The crate provides:
//!
//! - [`Policy`]: the declarative layer order, aliases, roles and rules
//! - [`LayerClassifier`]: path → layer, module and role
//! - [`extract_imports`]: static import/re-export extraction
//! - [`GraphBuilder`] / [`Graph`]: classified import graph of a tree
//! - [`Rule`] trait and [`RuleId`] tags for graph-wide rules
//! - [`Analyzer`]: discovery, graph building, rule evaluation and
//!   deterministic report order
//!
//! ## Example
//!
//! ```ignore
//! use layer_lint_core::{Analyzer, Policy};
//!
//! let analyzer = Analyzer::builder()
//!     .project_root(".")
//!     .policy(Policy::builtin()?)
//!     .rules(layer_lint_rules::all_rules())
//!     .build()?;
//!
//! let result = analyzer.analyze();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod classifier;
mod extractor;
mod graph;
pub mod policy;
mod resolver;
mod rule;
mod source;
mod types;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError};
pub use classifier::{Classification, ClassificationError, FileRole, Layer, LayerClassifier, ModuleId};
pub use extractor::{extract_imports, ImportKind, ImportSpecifier};
pub use graph::{Graph, GraphBuilder, ImportEdge, SourceFile, Target};
pub use policy::{Policy, PolicyError, DEFAULT_POLICY};
pub use resolver::{Resolution, Resolver};
pub use rule::{Rule, RuleBox, RuleContext, RuleId};
pub use source::{sanitize, FsReader, LineIndex, MemoryReader, SourceReader};
pub use types::{display_path, LintResult, Location, Severity, Suggestion, Violation};
