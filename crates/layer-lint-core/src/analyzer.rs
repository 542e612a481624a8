//! Core analyzer for orchestrating a run: discovery, graph, rules, report order.

use miette::Diagnostic;
use path_clean::PathClean;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::graph::{Graph, GraphBuilder};
use crate::policy::{Policy, PolicyError};
use crate::rule::{Rule, RuleBox, RuleContext, RuleId};
use crate::source::{FsReader, SourceReader};
use crate::types::{display_path, LintResult, Location, Severity, Violation};

/// Fatal errors that stop a run before any file is analyzed.
#[derive(Debug, Error, Diagnostic)]
pub enum AnalyzerError {
    /// The source root does not exist or is not a directory.
    #[error("source root {} does not exist", path.display())]
    #[diagnostic(
        code(layer_lint::analyzer::missing_root),
        help("pass the project directory to `check`, or set `root` in [analyzer] / use --root")
    )]
    MissingRoot {
        /// The missing directory.
        path: PathBuf,
    },

    /// An exclude pattern failed to compile.
    #[error("invalid exclude pattern `{pattern}`: {source}")]
    #[diagnostic(code(layer_lint::analyzer::invalid_exclude))]
    Glob {
        /// The offending pattern.
        pattern: String,
        /// Compile error.
        #[source]
        source: glob::PatternError,
    },

    /// The policy could not be built.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Policy(#[from] PolicyError),

    /// IO error resolving the project directory.
    #[error("IO error: {0}")]
    #[diagnostic(code(layer_lint::analyzer::io))]
    Io(#[from] std::io::Error),
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    project_root: Option<PathBuf>,
    source_root: Option<PathBuf>,
    policy: Option<Policy>,
    rules: Vec<RuleBox>,
    exclude_patterns: Vec<String>,
    reader: Option<Box<dyn SourceReader>>,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the project directory all paths are relative to (default: `.`).
    #[must_use]
    pub fn project_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.project_root = Some(path.into());
        self
    }

    /// Overrides the policy's `analyzer.root`.
    #[must_use]
    pub fn source_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_root = Some(path.into());
        self
    }

    /// Sets the policy (default: the built-in policy).
    #[must_use]
    pub fn policy(mut self, policy: Policy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Adds a rule to the analyzer.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds several boxed rules.
    #[must_use]
    pub fn rules(mut self, rules: impl IntoIterator<Item = RuleBox>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Adds an exclude glob pattern, matched against project-relative paths.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Replaces the filesystem reader.
    #[must_use]
    pub fn reader(mut self, reader: impl SourceReader + 'static) -> Self {
        self.reader = Some(Box::new(reader));
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if the source root doesn't exist or an exclude
    /// pattern is invalid.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let policy = match self.policy {
            Some(policy) => policy,
            None => Policy::builtin()?,
        };

        let project_root = self.project_root.unwrap_or_else(|| PathBuf::from("."));
        let project_root = if project_root.is_absolute() {
            project_root
        } else {
            std::env::current_dir()?.join(&project_root).clean()
        };

        let source_root = self
            .source_root
            .unwrap_or_else(|| policy.analyzer().root.clone());
        let source_dir = project_root.join(&source_root);
        if !source_dir.is_dir() {
            return Err(AnalyzerError::MissingRoot { path: source_dir });
        }

        let exclude = policy
            .analyzer()
            .exclude
            .iter()
            .chain(self.exclude_patterns.iter())
            .map(|pattern| {
                glob::Pattern::new(pattern).map_err(|source| AnalyzerError::Glob {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Analyzer {
            project_root,
            source_root,
            policy,
            rules: self.rules,
            exclude,
            reader: self.reader.unwrap_or_else(|| Box::new(FsReader)),
        })
    }
}

/// The main analyzer that orchestrates lint execution.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    project_root: PathBuf,
    source_root: PathBuf,
    policy: Policy,
    rules: Vec<RuleBox>,
    exclude: Vec<glob::Pattern>,
    reader: Box<dyn SourceReader>,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the project directory.
    #[must_use]
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Returns the scanned source root, relative to the project directory.
    #[must_use]
    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// Returns the active policy.
    #[must_use]
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Discovers, builds and evaluates the whole tree.
    ///
    /// Per-file failures are reported as violations; this never stops
    /// early on a single bad file.
    #[must_use]
    pub fn analyze(&self) -> LintResult {
        info!("Starting analysis at {}", self.project_root.display());

        let (paths, walk_issues) = self.discover_files();
        info!("Found {} files to analyze", paths.len());

        let mut result = self.analyze_paths(paths);
        if !walk_issues.is_empty() {
            result.violations.extend(walk_issues);
            result.sort();
        }

        info!(
            "Analysis complete: {} violations in {} files",
            result.violations.len(),
            result.files_checked
        );
        result
    }

    /// Builds the graph from already-discovered paths and evaluates every
    /// enabled rule. The order of `paths` does not affect the result.
    #[must_use]
    pub fn analyze_paths(&self, paths: Vec<String>) -> LintResult {
        let graph = self.build_graph(paths);
        self.evaluate(&graph)
    }

    /// Builds the dependency graph for the given paths.
    #[must_use]
    pub fn build_graph(&self, paths: Vec<String>) -> Graph {
        GraphBuilder::new(&self.policy, &self.project_root, self.reader.as_ref()).build(paths)
    }

    /// Evaluates every enabled rule against a graph.
    #[must_use]
    pub fn evaluate(&self, graph: &Graph) -> LintResult {
        let mut result = LintResult::new();
        result.files_checked = graph.inventory().len();
        result.edges_checked = graph.edge_count();
        result.violations.extend(graph.issues().iter().cloned());

        let ctx = RuleContext {
            graph,
            policy: &self.policy,
            project_root: &self.project_root,
        };

        for rule in &self.rules {
            if !self.policy.is_rule_enabled(rule.name()) {
                debug!("Skipping disabled rule: {}", rule.name());
                continue;
            }

            let violations = rule.evaluate(&ctx);
            debug!("{} produced {} violations", rule.name(), violations.len());
            let violations = self.apply_severity_override(rule.name(), rule.code(), violations);
            result.violations.extend(violations);
        }

        result.sort();
        result
    }

    /// Applies severity overrides from the policy.
    /// Re-grades a rule's own findings; `io-error` findings it reports keep
    /// their severity.
    fn apply_severity_override(
        &self,
        rule_name: &str,
        rule_code: &str,
        mut violations: Vec<Violation>,
    ) -> Vec<Violation> {
        if let Some(severity) = self.policy.rule_severity(rule_name) {
            for v in violations.iter_mut().filter(|v| v.code == rule_code) {
                v.severity = severity;
            }
        }
        violations
    }

    /// Walks the source root. Returns project-relative source paths and
    /// io-error violations for entries the walk could not read.
    fn discover_files(&self) -> (Vec<String>, Vec<Violation>) {
        let settings = self.policy.analyzer();
        let walk_root = self.project_root.join(&self.source_root);

        let mut builder = ignore::WalkBuilder::new(&walk_root);
        builder
            .hidden(false)
            .git_ignore(settings.respect_gitignore)
            .git_exclude(settings.respect_gitignore)
            .git_global(settings.respect_gitignore)
            .ignore(settings.respect_gitignore)
            .require_git(false)
            .sort_by_file_name(|a, b| a.cmp(b));

        let ignore_dirs = settings.ignore_dirs.clone();
        builder.filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            !(is_dir
                && entry.depth() > 0
                && ignore_dirs
                    .iter()
                    .any(|d| entry.file_name() == OsStr::new(d)))
        });

        let mut files = Vec::new();
        let mut issues = Vec::new();
        for entry in builder.build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let location = error_path(&err)
                        .map_or_else(|| walk_root.clone(), Path::to_path_buf);
                    warn!("Failed to walk {}: {err}", location.display());
                    issues.push(RuleId::IoError.violation(
                        Severity::Error,
                        Location::path(self.relative(&location)),
                        format!("failed to read directory entry: {err}"),
                    ));
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let path = entry.path();
            let is_source = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| self.policy.is_source_extension(ext));
            if !is_source {
                continue;
            }

            let rel = self.relative(path);
            if self.should_exclude(&rel) {
                debug!("Excluding: {rel}");
                continue;
            }
            files.push(rel);
        }

        (files, issues)
    }

    fn relative(&self, path: &Path) -> String {
        display_path(path.strip_prefix(&self.project_root).unwrap_or(path))
    }

    /// Checks if a project-relative path is excluded.
    fn should_exclude(&self, rel: &str) -> bool {
        self.exclude.iter().any(|p| p.matches(rel))
    }
}

/// Path carried by a walk error, looking through depth and line wrappers.
fn error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path),
        ignore::Error::Loop { child, .. } => Some(child),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        ignore::Error::Partial(errs) => errs.iter().find_map(error_path),
        _ => None,
    }
}
