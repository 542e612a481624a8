//! Rule: paths declared forbidden must not exist.
//!
//! Each `[structure] forbidden` entry is a glob relative to the project
//! directory. Every existing match, file or directory, is one violation,
//! whatever its content. A directory that cannot be read while
//! expanding a glob is reported as an `io-error` and expansion continues.
//!
//! # Detected Patterns
//!
//! - A leftover `src/mocks` scaffolding directory.
//! - `src/**/*.bak` editor backups.

use layer_lint_core::{display_path, Location, Rule, RuleContext, RuleId, Severity, Suggestion, Violation};
use std::path::Path;
use tracing::warn;

/// Rule code for forbidden-path.
pub const CODE: &str = RuleId::ForbiddenPath.code();

/// Rule name for forbidden-path.
pub const NAME: &str = RuleId::ForbiddenPath.name();

/// Flags existing paths matching a forbidden glob.
#[derive(Debug, Clone)]
pub struct ForbiddenPaths {
    /// Severity level for violations.
    pub severity: Severity,
}

impl Default for ForbiddenPaths {
    fn default() -> Self {
        Self {
            severity: Severity::Error,
        }
    }
}

impl ForbiddenPaths {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn absolute_pattern(root: &Path, pattern: &str) -> String {
    let root = root.to_string_lossy();
    if root.is_empty() {
        pattern.to_string()
    } else {
        format!(
            "{}/{pattern}",
            glob::Pattern::escape(root.trim_end_matches(['/', '\\']))
        )
    }
}

fn relative(root: &Path, path: &Path) -> String {
    display_path(path.strip_prefix(root).unwrap_or(path))
}

impl Rule for ForbiddenPaths {
    fn id(&self) -> RuleId {
        RuleId::ForbiddenPath
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();

        for pattern in ctx.policy.forbidden() {
            let full = absolute_pattern(ctx.project_root, pattern);
            let entries = match glob::glob(&full) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!("Cannot expand forbidden pattern `{pattern}`: {err}");
                    violations.push(RuleId::IoError.violation(
                        Severity::Error,
                        Location::path(""),
                        format!("cannot expand forbidden pattern `{pattern}`: {err}"),
                    ));
                    continue;
                }
            };

            for entry in entries {
                let path = match entry {
                    Ok(path) => path,
                    Err(err) => {
                        let rel = relative(ctx.project_root, err.path());
                        warn!("Failed to inspect {rel}: {}", err.error());
                        violations.push(RuleId::IoError.violation(
                            Severity::Error,
                            Location::path(&rel),
                            format!("failed to read directory: {}", err.error()),
                        ));
                        continue;
                    }
                };
                let rel = relative(ctx.project_root, &path);
                violations.push(
                    RuleId::ForbiddenPath
                        .violation(
                            self.severity,
                            Location::path(&rel),
                            format!("forbidden path `{rel}` exists (matches `{pattern}`)"),
                        )
                        .with_suggestion(Suggestion::new(format!("remove `{rel}`"))),
                );
            }
        }

        violations
    }
}
