//! Check command implementation.

use anyhow::{Context, Result};
use layer_lint_core::Analyzer;
use layer_lint_rules::{all_rules, rules_by_name};
use std::path::Path;
use std::process::ExitCode;

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Options of one `check` run.
#[derive(Debug)]
pub struct CheckOptions<'a> {
    /// Project directory.
    pub project: &'a Path,
    /// Source root override.
    pub root: Option<&'a Path>,
    /// Output format.
    pub format: OutputFormat,
    /// Comma-separated rule filter.
    pub rules: Option<&'a str>,
    /// Extra exclude globs.
    pub exclude: Vec<String>,
    /// Where the policy comes from.
    pub source: &'a ConfigSource,
}

/// Runs the check command. Returns exit code 1 when any violation is found.
pub fn run(options: &CheckOptions<'_>) -> Result<ExitCode> {
    let policy = options.source.load()?;

    let rules = match options.rules {
        Some(filter) => {
            let names: Vec<&str> = filter
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .collect();
            rules_by_name(&names)?
        }
        None => all_rules(),
    };

    let mut builder = Analyzer::builder()
        .project_root(options.project)
        .policy(policy)
        .rules(rules)
        .excludes(options.exclude.iter().cloned());
    if let Some(root) = options.root {
        builder = builder.source_root(root);
    }
    let analyzer = builder.build()?;

    tracing::info!(
        "Checking {} with {} rules",
        analyzer.project_root().display(),
        analyzer.rule_count()
    );

    let result = analyzer.analyze();
    super::output::print(&result, options.format).context("failed to write report")?;

    Ok(if result.has_violations() {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}
