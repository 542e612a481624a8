//! Rule: role files must not contain role-forbidden code or imports.
//!
//! Evaluates every `[[role-rules]]` entry of the policy against the files
//! whose role it names.
//!
//! # Rationale
//!
//! Roles split a module into predictable parts: the store holds state, the
//! service talks to the outside world, the UI renders. These checks catch
//! the common drift, such as a store calling `fetch(` itself or a UI file
//! pulling in core logic directly.
//!
//! # Matching
//!
//! Matching is textual and heuristic. A pattern is flagged wherever it
//! occurs outside comments, string literals included. Each pattern is
//! reported once per file, at its first occurrence, with the occurrence
//! count in the message. Import checks look at the raw specifier
//! (`deny_imports`) and at the resolved target layer (`deny_layers`).
//!
//! The severity of each finding comes from its role rule.

use layer_lint_core::{
    sanitize, ImportEdge, LineIndex, Location, Rule, RuleContext, RuleId, Severity, SourceFile,
    Suggestion, Violation,
};
use layer_lint_core::policy::RoleRule;

/// Rule code for role-content.
pub const CODE: &str = RuleId::RoleContent.code();

/// Rule name for role-content.
pub const NAME: &str = RuleId::RoleContent.name();

/// Applies the policy's role rules to role files.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleContent;

impl RoleContent {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn describe(rule: &RoleRule, default: String) -> String {
    match &rule.message {
        Some(message) => format!("[{}] {message}", rule.name),
        None => format!("[{}] {default}", rule.name),
    }
}

fn check_text(rule: &RoleRule, file: &SourceFile, text: &str, index: &LineIndex<'_>) -> Vec<Violation> {
    rule.text
        .iter()
        .filter_map(|pattern| {
            let (offset, count) = pattern.find(text)?;
            let (line, column) = index.position(offset);
            let found = if count == 1 {
                format!("found `{}`", pattern.as_str())
            } else {
                format!("found `{}`, {count} occurrences", pattern.as_str())
            };
            let message = describe(
                rule,
                format!("`{}` files must not contain `{}`", rule.role, pattern.as_str()),
            );
            Some(RuleId::RoleContent.violation(
                rule.severity,
                Location::new(&file.path, line, column),
                format!("{message} ({found})"),
            ))
        })
        .collect()
}

fn check_import(rule: &RoleRule, file: &SourceFile, edge: &ImportEdge) -> Option<Violation> {
    let reason = if let Some(denied) = rule.denies_import(&edge.specifier) {
        format!("imports denied package `{denied}`")
    } else if edge.target.layer.rank().is_some()
        && rule.deny_layers.iter().any(|l| l == edge.target.layer.name())
    {
        format!("imports layer `{}`", edge.target.layer)
    } else {
        return None;
    };

    let message = describe(
        rule,
        format!("`{}` files must not import `{}`", rule.role, edge.specifier),
    );
    Some(
        RuleId::RoleContent
            .violation(
                rule.severity,
                file.edge_location(edge),
                format!("{message} (`{}` {reason})", edge.specifier),
            )
            .with_suggestion(Suggestion::new(format!(
                "move this dependency out of the `{}` file",
                rule.role
            ))),
    )
}

impl Rule for RoleContent {
    fn id(&self) -> RuleId {
        RuleId::RoleContent
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();

        for file in ctx.graph.files() {
            let rules: Vec<&RoleRule> = ctx
                .policy
                .role_rules()
                .iter()
                .filter(|r| r.role == file.role)
                .collect();
            if rules.is_empty() {
                continue;
            }

            let text = sanitize(&file.content, false);
            let index = LineIndex::new(&text);
            for rule in rules {
                violations.extend(check_text(rule, file, &text, &index));
                violations.extend(
                    file.imports
                        .iter()
                        .filter_map(|edge| check_import(rule, file, edge)),
                );
            }
        }

        violations
    }
}
