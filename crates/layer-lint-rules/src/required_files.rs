//! Rule: every module directory must contain the required role files.
//!
//! # Rationale
//!
//! The module scaffold (`ui`, `store`, `service`, `index`) is what lets a
//! reader find the state of a feature without reading all of it. A module
//! that skips its store tends to grow state inside its UI instead.
//!
//! One violation is reported per missing role, located at the module
//! directory. A file counts for a role when it sits directly in the module
//! directory and its stem is registered for that role. Unreadable files
//! still count: they exist, they just could not be checked.

use layer_lint_core::{
    FileRole, LayerClassifier, Location, ModuleId, Rule, RuleContext, RuleId, Severity,
    Suggestion, Violation,
};

/// Rule code for required-files.
pub const CODE: &str = RuleId::RequiredFiles.code();

/// Rule name for required-files.
pub const NAME: &str = RuleId::RequiredFiles.name();

/// Flags modules missing one of the `[modules] required` role files.
#[derive(Debug, Clone)]
pub struct RequiredFiles {
    /// Severity level for violations.
    pub severity: Severity,
}

impl Default for RequiredFiles {
    fn default() -> Self {
        Self {
            severity: Severity::Error,
        }
    }
}

impl RequiredFiles {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn in_module_dir(path: &str, module: &ModuleId) -> bool {
    path.strip_prefix(module.dir.as_str())
        .and_then(|rest| rest.strip_prefix('/'))
        .is_some_and(|name| !name.contains('/'))
}

fn expected_file(ctx: &RuleContext<'_>, module: &ModuleId, role: FileRole) -> Option<String> {
    let stem = ctx.policy.roles().stems(role).into_iter().next()?;
    let ext = ctx.policy.analyzer().extensions.first()?;
    Some(format!("{}/{stem}.{ext}", module.dir))
}

impl Rule for RequiredFiles {
    fn id(&self) -> RuleId {
        RuleId::RequiredFiles
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Violation> {
        let required = &ctx.policy.modules().required;
        if required.is_empty() {
            return Vec::new();
        }

        let classifier = LayerClassifier::new(ctx.policy);
        let mut violations = Vec::new();

        for module in ctx.graph.modules() {
            let present: Vec<FileRole> = ctx
                .graph
                .inventory()
                .iter()
                .filter(|path| in_module_dir(path, module))
                .map(|path| classifier.role_of(path))
                .collect();

            for role in required {
                if present.contains(role) {
                    continue;
                }
                let mut violation = RuleId::RequiredFiles.violation(
                    self.severity,
                    Location::path(&module.dir),
                    format!("module `{}` is missing its `{role}` file", module.name),
                );
                if let Some(expected) = expected_file(ctx, module, *role) {
                    violation = violation
                        .with_suggestion(Suggestion::new(format!("create `{expected}`")));
                }
                violations.push(violation);
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{builtin, policy, run};

    fn complete(module: &str) -> Vec<(String, String)> {
        ["ui", "store", "service", "index"]
            .iter()
            .map(|stem| (format!("src/modules/{module}/{stem}.ts"), String::new()))
            .collect()
    }

    fn check(files: &[(String, String)]) -> Vec<Violation> {
        let borrowed: Vec<(&str, &str)> = files
            .iter()
            .map(|(p, c)| (p.as_str(), c.as_str()))
            .collect();
        run(&RequiredFiles::new(), &builtin(), &borrowed)
    }

    #[test]
    fn test_complete_modules_pass() {
        let mut files = complete("accounts");
        files.extend(complete("billing"));
        assert!(check(&files).is_empty());
    }

    #[test]
    fn test_missing_store_is_reported_once() {
        let mut files = complete("accounts");
        files.retain(|(p, _)| !p.ends_with("store.ts"));
        files.push(("src/modules/accounts/helpers.ts".into(), String::new()));

        let violations = check(&files);
        assert_eq!(violations.len(), 1);
        let v = &violations[0];
        assert_eq!(v.code, CODE);
        assert_eq!(v.location.file.to_str(), Some("src/modules/accounts"));
        assert!(v.message.contains("`accounts`"));
        assert!(v.message.contains("`store`"));
        assert_eq!(
            v.suggestion.as_ref().map(|s| s.message.as_str()),
            Some("create `src/modules/accounts/store.ts`")
        );
    }

    #[test]
    fn test_nested_files_do_not_count() {
        let files = vec![
            ("src/modules/cart/ui.ts".to_string(), String::new()),
            ("src/modules/cart/parts/store.ts".to_string(), String::new()),
            ("src/modules/cart/parts/service.ts".to_string(), String::new()),
            ("src/modules/cart/parts/index.ts".to_string(), String::new()),
        ];
        let violations = check(&files);
        assert_eq!(violations.len(), 3, "{violations:?}");
        assert!(violations.iter().all(|v| v.message.contains("`cart`")));
    }

    #[test]
    fn test_any_extension_satisfies_the_role() {
        let files = vec![
            ("src/modules/cart/ui.tsx".to_string(), String::new()),
            ("src/modules/cart/store.js".to_string(), String::new()),
            ("src/modules/cart/service.mjs".to_string(), String::new()),
            ("src/modules/cart/index.ts".to_string(), String::new()),
        ];
        assert!(check(&files).is_empty());
    }

    #[test]
    fn test_empty_requirement_list() {
        let policy = policy(
            r#"
[[layers]]
name = "modules"
roots = ["src/modules"]
modules = true

[modules]
required = []

[[role-rules]]
name = "store-no-network"
role = "store"
patterns = ["fetch("]
"#,
        );
        let violations = run(&RequiredFiles::new(), &policy, &[("src/modules/x/a.ts", "")]);
        assert!(violations.is_empty());
    }
}
