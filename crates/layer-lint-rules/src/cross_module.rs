//! Rule: modules must not import each other's internals.
//!
//! # Rationale
//!
//! Feature modules are developed independently. Once `cart/ui.ts` imports
//! `checkout/store.ts` directly, the checkout store can no longer change
//! shape without breaking the cart, and the two modules are effectively
//! one. Each module exposes a public entry (its `index` file) and other
//! modules go through it.
//!
//! # Detected Patterns
//!
//! - `import { useCheckout } from '../checkout/store'` inside `modules/cart`.
//! - `import '@modules/checkout/service'` anywhere in another module.
//!
//! Importing `@modules/checkout` (resolving to `checkout/index.ts`) is fine
//! while `[modules] allow_public_api` is on.

use layer_lint_core::{Rule, RuleContext, RuleId, Severity, Suggestion, Violation};

/// Rule code for cross-module-import.
pub const CODE: &str = RuleId::CrossModuleImport.code();

/// Rule name for cross-module-import.
pub const NAME: &str = RuleId::CrossModuleImport.name();

/// Flags imports between different modules that bypass the public entry.
#[derive(Debug, Clone)]
pub struct CrossModuleImport {
    /// Severity level for violations.
    pub severity: Severity,
}

impl Default for CrossModuleImport {
    fn default() -> Self {
        Self {
            severity: Severity::Error,
        }
    }
}

impl CrossModuleImport {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Rule for CrossModuleImport {
    fn id(&self) -> RuleId {
        RuleId::CrossModuleImport
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Violation> {
        let allow_public = ctx.policy.modules().allow_public_api;
        let mut violations = Vec::new();

        for (file, edge) in ctx.graph.edges() {
            let (Some(from), Some(to)) = (&file.module, &edge.target.module) else {
                continue;
            };
            if from == to || file.layer != edge.target.layer {
                continue;
            }
            if allow_public && edge.target.is_public_entry {
                continue;
            }

            let target = edge.target.path.as_deref().unwrap_or(&edge.specifier);
            let message = if edge.target.is_public_entry {
                format!(
                    "module `{}` must not import module `{}` (`{target}`); cross-module imports are disabled",
                    from.name, to.name
                )
            } else {
                format!(
                    "module `{}` imports `{target}`, an internal file of module `{}`",
                    from.name, to.name
                )
            };
            let help = if allow_public {
                format!("import from the public entry of `{}` instead", to.dir)
            } else {
                "move the shared code into a lower layer".to_string()
            };

            violations.push(
                RuleId::CrossModuleImport
                    .violation(self.severity, file.edge_location(edge), message)
                    .with_suggestion(Suggestion::new(help)),
            );
        }

        violations
    }
}
