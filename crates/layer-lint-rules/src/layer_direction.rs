//! Rule: imports must not point to a higher layer.
//!
//! Layers are ranked in the order the policy declares them, lowest first.
//! A file may import its own layer or any lower one.
//!
//! # Rationale
//!
//! A lower layer that reaches into a higher one drags the whole upper tier
//! into its dependency set. `shared` code that imports from `app` can no
//! longer be reused, and changes to the application shell start breaking
//! utilities that were meant to be stable.
//!
//! # Detected Patterns
//!
//! - `src/shared/format.ts` importing `@app/routes`.
//! - `src/core/cart.ts` importing `../modules/cart/store`.
//! - Same-layer imports in a layer declared with `allow_sideways = false`.
//!
//! # Exemptions
//!
//! Edges touching an unclassified, external or unresolved endpoint are never
//! checked. Same-layer edges inside a modules layer are left to
//! [`cross-module-import`](crate::cross_module).

use layer_lint_core::{
    ImportEdge, Layer, Rule, RuleContext, RuleId, Severity, SourceFile, Suggestion, Violation,
};

/// Rule code for layer-direction.
pub const CODE: &str = RuleId::LayerDirection.code();

/// Rule name for layer-direction.
pub const NAME: &str = RuleId::LayerDirection.name();

/// Flags imports from a lower layer into a higher one.
#[derive(Debug, Clone)]
pub struct LayerDirection {
    /// Severity level for violations.
    pub severity: Severity,
}

impl Default for LayerDirection {
    fn default() -> Self {
        Self {
            severity: Severity::Error,
        }
    }
}

impl LayerDirection {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the severity level.
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    fn check_edge(
        &self,
        ctx: &RuleContext<'_>,
        file: &SourceFile,
        edge: &ImportEdge,
    ) -> Option<Violation> {
        let (Layer::Classified { name: from, rank: from_rank }, Layer::Classified { name: to, rank: to_rank }) =
            (&file.layer, &edge.target.layer)
        else {
            return None;
        };

        if to_rank > from_rank {
            let violation = RuleId::LayerDirection
                .violation(
                    self.severity,
                    file.edge_location(edge),
                    format!(
                        "layer `{from}` must not import from higher layer `{to}` (`{}`)",
                        edge.specifier
                    ),
                )
                .with_suggestion(Suggestion::new(format!(
                    "move the shared code down into `{from}` or a lower layer, or invert the dependency"
                )));
            return Some(violation);
        }

        if to_rank == from_rank {
            let def = ctx.policy.layer(from)?;
            if !def.allow_sideways && !def.modules {
                let violation = RuleId::LayerDirection
                    .violation(
                        self.severity,
                        file.edge_location(edge),
                        format!(
                            "layer `{from}` does not allow imports within itself (`{}`)",
                            edge.specifier
                        ),
                    )
                    .with_suggestion(Suggestion::new(
                        "move the shared part into a lower layer or set `allow_sideways = true`",
                    ));
                return Some(violation);
            }
        }

        None
    }
}

impl Rule for LayerDirection {
    fn id(&self) -> RuleId {
        RuleId::LayerDirection
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Violation> {
        ctx.graph
            .edges()
            .filter_map(|(file, edge)| self.check_edge(ctx, file, edge))
            .collect()
    }
}
