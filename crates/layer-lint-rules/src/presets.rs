//! Rule sets for common configurations.

use crate::{CrossModuleImport, ForbiddenPaths, LayerDirection, RequiredFiles, RoleContent};
use layer_lint_core::{RuleBox, RuleId};
use thiserror::Error;

/// A `--rules` entry that names no rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown rule `{name}`; run `layer-lint list-rules` for the available names")]
pub struct UnknownRuleError {
    /// The unrecognised name.
    pub name: String,
}

/// Returns every built-in rule, in code order.
///
/// Includes:
/// - `layer-direction` (LL001)
/// - `cross-module-import` (LL002)
/// - `required-files` (LL003)
/// - `role-content` (LL004)
/// - `forbidden-path` (LL005)
#[must_use]
pub fn all_rules() -> Vec<RuleBox> {
    vec![
        Box::new(LayerDirection::new()),
        Box::new(CrossModuleImport::new()),
        Box::new(RequiredFiles::new()),
        Box::new(RoleContent::new()),
        Box::new(ForbiddenPaths::new()),
    ]
}

fn rule_for(id: RuleId) -> Option<RuleBox> {
    let rule: RuleBox = match id {
        RuleId::LayerDirection => Box::new(LayerDirection::new()),
        RuleId::CrossModuleImport => Box::new(CrossModuleImport::new()),
        RuleId::RequiredFiles => Box::new(RequiredFiles::new()),
        RuleId::RoleContent => Box::new(RoleContent::new()),
        RuleId::ForbiddenPath => Box::new(ForbiddenPaths::new()),
        RuleId::IoError | RuleId::ClassificationError => return None,
    };
    Some(rule)
}

/// Returns the rules named in `names`, by name or code, in code order.
///
/// Repeated names select a rule once.
///
/// # Errors
///
/// Returns [`UnknownRuleError`] for a name that matches no selectable rule.
pub fn rules_by_name<S: AsRef<str>>(names: &[S]) -> Result<Vec<RuleBox>, UnknownRuleError> {
    let mut ids = names
        .iter()
        .map(|name| {
            let name = name.as_ref().trim();
            RuleId::from_key(name)
                .filter(|id| id.is_configurable())
                .ok_or_else(|| UnknownRuleError {
                    name: name.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    ids.sort_unstable();
    ids.dedup();
    Ok(ids.into_iter().filter_map(rule_for).collect())
}
