//! Rule trait and rule identifiers.

use std::fmt;
use std::path::Path;

use crate::graph::Graph;
use crate::policy::Policy;
use crate::types::{Location, Severity, Violation};

/// Identifies every kind of finding the analyzer can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleId {
    /// LL001: imports must not point to a higher layer.
    LayerDirection,
    /// LL002: modules must not import each other's internals.
    CrossModuleImport,
    /// LL003: every module must contain the required role files.
    RequiredFiles,
    /// LL004: role-specific forbidden content and imports.
    RoleContent,
    /// LL005: paths that must not exist.
    ForbiddenPath,
    /// LL900: a file could not be read.
    IoError,
    /// LL901: a path does not fit the expected layout.
    ClassificationError,
}

impl RuleId {
    /// Every identifier, in code order.
    pub const ALL: [Self; 7] = [
        Self::LayerDirection,
        Self::CrossModuleImport,
        Self::RequiredFiles,
        Self::RoleContent,
        Self::ForbiddenPath,
        Self::IoError,
        Self::ClassificationError,
    ];

    /// Kebab-case rule name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LayerDirection => "layer-direction",
            Self::CrossModuleImport => "cross-module-import",
            Self::RequiredFiles => "required-files",
            Self::RoleContent => "role-content",
            Self::ForbiddenPath => "forbidden-path",
            Self::IoError => "io-error",
            Self::ClassificationError => "classification-error",
        }
    }

    /// Rule code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::LayerDirection => "LL001",
            Self::CrossModuleImport => "LL002",
            Self::RequiredFiles => "LL003",
            Self::RoleContent => "LL004",
            Self::ForbiddenPath => "LL005",
            Self::IoError => "LL900",
            Self::ClassificationError => "LL901",
        }
    }

    /// One-line description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::LayerDirection => "Imports must not point from a lower layer to a higher one",
            Self::CrossModuleImport => {
                "Modules must not import another module's internals, only its public entry"
            }
            Self::RequiredFiles => "Every module directory must contain the required role files",
            Self::RoleContent => "Role files must not contain role-forbidden code or imports",
            Self::ForbiddenPath => "Paths declared forbidden must not exist",
            Self::IoError => "A source file could not be read",
            Self::ClassificationError => "A file does not fit the expected module layout",
        }
    }

    /// Whether `[rules.<name>]` may toggle or re-grade the rule.
    #[must_use]
    pub const fn is_configurable(self) -> bool {
        !matches!(self, Self::IoError | Self::ClassificationError)
    }

    /// Looks up a rule by name or code (codes are case-insensitive).
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|id| id.name() == key || id.code().eq_ignore_ascii_case(key))
    }

    /// Builds a violation tagged with this rule.
    #[must_use]
    pub fn violation(
        self,
        severity: Severity,
        location: Location,
        message: impl Into<String>,
    ) -> Violation {
        Violation::new(self.code(), self.name(), severity, location, message)
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything a rule may inspect.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// The dependency graph.
    pub graph: &'a Graph,
    /// The active policy.
    pub policy: &'a Policy,
    /// Project directory all paths are relative to.
    pub project_root: &'a Path,
}

/// A rule evaluated against the whole graph.
///
/// # Example
///
/// ```ignore
/// use layer_lint_core::{Rule, RuleContext, RuleId, Violation};
///
/// pub struct NoUnresolved;
///
/// impl Rule for NoUnresolved {
///     fn id(&self) -> RuleId { RuleId::LayerDirection }
///
///     fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Violation> {
///         Vec::new()
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Identifier of this rule.
    fn id(&self) -> RuleId;

    /// Returns the kebab-case name of this rule (e.g., "layer-direction").
    fn name(&self) -> &'static str {
        self.id().name()
    }

    /// Returns the rule code (e.g., "LL001").
    fn code(&self) -> &'static str {
        self.id().code()
    }

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        self.id().description()
    }

    /// Returns the default severity for violations from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Evaluates the rule and returns every violation found.
    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Violation>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;

#[cfg(test)]
mod tests {
    use super::*;

    struct TestRule;

    impl Rule for TestRule {
        fn id(&self) -> RuleId {
            RuleId::ForbiddenPath
        }

        fn evaluate(&self, _ctx: &RuleContext<'_>) -> Vec<Violation> {
            vec![self.id().violation(
                self.default_severity(),
                Location::path("src/mocks"),
                "Test violation",
            )]
        }
    }

    #[test]
    fn rule_trait_defaults_follow_id() {
        let rule = TestRule;
        assert_eq!(rule.name(), "forbidden-path");
        assert_eq!(rule.code(), "LL005");
        assert_eq!(rule.default_severity(), Severity::Error);
    }

    #[test]
    fn lookup_by_name_or_code() {
        assert_eq!(RuleId::from_key("layer-direction"), Some(RuleId::LayerDirection));
        assert_eq!(RuleId::from_key("LL002"), Some(RuleId::CrossModuleImport));
        assert_eq!(RuleId::from_key("ll003"), Some(RuleId::RequiredFiles));
        assert_eq!(RuleId::from_key("nope"), None);
    }

    #[test]
    fn codes_are_unique() {
        let mut codes: Vec<_> = RuleId::ALL.iter().map(|id| id.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), RuleId::ALL.len());
    }

    #[test]
    fn io_and_classification_are_fixed() {
        assert!(!RuleId::IoError.is_configurable());
        assert!(!RuleId::ClassificationError.is_configurable());
        assert!(RuleId::RoleContent.is_configurable());
    }
}
