//! Validated, immutable policy model.
//!
//! Every value here has passed the loader's checks: layer names are
//! unique, paths are normalised project-relative strings, regexes are
//! compiled, and role names are resolved to [`FileRole`]s.

use regex::Regex;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::classifier::FileRole;
use crate::types::Severity;

/// Discovery settings from `[analyzer]`.
#[derive(Debug, Clone)]
pub struct AnalyzerSettings {
    /// Source root, relative to the project directory.
    pub root: PathBuf,
    /// Source file extensions, without the dot, in probing order.
    pub extensions: Vec<String>,
    /// Directory names skipped anywhere in the tree.
    pub ignore_dirs: Vec<String>,
    /// Validated glob patterns excluded from analysis.
    pub exclude: Vec<String>,
    /// Whether to respect `.gitignore` files.
    pub respect_gitignore: bool,
}

/// A layer in the dependency order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerDef {
    /// Layer name.
    pub name: String,
    /// Position in the order; 0 is the lowest layer.
    pub rank: usize,
    /// Normalised directory prefixes (`/`-separated, no trailing slash).
    pub roots: Vec<String>,
    /// Whether child directories of each root are modules.
    pub modules: bool,
    /// Whether files may import other files of the same layer.
    pub allow_sideways: bool,
}

/// A specifier alias such as `@` → `src`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    /// Specifier prefix, without trailing `/`.
    pub key: String,
    /// Normalised project-relative directory (empty for the project root).
    pub target: String,
}

impl Alias {
    /// Returns the remainder of `specifier` after this alias, if it applies.
    #[must_use]
    pub fn strip<'s>(&self, specifier: &'s str) -> Option<&'s str> {
        let rest = specifier.strip_prefix(self.key.as_str())?;
        if rest.is_empty() {
            Some(rest)
        } else {
            rest.strip_prefix('/')
        }
    }
}

/// File stem conventions identifying roles.
#[derive(Debug, Clone, Default)]
pub struct RoleConventions {
    by_stem: BTreeMap<String, FileRole>,
}

impl RoleConventions {
    pub(crate) fn insert(&mut self, stem: String, role: FileRole) -> Option<FileRole> {
        self.by_stem.insert(stem, role)
    }

    /// Role of a file with the given stem.
    #[must_use]
    pub fn role_for_stem(&self, stem: &str) -> FileRole {
        self.by_stem
            .get(stem)
            .copied()
            .unwrap_or(FileRole::Unclassified)
    }

    /// Stems registered for a role, sorted.
    #[must_use]
    pub fn stems(&self, role: FileRole) -> Vec<&str> {
        self.by_stem
            .iter()
            .filter(|(_, r)| **r == role)
            .map(|(s, _)| s.as_str())
            .collect()
    }
}

/// Module structure settings from `[modules]`.
#[derive(Debug, Clone)]
pub struct ModuleSettings {
    /// Roles every module directory must contain, deduplicated in
    /// declaration order.
    pub required: Vec<FileRole>,
    /// Whether importing another module's public entry is allowed.
    pub allow_public_api: bool,
}

/// A forbidden textual pattern.
#[derive(Debug, Clone)]
pub enum TextPattern {
    /// Literal substring.
    Literal(String),
    /// Compiled regular expression.
    Regex(Regex),
}

impl TextPattern {
    /// Source text of the pattern.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Literal(s) => s,
            Self::Regex(r) => r.as_str(),
        }
    }

    /// Byte offset of the first match and the number of matches.
    #[must_use]
    pub fn find(&self, text: &str) -> Option<(usize, usize)> {
        match self {
            Self::Literal(s) => {
                let first = text.find(s.as_str())?;
                Some((first, text.matches(s.as_str()).count()))
            }
            Self::Regex(r) => {
                let mut matches = r.find_iter(text).filter(|m| !m.as_str().is_empty());
                let first = matches.next()?;
                Some((first.start(), 1 + matches.count()))
            }
        }
    }
}

/// A role-specific content rule from `[[role-rules]]`.
#[derive(Debug, Clone)]
pub struct RoleRule {
    /// Rule name.
    pub name: String,
    /// Role the rule applies to.
    pub role: FileRole,
    /// Forbidden text, checked outside comments.
    pub text: Vec<TextPattern>,
    /// Forbidden specifiers; matches `spec == p` or `spec` starting with `p/`.
    pub deny_imports: Vec<String>,
    /// Layer names files of this role must not import.
    pub deny_layers: Vec<String>,
    /// Custom message.
    pub message: Option<String>,
    /// Severity of violations.
    pub severity: Severity,
}

impl RoleRule {
    /// Whether an import specifier is denied by this rule.
    #[must_use]
    pub fn denies_import(&self, specifier: &str) -> Option<&str> {
        self.deny_imports
            .iter()
            .find(|p| {
                specifier == p.as_str()
                    || specifier
                        .strip_prefix(p.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            })
            .map(String::as_str)
    }
}

/// Per-rule toggles from `[rules.<name>]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleSettings {
    /// Whether the rule runs (default: true).
    pub enabled: Option<bool>,
    /// Severity override.
    pub severity: Option<Severity>,
}

/// The complete, validated policy.
///
/// Constructed once per run and shared by reference; nothing mutates it.
#[derive(Debug, Clone)]
pub struct Policy {
    pub(crate) analyzer: AnalyzerSettings,
    pub(crate) layers: Vec<LayerDef>,
    pub(crate) aliases: Vec<Alias>,
    pub(crate) roles: RoleConventions,
    pub(crate) modules: ModuleSettings,
    pub(crate) role_rules: Vec<RoleRule>,
    pub(crate) forbidden: Vec<String>,
    pub(crate) rules: BTreeMap<String, RuleSettings>,
}

impl Policy {
    /// Discovery settings.
    #[must_use]
    pub fn analyzer(&self) -> &AnalyzerSettings {
        &self.analyzer
    }

    /// Layers in rank order.
    #[must_use]
    pub fn layers(&self) -> &[LayerDef] {
        &self.layers
    }

    /// Looks up a layer by name.
    #[must_use]
    pub fn layer(&self, name: &str) -> Option<&LayerDef> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// Aliases, longest key first.
    #[must_use]
    pub fn aliases(&self) -> &[Alias] {
        &self.aliases
    }

    /// Role conventions.
    #[must_use]
    pub fn roles(&self) -> &RoleConventions {
        &self.roles
    }

    /// Module structure settings.
    #[must_use]
    pub fn modules(&self) -> &ModuleSettings {
        &self.modules
    }

    /// Role-specific content rules.
    #[must_use]
    pub fn role_rules(&self) -> &[RoleRule] {
        &self.role_rules
    }

    /// Forbidden path patterns.
    #[must_use]
    pub fn forbidden(&self) -> &[String] {
        &self.forbidden
    }

    /// Whether a source extension (without dot) is scanned.
    #[must_use]
    pub fn is_source_extension(&self, ext: &str) -> bool {
        self.analyzer.extensions.iter().any(|e| e == ext)
    }

    /// Checks if a rule is enabled.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_name: &str) -> bool {
        self.rules
            .get(rule_name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a rule.
    #[must_use]
    pub fn rule_severity(&self, rule_name: &str) -> Option<Severity> {
        self.rules.get(rule_name).and_then(|c| c.severity)
    }
}
