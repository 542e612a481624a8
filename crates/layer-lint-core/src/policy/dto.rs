//! TOML deserialization types (DTO layer).
//!
//! These types exist solely for serde deserialization and carry the
//! built-in defaults for every section that a policy file omits.
//! They are converted to the validated [`Policy`](super::Policy) by the loader.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::types::Severity;

/// Raw TOML representation of a policy file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyDto {
    /// Discovery settings.
    pub analyzer: AnalyzerDto,
    /// Layer declarations, lowest rank first.
    pub layers: Vec<LayerDto>,
    /// Specifier prefix → project-relative directory.
    pub aliases: BTreeMap<String, String>,
    /// File stems identifying each role.
    pub roles: RolesDto,
    /// Module structure settings.
    pub modules: ModulesDto,
    /// Role-specific content rules; `None` selects the built-in set.
    #[serde(rename = "role-rules")]
    pub role_rules: Option<Vec<RoleRuleDto>>,
    /// Structural rules on the project tree.
    pub structure: StructureDto,
    /// Per-rule toggles and severity overrides.
    pub rules: BTreeMap<String, RuleSettingsDto>,
}

impl Default for PolicyDto {
    fn default() -> Self {
        Self {
            analyzer: AnalyzerDto::default(),
            layers: default_layers(),
            aliases: default_aliases(),
            roles: RolesDto::default(),
            modules: ModulesDto::default(),
            role_rules: None,
            structure: StructureDto::default(),
            rules: BTreeMap::new(),
        }
    }
}

/// `[analyzer]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerDto {
    /// Source root to scan, relative to the project directory.
    pub root: String,
    /// Source file extensions, without the dot.
    pub extensions: Vec<String>,
    /// Directory names skipped anywhere in the tree.
    pub ignore_dirs: Vec<String>,
    /// Glob patterns excluded from analysis.
    pub exclude: Vec<String>,
    /// Whether to respect `.gitignore` files.
    pub respect_gitignore: bool,
}

impl Default for AnalyzerDto {
    fn default() -> Self {
        Self {
            root: "src".to_string(),
            extensions: ["ts", "tsx", "js", "jsx", "mjs", "cjs"]
                .map(String::from)
                .to_vec(),
            ignore_dirs: ["node_modules", "dist", "build", "coverage", ".git"]
                .map(String::from)
                .to_vec(),
            exclude: Vec::new(),
            respect_gitignore: true,
        }
    }
}

/// `[[layers]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerDto {
    /// Layer name (e.g., "core").
    pub name: String,
    /// Directory prefixes belonging to this layer.
    pub roots: Vec<String>,
    /// Whether child directories of each root are modules.
    #[serde(default)]
    pub modules: bool,
    /// Whether files may import other files of the same layer.
    #[serde(default = "default_true")]
    pub allow_sideways: bool,
}

/// `[roles]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RolesDto {
    /// Stems of UI files.
    pub ui: Vec<String>,
    /// Stems of store files.
    pub store: Vec<String>,
    /// Stems of service files.
    pub service: Vec<String>,
    /// Stems of type declaration files.
    pub types: Vec<String>,
    /// Stems of the public entry file.
    #[serde(rename = "public-api", alias = "index")]
    pub public_api: Vec<String>,
}

impl Default for RolesDto {
    fn default() -> Self {
        Self {
            ui: vec!["ui".to_string()],
            store: vec!["store".to_string()],
            service: vec!["service".to_string()],
            types: vec!["types".to_string()],
            public_api: vec!["index".to_string()],
        }
    }
}

/// `[modules]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModulesDto {
    /// Role names every module directory must contain.
    pub required: Vec<String>,
    /// Whether importing another module's public entry is allowed.
    pub allow_public_api: bool,
}

impl Default for ModulesDto {
    fn default() -> Self {
        Self {
            required: ["ui", "store", "service", "public-api"]
                .map(String::from)
                .to_vec(),
            allow_public_api: true,
        }
    }
}

/// `[[role-rules]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoleRuleDto {
    /// Rule name (e.g., "store-no-network").
    pub name: String,
    /// Role the rule applies to.
    pub role: String,
    /// Forbidden literal substrings.
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Forbidden regular expressions.
    #[serde(default)]
    pub regex: Vec<String>,
    /// Forbidden import specifiers (package or path prefixes).
    #[serde(default)]
    pub deny_imports: Vec<String>,
    /// Layers that files of this role must not import.
    #[serde(default)]
    pub deny_layers: Vec<String>,
    /// Violation message.
    #[serde(default)]
    pub message: Option<String>,
    /// Severity (default: "error").
    #[serde(default = "default_severity")]
    pub severity: Severity,
}

/// `[structure]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StructureDto {
    /// Glob patterns of paths that must not exist.
    pub forbidden: Vec<String>,
}

/// `[rules.<name>]` entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleSettingsDto {
    /// Whether the rule runs.
    pub enabled: Option<bool>,
    /// Severity override.
    pub severity: Option<Severity>,
}

fn default_true() -> bool {
    true
}

fn default_severity() -> Severity {
    Severity::Error
}

fn layer(name: &str, root: &str, modules: bool) -> LayerDto {
    LayerDto {
        name: name.to_string(),
        roots: vec![root.to_string()],
        modules,
        allow_sideways: true,
    }
}

fn default_layers() -> Vec<LayerDto> {
    vec![
        layer("shared", "src/shared", false),
        layer("core", "src/core", false),
        layer("modules", "src/modules", true),
        layer("app", "src/app", false),
    ]
}

fn default_aliases() -> BTreeMap<String, String> {
    [
        ("@", "src"),
        ("@shared", "src/shared"),
        ("@core", "src/core"),
        ("@modules", "src/modules"),
        ("@app", "src/app"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// Built-in role rules, used when a policy has no `[[role-rules]]`.
pub(crate) fn default_role_rules() -> Vec<RoleRuleDto> {
    vec![
        RoleRuleDto {
            name: "store-no-network".to_string(),
            role: "store".to_string(),
            patterns: strings(&["fetch(", "XMLHttpRequest", "new WebSocket("]),
            regex: Vec::new(),
            deny_imports: strings(&["axios", "node:http", "node:https"]),
            deny_layers: Vec::new(),
            message: Some(
                "store files must not perform network calls; move I/O into the module service"
                    .to_string(),
            ),
            severity: Severity::Error,
        },
        RoleRuleDto {
            name: "ui-no-core".to_string(),
            role: "ui".to_string(),
            patterns: Vec::new(),
            regex: Vec::new(),
            deny_imports: Vec::new(),
            deny_layers: strings(&["core"]),
            message: Some(
                "UI files must not import the core layer; go through the module store or service"
                    .to_string(),
            ),
            severity: Severity::Error,
        },
        RoleRuleDto {
            name: "ui-no-network".to_string(),
            role: "ui".to_string(),
            patterns: strings(&["fetch("]),
            regex: Vec::new(),
            deny_imports: strings(&["axios"]),
            deny_layers: Vec::new(),
            message: Some("UI files must not perform network calls".to_string()),
            severity: Severity::Error,
        },
        RoleRuleDto {
            name: "service-no-business-logic".to_string(),
            role: "service".to_string(),
            patterns: Vec::new(),
            regex: strings(&[r"\bswitch\s*\(", r"\bfor\s*\(", r"\bwhile\s*\("]),
            deny_imports: Vec::new(),
            deny_layers: Vec::new(),
            message: Some(
                "service files should stay thin adapters; move control-flow-heavy logic into core"
                    .to_string(),
            ),
            severity: Severity::Warning,
        },
        RoleRuleDto {
            name: "types-declarations-only".to_string(),
            role: "types".to_string(),
            patterns: Vec::new(),
            regex: strings(&[r"(?m)^[ \t]*(export[ \t]+)?(default[ \t]+)?(async[ \t]+)?(function|class)[ \t]"]),
            deny_imports: Vec::new(),
            deny_layers: Vec::new(),
            message: Some("types files should only declare types and interfaces".to_string()),
            severity: Severity::Warning,
        },
    ]
}
