//! DTO → validated [`Policy`] conversion.

use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use crate::classifier::FileRole;
use crate::rule::RuleId;

use super::dto::{
    default_role_rules, AnalyzerDto, LayerDto, ModulesDto, PolicyDto, RoleRuleDto, RolesDto,
    RuleSettingsDto,
};
use super::model::{
    Alias, AnalyzerSettings, LayerDef, ModuleSettings, Policy, RoleConventions, RoleRule,
    RuleSettings, TextPattern,
};
use super::PolicyError;

/// Converts a [`PolicyDto`] to a validated [`Policy`].
///
/// # Errors
///
/// Returns the first validation error encountered.
pub fn load(dto: PolicyDto) -> Result<Policy, PolicyError> {
    let analyzer = convert_analyzer(dto.analyzer)?;
    let layers = convert_layers(dto.layers)?;
    let aliases = convert_aliases(dto.aliases)?;
    let roles = convert_roles(dto.roles)?;
    let modules = convert_modules(dto.modules)?;

    let role_dtos = match dto.role_rules {
        Some(rules) => rules,
        None => builtin_role_rules(&layers),
    };
    let mut seen = HashSet::new();
    let mut role_rules = Vec::with_capacity(role_dtos.len());
    for (i, rule) in role_dtos.into_iter().enumerate() {
        let rule = convert_role_rule(rule, i, &layers)?;
        if !seen.insert(rule.name.clone()) {
            return Err(PolicyError::DuplicateRoleRule { name: rule.name });
        }
        role_rules.push(rule);
    }

    let forbidden = dto
        .structure
        .forbidden
        .iter()
        .enumerate()
        .map(|(i, p)| convert_glob(p, &format!("structure.forbidden[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    let rules = convert_rule_settings(dto.rules)?;

    Ok(Policy {
        analyzer,
        layers,
        aliases,
        roles,
        modules,
        role_rules,
        forbidden,
        rules,
    })
}

/// Built-in role rules restricted to the declared layers. A rule left with
/// nothing to check is dropped.
fn builtin_role_rules(layers: &[LayerDef]) -> Vec<RoleRuleDto> {
    default_role_rules()
        .into_iter()
        .filter_map(|mut rule| {
            let declared = rule.deny_layers.len();
            rule.deny_layers
                .retain(|name| layers.iter().any(|l| l.name == *name));
            let emptied = declared > 0 && rule.deny_layers.is_empty();
            let checks_nothing =
                rule.patterns.is_empty() && rule.regex.is_empty() && rule.deny_imports.is_empty();
            (!(emptied && checks_nothing)).then_some(rule)
        })
        .collect()
}

/// Normalises a project-relative path: `\` becomes `/`, `.` and empty
/// segments are dropped, and the result has no trailing slash.
pub(crate) fn normalize_relative(value: &str, allow_root: bool) -> Result<String, &'static str> {
    let unified = value.trim().replace('\\', "/");
    let bytes = unified.as_bytes();
    let has_drive = bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':';
    if unified.starts_with('/') || has_drive {
        return Err("must be relative to the project directory");
    }

    let mut parts = Vec::new();
    for part in unified.split('/') {
        match part {
            "" | "." => {}
            ".." => return Err("must not contain `..`"),
            other => parts.push(other),
        }
    }
    if parts.is_empty() && !allow_root {
        return Err("must not be empty");
    }
    Ok(parts.join("/"))
}

fn invalid_path(context: String, value: &str, reason: &'static str) -> PolicyError {
    PolicyError::InvalidPath {
        context,
        value: value.to_string(),
        reason,
    }
}

fn convert_analyzer(dto: AnalyzerDto) -> Result<AnalyzerSettings, PolicyError> {
    let root = normalize_relative(&dto.root, true)
        .map_err(|reason| invalid_path("analyzer.root".into(), &dto.root, reason))?;

    let mut extensions: Vec<String> = Vec::new();
    for (i, ext) in dto.extensions.iter().enumerate() {
        let ext = ext.trim().trim_start_matches('.');
        if ext.is_empty() {
            return Err(PolicyError::EmptyName {
                context: format!("analyzer.extensions[{i}]"),
            });
        }
        if !extensions.iter().any(|e| e == ext) {
            extensions.push(ext.to_string());
        }
    }
    if extensions.is_empty() {
        return Err(PolicyError::EmptyName {
            context: "analyzer.extensions".into(),
        });
    }

    let exclude = dto
        .exclude
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let pattern = p.trim().trim_start_matches("./").to_string();
            glob::Pattern::new(&pattern)
                .map(|_| pattern)
                .map_err(|source| PolicyError::InvalidGlob {
                    context: format!("analyzer.exclude[{i}]"),
                    value: p.clone(),
                    source,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AnalyzerSettings {
        root: PathBuf::from(root),
        extensions,
        ignore_dirs: dto
            .ignore_dirs
            .into_iter()
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .collect(),
        exclude,
        respect_gitignore: dto.respect_gitignore,
    })
}

fn convert_layers(dtos: Vec<LayerDto>) -> Result<Vec<LayerDef>, PolicyError> {
    if dtos.is_empty() {
        return Err(PolicyError::NoLayers);
    }

    let mut seen = HashSet::new();
    let mut layers = Vec::with_capacity(dtos.len());
    for (rank, dto) in dtos.into_iter().enumerate() {
        let name = dto.name.trim().to_string();
        if name.is_empty() {
            return Err(PolicyError::EmptyName {
                context: format!("layers[{rank}].name"),
            });
        }
        if !seen.insert(name.clone()) {
            return Err(PolicyError::CyclicOrder { name });
        }
        if dto.roots.is_empty() {
            return Err(invalid_path(
                format!("layers[{rank}].roots"),
                "",
                "a layer needs at least one root",
            ));
        }
        let roots = dto
            .roots
            .iter()
            .enumerate()
            .map(|(j, r)| {
                normalize_relative(r, false)
                    .map_err(|reason| invalid_path(format!("layers[{rank}].roots[{j}]"), r, reason))
            })
            .collect::<Result<Vec<_>, _>>()?;

        layers.push(LayerDef {
            name,
            rank,
            roots,
            modules: dto.modules,
            allow_sideways: dto.allow_sideways,
        });
    }
    Ok(layers)
}

fn convert_aliases(dtos: BTreeMap<String, String>) -> Result<Vec<Alias>, PolicyError> {
    let mut aliases: Vec<Alias> = Vec::with_capacity(dtos.len());
    for (key, target) in &dtos {
        let normalized_key = key.trim().trim_end_matches('/').to_string();
        if normalized_key.is_empty() {
            return Err(PolicyError::EmptyName {
                context: format!("aliases.\"{key}\""),
            });
        }
        if aliases.iter().any(|a| a.key == normalized_key) {
            return Err(invalid_path(
                "aliases".into(),
                key,
                "alias key is declared more than once",
            ));
        }
        let normalized_target = normalize_relative(target, true)
            .map_err(|reason| invalid_path(format!("aliases.\"{key}\""), target, reason))?;
        aliases.push(Alias {
            key: normalized_key,
            target: normalized_target,
        });
    }
    // Longest key first, so `@core` wins over `@`.
    aliases.sort_by(|a, b| b.key.len().cmp(&a.key.len()).then_with(|| a.key.cmp(&b.key)));
    Ok(aliases)
}

fn convert_roles(dto: RolesDto) -> Result<RoleConventions, PolicyError> {
    let mut roles = RoleConventions::default();
    let groups = [
        (FileRole::Ui, dto.ui),
        (FileRole::Store, dto.store),
        (FileRole::Service, dto.service),
        (FileRole::Types, dto.types),
        (FileRole::PublicApi, dto.public_api),
    ];
    for (role, stems) in groups {
        for (i, stem) in stems.iter().enumerate() {
            let stem = stem.trim();
            if stem.is_empty() {
                return Err(PolicyError::EmptyName {
                    context: format!("roles.{}[{i}]", role.as_str()),
                });
            }
            if roles.insert(stem.to_string(), role).is_some() {
                return Err(PolicyError::DuplicateRoleStem {
                    stem: stem.to_string(),
                });
            }
        }
    }
    Ok(roles)
}

fn parse_role(value: &str, context: String) -> Result<FileRole, PolicyError> {
    FileRole::from_name(value.trim()).ok_or_else(|| PolicyError::UnknownRole {
        context,
        value: value.to_string(),
    })
}

fn convert_modules(dto: ModulesDto) -> Result<ModuleSettings, PolicyError> {
    let mut required = Vec::new();
    for (i, name) in dto.required.iter().enumerate() {
        let role = parse_role(name, format!("modules.required[{i}]"))?;
        if !required.contains(&role) {
            required.push(role);
        }
    }
    Ok(ModuleSettings {
        required,
        allow_public_api: dto.allow_public_api,
    })
}

fn convert_role_rule(
    dto: RoleRuleDto,
    index: usize,
    layers: &[LayerDef],
) -> Result<RoleRule, PolicyError> {
    let name = dto.name.trim().to_string();
    if name.is_empty() {
        return Err(PolicyError::EmptyName {
            context: format!("role-rules[{index}].name"),
        });
    }
    let ctx = format!("role-rule '{name}'");
    let role = parse_role(&dto.role, format!("{ctx} role"))?;

    let mut text = Vec::with_capacity(dto.patterns.len() + dto.regex.len());
    for (i, literal) in dto.patterns.into_iter().enumerate() {
        if literal.is_empty() {
            return Err(PolicyError::EmptyName {
                context: format!("{ctx} patterns[{i}]"),
            });
        }
        text.push(TextPattern::Literal(literal));
    }
    for (i, source) in dto.regex.iter().enumerate() {
        let compiled = Regex::new(source).map_err(|source| PolicyError::InvalidRegex {
            context: format!("{ctx} regex[{i}]"),
            source,
        })?;
        text.push(TextPattern::Regex(compiled));
    }

    let deny_imports: Vec<String> = dto
        .deny_imports
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    for (i, layer) in dto.deny_layers.iter().enumerate() {
        if !layers.iter().any(|l| l.name == *layer) {
            return Err(PolicyError::UnknownLayer {
                context: format!("{ctx} deny_layers[{i}]"),
                value: layer.clone(),
            });
        }
    }

    if text.is_empty() && deny_imports.is_empty() && dto.deny_layers.is_empty() {
        return Err(PolicyError::EmptyRoleRule { name });
    }

    Ok(RoleRule {
        name,
        role,
        text,
        deny_imports,
        deny_layers: dto.deny_layers,
        message: dto.message,
        severity: dto.severity,
    })
}

fn convert_glob(value: &str, context: &str) -> Result<String, PolicyError> {
    let pattern = normalize_relative(value, false)
        .map_err(|reason| invalid_path(context.to_string(), value, reason))?;
    glob::Pattern::new(&pattern).map_err(|source| PolicyError::InvalidGlob {
        context: context.to_string(),
        value: value.to_string(),
        source,
    })?;
    Ok(pattern)
}

fn convert_rule_settings(
    dtos: BTreeMap<String, RuleSettingsDto>,
) -> Result<BTreeMap<String, RuleSettings>, PolicyError> {
    let mut rules = BTreeMap::new();
    for (key, dto) in dtos {
        let id = RuleId::from_key(&key)
            .filter(|id| id.is_configurable())
            .ok_or_else(|| PolicyError::UnknownRule { name: key.clone() })?;
        rules.insert(
            id.name().to_string(),
            RuleSettings {
                enabled: dto.enabled,
                severity: dto.severity,
            },
        );
    }
    Ok(rules)
}
