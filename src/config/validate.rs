// src/config/validate.rs

use std::collections::{BTreeMap, HashSet};

use crate::blueprint::{is_malformed_blueprint_name, Blueprint};
use crate::config::model::{ConfigFile, RawBlueprint, RawConfigFile, RawOptionKind, RawOptionSpec};
use crate::errors::{Result, SproutError};
use crate::options::{OptionKind, OptionSpec, OptionValue};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = SproutError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_test_section(&raw)?;
        validate_new_section(&raw)?;
        let blueprints = convert_blueprints(&raw.blueprint)?;
        Ok(ConfigFile::new_unchecked(raw.project, raw.test, raw.new, blueprints))
    }
}

fn validate_test_section(cfg: &RawConfigFile) -> Result<()> {
    if cfg.test.debounce_ms == 0 {
        return Err(config_error("[test].debounce_ms must be >= 1 (got 0)"));
    }
    for (key, value) in [
        ("command", &cfg.test.command),
        ("dev_command", &cfg.test.dev_command),
    ] {
        if value.as_deref().is_some_and(|cmd| cmd.trim().is_empty()) {
            return Err(config_error(format!("[test].{key} must not be empty")));
        }
    }
    Ok(())
}

fn validate_new_section(cfg: &RawConfigFile) -> Result<()> {
    if cfg.new.reserved_names.iter().any(|n| n.trim().is_empty()) {
        return Err(config_error("[new].reserved_names must not contain empty names"));
    }
    Ok(())
}

fn convert_blueprints(raw: &BTreeMap<String, RawBlueprint>) -> Result<BTreeMap<String, Blueprint>> {
    let mut out = BTreeMap::new();

    for (name, bp) in raw {
        if is_malformed_blueprint_name(name) {
            return Err(config_error(format!("invalid blueprint name '{name}'")));
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut options = Vec::with_capacity(bp.options.len());

        for raw_opt in &bp.options {
            let spec = convert_option(name, raw_opt)?;
            for spelling in std::iter::once(&raw_opt.name).chain(raw_opt.aliases.iter()) {
                if !seen.insert(spelling.as_str()) {
                    return Err(config_error(format!(
                        "blueprint '{name}' declares option '{spelling}' more than once"
                    )));
                }
            }
            options.push(spec);
        }

        out.insert(
            name.clone(),
            Blueprint {
                name: name.clone(),
                description: bp.description.clone(),
                available_options: options,
            },
        );
    }

    Ok(out)
}

fn convert_option(blueprint: &str, raw: &RawOptionSpec) -> Result<OptionSpec> {
    let name = raw.name.trim();
    if !is_option_spelling(name) {
        return Err(config_error(format!(
            "blueprint '{blueprint}' has an option with invalid name '{}'",
            raw.name
        )));
    }
    if let Some(alias) = raw.aliases.iter().find(|alias| !is_option_spelling(alias)) {
        return Err(config_error(format!(
            "blueprint '{blueprint}' option '{name}' has an invalid alias '{alias}'"
        )));
    }

    let kind = match raw.kind {
        RawOptionKind::String => OptionKind::String,
        RawOptionKind::Boolean => OptionKind::Boolean,
        RawOptionKind::Number => OptionKind::Number,
        RawOptionKind::Enum if raw.values.is_empty() => {
            return Err(config_error(format!(
                "blueprint '{blueprint}' option '{name}' is an enum without `values`"
            )));
        }
        RawOptionKind::Enum => OptionKind::Enum(raw.values.clone()),
    };

    let default = match &raw.default {
        None => None,
        Some(value) => {
            let converted = toml_to_option_value(value).filter(|v| kind.accepts(v));
            match converted {
                Some(v) => Some(v),
                None => {
                    return Err(config_error(format!(
                        "blueprint '{blueprint}' option '{name}' has a default that is not a valid {kind}"
                    )));
                }
            }
        }
    };

    Ok(OptionSpec {
        name: name.to_string(),
        kind,
        default,
        aliases: raw.aliases.clone(),
        description: raw.description.clone(),
    })
}

/// Usable as `--name` or `-n` on the command line.
fn is_option_spelling(spelling: &str) -> bool {
    !spelling.is_empty()
        && !spelling.starts_with('-')
        && spelling
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn toml_to_option_value(value: &toml::Value) -> Option<OptionValue> {
    match value {
        toml::Value::String(s) => Some(OptionValue::String(s.clone())),
        toml::Value::Boolean(b) => Some(OptionValue::Bool(*b)),
        toml::Value::Integer(i) => Some(OptionValue::Number(*i as f64)),
        toml::Value::Float(f) => Some(OptionValue::Number(*f)),
        _ => None,
    }
}

fn config_error(msg: impl Into<String>) -> SproutError {
    SproutError::Config(msg.into())
}
