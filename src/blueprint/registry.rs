// src/blueprint/registry.rs

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::blueprint::{Blueprint, BlueprintLookup, BlueprintRegistry, LookupFuture};
use crate::config::ConfigFile;

/// Blueprint names may not be empty, contain whitespace or path separators,
/// or start with a dash.
static MALFORMED_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^$|^-|[\s/\\]").expect("static regex is valid"));

pub fn is_malformed_blueprint_name(name: &str) -> bool {
    MALFORMED_NAME.is_match(name)
}

/// Registry backed by the `[blueprint.<name>]` sections of `Sprout.toml`.
#[derive(Debug, Clone, Default)]
pub struct ConfigBlueprintRegistry {
    blueprints: BTreeMap<String, Blueprint>,
}

impl ConfigBlueprintRegistry {
    pub fn new(blueprints: impl IntoIterator<Item = Blueprint>) -> Self {
        Self {
            blueprints: blueprints
                .into_iter()
                .map(|bp| (bp.name.clone(), bp))
                .collect(),
        }
    }

    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self::new(cfg.blueprints.values().cloned())
    }
}

impl BlueprintRegistry for ConfigBlueprintRegistry {
    fn lookup<'a>(&'a self, name: &'a str) -> LookupFuture<'a> {
        let result = if is_malformed_blueprint_name(name) {
            BlueprintLookup::Failed(format!("`{name}` is not a valid blueprint name"))
        } else {
            match self.blueprints.get(name) {
                Some(bp) => BlueprintLookup::Found(bp.clone()),
                None => BlueprintLookup::NotFound,
            }
        };
        debug!(blueprint = %name, found = matches!(result, BlueprintLookup::Found(_)), "blueprint lookup");
        Box::pin(std::future::ready(result))
    }
}
