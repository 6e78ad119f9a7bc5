// src/options/schema.rs

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::blueprint::{BlueprintLookup, BlueprintRegistry};
use crate::errors::{Result, SproutError};
use crate::options::spec::OptionSpec;
use crate::types::NotFoundPolicy;

/// The merged, name-unique list of options a command accepts for one
/// invocation.
///
/// Ordering: static options as declared, followed by net-new dynamic options
/// in the order they were supplied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionSchema {
    options: Vec<OptionSpec>,
}

impl OptionSchema {
    /// Build a schema from a command's statically declared options.
    ///
    /// Static options are authored by the command itself, so a duplicate
    /// spelling here is an error rather than something to drop.
    pub fn from_static(options: Vec<OptionSpec>) -> Result<Self> {
        let mut seen: HashSet<&str> = HashSet::new();
        for spec in &options {
            for spelling in spec.spellings() {
                if !seen.insert(spelling) {
                    return Err(SproutError::OptionResolution(format!(
                        "option `{spelling}` is declared more than once"
                    )));
                }
            }
        }
        Ok(Self { options })
    }

    /// Append dynamic options. An option whose name is already taken is
    /// dropped; a clashing alias is dropped from an otherwise new option.
    /// Returns the names of the dropped options.
    pub fn extend_dynamic(&mut self, dynamic: Vec<OptionSpec>) -> Vec<String> {
        let mut dropped = Vec::new();

        for mut spec in dynamic {
            if self.find(&spec.name).is_some() {
                warn!(
                    option = %spec.name,
                    "dynamic option collides with an existing option; keeping the existing one"
                );
                dropped.push(spec.name);
                continue;
            }

            let mut kept: Vec<String> = Vec::with_capacity(spec.aliases.len());
            for alias in std::mem::take(&mut spec.aliases) {
                let taken = alias == spec.name
                    || kept.iter().any(|k| *k == alias)
                    || self.find(&alias).is_some();
                if taken {
                    warn!(option = %spec.name, %alias, "dropping alias already in use");
                } else {
                    kept.push(alias);
                }
            }
            spec.aliases = kept;

            debug!(option = %spec.name, "registered dynamic option");
            self.options.push(spec);
        }

        dropped
    }

    /// Find the option answering to `token` (a name or an alias).
    pub fn find(&self, token: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|spec| spec.answers_to(token))
    }

    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(|spec| spec.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// Merge static and dynamic options: first occurrence by name wins.
pub fn merge_options(
    static_options: Vec<OptionSpec>,
    dynamic_options: Vec<OptionSpec>,
) -> Result<OptionSchema> {
    let mut schema = OptionSchema::from_static(static_options)?;
    schema.extend_dynamic(dynamic_options);
    Ok(schema)
}

/// Resolve the full option schema for an invocation.
///
/// `blueprints` are tried in order and the first one the registry knows
/// contributes its options, merged in after the static ones:
/// - nothing requested: static options only,
/// - none found: governed by `policy`,
/// - lookup failure: always an error; nothing is parsed.
pub async fn resolve_options(
    static_options: Vec<OptionSpec>,
    registry: &dyn BlueprintRegistry,
    blueprints: &[&str],
    policy: NotFoundPolicy,
) -> Result<OptionSchema> {
    let mut schema = OptionSchema::from_static(static_options)?;

    let Some(first) = blueprints.first() else {
        return Ok(schema);
    };

    for name in blueprints {
        match registry.lookup(name).await {
            BlueprintLookup::Found(found) => {
                debug!(
                    blueprint = %found.name,
                    count = found.available_options.len(),
                    "merging blueprint options"
                );
                schema.extend_dynamic(found.available_options);
                return Ok(schema);
            }
            BlueprintLookup::NotFound => {
                debug!(blueprint = %name, "no such blueprint");
            }
            BlueprintLookup::Failed(reason) => {
                return Err(SproutError::OptionResolution(format!(
                    "looking up blueprint `{name}` failed: {reason}"
                )));
            }
        }
    }

    match policy {
        NotFoundPolicy::Tolerate => {
            debug!(blueprint = %first, "no blueprint found; using static options only");
            Ok(schema)
        }
        NotFoundPolicy::Reject => Err(SproutError::OptionResolution(format!(
            "Unknown blueprint: {first}"
        ))),
    }
}
