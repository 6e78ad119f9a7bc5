// src/config/model.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::blueprint::Blueprint;
use crate::types::NotFoundPolicy;

/// Project configuration as read from `Sprout.toml`.
///
/// ```toml
/// [project]
/// name = "my-app"
///
/// [test]
/// command = "npm test --"
/// dev_command = "npm run test:dev"
/// watch = ["dist/**"]
///
/// [new]
/// reserved_names = ["node_modules"]
/// blueprint_not_found = "tolerate"
///
/// [blueprint.app]
/// description = "Default application blueprint"
///
/// [[blueprint.app.options]]
/// name = "skip-git"
/// type = "boolean"
/// default = false
/// ```
///
/// Every section is optional.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub project: ProjectSection,

    #[serde(default)]
    pub test: TestSection,

    #[serde(default)]
    pub new: NewSection,

    /// Blueprints keyed by name, from `[blueprint.<name>]`.
    #[serde(default)]
    pub blueprint: BTreeMap<String, RawBlueprint>,
}

/// Validated configuration. Blueprint option declarations have been checked
/// and converted into [`crate::options::OptionSpec`]s.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub project: ProjectSection,
    pub test: TestSection,
    pub new: NewSection,
    pub blueprints: BTreeMap<String, Blueprint>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        project: ProjectSection,
        test: TestSection,
        new: NewSection,
        blueprints: BTreeMap<String, Blueprint>,
    ) -> Self {
        Self {
            project,
            test,
            new,
            blueprints,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(
            ProjectSection::default(),
            TestSection::default(),
            NewSection::default(),
            BTreeMap::new(),
        )
    }
}

/// `[project]` section. Also the shape `sprout init` writes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ProjectSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Blueprint the project was generated from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blueprint: Option<String>,

    /// Options recorded at generation time.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, toml::Value>,
}

/// Manifest written by `sprout init`.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectManifest {
    pub project: ProjectSection,
}

/// `[test]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TestSection {
    /// Command for a one-shot test run.
    #[serde(default)]
    pub command: Option<String>,

    /// Long-lived command for `sprout test --server`; falls back to
    /// `command`.
    #[serde(default)]
    pub dev_command: Option<String>,

    /// Globs (relative to the project root) of build output. A change to a
    /// matching file means a build finished.
    #[serde(default = "default_watch")]
    pub watch: Vec<String>,

    #[serde(default)]
    pub exclude: Vec<String>,

    /// Window in which a burst of file events counts as one build.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_watch() -> Vec<String> {
    vec!["dist/**".to_string()]
}

fn default_debounce_ms() -> u64 {
    150
}

impl Default for TestSection {
    fn default() -> Self {
        Self {
            command: None,
            dev_command: None,
            watch: default_watch(),
            exclude: Vec::new(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// `[new]` section.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewSection {
    /// Names rejected in addition to the built-in reserved set.
    #[serde(default)]
    pub reserved_names: Vec<String>,

    #[serde(default)]
    pub blueprint_not_found: NotFoundPolicy,
}

/// `[blueprint.<name>]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBlueprint {
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub options: Vec<RawOptionSpec>,
}

/// One `[[blueprint.<name>.options]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct RawOptionSpec {
    pub name: String,

    #[serde(default, rename = "type")]
    pub kind: RawOptionKind,

    /// Allowed values for `type = "enum"`.
    #[serde(default)]
    pub values: Vec<String>,

    #[serde(default)]
    pub default: Option<toml::Value>,

    #[serde(default)]
    pub aliases: Vec<String>,

    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawOptionKind {
    #[default]
    String,
    Boolean,
    Number,
    Enum,
}
