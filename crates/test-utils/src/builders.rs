#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use sprout::blueprint::{Blueprint, BlueprintRegistry, ConfigBlueprintRegistry};
use sprout::command::{CommandContext, Project};
use sprout::config::{ConfigFile, RawBlueprint, RawConfigFile, RawOptionKind, RawOptionSpec};
use sprout::options::OptionSpec;
use sprout::types::NotFoundPolicy;
use sprout::ui::Ui;
use sprout::validation::ToolIdentity;

use crate::fakes::RecordingUi;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_test_command(mut self, cmd: &str) -> Self {
        self.config.test.command = Some(cmd.to_string());
        self
    }

    pub fn with_dev_command(mut self, cmd: &str) -> Self {
        self.config.test.dev_command = Some(cmd.to_string());
        self
    }

    pub fn with_reserved_name(mut self, name: &str) -> Self {
        self.config.new.reserved_names.push(name.to_string());
        self
    }

    pub fn with_not_found_policy(mut self, policy: NotFoundPolicy) -> Self {
        self.config.new.blueprint_not_found = policy;
        self
    }

    pub fn with_blueprint(mut self, name: &str, options: Vec<RawOptionSpec>) -> Self {
        self.config.blueprint.insert(
            name.to_string(),
            RawBlueprint {
                description: format!("{name} blueprint"),
                options,
            },
        );
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A `[[blueprint.<name>.options]]` entry.
pub fn raw_option(name: &str, kind: RawOptionKind) -> RawOptionSpec {
    RawOptionSpec {
        name: name.to_string(),
        kind,
        values: Vec::new(),
        default: None,
        aliases: Vec::new(),
        description: String::new(),
    }
}

pub fn blueprint(name: &str, options: Vec<OptionSpec>) -> Blueprint {
    Blueprint {
        name: name.to_string(),
        description: format!("{name} blueprint"),
        available_options: options,
    }
}

/// Builder for `CommandContext`. Defaults: a [`RecordingUi`], blueprints
/// from the config, the default tool identity plus the config's reserved
/// names.
pub struct ContextBuilder {
    root: PathBuf,
    config: ConfigFile,
    ui: Option<Arc<dyn Ui>>,
    blueprints: Option<Arc<dyn BlueprintRegistry>>,
}

impl ContextBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config: ConfigFile::default(),
            ui: None,
            blueprints: None,
        }
    }

    pub fn with_config(mut self, config: ConfigFile) -> Self {
        self.config = config;
        self
    }

    pub fn with_ui(mut self, ui: Arc<dyn Ui>) -> Self {
        self.ui = Some(ui);
        self
    }

    pub fn with_blueprints(mut self, blueprints: Arc<dyn BlueprintRegistry>) -> Self {
        self.blueprints = Some(blueprints);
        self
    }

    pub fn build(self) -> CommandContext {
        let identity =
            ToolIdentity::default().with_extra_reserved(self.config.new.reserved_names.clone());
        let blueprints: Arc<dyn BlueprintRegistry> = match self.blueprints {
            Some(blueprints) => blueprints,
            None => Arc::new(ConfigBlueprintRegistry::from_config(&self.config)),
        };
        let ui: Arc<dyn Ui> = match self.ui {
            Some(ui) => ui,
            None => RecordingUi::new(),
        };
        CommandContext {
            ui,
            project: Project {
                root: self.root,
                config: self.config,
            },
            blueprints,
            identity,
        }
    }
}
