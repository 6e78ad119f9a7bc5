// src/task/manifest.rs

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use crate::command::Invocation;
use crate::config::{ProjectManifest, ProjectSection, MANIFEST_FILE};
use crate::errors::{Result, SproutError};
use crate::fs::FileSystem;
use crate::options::OptionValue;
use crate::task::{Task, TaskFuture};
use crate::types::Outcome;
use crate::ui::Ui;

/// Options that steer generation itself and are not recorded.
const UNRECORDED_OPTIONS: &[&str] = &["dry-run", "blueprint", "directory"];

/// Writes `Sprout.toml` into the working directory.
///
/// The project name is the first positional, or the directory name when none
/// is given. Blueprint options passed on the command line are recorded under
/// `[project.options]`. An existing manifest is never overwritten.
pub struct WriteProjectManifest {
    fs: Arc<dyn FileSystem>,
    ui: Arc<dyn Ui>,
}

impl WriteProjectManifest {
    pub fn new(fs: Arc<dyn FileSystem>, ui: Arc<dyn Ui>) -> Self {
        Self { fs, ui }
    }

    fn write(&self, invocation: &Invocation) -> Result<Outcome> {
        let dir = &invocation.working_dir;
        let path = dir.join(MANIFEST_FILE);

        if self.fs.exists(&path) {
            return Err(SproutError::TaskRuntime(format!(
                "{MANIFEST_FILE} already exists in {}; refusing to overwrite it.",
                dir.display()
            )));
        }

        let name = invocation
            .positional(0)
            .map(str::to_string)
            .or_else(|| dir.file_name().map(|n| n.to_string_lossy().into_owned()));

        let options: BTreeMap<String, toml::Value> = invocation
            .options
            .iter()
            .filter(|(key, _)| !UNRECORDED_OPTIONS.iter().any(|skip| skip == key))
            .map(|(key, value)| (key.to_string(), to_toml(value)))
            .collect();

        let manifest = ProjectManifest {
            project: ProjectSection {
                name,
                blueprint: invocation.options.string("blueprint").map(str::to_string),
                options,
            },
        };

        let rendered = toml::to_string(&manifest)
            .map_err(|err| SproutError::TaskRuntime(format!("rendering {MANIFEST_FILE}: {err}")))?;

        if invocation.options.flag("dry-run") {
            self.ui
                .write_line(&format!("Would write {}:\n{rendered}", path.display()));
            return Ok(Outcome::Message(format!(
                "Dry run: nothing written to {}",
                dir.display()
            )));
        }

        self.fs.write(&path, rendered.as_bytes())?;
        info!(path = ?path, "wrote project manifest");

        Ok(Outcome::Message(format!(
            "Initialized project in {}",
            dir.display()
        )))
    }
}

fn to_toml(value: &OptionValue) -> toml::Value {
    match value {
        OptionValue::String(s) => toml::Value::String(s.clone()),
        OptionValue::Bool(b) => toml::Value::Boolean(*b),
        OptionValue::Number(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
            toml::Value::Integer(*n as i64)
        }
        OptionValue::Number(n) => toml::Value::Float(*n),
    }
}

impl Task for WriteProjectManifest {
    fn name(&self) -> &str {
        "write-project-manifest"
    }

    fn run<'a>(&'a self, invocation: &'a Invocation, _input: Outcome) -> TaskFuture<'a> {
        Box::pin(std::future::ready(self.write(invocation)))
    }
}
