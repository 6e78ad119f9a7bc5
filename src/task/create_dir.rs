// src/task/create_dir.rs

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::command::Invocation;
use crate::errors::{Result, SproutError};
use crate::fs::FileSystem;
use crate::task::{Task, TaskFuture};
use crate::types::Outcome;
use crate::ui::Ui;

/// Creates the directory for a new project and resolves with its path, so
/// the next step runs inside it.
///
/// The directory is `--directory` if given, else the first positional.
/// An existing non-empty directory is an error. With `--dry-run` nothing is
/// created.
pub struct CreateAndStepIntoDirectory {
    fs: Arc<dyn FileSystem>,
    ui: Arc<dyn Ui>,
}

impl CreateAndStepIntoDirectory {
    pub fn new(fs: Arc<dyn FileSystem>, ui: Arc<dyn Ui>) -> Self {
        Self { fs, ui }
    }

    fn create(&self, invocation: &Invocation) -> Result<Outcome> {
        let dir_name = invocation
            .options
            .string("directory")
            .or_else(|| invocation.positional(0))
            .filter(|d| !d.is_empty())
            .ok_or_else(|| SproutError::Parse("A project directory name is required.".to_string()))?;

        let target: PathBuf = invocation.working_dir.join(dir_name);

        if self.fs.is_dir(&target) {
            let entries = self.fs.read_dir(&target)?;
            if !entries.is_empty() {
                return Err(SproutError::TaskRuntime(format!(
                    "Directory '{dir_name}' already exists and is not empty."
                )));
            }
        } else if self.fs.exists(&target) {
            return Err(SproutError::TaskRuntime(format!(
                "'{dir_name}' already exists and is not a directory."
            )));
        }

        if invocation.options.flag("dry-run") {
            self.ui
                .write_line(&format!("Would create directory {}", target.display()));
        } else {
            self.fs.create_dir_all(&target)?;
            info!(dir = ?target, "created project directory");
            self.ui.write_line(&format!("Created project directory {dir_name}"));
        }

        Ok(Outcome::Path(target))
    }
}

impl Task for CreateAndStepIntoDirectory {
    fn name(&self) -> &str {
        "create-and-step-into-directory"
    }

    fn run<'a>(&'a self, invocation: &'a Invocation, _input: Outcome) -> TaskFuture<'a> {
        Box::pin(std::future::ready(self.create(invocation)))
    }
}
