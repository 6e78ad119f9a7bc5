// src/task/subcommand.rs

use std::sync::Arc;

use tracing::debug;

use crate::command::{Command, Invocation};
use crate::task::{Task, TaskFuture};
use crate::types::Outcome;

/// Runs another command's `run` as a step, with the caller's parsed
/// options.
///
/// If the previous step resolved with [`Outcome::Path`], the sub-command
/// runs in that directory.
pub struct SubCommandTask {
    command: Arc<dyn Command>,
}

impl SubCommandTask {
    pub fn new(command: Arc<dyn Command>) -> Self {
        Self { command }
    }
}

impl Task for SubCommandTask {
    fn name(&self) -> &str {
        self.command.name()
    }

    fn run<'a>(&'a self, invocation: &'a Invocation, input: Outcome) -> TaskFuture<'a> {
        let mut forwarded = invocation.clone();
        if let Outcome::Path(dir) = input {
            forwarded.working_dir = dir;
        }
        debug!(
            command = self.command.name(),
            dir = ?forwarded.working_dir,
            "running sub-command"
        );
        self.command.run(forwarded)
    }
}
