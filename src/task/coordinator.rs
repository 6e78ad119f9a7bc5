// src/task/coordinator.rs

//! Pure core of the watch-and-test loop.
//!
//! Decides, for each build notification, whether the test session must be
//! started or restarted, and maps the session's end to a result. No Tokio,
//! no processes: [`super::test_server::TestServerTask`] performs the IO.

use tracing::debug;

use crate::errors::{Result, SproutError};
use crate::runner::RunnerExit;
use crate::types::Outcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    AwaitingFirstBuild,
    Running,
}

/// What the shell must do in response to a build notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorAction {
    StartSession,
    RestartSession,
}

#[derive(Debug)]
pub struct CoordinatorCore {
    state: CoordinatorState,
    builds_seen: u64,
}

impl Default for CoordinatorCore {
    fn default() -> Self {
        Self::new()
    }
}

impl CoordinatorCore {
    pub fn new() -> Self {
        Self {
            state: CoordinatorState::AwaitingFirstBuild,
            builds_seen: 0,
        }
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    pub fn builds_seen(&self) -> u64 {
        self.builds_seen
    }

    /// Handle one build notification.
    ///
    /// Only the first notification starts the session; `Running` is never
    /// left.
    pub fn on_build(&mut self) -> CoordinatorAction {
        self.builds_seen += 1;
        let action = match self.state {
            CoordinatorState::AwaitingFirstBuild => {
                self.state = CoordinatorState::Running;
                CoordinatorAction::StartSession
            }
            CoordinatorState::Running => CoordinatorAction::RestartSession,
        };
        debug!(build = self.builds_seen, ?action, "coordinator decision");
        action
    }
}

/// Map the end of a test session to the task's result.
pub fn settle_exit(exit: RunnerExit) -> Result<Outcome> {
    match exit {
        RunnerExit::Errored(err) => Err(SproutError::TaskRuntime(format!("{err:#}"))),
        RunnerExit::Exited(0) => Ok(Outcome::ExitCode(0)),
        RunnerExit::Exited(code) => Err(SproutError::ProcessExit { code }),
    }
}
