// src/runner/mod.rs

//! Test-runner process control.
//!
//! The coordinator talks to a [`TestRunner`] rather than to processes
//! directly:
//!
//! - `start_dev` begins a long-lived session that survives rebuilds,
//! - `restart` re-runs the tests inside that same session,
//! - `start_ci` runs the tests once.
//!
//! A session reports its end exactly once, through the [`ExitNotifier`]
//! handed over at start. Restarts never report.
//!
//! [`process`] contains the production implementation.

use std::path::PathBuf;

use tokio::sync::oneshot;

use crate::command::Invocation;
use crate::config::TestSection;
use crate::errors::{Result, SproutError};

pub mod process;

pub use process::ProcessTestRunner;

/// How a test session ended.
#[derive(Debug)]
pub enum RunnerExit {
    /// The test process exited on its own with this code.
    Exited(i32),
    /// The session failed for a reason other than an exit code (e.g. the
    /// process could not be spawned).
    Errored(anyhow::Error),
}

/// Single-use sender for a session's [`RunnerExit`].
///
/// Consumed on use, so a session can only report once. Dropping it without
/// reporting is observed by the receiver as a closed channel.
#[derive(Debug)]
pub struct ExitNotifier {
    tx: oneshot::Sender<RunnerExit>,
}

impl ExitNotifier {
    pub fn channel() -> (Self, oneshot::Receiver<RunnerExit>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    pub fn exited(self, code: i32) {
        self.report(RunnerExit::Exited(code));
    }

    pub fn errored(self, err: impl Into<anyhow::Error>) {
        self.report(RunnerExit::Errored(err.into()));
    }

    pub fn report(self, exit: RunnerExit) {
        // The receiver may be gone if the caller abandoned the result.
        let _ = self.tx.send(exit);
    }
}

/// Which kind of session a command asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Dev,
    Ci,
}

/// Everything a runner needs to launch the test process.
#[derive(Debug, Clone, PartialEq)]
pub struct TestRunOptions {
    pub command: String,
    pub cwd: PathBuf,
    pub env: Vec<(String, String)>,
}

impl TestRunOptions {
    pub fn new(command: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            cwd: cwd.into(),
            env: Vec::new(),
        }
    }

    /// Build options from the `[test]` config plus the parsed `test`
    /// command options.
    ///
    /// `filter`, `launch`, `port` and `reporter` are forwarded to the test
    /// process as `SPROUT_TEST_*` environment variables.
    pub fn from_invocation(
        config: &TestSection,
        invocation: &Invocation,
        mode: SessionMode,
    ) -> Result<Self> {
        let command = match mode {
            SessionMode::Dev => config.dev_command.as_ref().or(config.command.as_ref()),
            SessionMode::Ci => config.command.as_ref(),
        }
        .ok_or_else(|| {
            SproutError::Config(
                "no test command configured; set [test].command in Sprout.toml".to_string(),
            )
        })?;

        let mut options = Self::new(command.clone(), invocation.working_dir.clone());
        for (option, var) in [
            ("filter", "SPROUT_TEST_FILTER"),
            ("launch", "SPROUT_TEST_LAUNCH"),
            ("port", "SPROUT_TEST_PORT"),
            ("reporter", "SPROUT_TEST_REPORTER"),
        ] {
            if let Some(value) = invocation.options.get(option) {
                options.env.push((var.to_string(), value.to_string()));
            }
        }
        Ok(options)
    }
}

/// Controller for a test process.
pub trait TestRunner: Send + Sync {
    /// Begin a long-lived session. `on_exit` fires once, when the session
    /// ends.
    fn start_dev(&self, options: TestRunOptions, on_exit: ExitNotifier) -> anyhow::Result<()>;

    /// Run the tests once. `on_exit` fires when the process exits.
    fn start_ci(&self, options: TestRunOptions, on_exit: ExitNotifier) -> anyhow::Result<()>;

    /// Re-run the tests inside the current dev session.
    fn restart(&self) -> anyhow::Result<()>;
}
