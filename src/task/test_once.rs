// src/task/test_once.rs

use std::sync::Arc;

use tracing::info;

use crate::command::Invocation;
use crate::config::TestSection;
use crate::errors::{Result, SproutError};
use crate::runner::{ExitNotifier, SessionMode, TestRunOptions, TestRunner};
use crate::task::coordinator::settle_exit;
use crate::task::{Task, TaskFuture};
use crate::types::Outcome;

/// Runs the test suite once and resolves with its exit status.
pub struct TestTask {
    runner: Arc<dyn TestRunner>,
    config: TestSection,
}

impl TestTask {
    pub fn new(runner: Arc<dyn TestRunner>, config: TestSection) -> Self {
        Self { runner, config }
    }

    async fn run_once(&self, invocation: &Invocation) -> Result<Outcome> {
        let options = TestRunOptions::from_invocation(&self.config, invocation, SessionMode::Ci)?;
        info!(cmd = %options.command, "running tests once");

        let (notifier, exit_rx) = ExitNotifier::channel();
        self.runner.start_ci(options, notifier).map_err(|err| {
            SproutError::TaskRuntime(format!("starting the test runner failed: {err:#}"))
        })?;

        match exit_rx.await {
            Ok(exit) => settle_exit(exit),
            Err(_) => Err(SproutError::TaskRuntime(
                "test runner ended the session without reporting an exit".to_string(),
            )),
        }
    }
}

impl Task for TestTask {
    fn name(&self) -> &str {
        "test"
    }

    fn run<'a>(&'a self, invocation: &'a Invocation, _input: Outcome) -> TaskFuture<'a> {
        Box::pin(self.run_once(invocation))
    }
}
