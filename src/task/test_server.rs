// src/task/test_server.rs

//! Watch-and-test task: keeps one test session alive across rebuilds.

use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::command::Invocation;
use crate::config::TestSection;
use crate::errors::{Result, SproutError};
use crate::runner::{ExitNotifier, RunnerExit, SessionMode, TestRunOptions, TestRunner};
use crate::task::coordinator::{settle_exit, CoordinatorAction, CoordinatorCore, CoordinatorState};
use crate::task::{Task, TaskFuture};
use crate::types::Outcome;
use crate::ui::Ui;
use crate::watch::BuildWatcher;

/// Runs the test runner in dev mode, driven by build notifications.
///
/// - The build is assumed to be in flight already, so a "Building" progress
///   indicator is shown immediately.
/// - First build: progress stops and the session starts.
/// - Every later build: the session restarts in place.
///
/// The task resolves only when the session ends: `ExitCode(0)` on a clean
/// exit, [`SproutError::ProcessExit`] on a non-zero exit, and
/// [`SproutError::TaskRuntime`] if the runner errors, a start/restart call
/// fails, or the watcher stops before any build completed.
pub struct TestServerTask {
    ui: Arc<dyn Ui>,
    runner: Arc<dyn TestRunner>,
    watcher: Arc<dyn BuildWatcher>,
    config: TestSection,
}

impl TestServerTask {
    pub fn new(
        ui: Arc<dyn Ui>,
        runner: Arc<dyn TestRunner>,
        watcher: Arc<dyn BuildWatcher>,
        config: TestSection,
    ) -> Self {
        Self {
            ui,
            runner,
            watcher,
            config,
        }
    }

    async fn watch(&self, invocation: &Invocation) -> Result<Outcome> {
        let options = TestRunOptions::from_invocation(&self.config, invocation, SessionMode::Dev)?;

        let mut changes = self.watcher.subscribe().map_err(|err| {
            SproutError::TaskRuntime(format!("failed to subscribe to build notifications: {err:#}"))
        })?;

        let mut progress = Progress::start(self.ui.as_ref(), "Building", ".");
        let mut core = CoordinatorCore::new();
        let mut exit_rx: Option<oneshot::Receiver<RunnerExit>> = None;
        let mut watching = true;

        loop {
            tokio::select! {
                exit = wait_for_exit(&mut exit_rx), if exit_rx.is_some() => {
                    return match exit {
                        Ok(exit) => {
                            info!(builds = core.builds_seen(), "test session ended");
                            settle_exit(exit)
                        }
                        Err(_) => Err(SproutError::TaskRuntime(
                            "test runner ended the session without reporting an exit".to_string(),
                        )),
                    };
                }

                change = changes.recv(), if watching => {
                    match change {
                        Some(event) => {
                            debug!(build = event.sequence, paths = ?event.paths, "build finished");
                            match core.on_build() {
                                CoordinatorAction::StartSession => {
                                    progress.stop();
                                    let (notifier, rx) = ExitNotifier::channel();
                                    self.runner
                                        .start_dev(options.clone(), notifier)
                                        .map_err(|err| handler_error("starting", err))?;
                                    exit_rx = Some(rx);
                                }
                                CoordinatorAction::RestartSession => {
                                    self.runner
                                        .restart()
                                        .map_err(|err| handler_error("restarting", err))?;
                                }
                            }
                        }
                        None if core.state() == CoordinatorState::AwaitingFirstBuild => {
                            return Err(SproutError::TaskRuntime(
                                "build watcher stopped before the first build completed".to_string(),
                            ));
                        }
                        None => {
                            debug!("build watcher stopped; waiting for the test session to end");
                            watching = false;
                        }
                    }
                }
            }
        }
    }
}

impl Task for TestServerTask {
    fn name(&self) -> &str {
        "test-server"
    }

    fn run<'a>(&'a self, invocation: &'a Invocation, _input: Outcome) -> TaskFuture<'a> {
        Box::pin(self.watch(invocation))
    }
}

async fn wait_for_exit(
    rx: &mut Option<oneshot::Receiver<RunnerExit>>,
) -> std::result::Result<RunnerExit, oneshot::error::RecvError> {
    match rx {
        Some(rx) => rx.await,
        None => std::future::pending().await,
    }
}

fn handler_error(action: &str, err: anyhow::Error) -> SproutError {
    SproutError::TaskRuntime(format!("{action} the test runner failed: {err:#}"))
}

/// A started progress indicator, stopped at most once.
///
/// Dropping it stops the indicator if it is still running, so start/stop
/// calls stay paired on every exit path.
struct Progress<'a> {
    ui: &'a dyn Ui,
    active: bool,
}

impl<'a> Progress<'a> {
    fn start(ui: &'a dyn Ui, label: &str, tick: &str) -> Self {
        ui.start_progress(label, tick);
        Self { ui, active: true }
    }

    fn stop(&mut self) {
        if std::mem::take(&mut self.active) {
            self.ui.stop_progress();
        }
    }
}

impl Drop for Progress<'_> {
    fn drop(&mut self) {
        self.stop();
    }
}
