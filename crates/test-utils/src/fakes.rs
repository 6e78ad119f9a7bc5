//! Test doubles for the collaborators commands and tasks depend on.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::anyhow;
use tokio::sync::mpsc;

use sprout::blueprint::{Blueprint, BlueprintLookup, BlueprintRegistry, LookupFuture};
use sprout::runner::{ExitNotifier, TestRunOptions, TestRunner};
use sprout::ui::Ui;
use sprout::watch::{BuildEvent, BuildWatcher, ChangeStream};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|p| p.into_inner())
}

// ---------------------------------------------------------------------------
// FakeTestRunner

#[derive(Debug, Clone, PartialEq)]
pub enum RunnerCall {
    StartDev(TestRunOptions),
    StartCi(TestRunOptions),
    Restart,
}

#[derive(Default)]
struct RunnerState {
    calls: Vec<RunnerCall>,
    notifier: Option<ExitNotifier>,
    fail_start: Option<String>,
    fail_restart: Option<String>,
    ci_exit_code: Option<i32>,
}

/// Records every call and holds the session's [`ExitNotifier`] so the test
/// decides when (and how) the session ends.
#[derive(Default)]
pub struct FakeTestRunner {
    state: Mutex<RunnerState>,
}

impl FakeTestRunner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// `start_dev`/`start_ci` fail with `message`.
    pub fn failing_start(message: &str) -> Arc<Self> {
        let runner = Self::default();
        lock(&runner.state).fail_start = Some(message.to_string());
        Arc::new(runner)
    }

    /// `restart` fails with `message`.
    pub fn failing_restart(message: &str) -> Arc<Self> {
        let runner = Self::default();
        lock(&runner.state).fail_restart = Some(message.to_string());
        Arc::new(runner)
    }

    /// `start_ci` reports `code` right away.
    pub fn exiting_ci(code: i32) -> Arc<Self> {
        let runner = Self::default();
        lock(&runner.state).ci_exit_code = Some(code);
        Arc::new(runner)
    }

    pub fn calls(&self) -> Vec<RunnerCall> {
        lock(&self.state).calls.clone()
    }

    pub fn dev_starts(&self) -> usize {
        self.count(|c| matches!(c, RunnerCall::StartDev(_)))
    }

    pub fn ci_starts(&self) -> usize {
        self.count(|c| matches!(c, RunnerCall::StartCi(_)))
    }

    pub fn restarts(&self) -> usize {
        self.count(|c| matches!(c, RunnerCall::Restart))
    }

    /// Options passed to the most recent start.
    pub fn last_options(&self) -> Option<TestRunOptions> {
        lock(&self.state).calls.iter().rev().find_map(|c| match c {
            RunnerCall::StartDev(o) | RunnerCall::StartCi(o) => Some(o.clone()),
            RunnerCall::Restart => None,
        })
    }

    pub fn has_session(&self) -> bool {
        lock(&self.state).notifier.is_some()
    }

    /// End the session with an exit code. Returns false if no session is
    /// waiting.
    pub fn finish(&self, code: i32) -> bool {
        match lock(&self.state).notifier.take() {
            Some(notifier) => {
                notifier.exited(code);
                true
            }
            None => false,
        }
    }

    /// End the session with a runner error.
    pub fn fail(&self, message: &str) -> bool {
        match lock(&self.state).notifier.take() {
            Some(notifier) => {
                notifier.errored(anyhow!(message.to_string()));
                true
            }
            None => false,
        }
    }

    /// Drop the notifier without reporting.
    pub fn abandon(&self) -> bool {
        lock(&self.state).notifier.take().is_some()
    }

    fn count(&self, pred: impl Fn(&RunnerCall) -> bool) -> usize {
        lock(&self.state).calls.iter().filter(|c| pred(c)).count()
    }

    fn start(&self, call: RunnerCall, on_exit: ExitNotifier, ci: bool) -> anyhow::Result<()> {
        let mut state = lock(&self.state);
        state.calls.push(call);
        if let Some(message) = &state.fail_start {
            return Err(anyhow!(message.clone()));
        }
        let ci_exit_code = state.ci_exit_code;
        match ci_exit_code {
            Some(code) if ci => on_exit.exited(code),
            _ => state.notifier = Some(on_exit),
        }
        Ok(())
    }
}

impl TestRunner for FakeTestRunner {
    fn start_dev(&self, options: TestRunOptions, on_exit: ExitNotifier) -> anyhow::Result<()> {
        self.start(RunnerCall::StartDev(options), on_exit, false)
    }

    fn start_ci(&self, options: TestRunOptions, on_exit: ExitNotifier) -> anyhow::Result<()> {
        self.start(RunnerCall::StartCi(options), on_exit, true)
    }

    fn restart(&self) -> anyhow::Result<()> {
        let mut state = lock(&self.state);
        state.calls.push(RunnerCall::Restart);
        match &state.fail_restart {
            Some(message) => Err(anyhow!(message.clone())),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// ManualWatcher

#[derive(Default)]
struct WatcherState {
    subscribers: Vec<mpsc::UnboundedSender<BuildEvent>>,
    sequence: u64,
    fail_subscribe: Option<String>,
}

/// A build watcher driven by the test: `emit` is a finished build, `close`
/// shuts the watcher down.
#[derive(Default)]
pub struct ManualWatcher {
    state: Mutex<WatcherState>,
}

impl ManualWatcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(message: &str) -> Arc<Self> {
        let watcher = Self::default();
        lock(&watcher.state).fail_subscribe = Some(message.to_string());
        Arc::new(watcher)
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.state).subscribers.len()
    }

    /// Announce a finished build to every subscriber.
    pub fn emit(&self, paths: &[&str]) {
        let mut state = lock(&self.state);
        state.sequence += 1;
        let event = BuildEvent {
            sequence: state.sequence,
            paths: paths.iter().map(|p| p.to_string()).collect(),
        };
        state.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn close(&self) {
        lock(&self.state).subscribers.clear();
    }
}

impl BuildWatcher for ManualWatcher {
    fn subscribe(&self) -> anyhow::Result<ChangeStream> {
        let mut state = lock(&self.state);
        if let Some(message) = &state.fail_subscribe {
            return Err(anyhow!(message.clone()));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        state.subscribers.push(tx);
        Ok(rx)
    }
}

// ---------------------------------------------------------------------------
// RecordingUi

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    ProgressStarted { label: String, tick: String },
    ProgressStopped,
    Line(String),
}

#[derive(Debug, Default)]
pub struct RecordingUi {
    events: Mutex<Vec<UiEvent>>,
}

impl RecordingUi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<UiEvent> {
        lock(&self.events).clone()
    }

    pub fn lines(&self) -> Vec<String> {
        lock(&self.events)
            .iter()
            .filter_map(|e| match e {
                UiEvent::Line(l) => Some(l.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn progress_starts(&self) -> usize {
        lock(&self.events)
            .iter()
            .filter(|e| matches!(e, UiEvent::ProgressStarted { .. }))
            .count()
    }

    pub fn progress_stops(&self) -> usize {
        lock(&self.events)
            .iter()
            .filter(|e| matches!(e, UiEvent::ProgressStopped))
            .count()
    }

    fn push(&self, event: UiEvent) {
        lock(&self.events).push(event);
    }
}

impl Ui for RecordingUi {
    fn start_progress(&self, label: &str, tick: &str) {
        self.push(UiEvent::ProgressStarted {
            label: label.to_string(),
            tick: tick.to_string(),
        });
    }

    fn stop_progress(&self) {
        self.push(UiEvent::ProgressStopped);
    }

    fn write_line(&self, line: &str) {
        self.push(UiEvent::Line(line.to_string()));
    }
}

// ---------------------------------------------------------------------------
// StaticBlueprints

/// Registry with canned answers. Names without an entry are `NotFound`.
#[derive(Debug, Default)]
pub struct StaticBlueprints {
    answers: BTreeMap<String, BlueprintLookup>,
    lookups: Mutex<Vec<String>>,
}

impl StaticBlueprints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blueprint(mut self, blueprint: Blueprint) -> Self {
        self.answers
            .insert(blueprint.name.clone(), BlueprintLookup::Found(blueprint));
        self
    }

    pub fn with_failure(mut self, name: &str, reason: &str) -> Self {
        self.answers
            .insert(name.to_string(), BlueprintLookup::Failed(reason.to_string()));
        self
    }

    /// Names asked for, in order.
    pub fn lookups(&self) -> Vec<String> {
        lock(&self.lookups).clone()
    }
}

impl BlueprintRegistry for StaticBlueprints {
    fn lookup<'a>(&'a self, name: &'a str) -> LookupFuture<'a> {
        lock(&self.lookups).push(name.to_string());
        let answer = self
            .answers
            .get(name)
            .cloned()
            .unwrap_or(BlueprintLookup::NotFound);
        Box::pin(async move {
            tokio::task::yield_now().await;
            answer
        })
    }
}
