// tests/test_server.rs

mod common;
use crate::common::fakes::{FakeTestRunner, ManualWatcher, RecordingUi, RunnerCall, UiEvent};
use crate::common::{init_tracing, wait_until, with_timeout};

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinHandle;

use sprout::command::Invocation;
use sprout::config::TestSection;
use sprout::errors::SproutError;
use sprout::task::{Task, TestServerTask};
use sprout::types::Outcome;

type TestResult = Result<(), Box<dyn Error>>;

struct Harness {
    ui: Arc<RecordingUi>,
    runner: Arc<FakeTestRunner>,
    watcher: Arc<ManualWatcher>,
    handle: JoinHandle<Result<Outcome, SproutError>>,
}

fn test_config() -> TestSection {
    TestSection {
        command: Some("npm test".to_string()),
        ..TestSection::default()
    }
}

fn invocation() -> Invocation {
    Invocation {
        working_dir: PathBuf::from("/projects/my-app"),
        ..Invocation::default()
    }
}

fn start_with(
    runner: Arc<FakeTestRunner>,
    watcher: Arc<ManualWatcher>,
    config: TestSection,
    invocation: Invocation,
) -> Harness {
    init_tracing();
    let ui = RecordingUi::new();
    let task = TestServerTask::new(ui.clone(), runner.clone(), watcher.clone(), config);
    let handle = tokio::spawn(async move { task.run(&invocation, Outcome::Unit).await });
    Harness {
        ui,
        runner,
        watcher,
        handle,
    }
}

fn start(runner: Arc<FakeTestRunner>) -> Harness {
    start_with(runner, ManualWatcher::new(), test_config(), invocation())
}

async fn subscribed(h: &Harness) {
    let watcher = h.watcher.clone();
    wait_until(move || watcher.subscriber_count() == 1).await;
}

#[tokio::test]
async fn first_build_starts_later_builds_restart() -> TestResult {
    let h = start(FakeTestRunner::new());
    subscribed(&h).await;

    h.watcher.emit(&["dist/app.js"]);
    let runner = h.runner.clone();
    wait_until(move || runner.dev_starts() == 1).await;
    assert_eq!(h.runner.restarts(), 0);

    h.watcher.emit(&["dist/app.js"]);
    h.watcher.emit(&["dist/vendor.js"]);
    let runner = h.runner.clone();
    wait_until(move || runner.restarts() == 2).await;

    assert!(h.runner.finish(0));
    let outcome = with_timeout(h.handle).await??;

    assert_eq!(outcome, Outcome::ExitCode(0));
    assert_eq!(h.runner.dev_starts(), 1);
    assert_eq!(h.runner.ci_starts(), 0);
    assert_eq!(h.runner.restarts(), 2);
    Ok(())
}

#[tokio::test]
async fn burst_of_builds_is_handled_in_order() -> TestResult {
    let h = start(FakeTestRunner::new());
    subscribed(&h).await;

    for _ in 0..3 {
        h.watcher.emit(&["dist/app.js"]);
    }
    let runner = h.runner.clone();
    wait_until(move || runner.calls().len() == 3).await;

    let calls = h.runner.calls();
    assert!(matches!(calls[0], RunnerCall::StartDev(_)));
    assert_eq!(&calls[1..], &[RunnerCall::Restart, RunnerCall::Restart]);

    h.runner.finish(0);
    with_timeout(h.handle).await??;
    Ok(())
}

#[tokio::test]
async fn progress_runs_from_start_until_the_first_build() -> TestResult {
    let h = start(FakeTestRunner::new());
    subscribed(&h).await;

    assert_eq!(
        h.ui.events(),
        vec![UiEvent::ProgressStarted {
            label: "Building".to_string(),
            tick: ".".to_string()
        }]
    );

    h.watcher.emit(&["dist/app.js"]);
    let runner = h.runner.clone();
    wait_until(move || runner.dev_starts() == 1).await;
    h.watcher.emit(&["dist/app.js"]);
    let runner = h.runner.clone();
    wait_until(move || runner.restarts() == 1).await;

    assert_eq!(h.ui.progress_starts(), 1);
    assert_eq!(h.ui.progress_stops(), 1);

    h.runner.finish(0);
    with_timeout(h.handle).await??;
    assert_eq!(h.ui.progress_stops(), 1);
    Ok(())
}

#[tokio::test]
async fn non_zero_exit_fails_with_process_exit() -> TestResult {
    let h = start(FakeTestRunner::new());
    subscribed(&h).await;
    h.watcher.emit(&["dist/app.js"]);
    let runner = h.runner.clone();
    wait_until(move || runner.has_session()).await;

    h.runner.finish(2);
    let err = with_timeout(h.handle).await?.unwrap_err();

    assert!(matches!(err, SproutError::ProcessExit { code: 2 }));
    assert_eq!(
        err.to_string(),
        "Test runner finished with non-zero exit code. Tests failed."
    );
    assert!(err.is_silent());
    assert_eq!(err.exit_code(), 2);
    Ok(())
}

#[tokio::test]
async fn runner_error_fails_the_task() -> TestResult {
    let h = start(FakeTestRunner::new());
    subscribed(&h).await;
    h.watcher.emit(&["dist/app.js"]);
    let runner = h.runner.clone();
    wait_until(move || runner.has_session()).await;

    h.runner.fail("launcher crashed");
    let err = with_timeout(h.handle).await?.unwrap_err();

    assert!(matches!(err, SproutError::TaskRuntime(ref msg) if msg.contains("launcher crashed")));
    Ok(())
}

#[tokio::test]
async fn abandoned_session_fails_the_task() -> TestResult {
    let h = start(FakeTestRunner::new());
    subscribed(&h).await;
    h.watcher.emit(&["dist/app.js"]);
    let runner = h.runner.clone();
    wait_until(move || runner.has_session()).await;

    h.runner.abandon();
    let err = with_timeout(h.handle).await?.unwrap_err();
    assert!(matches!(err, SproutError::TaskRuntime(_)));
    Ok(())
}

#[tokio::test]
async fn failed_restart_fails_the_task() -> TestResult {
    let h = start(FakeTestRunner::failing_restart("socket closed"));
    subscribed(&h).await;

    h.watcher.emit(&["dist/app.js"]);
    h.watcher.emit(&["dist/app.js"]);
    let err = with_timeout(h.handle).await?.unwrap_err();

    match err {
        SproutError::TaskRuntime(msg) => {
            assert_eq!(msg, "restarting the test runner failed: socket closed")
        }
        other => panic!("unexpected error: {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn failed_start_fails_the_task_and_stops_progress() -> TestResult {
    let h = start(FakeTestRunner::failing_start("no browser"));
    subscribed(&h).await;

    h.watcher.emit(&["dist/app.js"]);
    let err = with_timeout(h.handle).await?.unwrap_err();

    assert!(matches!(err, SproutError::TaskRuntime(ref msg) if msg.contains("no browser")));
    assert_eq!(h.ui.progress_starts(), 1);
    assert_eq!(h.ui.progress_stops(), 1);
    Ok(())
}

#[tokio::test]
async fn watcher_closing_before_first_build_fails() -> TestResult {
    let h = start(FakeTestRunner::new());
    subscribed(&h).await;

    h.watcher.close();
    let err = with_timeout(h.handle).await?.unwrap_err();

    assert!(matches!(err, SproutError::TaskRuntime(ref msg) if msg.contains("before the first build")));
    assert_eq!(h.runner.dev_starts(), 0);
    assert_eq!(h.ui.progress_stops(), 1);
    Ok(())
}

#[tokio::test]
async fn watcher_closing_after_start_waits_for_the_session() -> TestResult {
    let h = start(FakeTestRunner::new());
    subscribed(&h).await;
    h.watcher.emit(&["dist/app.js"]);
    let runner = h.runner.clone();
    wait_until(move || runner.has_session()).await;

    h.watcher.close();
    tokio::task::yield_now().await;
    assert!(!h.handle.is_finished());

    h.runner.finish(0);
    assert_eq!(with_timeout(h.handle).await??, Outcome::ExitCode(0));
    Ok(())
}

#[tokio::test]
async fn subscribe_failure_fails_before_progress() -> TestResult {
    let h = start_with(
        FakeTestRunner::new(),
        ManualWatcher::failing("inotify limit reached"),
        test_config(),
        invocation(),
    );

    let err = with_timeout(h.handle).await?.unwrap_err();
    assert!(matches!(err, SproutError::TaskRuntime(ref msg) if msg.contains("inotify limit reached")));
    assert!(h.ui.events().is_empty());
    Ok(())
}

#[tokio::test]
async fn missing_test_command_is_a_config_error() -> TestResult {
    let h = start_with(
        FakeTestRunner::new(),
        ManualWatcher::new(),
        TestSection::default(),
        invocation(),
    );

    let err = with_timeout(h.handle).await?.unwrap_err();
    assert!(matches!(err, SproutError::Config(_)));
    Ok(())
}

#[tokio::test]
async fn dev_command_and_options_reach_the_runner() -> TestResult {
    let mut inv = invocation();
    inv.options.insert("filter", "login");
    inv.options.insert("port", 9000.0);

    let config = TestSection {
        command: Some("npm test".to_string()),
        dev_command: Some("npm run test:dev".to_string()),
        ..TestSection::default()
    };
    let h = start_with(FakeTestRunner::new(), ManualWatcher::new(), config, inv);
    subscribed(&h).await;
    h.watcher.emit(&["dist/app.js"]);
    let runner = h.runner.clone();
    wait_until(move || runner.has_session()).await;

    let options = h.runner.last_options().ok_or("no start recorded")?;
    assert_eq!(options.command, "npm run test:dev");
    assert_eq!(options.cwd, PathBuf::from("/projects/my-app"));
    assert!(options.env.contains(&("SPROUT_TEST_FILTER".to_string(), "login".to_string())));
    assert!(options.env.contains(&("SPROUT_TEST_PORT".to_string(), "9000".to_string())));

    h.runner.finish(0);
    with_timeout(h.handle).await??;
    Ok(())
}
