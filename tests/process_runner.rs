// tests/process_runner.rs

#![cfg(unix)]

mod common;
use crate::common::{init_tracing, with_timeout};

use std::error::Error;
use std::fs;
use std::time::Duration;

use tempfile::TempDir;

use sprout::runner::{ExitNotifier, ProcessTestRunner, RunnerExit, TestRunOptions, TestRunner};

type TestResult = Result<(), Box<dyn Error>>;

fn options(cmd: &str, dir: &TempDir) -> TestRunOptions {
    TestRunOptions::new(cmd, dir.path())
}

#[tokio::test]
async fn ci_session_reports_the_exit_code() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let runner = ProcessTestRunner::new();
    let (notifier, exit) = ExitNotifier::channel();

    runner.start_ci(options("exit 3", &dir), notifier)?;

    match with_timeout(exit).await? {
        RunnerExit::Exited(code) => assert_eq!(code, 3),
        other => panic!("unexpected exit: {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn env_and_cwd_reach_the_process() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let runner = ProcessTestRunner::new();
    let (notifier, exit) = ExitNotifier::channel();

    let mut opts = options("printf '%s' \"$SPROUT_TEST_FILTER\" > seen.txt", &dir);
    opts.env.push(("SPROUT_TEST_FILTER".to_string(), "login".to_string()));
    runner.start_ci(opts, notifier)?;

    assert!(matches!(with_timeout(exit).await?, RunnerExit::Exited(0)));
    assert_eq!(fs::read_to_string(dir.path().join("seen.txt"))?, "login");
    Ok(())
}

#[tokio::test]
async fn restart_replaces_the_process_without_reporting() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let runner = ProcessTestRunner::new();
    let (notifier, mut exit) = ExitNotifier::channel();

    // Each run appends a line; only the third run exits on its own.
    let script = "echo run >> runs.txt; \
                  if [ $(wc -l < runs.txt) -ge 3 ]; then exit 0; fi; \
                  sleep 30";
    runner.start_dev(options(script, &dir), notifier)?;

    let runs = dir.path().join("runs.txt");
    let count_runs = || {
        fs::read_to_string(&runs)
            .map(|s| s.lines().count())
            .unwrap_or(0)
    };

    for expected in 1..=2 {
        with_timeout(async {
            while count_runs() < expected {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        assert!(exit.try_recv().is_err(), "session reported after run {expected}");
        runner.restart()?;
    }

    assert!(matches!(with_timeout(exit).await?, RunnerExit::Exited(0)));
    assert_eq!(count_runs(), 3);
    Ok(())
}

#[tokio::test]
async fn unusable_working_directory_reports_an_error() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let missing = dir.path().join("does-not-exist");
    let runner = ProcessTestRunner::new();
    let (notifier, exit) = ExitNotifier::channel();

    runner.start_ci(TestRunOptions::new("true", missing), notifier)?;

    assert!(matches!(with_timeout(exit).await?, RunnerExit::Errored(_)));
    Ok(())
}

#[tokio::test]
async fn misuse_is_rejected() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let runner = ProcessTestRunner::new();

    assert!(runner.restart().is_err(), "restart without a session");

    let (notifier, _exit) = ExitNotifier::channel();
    runner.start_ci(options("sleep 30", &dir), notifier)?;
    assert!(runner.restart().is_err(), "restart of a ci session");

    let (second, _second_exit) = ExitNotifier::channel();
    assert!(runner.start_dev(options("true", &dir), second).is_err());
    Ok(())
}
