// tests/test_command.rs

mod common;
use crate::common::builders::{ConfigFileBuilder, ContextBuilder};
use crate::common::fakes::{FakeTestRunner, ManualWatcher};
use crate::common::{args, init_tracing, wait_until, with_timeout};

use std::error::Error;
use std::sync::Arc;

use sprout::errors::INTERRUPTED_EXIT_CODE;
use sprout::{build_command_set, run_until_interrupted};
use sprout::command::{validate_and_run, Command, CommandContext, TestCommand};
use sprout::errors::SproutError;
use sprout::fs::MockFileSystem;
use sprout::types::Outcome;

type TestResult = Result<(), Box<dyn Error>>;

fn context() -> CommandContext {
    ContextBuilder::new("/projects/my-app")
        .with_config(ConfigFileBuilder::new().with_test_command("npm test").build())
        .build()
}

fn env_value(runner: &FakeTestRunner, key: &str) -> Option<String> {
    runner
        .last_options()?
        .env
        .into_iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v)
}

#[tokio::test]
async fn single_run_resolves_with_exit_code_zero() -> TestResult {
    init_tracing();
    let runner = FakeTestRunner::exiting_ci(0);
    let command = TestCommand::new(context(), runner.clone(), ManualWatcher::new());

    let outcome = validate_and_run(&command, &args(&["--filter", "login"])).await?;

    assert_eq!(outcome, Outcome::ExitCode(0));
    assert_eq!(runner.ci_starts(), 1);
    assert_eq!(runner.dev_starts(), 0);
    assert_eq!(env_value(&runner, "SPROUT_TEST_FILTER").as_deref(), Some("login"));
    assert_eq!(env_value(&runner, "SPROUT_TEST_REPORTER").as_deref(), Some("tap"));
    assert_eq!(env_value(&runner, "SPROUT_TEST_PORT").as_deref(), Some("7357"));
    assert_eq!(env_value(&runner, "SPROUT_TEST_LAUNCH"), None);
    Ok(())
}

#[tokio::test]
async fn single_run_failure_is_a_process_exit() {
    init_tracing();
    let runner = FakeTestRunner::exiting_ci(1);
    let command = TestCommand::new(context(), runner, ManualWatcher::new());

    let err = validate_and_run(&command, &[]).await.unwrap_err();
    assert!(matches!(err, SproutError::ProcessExit { code: 1 }));
}

#[tokio::test]
async fn server_flag_runs_the_watch_loop() -> TestResult {
    init_tracing();
    let runner = FakeTestRunner::new();
    let watcher = ManualWatcher::new();
    let command = TestCommand::new(context(), runner.clone(), watcher.clone());

    let handle = tokio::spawn(async move { validate_and_run(&command, &args(&["-s"])).await });

    let w = watcher.clone();
    wait_until(move || w.subscriber_count() == 1).await;
    watcher.emit(&["dist/app.js"]);
    watcher.emit(&["dist/app.js"]);
    let r = runner.clone();
    wait_until(move || r.restarts() == 1).await;
    runner.finish(0);

    assert_eq!(with_timeout(handle).await??, Outcome::ExitCode(0));
    assert_eq!(runner.dev_starts(), 1);
    assert_eq!(runner.ci_starts(), 0);
    Ok(())
}

#[tokio::test]
async fn invalid_reporter_never_reaches_the_runner() {
    let runner = FakeTestRunner::exiting_ci(0);
    let command = TestCommand::new(context(), runner.clone(), ManualWatcher::new());

    let err = validate_and_run(&command, &args(&["--reporter", "junit"]))
        .await
        .unwrap_err();

    assert!(matches!(err, SproutError::Parse(_)));
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn stray_positional_is_rejected() {
    let runner = FakeTestRunner::exiting_ci(0);
    let command = TestCommand::new(context(), runner.clone(), ManualWatcher::new());

    let err = validate_and_run(&command, &args(&["unit"])).await.unwrap_err();
    assert!(matches!(err, SproutError::Parse(ref msg) if msg.contains("unexpected `unit`")));
}

#[tokio::test]
async fn command_set_dispatches_by_alias() -> TestResult {
    init_tracing();
    let runner = FakeTestRunner::exiting_ci(0);
    let commands = build_command_set(
        context(),
        Arc::new(MockFileSystem::new()),
        runner.clone(),
        ManualWatcher::new(),
    );

    assert_eq!(commands.names(), vec!["new", "init", "test"]);
    let test = commands.find("t").ok_or("alias not found")?;
    assert_eq!(test.name(), "test");

    let outcome = commands.dispatch("t", &[]).await?;
    assert_eq!(outcome, Outcome::ExitCode(0));
    assert_eq!(runner.ci_starts(), 1);
    Ok(())
}

#[tokio::test]
async fn interrupt_during_watch_mode_is_not_a_success() {
    init_tracing();
    let runner = FakeTestRunner::new();
    let watcher = ManualWatcher::new();
    let commands = build_command_set(
        context(),
        Arc::new(MockFileSystem::new()),
        runner.clone(),
        watcher.clone(),
    );

    let w = watcher.clone();
    let ctrl_c = async move {
        wait_until(move || w.subscriber_count() == 1).await;
        Ok(())
    };
    let err = with_timeout(run_until_interrupted(&commands, "test", &args(&["--server"]), ctrl_c))
        .await
        .unwrap_err();

    assert!(matches!(err, SproutError::Interrupted));
    assert_eq!(err.exit_code(), INTERRUPTED_EXIT_CODE);
    assert!(err.is_silent());
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn unknown_command_is_reported() {
    let commands = build_command_set(
        context(),
        Arc::new(MockFileSystem::new()),
        FakeTestRunner::new(),
        ManualWatcher::new(),
    );

    let err = commands.dispatch("serve", &[]).await.unwrap_err();
    assert!(matches!(err, SproutError::UnknownCommand(ref name) if name == "serve"));
}

#[test]
fn help_lists_commands_and_options() {
    let commands = build_command_set(
        context(),
        Arc::new(MockFileSystem::new()),
        FakeTestRunner::new(),
        ManualWatcher::new(),
    );

    let help = commands.help_text("sprout");
    assert!(help.starts_with("Usage: sprout <command> [options]"));
    for needle in ["new", "init", "test", "--dry-run, -d", "--server, -s", "(aliases: t)"] {
        assert!(help.contains(needle), "missing {needle} in:\n{help}");
    }
}
