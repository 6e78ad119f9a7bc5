// tests/task_sequence.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use sprout::command::Invocation;
use sprout::errors::SproutError;
use sprout::task::{Task, TaskFuture, TaskSequence};
use sprout::types::Outcome;

type TestResult = Result<(), Box<dyn Error>>;

/// Records the input it was given and resolves with a fixed outcome.
struct Step {
    name: &'static str,
    output: Option<Outcome>,
    seen: Arc<Mutex<Vec<(String, Outcome)>>>,
}

impl Task for Step {
    fn name(&self) -> &str {
        self.name
    }

    fn run<'a>(&'a self, _invocation: &'a Invocation, input: Outcome) -> TaskFuture<'a> {
        Box::pin(async move {
            self.seen.lock().unwrap().push((self.name.to_string(), input));
            tokio::task::yield_now().await;
            self.output
                .clone()
                .ok_or_else(|| SproutError::TaskRuntime(format!("{} failed", self.name)))
        })
    }
}

struct CountingStep(Arc<AtomicUsize>);

impl Task for CountingStep {
    fn name(&self) -> &str {
        "counting"
    }

    fn run<'a>(&'a self, _invocation: &'a Invocation, input: Outcome) -> TaskFuture<'a> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move { Ok(input) })
    }
}

fn step(
    name: &'static str,
    output: Option<Outcome>,
    seen: &Arc<Mutex<Vec<(String, Outcome)>>>,
) -> Arc<dyn Task> {
    Arc::new(Step {
        name,
        output,
        seen: seen.clone(),
    })
}

#[tokio::test]
async fn each_step_receives_the_previous_outcome() -> TestResult {
    init_tracing();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let sequence = TaskSequence::new("scaffold")
        .then(step("mkdir", Some(Outcome::Path(PathBuf::from("my-app"))), &seen))
        .then(step("init", Some(Outcome::Message("done".into())), &seen));

    let outcome = sequence
        .run_from(&Invocation::default(), Outcome::Unit)
        .await?;

    assert_eq!(outcome, Outcome::Message("done".into()));
    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            ("mkdir".to_string(), Outcome::Unit),
            ("init".to_string(), Outcome::Path(PathBuf::from("my-app"))),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn first_failure_skips_the_rest() {
    init_tracing();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let later = Arc::new(AtomicUsize::new(0));

    let sequence = TaskSequence::new("scaffold")
        .then(step("first", Some(Outcome::Unit), &seen))
        .then(step("second", None, &seen))
        .then(Arc::new(CountingStep(later.clone())));

    let err = sequence
        .run_from(&Invocation::default(), Outcome::Unit)
        .await
        .unwrap_err();

    assert!(matches!(err, SproutError::TaskRuntime(ref msg) if msg == "second failed"));
    assert_eq!(later.load(Ordering::SeqCst), 0);
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn empty_sequence_passes_its_input_through() -> TestResult {
    let sequence = TaskSequence::new("empty");
    assert!(sequence.is_empty());

    let outcome = sequence
        .run_from(&Invocation::default(), Outcome::ExitCode(3))
        .await?;
    assert_eq!(outcome, Outcome::ExitCode(3));
    Ok(())
}

#[tokio::test]
async fn sequences_nest_as_tasks() -> TestResult {
    let count = Arc::new(AtomicUsize::new(0));
    let inner = TaskSequence::new("inner")
        .then(Arc::new(CountingStep(count.clone())))
        .then(Arc::new(CountingStep(count.clone())));
    let outer = TaskSequence::new("outer")
        .then(Arc::new(inner))
        .then(Arc::new(CountingStep(count.clone())));

    assert_eq!(outer.step_names(), vec!["inner", "counting"]);
    let outcome = outer.run(&Invocation::default(), Outcome::Unit).await?;

    assert_eq!(outcome, Outcome::Unit);
    assert_eq!(count.load(Ordering::SeqCst), 3);
    Ok(())
}
