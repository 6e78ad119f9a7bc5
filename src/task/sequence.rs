// src/task/sequence.rs

use std::sync::Arc;

use tracing::{debug, warn};

use crate::command::Invocation;
use crate::errors::Result;
use crate::task::{Task, TaskFuture};
use crate::types::Outcome;

/// Ordered composition of tasks.
///
/// Each step receives the previous step's outcome; the sequence resolves
/// with the last step's outcome. The first failing step ends the sequence
/// and its error is the sequence's error.
#[derive(Clone)]
pub struct TaskSequence {
    label: String,
    steps: Vec<Arc<dyn Task>>,
}

impl std::fmt::Debug for TaskSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskSequence")
            .field("label", &self.label)
            .field("steps", &self.step_names())
            .finish()
    }
}

impl TaskSequence {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            steps: Vec::new(),
        }
    }

    pub fn then(mut self, task: Arc<dyn Task>) -> Self {
        self.steps.push(task);
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run all steps starting from `input`.
    pub async fn run_from(&self, invocation: &Invocation, input: Outcome) -> Result<Outcome> {
        let mut value = input;

        for (index, step) in self.steps.iter().enumerate() {
            debug!(sequence = %self.label, step = step.name(), index, "running task");
            value = match step.run(invocation, value).await {
                Ok(next) => next,
                Err(err) => {
                    warn!(
                        sequence = %self.label,
                        step = step.name(),
                        index,
                        error = %err,
                        "task failed; skipping remaining steps"
                    );
                    return Err(err);
                }
            };
        }

        Ok(value)
    }
}

impl Task for TaskSequence {
    fn name(&self) -> &str {
        &self.label
    }

    fn run<'a>(&'a self, invocation: &'a Invocation, input: Outcome) -> TaskFuture<'a> {
        Box::pin(self.run_from(invocation, input))
    }
}
