// src/task/mod.rs

//! Tasks: single asynchronous units of work run by commands.
//!
//! - [`sequence`]: [`TaskSequence`], which runs tasks in order, feeding each
//!   task's [`Outcome`] to the next and stopping at the first failure.
//! - [`coordinator`]: the pure state machine behind the watch-and-test loop.
//! - [`test_server`]: [`TestServerTask`], the async shell around it.
//! - [`test_once`]: [`TestTask`], a single test run.
//! - [`create_dir`], [`manifest`], [`subcommand`]: scaffolding steps.

use std::future::Future;
use std::pin::Pin;

use crate::command::Invocation;
use crate::errors::Result;
use crate::types::Outcome;

pub mod coordinator;
pub mod create_dir;
pub mod manifest;
pub mod sequence;
pub mod subcommand;
pub mod test_once;
pub mod test_server;

pub use coordinator::{settle_exit, CoordinatorAction, CoordinatorCore, CoordinatorState};
pub use create_dir::CreateAndStepIntoDirectory;
pub use manifest::WriteProjectManifest;
pub use sequence::TaskSequence;
pub use subcommand::SubCommandTask;
pub use test_once::TestTask;
pub use test_server::TestServerTask;

pub type TaskFuture<'a> = Pin<Box<dyn Future<Output = Result<Outcome>> + Send + 'a>>;

/// One asynchronous unit of work.
///
/// Tasks keep no state between runs beyond their injected collaborators.
/// `input` is the previous step's outcome when run inside a
/// [`TaskSequence`], and [`Outcome::Unit`] otherwise.
pub trait Task: Send + Sync {
    fn name(&self) -> &str;

    fn run<'a>(&'a self, invocation: &'a Invocation, input: Outcome) -> TaskFuture<'a>;
}
