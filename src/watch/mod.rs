// src/watch/mod.rs

//! Build-completion notifications.
//!
//! The test coordinator only needs to know *that* a build finished. A
//! [`BuildWatcher`] hands out subscriptions; each received [`BuildEvent`]
//! is one completed build.
//!
//! - [`watcher`]: [`FsBuildWatcher`], which watches the build output
//!   directory with `notify` and collapses bursts of writes into one event.
//! - [`patterns`]: glob matching for which output paths count.

use tokio::sync::mpsc;

pub mod patterns;
pub mod watcher;

pub use patterns::{root_relative, BuildOutputMatcher};
pub use watcher::FsBuildWatcher;

/// One completed build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildEvent {
    /// 1-based count of builds seen by the watcher.
    pub sequence: u64,
    /// Root-relative paths that changed in this build.
    pub paths: Vec<String>,
}

/// Stream of build notifications. `recv()` returns `None` once the watcher
/// has shut down.
pub type ChangeStream = mpsc::UnboundedReceiver<BuildEvent>;

pub trait BuildWatcher: Send + Sync {
    fn subscribe(&self) -> anyhow::Result<ChangeStream>;
}
