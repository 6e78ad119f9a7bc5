// src/ui/mod.rs

//! Console output seam.
//!
//! Tasks and commands write through a [`Ui`] so tests can record what was
//! shown. Progress indicators are cosmetic; callers must pair every
//! `start_progress` with exactly one `stop_progress`.

pub mod console;

pub use console::ConsoleUi;

pub trait Ui: Send + Sync {
    /// Show `label`, then print `tick` periodically until stopped.
    fn start_progress(&self, label: &str, tick: &str);
    fn stop_progress(&self);
    fn write_line(&self, line: &str);
}
