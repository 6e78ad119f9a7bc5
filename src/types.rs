// src/types.rs

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

/// Value a task (and, by extension, a command) resolves with.
///
/// Tasks in a sequence receive the previous step's `Outcome` as input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Outcome {
    #[default]
    Unit,
    ExitCode(i32),
    Path(PathBuf),
    Message(String),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Unit => write!(f, "done"),
            Outcome::ExitCode(code) => write!(f, "exit code {code}"),
            Outcome::Path(path) => write!(f, "{}", path.display()),
            Outcome::Message(msg) => write!(f, "{msg}"),
        }
    }
}

/// What to do when none of the requested blueprints exist.
///
/// - `Tolerate`: proceed with static options only (default).
/// - `Reject`: fail the command before argument parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotFoundPolicy {
    #[default]
    Tolerate,
    Reject,
}
