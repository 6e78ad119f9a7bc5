// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Every failure a command can end with maps onto one variant here, so the
//! caller of [`crate::command::validate_and_run`] sees a single terminal
//! error per invocation.

use thiserror::Error;

/// Shell convention for a process ended by SIGINT.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Error, Debug)]
pub enum SproutError {
    /// A proposed entity name hit a reserved/format rule.
    #[error("{0}")]
    Validation(String),

    /// Dynamic (blueprint) option lookup failed or the schema is inconsistent.
    #[error("Option resolution error: {0}")]
    OptionResolution(String),

    /// Unknown or malformed flag, or a missing positional argument.
    #[error("{0}")]
    Parse(String),

    /// A collaborator (test runner, watcher, filesystem) failed while a task
    /// was running.
    #[error("{0}")]
    TaskRuntime(String),

    /// The test runner exited with a non-zero code. Expected test failures,
    /// not a defect: reported without any error chain.
    #[error("Test runner finished with non-zero exit code. Tests failed.")]
    ProcessExit { code: i32 },

    /// The user pressed Ctrl-C before the command finished.
    #[error("Interrupted.")]
    Interrupted,

    #[error("No command named `{0}`. Run `sprout help` to list commands.")]
    UnknownCommand(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SproutError {
    /// Silent errors are printed as their message only.
    pub fn is_silent(&self) -> bool {
        matches!(
            self,
            SproutError::Validation(_)
                | SproutError::Parse(_)
                | SproutError::ProcessExit { .. }
                | SproutError::Interrupted
        )
    }

    /// Process exit code to use when this error terminates the CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            SproutError::ProcessExit { code } if *code != 0 => *code,
            SproutError::Interrupted => INTERRUPTED_EXIT_CODE,
            _ => 1,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SproutError>;
