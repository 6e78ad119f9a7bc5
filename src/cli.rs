// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Only the global flags are parsed here. Everything after the command name
//! is handed to the command unparsed, because a command's accepted options
//! depend on which blueprint it resolves.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `sprout`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sprout",
    version,
    about = "Scaffold projects and run their tests, rebuilding on change.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the project config file (TOML).
    ///
    /// Default: `Sprout.toml` in the current working directory. A missing
    /// file means default settings.
    #[arg(long, value_name = "PATH", default_value = "Sprout.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SPROUT_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Command to run (`new`, `init`, `test`, `help`).
    #[arg(value_name = "COMMAND")]
    pub command: Option<String>,

    /// Arguments for the command, passed through as given.
    #[arg(
        value_name = "ARGS",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub args: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
