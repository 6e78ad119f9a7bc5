// src/lib.rs

pub mod blueprint;
pub mod cli;
pub mod command;
pub mod config;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod options;
pub mod runner;
pub mod task;
pub mod types;
pub mod ui;
pub mod validation;
pub mod watch;

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::blueprint::ConfigBlueprintRegistry;
use crate::cli::CliArgs;
use crate::command::{Command, CommandContext, CommandSet, InitCommand, NewCommand, Project, TestCommand};
use crate::config::load_or_default;
use crate::errors::{Result, SproutError};
use crate::fs::{FileSystem, RealFileSystem};
use crate::runner::{ProcessTestRunner, TestRunner};
use crate::types::Outcome;
use crate::ui::ConsoleUi;
use crate::validation::ToolIdentity;
use crate::watch::{BuildWatcher, FsBuildWatcher};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (a missing `Sprout.toml` means defaults)
/// - the blueprint registry, console UI, test runner and build watcher
/// - the command set, dispatched by name or alias
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<Outcome> {
    let config_path = PathBuf::from(&args.config);
    let config = load_or_default(&config_path)?;
    let root = config_root_dir(&config_path);
    debug!(?root, blueprints = config.blueprints.len(), "configuration loaded");

    let identity = ToolIdentity::default().with_extra_reserved(config.new.reserved_names.clone());
    let blueprints = Arc::new(ConfigBlueprintRegistry::from_config(&config));
    let watcher = Arc::new(FsBuildWatcher::from_config(&root, &config.test)?);

    let ctx = CommandContext {
        ui: Arc::new(ConsoleUi::new()),
        project: Project { root, config },
        blueprints,
        identity,
    };
    let tool = ctx.identity.command_name.clone();

    let commands = build_command_set(
        ctx,
        Arc::new(RealFileSystem),
        Arc::new(ProcessTestRunner::new()),
        watcher,
    );

    let name = match args.command.as_deref() {
        None | Some("help") => return Ok(Outcome::Message(commands.help_text(&tool))),
        Some(name) => name,
    };

    run_until_interrupted(&commands, name, &args.args, tokio::signal::ctrl_c()).await
}

/// Dispatch `name`, abandoning it if `interrupt` resolves first.
///
/// An interrupted command ends with [`SproutError::Interrupted`], never a
/// success.
pub async fn run_until_interrupted<F>(
    commands: &CommandSet,
    name: &str,
    raw_args: &[String],
    interrupt: F,
) -> Result<Outcome>
where
    F: Future<Output = std::io::Result<()>>,
{
    tokio::select! {
        result = commands.dispatch(name, raw_args) => result,
        signal = interrupt => {
            match signal {
                Ok(()) => info!(command = name, "interrupted; shutting down"),
                Err(err) => warn!(command = name, error = %err, "failed to listen for Ctrl+C"),
            }
            Err(SproutError::Interrupted)
        }
    }
}

/// Assemble the built-in commands around shared collaborators.
///
/// `new` runs `init` as its final step, so both share one `InitCommand`.
pub fn build_command_set(
    ctx: CommandContext,
    fs: Arc<dyn FileSystem>,
    runner: Arc<dyn TestRunner>,
    watcher: Arc<dyn BuildWatcher>,
) -> CommandSet {
    let policy = ctx.project.config.new.blueprint_not_found;
    let init: Arc<dyn Command> = Arc::new(InitCommand::new(ctx.clone(), fs.clone()));

    CommandSet::new()
        .with(Arc::new(NewCommand::new(ctx.clone(), fs, init.clone(), policy)))
        .with(init)
        .with(Arc::new(TestCommand::new(ctx, runner, watcher)))
}

/// Figure out the project root.
///
/// - If the config path has a non-empty parent (e.g. "app/Sprout.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Sprout.toml" (parent = ""),
///   we fall back to the current working directory.
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
