// src/command/mod.rs

//! Commands: the user-facing verbs of the CLI.
//!
//! A command declares its positionals and static options, optionally asks
//! for blueprint-contributed options, and implements `run`. Everything
//! before `run` (option resolution, name validation, parsing) is shared and
//! lives in [`pipeline`].
//!
//! Commands receive their collaborators through a [`CommandContext`] and
//! their constructor; sub-commands and tasks are passed in explicitly, see
//! [`set::CommandSet`].

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use crate::blueprint::BlueprintRegistry;
use crate::config::ConfigFile;
use crate::errors::Result;
use crate::options::{scan_args, CommandOptions, OptionSchema, OptionSpec, OptionValue};
use crate::types::{NotFoundPolicy, Outcome};
use crate::ui::Ui;
use crate::validation::ToolIdentity;

pub mod init;
pub mod new;
pub mod pipeline;
pub mod set;

pub use init::InitCommand;
pub use new::NewCommand;
pub use pipeline::{run_with_phases, validate_and_run, CommandPhase, PhasedRun};
pub use set::CommandSet;
pub use test::TestCommand;

pub type CommandFuture<'a> = Pin<Box<dyn Future<Output = Result<Outcome>> + Send + 'a>>;

/// The project a command runs against.
#[derive(Debug, Clone, Default)]
pub struct Project {
    pub root: PathBuf,
    pub config: ConfigFile,
}

/// Collaborators shared by all commands of one CLI invocation.
#[derive(Clone)]
pub struct CommandContext {
    pub ui: Arc<dyn Ui>,
    pub project: Project,
    pub blueprints: Arc<dyn BlueprintRegistry>,
    pub identity: ToolIdentity,
}

impl std::fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext")
            .field("project", &self.project)
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

/// A declared positional argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionalSpec {
    pub name: &'static str,
    pub required: bool,
}

/// Parsed input handed to [`Command::run`] and on to tasks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Invocation {
    pub positionals: Vec<String>,
    pub options: CommandOptions,
    /// Directory the command operates in.
    pub working_dir: PathBuf,
}

impl Invocation {
    pub fn positional(&self, index: usize) -> Option<&str> {
        self.positionals.get(index).map(String::as_str)
    }
}

pub trait Command: Send + Sync {
    fn name(&self) -> &str;

    fn aliases(&self) -> &[&'static str] {
        &[]
    }

    fn description(&self) -> &str;

    fn context(&self) -> &CommandContext;

    fn positional_args(&self) -> &[PositionalSpec] {
        &[]
    }

    /// Options this command always accepts.
    fn available_options(&self) -> Vec<OptionSpec>;

    /// `Some(policy)` if this command merges in the options of a blueprint;
    /// `policy` decides what a missing blueprint means.
    fn blueprint_policy(&self) -> Option<NotFoundPolicy> {
        None
    }

    /// Blueprints to ask for, most specific first. `schema` holds the
    /// static options, so option values are not mistaken for positionals.
    fn blueprint_candidates(&self, schema: &OptionSchema, raw_args: &[String]) -> Vec<String> {
        scan_args(schema, raw_args)
            .positionals
            .first()
            .filter(|name| !name.is_empty())
            .map(|name| name.to_string())
            .into_iter()
            .collect()
    }

    /// Commands that create a named entity validate their first positional
    /// against the reserved-name rules.
    fn creates_named_entity(&self) -> bool {
        false
    }

    fn run<'a>(&'a self, invocation: Invocation) -> CommandFuture<'a>;
}

/// Blueprints for scaffolding commands: `--blueprint`/`-b` alone if given,
/// else the first positional followed by the `blueprint` option's default.
pub fn selected_blueprint(schema: &OptionSchema, raw_args: &[String]) -> Vec<String> {
    let scan = scan_args(schema, raw_args);
    if let Some(explicit) = scan.value("blueprint").filter(|name| !name.is_empty()) {
        return vec![explicit.to_string()];
    }

    let fallback = schema.find("blueprint").and_then(|spec| match &spec.default {
        Some(OptionValue::String(name)) => Some(name.as_str()),
        _ => None,
    });

    let mut candidates: Vec<String> = Vec::new();
    for name in scan.positionals.first().copied().into_iter().chain(fallback) {
        if !name.is_empty() && !candidates.iter().any(|c| c == name) {
            candidates.push(name.to_string());
        }
    }
    candidates
}
