// src/command/pipeline.rs

//! The shared validate-then-run sequence every command goes through.
//!
//! ```text
//! Created -> OptionsResolved -> NameValidated -> Parsed -> Running -> Succeeded | Failed
//! ```
//!
//! Option resolution completes before the name is validated or anything is
//! parsed, so blueprint options are parseable. A rejected name never
//! reaches `Parsed`.

use tracing::{debug, info, warn};

use crate::command::{Command, Invocation};
use crate::errors::{Result, SproutError};
use crate::options::{parse_args, resolve_options, scan_args, OptionSchema};
use crate::types::Outcome;
use crate::validation::{validate_name, ValidationOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandPhase {
    Created,
    OptionsResolved,
    NameValidated,
    Parsed,
    Running,
    Succeeded,
    Failed,
}

/// A settled command run together with the phases it passed through.
#[derive(Debug)]
pub struct PhasedRun {
    pub phases: Vec<CommandPhase>,
    pub result: Result<Outcome>,
}

struct PhaseLog<'a> {
    command: &'a str,
    phases: Vec<CommandPhase>,
}

impl<'a> PhaseLog<'a> {
    fn new(command: &'a str) -> Self {
        Self {
            command,
            phases: vec![CommandPhase::Created],
        }
    }

    fn enter(&mut self, phase: CommandPhase) {
        debug!(command = %self.command, ?phase, "command phase");
        self.phases.push(phase);
    }
}

/// Resolve options, validate, parse and run `command` with `raw_args`.
pub async fn validate_and_run(command: &dyn Command, raw_args: &[String]) -> Result<Outcome> {
    run_with_phases(command, raw_args).await.result
}

/// [`validate_and_run`], also reporting which phases were reached.
pub async fn run_with_phases(command: &dyn Command, raw_args: &[String]) -> PhasedRun {
    let mut log = PhaseLog::new(command.name());
    let result = drive(command, raw_args, &mut log).await;

    match &result {
        Ok(outcome) => {
            info!(command = %command.name(), %outcome, "command succeeded");
            log.enter(CommandPhase::Succeeded);
        }
        Err(err) => {
            warn!(command = %command.name(), error = %err, "command failed");
            log.enter(CommandPhase::Failed);
        }
    }

    PhasedRun {
        phases: log.phases,
        result,
    }
}

async fn drive(command: &dyn Command, raw_args: &[String], log: &mut PhaseLog<'_>) -> Result<Outcome> {
    let ctx = command.context();

    let static_schema = OptionSchema::from_static(command.available_options())?;
    let schema = match command.blueprint_policy() {
        Some(policy) => {
            let candidates = command.blueprint_candidates(&static_schema, raw_args);
            let candidates: Vec<&str> = candidates.iter().map(String::as_str).collect();
            resolve_options(
                command.available_options(),
                ctx.blueprints.as_ref(),
                &candidates,
                policy,
            )
            .await?
        }
        None => static_schema,
    };
    log.enter(CommandPhase::OptionsResolved);

    // Located with the merged schema so a valued flag before the name
    // (`-b app NAME`) cannot shadow it.
    if command.creates_named_entity() {
        let scan = scan_args(&schema, raw_args);
        let name = scan.positionals.first().copied().unwrap_or_default();
        if let ValidationOutcome::Invalid(reason) = validate_name(&ctx.identity, name) {
            return Err(SproutError::Validation(reason));
        }
    }
    log.enter(CommandPhase::NameValidated);

    let usage = format!("{} {}", ctx.identity.command_name, command.name());
    let parsed = parse_args(&schema, raw_args, &usage)?;
    check_positionals(command, &parsed.positionals, &usage)?;
    log.enter(CommandPhase::Parsed);

    let invocation = Invocation {
        positionals: parsed.positionals,
        options: parsed.options,
        working_dir: ctx.project.root.clone(),
    };

    log.enter(CommandPhase::Running);
    command.run(invocation).await
}

fn check_positionals(command: &dyn Command, positionals: &[String], usage: &str) -> Result<()> {
    let specs = command.positional_args();

    if let Some(missing) = specs
        .iter()
        .enumerate()
        .find(|(idx, spec)| spec.required && positionals.get(*idx).is_none())
        .map(|(_, spec)| spec)
    {
        return Err(SproutError::Parse(format!(
            "The `{usage}` command requires a {} argument.",
            missing.name
        )));
    }

    if positionals.len() > specs.len() {
        return Err(SproutError::Parse(format!(
            "Too many arguments for `{usage}`: unexpected `{}`.",
            positionals[specs.len()]
        )));
    }

    Ok(())
}
