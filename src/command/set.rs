// src/command/set.rs

use std::sync::Arc;

use tracing::debug;

use crate::command::{validate_and_run, Command};
use crate::errors::{Result, SproutError};
use crate::types::Outcome;

/// The commands available to one CLI invocation.
#[derive(Clone, Default)]
pub struct CommandSet {
    commands: Vec<Arc<dyn Command>>,
}

impl CommandSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, command: Arc<dyn Command>) -> Self {
        self.commands.push(command);
        self
    }

    /// Look a command up by name or alias.
    pub fn find(&self, name: &str) -> Option<&Arc<dyn Command>> {
        self.commands
            .iter()
            .find(|c| c.name() == name || c.aliases().iter().any(|alias| *alias == name))
    }

    pub fn names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.name()).collect()
    }

    /// Run the command called `name` with its raw arguments.
    pub async fn dispatch(&self, name: &str, raw_args: &[String]) -> Result<Outcome> {
        let command = self
            .find(name)
            .ok_or_else(|| SproutError::UnknownCommand(name.to_string()))?;
        debug!(command = command.name(), args = ?raw_args, "dispatching");
        validate_and_run(command.as_ref(), raw_args).await
    }

    /// Command list with options, as printed by `sprout help`.
    pub fn help_text(&self, tool: &str) -> String {
        let mut out = format!("Usage: {tool} <command> [options]\n\nCommands:\n");
        for command in &self.commands {
            let aliases = command.aliases();
            if aliases.is_empty() {
                out.push_str(&format!("  {:<10} {}\n", command.name(), command.description()));
            } else {
                out.push_str(&format!(
                    "  {:<10} {} (aliases: {})\n",
                    command.name(),
                    command.description(),
                    aliases.join(", ")
                ));
            }
            for option in command.available_options() {
                let mut spelling = format!("--{}", option.name);
                for alias in &option.aliases {
                    spelling.push_str(if alias.len() == 1 { ", -" } else { ", --" });
                    spelling.push_str(alias);
                }
                out.push_str(&format!(
                    "      {spelling:<22} ({}) {}\n",
                    option.kind, option.description
                ));
            }
        }
        out
    }
}
