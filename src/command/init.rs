// src/command/init.rs

use std::sync::Arc;

use crate::command::{
    selected_blueprint, Command, CommandContext, CommandFuture, Invocation, PositionalSpec,
};
use crate::fs::FileSystem;
use crate::options::{OptionSchema, OptionSpec};
use crate::task::{TaskSequence, WriteProjectManifest};
use crate::types::{NotFoundPolicy, Outcome};

const POSITIONALS: &[PositionalSpec] = &[PositionalSpec {
    name: "name",
    required: false,
}];

/// `sprout init [name]`: write a project manifest into the current
/// directory.
pub struct InitCommand {
    ctx: CommandContext,
    fs: Arc<dyn FileSystem>,
}

impl InitCommand {
    pub fn new(ctx: CommandContext, fs: Arc<dyn FileSystem>) -> Self {
        Self { ctx, fs }
    }
}

impl Command for InitCommand {
    fn name(&self) -> &str {
        "init"
    }

    fn description(&self) -> &str {
        "Creates a new project in the current directory."
    }

    fn context(&self) -> &CommandContext {
        &self.ctx
    }

    fn positional_args(&self) -> &[PositionalSpec] {
        POSITIONALS
    }

    fn available_options(&self) -> Vec<OptionSpec> {
        vec![
            OptionSpec::boolean("dry-run")
                .alias("d")
                .default_value(false)
                .describe("Show the manifest without writing it."),
            OptionSpec::string("blueprint")
                .alias("b")
                .default_value("app")
                .describe("Blueprint to generate the project from."),
        ]
    }

    /// Same selection as `new`, so `new` can forward its arguments.
    fn blueprint_candidates(&self, schema: &OptionSchema, raw_args: &[String]) -> Vec<String> {
        selected_blueprint(schema, raw_args)
    }

    fn blueprint_policy(&self) -> Option<NotFoundPolicy> {
        Some(NotFoundPolicy::Tolerate)
    }

    fn run<'a>(&'a self, invocation: Invocation) -> CommandFuture<'a> {
        let tasks = TaskSequence::new("init").then(Arc::new(WriteProjectManifest::new(
            self.fs.clone(),
            self.ctx.ui.clone(),
        )));
        Box::pin(async move { tasks.run_from(&invocation, Outcome::Unit).await })
    }
}
