// src/command/new.rs

use std::sync::Arc;

use crate::command::{
    selected_blueprint, Command, CommandContext, CommandFuture, Invocation, PositionalSpec,
};
use crate::fs::FileSystem;
use crate::options::{OptionSchema, OptionSpec};
use crate::task::{CreateAndStepIntoDirectory, SubCommandTask, TaskSequence};
use crate::types::{NotFoundPolicy, Outcome};

const POSITIONALS: &[PositionalSpec] = &[PositionalSpec {
    name: "name",
    required: true,
}];

/// `sprout new <name>`: create a directory and initialize a project in it.
///
/// The name is checked against the reserved-name rules before anything is
/// parsed. Options of the selected blueprint (see [`selected_blueprint`])
/// are accepted alongside the static ones and forwarded to `init`.
pub struct NewCommand {
    ctx: CommandContext,
    fs: Arc<dyn FileSystem>,
    init: Arc<dyn Command>,
    policy: NotFoundPolicy,
}

impl NewCommand {
    pub fn new(
        ctx: CommandContext,
        fs: Arc<dyn FileSystem>,
        init: Arc<dyn Command>,
        policy: NotFoundPolicy,
    ) -> Self {
        Self {
            ctx,
            fs,
            init,
            policy,
        }
    }

    fn tasks(&self) -> TaskSequence {
        TaskSequence::new("new")
            .then(Arc::new(CreateAndStepIntoDirectory::new(
                self.fs.clone(),
                self.ctx.ui.clone(),
            )))
            .then(Arc::new(SubCommandTask::new(self.init.clone())))
    }
}

impl Command for NewCommand {
    fn name(&self) -> &str {
        "new"
    }

    fn description(&self) -> &str {
        "Creates a new directory and runs `init` in it."
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
                .describe("Show what would be created without writing anything."),
            OptionSpec::string("blueprint")
                .alias("b")
                .default_value("app")
                .describe(
                    "Blueprint to generate the project from. Without it, a blueprint \
                     named like the project is used if one exists, else `app`.",
                ),
            OptionSpec::string("directory")
                .alias("dir")
                .describe("Directory to create; defaults to the project name."),
        ]
    }

    fn blueprint_candidates(&self, schema: &OptionSchema, raw_args: &[String]) -> Vec<String> {
        selected_blueprint(schema, raw_args)
    }

    fn blueprint_policy(&self) -> Option<NotFoundPolicy> {
        Some(self.policy)
    }

    fn creates_named_entity(&self) -> bool {
        true
    }

    fn run<'a>(&'a self, invocation: Invocation) -> CommandFuture<'a> {
        let tasks = self.tasks();
        Box::pin(async move { tasks.run_from(&invocation, Outcome::Unit).await })
    }
}
