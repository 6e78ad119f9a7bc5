// src/blueprint/mod.rs

//! Blueprint discovery.
//!
//! A blueprint is a named generator plugin that may contribute extra options
//! to the command that selects it. Commands talk to a [`BlueprintRegistry`]
//! rather than a concrete source so tests can substitute their own.
//!
//! - [`registry`] provides [`ConfigBlueprintRegistry`], which serves the
//!   `[blueprint.<name>]` sections of the project config.

use std::future::Future;
use std::pin::Pin;

use crate::options::OptionSpec;

pub mod registry;

pub use registry::{is_malformed_blueprint_name, ConfigBlueprintRegistry};

/// A resolved blueprint.
#[derive(Debug, Clone, PartialEq)]
pub struct Blueprint {
    pub name: String,
    pub description: String,
    pub available_options: Vec<OptionSpec>,
}

/// Result of asking a registry for a blueprint.
///
/// `NotFound` is benign; whether it aborts a command is decided by the
/// caller's [`crate::types::NotFoundPolicy`]. `Failed` always aborts.
#[derive(Debug, Clone, PartialEq)]
pub enum BlueprintLookup {
    Found(Blueprint),
    NotFound,
    Failed(String),
}

pub type LookupFuture<'a> = Pin<Box<dyn Future<Output = BlueprintLookup> + Send + 'a>>;

/// Source of blueprints.
pub trait BlueprintRegistry: Send + Sync {
    fn lookup<'a>(&'a self, name: &'a str) -> LookupFuture<'a>;
}
