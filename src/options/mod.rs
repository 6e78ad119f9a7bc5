// src/options/mod.rs

//! Command option definitions, schema merging and argument parsing.
//!
//! - [`spec`] defines option specs and typed values.
//! - [`schema`] merges a command's static options with options contributed
//!   by a blueprint (first occurrence of a name wins).
//! - [`parser`] turns raw arguments into positionals plus typed
//!   [`CommandOptions`] according to a merged schema, using `clap`.

pub mod parser;
pub mod schema;
pub mod spec;

pub use parser::{parse_args, scan_args, ArgScan, CommandOptions, ParsedArgs};
pub use schema::{merge_options, resolve_options, OptionSchema};
pub use spec::{OptionKind, OptionSpec, OptionValue};
