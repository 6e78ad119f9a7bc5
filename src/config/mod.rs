// src/config/mod.rs

//! Project configuration (`Sprout.toml`).
//!
//! - [`model`]: the TOML-backed data model.
//! - [`loader`]: reading a config from disk, or falling back to defaults.
//! - [`validate`]: checks and the conversion of blueprint option
//!   declarations into option specs.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_or_default, MANIFEST_FILE};
pub use model::{
    ConfigFile, NewSection, ProjectManifest, ProjectSection, RawBlueprint, RawConfigFile,
    RawOptionKind, RawOptionSpec, TestSection,
};
