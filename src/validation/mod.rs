// src/validation/mod.rs

//! Entity-name validation.
//!
//! Pure predicates over a proposed project/entity name. Commands that create
//! a named entity run these before any argument parsing happens.

pub mod rules;

pub use rules::{validate_name, ToolIdentity, ValidationOutcome};
