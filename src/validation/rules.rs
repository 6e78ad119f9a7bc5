// src/validation/rules.rs

use std::sync::LazyLock;

use regex::Regex;

/// Names that would collide with generic project directories.
const GENERIC_RESERVED: [&str; 2] = ["test", "vendor"];

static LEADING_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]").expect("static regex is valid"));

/// The tool's own identity: its command name and package name are never
/// valid project names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolIdentity {
    pub command_name: String,
    pub package_name: String,
    /// Additional reserved names (from `[new].reserved_names`).
    pub extra_reserved: Vec<String>,
}

impl Default for ToolIdentity {
    fn default() -> Self {
        Self {
            command_name: "sprout".to_string(),
            package_name: "sprout-cli".to_string(),
            extra_reserved: Vec::new(),
        }
    }
}

impl ToolIdentity {
    pub fn with_extra_reserved<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_reserved.extend(names.into_iter().map(Into::into));
        self
    }

    /// Case-insensitive membership in the reserved set.
    pub fn is_reserved(&self, name: &str) -> bool {
        let lowered = name.to_lowercase();
        [self.command_name.as_str(), self.package_name.as_str()]
            .into_iter()
            .chain(GENERIC_RESERVED)
            .chain(self.extra_reserved.iter().map(String::as_str))
            .any(|reserved| reserved.to_lowercase() == lowered)
    }
}

/// Result of validating a proposed name. Exactly one variant holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid,
    Invalid(String),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            ValidationOutcome::Valid => None,
            ValidationOutcome::Invalid(reason) => Some(reason),
        }
    }
}

/// Validate a proposed entity name.
///
/// First matching rule wins. The name is interpolated exactly as the user
/// typed it.
pub fn validate_name(identity: &ToolIdentity, name: &str) -> ValidationOutcome {
    if name.is_empty() {
        return ValidationOutcome::Invalid(format!(
            "The `{} new` command requires a name to be specified.",
            identity.command_name
        ));
    }

    // Must run before the period rule: `.` gets a suggestion, not a rejection.
    if name == "." {
        return ValidationOutcome::Invalid(format!(
            "Trying to generate an application structure in this directory? Use `{} init` instead.",
            identity.command_name
        ));
    }

    if identity.is_reserved(name) || name.contains('.') || LEADING_DIGIT.is_match(name) {
        return ValidationOutcome::Invalid(unsupported_name(name));
    }

    ValidationOutcome::Valid
}

fn unsupported_name(name: &str) -> String {
    format!("We currently do not support a name of `{name}`.")
}
