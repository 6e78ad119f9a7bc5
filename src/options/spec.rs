// src/options/spec.rs

use std::fmt;

/// Value type accepted by an option.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionKind {
    String,
    Boolean,
    Number,
    /// One of a fixed set of string values.
    Enum(Vec<String>),
}

impl OptionKind {
    /// Whether `value` is acceptable for this kind (used to check defaults).
    pub fn accepts(&self, value: &OptionValue) -> bool {
        match (self, value) {
            (OptionKind::String, OptionValue::String(_)) => true,
            (OptionKind::Boolean, OptionValue::Bool(_)) => true,
            (OptionKind::Number, OptionValue::Number(_)) => true,
            (OptionKind::Enum(values), OptionValue::String(s)) => values.contains(s),
            _ => false,
        }
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, OptionKind::Boolean)
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionKind::String => write!(f, "string"),
            OptionKind::Boolean => write!(f, "boolean"),
            OptionKind::Number => write!(f, "number"),
            OptionKind::Enum(values) => write!(f, "{}", values.join("|")),
        }
    }
}

/// A parsed option value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    String(String),
    Bool(bool),
    Number(f64),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::String(s) => write!(f, "{s}"),
            OptionValue::Bool(b) => write!(f, "{b}"),
            OptionValue::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::String(value.to_string())
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Number(value)
    }
}

/// Definition of a single command option.
///
/// Built with the constructors below, e.g.
/// `OptionSpec::boolean("dry-run").alias("d").default_value(false)`.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionSpec {
    pub name: String,
    pub kind: OptionKind,
    pub default: Option<OptionValue>,
    /// Alternative spellings. A single character is spelled `-x`, anything
    /// longer `--xyz`.
    pub aliases: Vec<String>,
    pub description: String,
}

impl OptionSpec {
    pub fn new(name: impl Into<String>, kind: OptionKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
            aliases: Vec::new(),
            description: String::new(),
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, OptionKind::String)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, OptionKind::Boolean)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, OptionKind::Number)
    }

    pub fn enumerated<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, OptionKind::Enum(values.into_iter().map(Into::into).collect()))
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<OptionValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Whether `token` (without leading dashes) names this option.
    pub fn answers_to(&self, token: &str) -> bool {
        self.name == token || self.aliases.iter().any(|a| a == token)
    }

    /// Name plus aliases.
    pub fn spellings(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Whether `--token` selects this option.
    pub fn has_long(&self, token: &str) -> bool {
        self.name == token || self.long_aliases().any(|alias| alias == token)
    }

    /// Whether `-c` selects this option.
    pub fn has_short(&self, c: char) -> bool {
        self.short_aliases().any(|short| short == c)
    }

    pub fn short_aliases(&self) -> impl Iterator<Item = char> + '_ {
        self.aliases.iter().filter_map(|alias| as_short(alias))
    }

    pub fn long_aliases(&self) -> impl Iterator<Item = &str> {
        self.aliases
            .iter()
            .filter(|alias| as_short(alias).is_none())
            .map(String::as_str)
    }
}

fn as_short(alias: &str) -> Option<char> {
    let mut chars = alias.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}
