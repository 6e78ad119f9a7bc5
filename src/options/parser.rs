// src/options/parser.rs

//! Raw argument parsing against an [`OptionSchema`].
//!
//! The schema is only known at run time (blueprints contribute options), so
//! a `clap::Command` is assembled from it for every invocation:
//! - `--name value`, `--name=value`, aliases as `-x` (one character) or
//!   `--xyz` (longer)
//! - booleans: `--flag`, `--flag=false`, `--no-flag`
//! - `--` stops option parsing; everything after it is positional.
//!
//! [`scan_args`] is a lenient pass used before the full schema exists.

use std::collections::BTreeMap;

use clap::builder::{BoolishValueParser, PossibleValuesParser};
use clap::error::{ContextKind, ErrorKind};
use clap::{Arg, ArgAction, ArgMatches, ColorChoice};

use crate::errors::{Result, SproutError};
use crate::options::schema::OptionSchema;
use crate::options::spec::{OptionKind, OptionSpec, OptionValue};

/// Argument id holding the positionals; not a valid option name.
const POSITIONALS: &str = "<positionals>";

/// Typed options for one invocation, keyed by canonical option name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOptions {
    values: BTreeMap<String, OptionValue>,
}

impl CommandOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<OptionValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// String (or enum) value of `name`.
    pub fn string(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(OptionValue::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Boolean value of `name`; absent or non-boolean reads as `false`.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(OptionValue::Bool(true)))
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        match self.values.get(name) {
            Some(OptionValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Result of parsing raw arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedArgs {
    pub positionals: Vec<String>,
    pub options: CommandOptions,
}

/// Parse `raw` against `schema`. `usage` (e.g. `"sprout new"`) is only
/// used in error messages.
pub fn parse_args(schema: &OptionSchema, raw: &[String], usage: &str) -> Result<ParsedArgs> {
    let matches = clap_command(schema, usage)
        .try_get_matches_from(raw)
        .map_err(|err| parse_error(err, usage))?;

    let mut parsed = ParsedArgs {
        positionals: matches
            .try_get_many::<String>(POSITIONALS)
            .ok()
            .flatten()
            .map(|values| values.cloned().collect())
            .unwrap_or_default(),
        options: CommandOptions::new(),
    };

    for spec in schema.options() {
        let value = match matched_value(&matches, spec)? {
            Some(value) => Some(value),
            None if negated(&matches, schema, spec) => Some(OptionValue::Bool(false)),
            None => spec.default.clone(),
        };
        if let Some(value) = value {
            parsed.options.insert(spec.name.clone(), value);
        }
    }

    Ok(parsed)
}

fn clap_command(schema: &OptionSchema, usage: &str) -> clap::Command {
    let mut cmd = clap::Command::new(usage.to_string())
        .no_binary_name(true)
        .disable_help_flag(true)
        .disable_version_flag(true)
        .args_override_self(true)
        .color(ColorChoice::Never)
        .arg(
            Arg::new(POSITIONALS)
                .num_args(0..)
                .action(ArgAction::Append)
                .allow_negative_numbers(true),
        );

    for spec in schema.options() {
        cmd = cmd.arg(option_arg(spec));
        if let Some(negation) = negation_name(schema, spec) {
            cmd = cmd.arg(
                Arg::new(negation.clone())
                    .long(negation)
                    .action(ArgAction::SetTrue)
                    .overrides_with(spec.name.clone())
                    .hide(true),
            );
        }
    }

    cmd
}

fn option_arg(spec: &OptionSpec) -> Arg {
    let mut arg = Arg::new(spec.name.clone())
        .long(spec.name.clone())
        .help(spec.description.clone());

    for (idx, short) in spec.short_aliases().enumerate() {
        arg = if idx == 0 { arg.short(short) } else { arg.short_alias(short) };
    }
    for alias in spec.long_aliases() {
        arg = arg.alias(alias.to_string());
    }

    match &spec.kind {
        OptionKind::Boolean => arg
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true")
            .value_parser(BoolishValueParser::new()),
        OptionKind::Number => arg
            .value_name("NUMBER")
            .allow_negative_numbers(true)
            .value_parser(clap::value_parser!(f64)),
        OptionKind::Enum(values) => arg
            .value_name("VALUE")
            .value_parser(PossibleValuesParser::new(values.clone())),
        OptionKind::String => arg.value_name("TEXT"),
    }
}

/// `no-<name>` for booleans, unless that spelling belongs to another option.
fn negation_name(schema: &OptionSchema, spec: &OptionSpec) -> Option<String> {
    let negation = format!("no-{}", spec.name);
    (spec.kind.is_boolean() && schema.find(&negation).is_none()).then_some(negation)
}

fn negated(matches: &ArgMatches, schema: &OptionSchema, spec: &OptionSpec) -> bool {
    negation_name(schema, spec)
        .and_then(|negation| matches.try_get_one::<bool>(&negation).ok().flatten().copied())
        .unwrap_or(false)
}

fn matched_value(matches: &ArgMatches, spec: &OptionSpec) -> Result<Option<OptionValue>> {
    let id = spec.name.as_str();
    let lookup_failed =
        |err: clap::parser::MatchesError| SproutError::Parse(format!("Option `--{id}`: {err}"));

    let value = match &spec.kind {
        OptionKind::Boolean => matches
            .try_get_one::<bool>(id)
            .map_err(lookup_failed)?
            .map(|b| OptionValue::Bool(*b)),
        OptionKind::Number => match matches.try_get_one::<f64>(id).map_err(lookup_failed)? {
            Some(n) if !n.is_finite() => {
                return Err(SproutError::Parse(format!(
                    "Option `--{id}` expects a finite number, got `{n}`."
                )));
            }
            n => n.map(|n| OptionValue::Number(*n)),
        },
        OptionKind::String | OptionKind::Enum(_) => matches
            .try_get_one::<String>(id)
            .map_err(lookup_failed)?
            .map(|s| OptionValue::String(s.clone())),
    };
    Ok(value)
}

fn parse_error(err: clap::Error, usage: &str) -> SproutError {
    if err.kind() == ErrorKind::UnknownArgument {
        if let Some(arg) = err.get(ContextKind::InvalidArg) {
            return SproutError::Parse(format!("Unknown option `{arg}` for `{usage}`."));
        }
    }
    let rendered = err.to_string();
    let summary = rendered.lines().next().unwrap_or_default();
    SproutError::Parse(summary.trim_start_matches("error: ").to_string())
}

/// Positionals and option values picked out of raw arguments without
/// failing on anything unrecognised.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgScan<'a> {
    pub positionals: Vec<&'a str>,
    values: Vec<(&'a str, &'a str)>,
}

impl<'a> ArgScan<'a> {
    /// Last value given for the option named `name`.
    pub fn value(&self, name: &str) -> Option<&'a str> {
        self.values
            .iter()
            .rev()
            .find(|(option, _)| *option == name)
            .map(|(_, value)| *value)
    }
}

/// Separate positionals from options using `schema`.
///
/// Used where parsing cannot fail yet: unknown flags are skipped without
/// consuming a value, and bad values are not checked. [`parse_args`]
/// reports those later.
pub fn scan_args<'a>(schema: &'a OptionSchema, raw: &'a [String]) -> ArgScan<'a> {
    let mut scan = ArgScan::default();
    let mut iter = raw.iter().map(String::as_str).peekable();

    while let Some(arg) = iter.next() {
        if arg == "--" {
            scan.positionals.extend(iter.by_ref());
            break;
        }

        if let Some(body) = arg.strip_prefix("--") {
            let (token, inline) = split_inline(body);
            let Some(spec) = schema.options().iter().find(|spec| spec.has_long(token)) else {
                continue;
            };
            if spec.kind.is_boolean() {
                continue;
            }
            if let Some(value) = inline.or_else(|| iter.next_if(|next| !is_flag(next))) {
                scan.values.push((spec.name.as_str(), value));
            }
            continue;
        }

        if !is_flag(arg) {
            scan.positionals.push(arg);
            continue;
        }

        // A cluster of shorts such as `-d`, `-db app`, `-bapp` or `-b=app`.
        let shorts = &arg[1..];
        for (idx, c) in shorts.char_indices() {
            let Some(spec) = schema.options().iter().find(|spec| spec.has_short(c)) else {
                break;
            };
            if spec.kind.is_boolean() {
                continue;
            }
            let rest = &shorts[idx + c.len_utf8()..];
            let rest = rest.strip_prefix('=').unwrap_or(rest);
            let value = if rest.is_empty() {
                iter.next_if(|next| !is_flag(next))
            } else {
                Some(rest)
            };
            if let Some(value) = value {
                scan.values.push((spec.name.as_str(), value));
            }
            break;
        }
    }

    scan
}

fn split_inline(body: &str) -> (&str, Option<&str>) {
    match body.split_once('=') {
        Some((token, value)) => (token, Some(value)),
        None => (body, None),
    }
}

/// `-x`, `--x` and `--x=y` are flags; `-` alone and negative numbers are not.
fn is_flag(arg: &str) -> bool {
    match arg.strip_prefix('-') {
        Some(rest) if !rest.is_empty() => rest.parse::<f64>().is_err(),
        _ => false,
    }
}
