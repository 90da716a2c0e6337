//! Declarative parameter descriptions.
//!
//! Each command lists its parameters as [`ParamSpec`]s. The CLI turns them
//! into arguments and options; nothing here knows about the parser.
//!
//! # Placement
//!
//! | Kind / default            | positional mode on | positional mode off |
//! |---------------------------|--------------------|---------------------|
//! | `Bool`                    | `--flag`           | `--flag`            |
//! | required, non-bool        | `<ARG>`            | `--name <VALUE>`    |
//! | optional (has a default)  | `--name <VALUE>`   | `--name <VALUE>`    |

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

// ── Value ─────────────────────────────────────────────────────────────────────

/// A scalar bound to a parameter, or used as its default.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("none"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

// ── Choice ────────────────────────────────────────────────────────────────────

/// An enumeration exposed on the command line as a constrained choice.
///
/// ```rust
/// use verbkit_core::params::Choice;
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Color { Red, Blue }
///
/// impl Choice for Color {
///     const VARIANTS: &'static [Self] = &[Self::Red, Self::Blue];
///     fn value(&self) -> &'static str {
///         match self { Self::Red => "red", Self::Blue => "blue" }
///     }
/// }
///
/// assert_eq!(Color::parse_choice("BLUE"), Some(Color::Blue));
/// ```
pub trait Choice: Sized + Copy + 'static {
    const VARIANTS: &'static [Self];

    /// The string the user types for this member.
    fn value(&self) -> &'static str;

    fn values() -> Vec<&'static str> {
        Self::VARIANTS.iter().map(|v| v.value()).collect()
    }

    /// Case-insensitive lookup of a member by its value.
    fn parse_choice(raw: &str) -> Option<Self> {
        Self::VARIANTS
            .iter()
            .copied()
            .find(|v| v.value().eq_ignore_ascii_case(raw))
    }
}

/// Canonical spelling of `raw` among `values`, ignoring ASCII case.
pub fn canonical_choice<'a>(values: &[&'a str], raw: &str) -> Option<&'a str> {
    values.iter().copied().find(|v| v.eq_ignore_ascii_case(raw))
}

// ── ParamKind / ParamSpec ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamKind {
    Bool,
    Int,
    Float,
    Str,
    Choice(Vec<&'static str>),
    /// A readable stream, opened before the handler runs.
    File,
}

impl ParamKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "string",
            Self::Choice(_) => "choice",
            Self::File => "file",
        }
    }
}

/// Where a parameter surfaces on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Positional,
    Flag,
    Option,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    name: String,
    kind: ParamKind,
    default: Option<Value>,
    help: Option<String>,
}

impl ParamSpec {
    fn new(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
            help: None,
        }
    }

    /// Boolean flag, false unless given.
    pub fn flag(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Bool).default(false)
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Int)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Float)
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Str)
    }

    pub fn choice<E: Choice>(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Choice(E::values()))
    }

    pub fn file(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::File)
    }

    /// Make the parameter optional with the given default.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Default a choice parameter to one of its members.
    pub fn default_choice<E: Choice>(self, member: E) -> Self {
        self.default(member.value())
    }

    /// Make the parameter optional with a null default.
    pub fn optional(mut self) -> Self {
        self.default = Some(Value::Null);
        self
    }

    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.help = Some(text.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ParamKind {
        &self.kind
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn help_text(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    /// `--name-with-hyphens`
    pub fn flag_name(&self) -> String {
        format!("--{}", self.long_name())
    }

    pub fn long_name(&self) -> String {
        self.name.replace('_', "-")
    }

    pub fn placement(&self, positional_mode: bool) -> Placement {
        match self.kind {
            ParamKind::Bool => Placement::Flag,
            _ if positional_mode && self.is_required() => Placement::Positional,
            _ => Placement::Option,
        }
    }
}

// ── Signature validation ──────────────────────────────────────────────────────

pub const RESERVED_PARAM_NAMES: &[&str] = &["help"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{verb}: {reason}")]
pub struct SignatureError {
    pub verb: String,
    pub reason: String,
}

impl SignatureError {
    fn new(verb: &str, reason: impl Into<String>) -> Self {
        Self {
            verb: verb.to_owned(),
            reason: reason.into(),
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn default_matches(kind: &ParamKind, default: &Value) -> bool {
    match (kind, default) {
        (ParamKind::Bool, Value::Bool(_)) => true,
        (ParamKind::Bool, _) => false,
        (_, Value::Null) => true,
        (ParamKind::Int, Value::Int(_)) => true,
        (ParamKind::Float, Value::Int(_) | Value::Float(_)) => true,
        (ParamKind::Str, Value::Str(_)) => true,
        (ParamKind::Choice(values), Value::Str(s)) => values.contains(&s.as_str()),
        (ParamKind::File, Value::Str(_)) => true,
        _ => false,
    }
}

/// Check a command's parameter list before it is exposed on the CLI.
///
/// Failures are programmer errors and abort startup.
pub fn validate_signature(verb: &str, params: &[ParamSpec]) -> Result<(), SignatureError> {
    let mut seen = HashSet::new();
    for param in params {
        let name = param.name();
        if !is_identifier(name) {
            return Err(SignatureError::new(
                verb,
                format!("parameter name '{name}' must be a lower snake_case identifier"),
            ));
        }
        if RESERVED_PARAM_NAMES.contains(&name) {
            return Err(SignatureError::new(
                verb,
                format!("parameter name '{name}' is reserved"),
            ));
        }
        if !seen.insert(name) {
            return Err(SignatureError::new(
                verb,
                format!("parameter '{name}' is declared twice"),
            ));
        }
        if let ParamKind::Choice(values) = param.kind() {
            if values.is_empty() {
                return Err(SignatureError::new(
                    verb,
                    format!("choice parameter '{name}' has no values"),
                ));
            }
        }
        if let Some(default) = param.default_value() {
            if !default_matches(param.kind(), default) {
                return Err(SignatureError::new(
                    verb,
                    format!(
                        "default {} ({}) does not fit {} parameter '{name}'",
                        default,
                        default.type_name(),
                        param.kind().as_str()
                    ),
                ));
            }
        }
    }
    Ok(())
}
