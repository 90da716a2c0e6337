//! Dispatch registry - maps verbs to handlers and their metadata.
//!
//! Plugins populate the registry once at startup; the CLI only reads it
//! afterwards. Registration enforces verb uniqueness: a second registration
//! of the same verb is a fatal error that names both registrants.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::args::{ArgError, Args};
use crate::params::ParamSpec;
use crate::results::ResultObject;

/// Verbs the CLI provides itself.
pub const RESERVED_VERBS: &[&str] = &["help", "completions"];

pub const DEFAULT_SUMMARY: &str = "Run command";

// ── Handler ───────────────────────────────────────────────────────────────────

/// Ways a handler can stop other than recording a failure on the result
/// object.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The invocation itself was malformed. Reported like an argument-parse
    /// error; nothing is rendered.
    #[error("{0}")]
    Usage(String),

    #[error("interrupted")]
    Interrupted,

    /// Anything the handler did not anticipate. Treated as a bug.
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<ArgError> for HandlerError {
    fn from(err: ArgError) -> Self {
        Self::Unexpected(err.into())
    }
}

impl From<std::io::Error> for HandlerError {
    fn from(err: std::io::Error) -> Self {
        Self::Unexpected(err.into())
    }
}

pub type HandlerResult = Result<(), HandlerError>;

/// The function behind a verb.
///
/// It receives the invocation's result object (mutated in place, never
/// returned) and the bound arguments.
pub trait Handler: Send + Sync {
    fn call(&self, results: &mut ResultObject, args: &mut Args) -> HandlerResult;
}

impl<F> Handler for F
where
    F: Fn(&mut ResultObject, &mut Args) -> HandlerResult + Send + Sync,
{
    fn call(&self, results: &mut ResultObject, args: &mut Args) -> HandlerResult {
        self(results, args)
    }
}

// ── Command ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMeta {
    pub verb: String,
    pub summary: String,
    /// Module that registered the verb, for conflict reports.
    pub module: String,
    /// Required parameters surface as positional arguments when set.
    pub positional: bool,
}

/// Builder handed to [`Registry::register`].
pub struct CommandSpec {
    meta: CommandMeta,
    params: Vec<ParamSpec>,
    handler: Box<dyn Handler>,
}

impl CommandSpec {
    pub fn new(
        verb: impl Into<String>,
        module: impl Into<String>,
        handler: impl Handler + 'static,
    ) -> Self {
        Self {
            meta: CommandMeta {
                verb: verb.into(),
                summary: DEFAULT_SUMMARY.to_owned(),
                module: module.into(),
                positional: true,
            },
            params: Vec::new(),
            handler: Box::new(handler),
        }
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.meta.summary = summary.into();
        self
    }

    pub fn positional(mut self, positional: bool) -> Self {
        self.meta.positional = positional;
        self
    }

    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    pub fn verb(&self) -> &str {
        &self.meta.verb
    }
}

/// A registered verb.
pub struct Command {
    meta: CommandMeta,
    params: Vec<ParamSpec>,
    handler: Box<dyn Handler>,
}

impl Command {
    pub fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    pub fn verb(&self) -> &str {
        &self.meta.verb
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    pub fn handler(&self) -> &dyn Handler {
        self.handler.as_ref()
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("meta", &self.meta)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

// ── Registry ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("Duplicate verb '{verb}' registered by {module}; already registered by {existing}")]
    DuplicateVerb {
        verb: String,
        module: String,
        existing: String,
    },

    #[error("Invalid verb '{verb}' registered by {module}: {reason}")]
    InvalidVerb {
        verb: String,
        module: String,
        reason: &'static str,
    },
}

/// Verb -> command, iterated in lexicographic verb order.
#[derive(Debug, Default)]
pub struct Registry {
    commands: BTreeMap<String, Command>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command. Fails if the verb is taken or unusable.
    pub fn register(&mut self, spec: CommandSpec) -> Result<(), RegistrationError> {
        let CommandSpec {
            meta,
            params,
            handler,
        } = spec;

        if let Some(reason) = verb_problem(&meta.verb) {
            return Err(RegistrationError::InvalidVerb {
                verb: meta.verb,
                module: meta.module,
                reason,
            });
        }

        if let Some(existing) = self.commands.get(&meta.verb) {
            return Err(RegistrationError::DuplicateVerb {
                verb: meta.verb,
                module: meta.module,
                existing: existing.meta.module.clone(),
            });
        }

        tracing::debug!(verb = %meta.verb, module = %meta.module, "registered command");
        self.commands.insert(
            meta.verb.clone(),
            Command {
                meta,
                params,
                handler,
            },
        );
        Ok(())
    }

    pub fn get(&self, verb: &str) -> Option<&Command> {
        self.commands.get(verb)
    }

    pub fn meta(&self, verb: &str) -> Option<&CommandMeta> {
        self.get(verb).map(Command::meta)
    }

    /// Commands in lexicographic verb order.
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }

    pub fn verbs(&self) -> Vec<&str> {
        self.commands.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

fn verb_problem(verb: &str) -> Option<&'static str> {
    if verb.is_empty() {
        Some("verb is empty")
    } else if verb.starts_with('-') {
        Some("verb must not start with '-'")
    } else if verb.chars().any(char::is_whitespace) {
        Some("verb must not contain whitespace")
    } else if RESERVED_VERBS.contains(&verb) {
        Some("verb is reserved by the CLI")
    } else {
        None
    }
}
