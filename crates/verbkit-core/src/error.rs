//! Unified error handling for verbkit core.
//!
//! Everything that can go wrong while building the command tree (as opposed
//! to while running a handler) is a [`CoreError`]. These are programmer
//! errors in plugins, so the CLI treats them as fatal at startup.

use thiserror::Error;

use crate::params::SignatureError;
use crate::plugins::PluginError;
use crate::registry::RegistrationError;

/// Root error type for verbkit core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A verb was registered twice or is unusable.
    #[error("Registration error: {0}")]
    Registration(#[from] RegistrationError),

    /// A command declared parameters that cannot be exposed on the CLI.
    #[error("Invalid command signature: {0}")]
    Signature(#[from] SignatureError),

    /// A plugin failed in a way that could not be downgraded to a warning.
    #[error("Plugin error: {0}")]
    Plugin(#[from] PluginError),
}

impl CoreError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Registration(RegistrationError::DuplicateVerb { verb, .. }) => vec![
                format!("Two plugins both register the verb '{verb}'"),
                "Rename one of the verbs in its CommandSpec".into(),
            ],
            Self::Registration(RegistrationError::InvalidVerb { .. }) => vec![
                "Verbs must be non-empty, must not start with '-', and must not contain spaces"
                    .into(),
                "'help' and 'completions' are provided by the CLI itself".into(),
            ],
            Self::Signature(err) => vec![
                format!("Fix the parameter list of '{}'", err.verb),
                "Parameter names are lower snake_case and unique per command".into(),
                "Defaults must match the parameter kind".into(),
            ],
            Self::Plugin(_) => vec!["Check the plugin's init function".into()],
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Registration(_) | Self::Signature(_) => ErrorCategory::Programming,
            Self::Plugin(PluginError::Registration(_)) => ErrorCategory::Programming,
            Self::Plugin(PluginError::Init(_)) => ErrorCategory::Plugin,
        }
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Mistake in plugin code; never the user's fault.
    Programming,
    /// A plugin could not initialise.
    Plugin,
}

/// Convenient result type alias.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_verb_is_a_programming_error() {
        let err: CoreError = RegistrationError::DuplicateVerb {
            verb: "ingest".into(),
            module: "b".into(),
            existing: "a".into(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Programming);
        assert!(err.suggestions().iter().any(|s| s.contains("ingest")));
        assert!(err.to_string().starts_with("Registration error"));
    }

    #[test]
    fn signature_error_mentions_verb() {
        let err: CoreError = SignatureError {
            verb: "ingest".into(),
            reason: "bad".into(),
        }
        .into();
        assert!(err.to_string().contains("ingest: bad"));
        assert!(err.suggestions()[0].contains("ingest"));
    }
}
