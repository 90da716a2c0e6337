//! Error handling for the verbkit CLI.
//!
//! These are failures of the CLI itself (a broken plugin set, an unreadable
//! config), never of a handler. Handler outcomes travel through the result
//! object and the exit policy instead.
//!
//! | Category      | Exit | Examples                                   |
//! |---------------|------|--------------------------------------------|
//! | Programming   | 70   | duplicate verb, unusable parameter list    |
//! | Configuration | 1    | malformed or missing config file           |
//! | Internal      | 1    | logging could not start                    |

use std::error::Error as _;

use owo_colors::OwoColorize;
use thiserror::Error;
use verbkit_core::error::{CoreError, ErrorCategory as CoreCategory};
use verbkit_core::exit::EXIT_BUG;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// The plugin set could not be turned into a command tree.
    #[error("Startup failed: {0}")]
    Core(#[from] CoreError),

    /// A configuration file could not be read or parsed, or holds values
    /// that make no sense.
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The tracing subscriber could not be installed.
    #[error("Failed to initialise logging: {0}")]
    Logging(String),
}

impl CliError {
    pub fn config(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Config {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Core(core) => core.suggestions(),
            Self::Config { .. } => vec![
                format!(
                    "Check your config file (default: {})",
                    crate::config::AppConfig::config_path().display()
                ),
                "Check VERBKIT_* environment variables".into(),
                "Exit bands need start < end".into(),
            ],
            Self::Logging(_) => vec!["Check the RUST_LOG filter syntax".into()],
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Core(core) => match core.category() {
                CoreCategory::Programming | CoreCategory::Plugin => ErrorCategory::Programming,
            },
            Self::Config { .. } => ErrorCategory::Configuration,
            Self::Logging(_) => ErrorCategory::Internal,
        }
    }

    /// Exit code to pass to the OS.
    pub fn exit_code(&self) -> u8 {
        match self.category() {
            ErrorCategory::Programming => EXIT_BUG,
            ErrorCategory::Configuration => 1,
            ErrorCategory::Internal => 1,
        }
    }

    /// Format the error for display with colors and suggestions.
    pub fn format_colored(&self, verbose: bool) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "\n{} {}\n\n",
            "✗".red().bold(),
            "Error:".red().bold()
        ));
        output.push_str(&format!("  {}\n", self.to_string().red()));

        if verbose {
            let mut source = self.source();
            while let Some(err) = source {
                output.push_str(&format!(
                    "\n  {} {}\n",
                    "→".dimmed(),
                    err.to_string().dimmed()
                ));
                source = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str(&format!("\n{}\n", "Suggestions:".yellow().bold()));
            for suggestion in suggestions {
                output.push_str(&format!("  {suggestion}\n"));
            }
        }

        if !verbose {
            output.push('\n');
            output.push_str(&format!(
                "{} {}\n",
                "\u{2139}".blue(),
                "Use -v / --verbose for more details.".dimmed(),
            ));
        }

        output
    }

    /// Plain-text version of [`Self::format_colored`], no ANSI codes.
    pub fn format_plain(&self, verbose: bool) -> String {
        let mut out = String::new();
        out.push_str(&format!("\nError: {self}\n"));

        if verbose {
            let mut src = self.source();
            while let Some(err) = src {
                out.push_str(&format!("  Caused by: {err}\n"));
                src = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out.push_str("\nSuggestions:\n");
            for s in &suggestions {
                out.push_str(&format!("  {s}\n"));
            }
        }

        if !verbose {
            out.push_str("\nUse -v / --verbose for more details.\n");
        }

        out
    }

    /// Log the error using tracing.
    pub fn log(&self) {
        match self.category() {
            ErrorCategory::Programming => tracing::error!("Programming error: {}", self),
            ErrorCategory::Configuration => tracing::error!("Configuration error: {}", self),
            ErrorCategory::Internal => tracing::error!("Internal error: {}", self),
        }

        if let Some(source) = self.source() {
            tracing::debug!("Caused by: {}", source);
        }
    }
}

/// Error categories for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A plugin or command definition is wrong; fix the code.
    Programming,
    Configuration,
    /// Internal/system error.
    Internal,
}
