//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup, after argument parsing (the
//! `--config` flag picks the file). The CLI layer owns config; the core
//! crate only sees the [`ExitPolicy`] it is handed.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (`--output`, `--no-color`; applied at the call-site)
//! 2. Environment variables, `VERBKIT_OUTPUT__FORMAT=json` style
//! 3. Config file (`--config FILE`, else the platform config dir)
//! 4. Built-in defaults
//!
//! ```toml
//! [output]
//! format = "json"
//! no_color = true
//!
//! [exit_codes]
//! unclassified = 3
//! bands = [
//!   { start = 1000, end = 3000, exit_code = 1 },
//!   { start = 5000, end = 6000, exit_code = 4 },
//! ]
//! ```

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use verbkit_core::ExitPolicy;

use crate::cli::OutputFormat;
use crate::error::{CliError, CliResult};

const ENV_PREFIX: &str = "VERBKIT";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub output: OutputConfig,
    /// Mapping from outcomes to process exit codes.
    pub exit_codes: ExitPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Used when `--output` is not given.
    pub format: OutputFormat,
    pub no_color: bool,
}

impl AppConfig {
    /// Load configuration, starting from defaults.
    ///
    /// An explicit `config_file` must exist; the default location is
    /// optional.
    pub fn load(config_file: Option<&Path>) -> CliResult<Self> {
        let file = match config_file {
            Some(path) => File::from(path).required(true),
            None => File::from(Self::config_path().as_path()).required(false),
        };

        let config: Self = Config::builder()
            .add_source(Config::try_from(&Self::default()).map_err(CliError::config)?)
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(Config::try_deserialize)
            .map_err(CliError::config)?;

        config.exit_codes.validate().map_err(CliError::config)?;

        tracing::debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.verbkit.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "verbkit", "verbkit")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".verbkit.toml"))
    }
}
