//! Plugin loading.
//!
//! A plugin namespace is a slice of [`Plugin`]s, each with an `init` function
//! that registers its verbs. [`load_plugins`] runs them in name order. A
//! plugin that fails to initialise is reported and skipped so the rest of the
//! CLI stays usable; a verb conflict is a programming error and stops
//! loading immediately.

use thiserror::Error;
use tracing::{debug, warn};

use crate::registry::{RegistrationError, Registry};

#[derive(Debug, Error)]
pub enum PluginError {
    /// The plugin could not set itself up (missing resource, bad state...).
    #[error(transparent)]
    Init(#[from] anyhow::Error),

    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

pub type PluginInit = fn(&mut Registry) -> Result<(), PluginError>;

#[derive(Debug, Clone, Copy)]
pub struct Plugin {
    pub name: &'static str,
    pub init: PluginInit,
}

impl Plugin {
    pub const fn new(name: &'static str, init: PluginInit) -> Self {
        Self { name, init }
    }
}

/// Outcome of loading a namespace.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: Vec<&'static str>,
    pub failed: Vec<(&'static str, String)>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Emit one warning per failed plugin.
    ///
    /// [`load_plugins`] already warns as it goes; call this again once a
    /// subscriber is installed if loading happened before logging was set up.
    pub fn log(&self) {
        for (name, reason) in &self.failed {
            warn!(plugin = name, "plugin import failed: {name} ({reason})");
        }
    }
}

/// Initialise every plugin of `namespace` into `registry`, sorted by name.
pub fn load_plugins(
    registry: &mut Registry,
    namespace: &[Plugin],
) -> Result<LoadReport, RegistrationError> {
    let mut plugins: Vec<&Plugin> = namespace.iter().collect();
    plugins.sort_by_key(|p| p.name);

    let mut report = LoadReport::default();
    for plugin in plugins {
        match (plugin.init)(registry) {
            Ok(()) => {
                debug!(plugin = plugin.name, "plugin loaded");
                report.loaded.push(plugin.name);
            }
            Err(PluginError::Registration(err)) => return Err(err),
            Err(PluginError::Init(err)) => {
                let reason = format!("{err:#}");
                warn!(plugin = plugin.name, "plugin import failed: {reason}");
                report.failed.push((plugin.name, reason));
            }
        }
    }
    Ok(report)
}
