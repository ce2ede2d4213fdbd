//! Runtime configuration for certwatch
//!
//! A [`WatchConfig`] is built once at startup (defaults, then an optional
//! YAML file, then command-line overrides) and handed to every check by
//! reference.

#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use thiserror::Error;

/// Days before expiry at which warnings start.
pub const DEFAULT_WARN_PERIOD_DAYS: u32 = 30;

/// Recipient used in the `To:` header when none is configured.
pub const DEFAULT_ADDRESS: &str = "root";

/// Failure to read a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be opened or read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid YAML for [`WatchConfig`].
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Settings shared by every certificate check in a run.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct WatchConfig {
    /// Warn when fewer than this many whole days remain.
    pub warn_period_days: u32,
    /// Mail recipient for the warning notice.
    pub address: String,
    /// Only report through the exit status.
    pub quiet: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            warn_period_days: DEFAULT_WARN_PERIOD_DAYS,
            address: DEFAULT_ADDRESS.to_string(),
            quiet: false,
        }
    }
}

impl WatchConfig {
    /// Load a configuration file. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be opened and
    /// [`ConfigError::Yaml`] if it is not a valid document.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config: WatchConfig = serde_yaml::from_reader(file)?;
        Ok(config)
    }

    /// Replace the fields given on the command line.
    #[must_use]
    pub fn with_overrides(
        mut self,
        warn_period_days: Option<u32>,
        address: Option<String>,
        quiet: bool,
    ) -> Self {
        if let Some(days) = warn_period_days {
            self.warn_period_days = days;
        }
        if let Some(address) = address {
            self.address = address;
        }
        self.quiet |= quiet;
        self
    }
}
