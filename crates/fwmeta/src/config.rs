//! Configuration management for fwmeta.
//!
//! This module provides configuration loading and validation using figment.
//! Configuration is opt-in: only a TOML file passed explicitly is read, so
//! without one the generator always uses the fixed
//! `https://your-server.com/` base URL.

use std::path::PathBuf;

use figment::{
    providers::{Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Base URL firmware images are served from unless configured otherwise.
pub const DEFAULT_BASE_URL: &str = "https://your-server.com/";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. A TOML config file given with `--config`
/// 2. Default values
///
/// The environment and per-user config directories are never consulted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Metadata content configuration.
    pub metadata: MetadataConfig,
    /// Output file configuration.
    pub output: OutputConfig,
}

/// Settings that shape the generated metadata record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// Base URL the firmware file name is appended to.
    pub base_url: String,
}

/// Settings for writing the metadata file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Write to a temporary file and rename it over the destination.
    pub atomic_write: bool,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { atomic_write: true }
    }
}

impl Config {
    /// Load configuration, optionally layering a TOML file over the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigNotFound`] if `config_path` names a file that
    /// does not exist, or an error if parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(config_file) = config_path {
            if !config_file.is_file() {
                return Err(Error::ConfigNotFound { path: config_file });
            }
            tracing::debug!(path = %config_file.display(), "loading configuration");
            figment = figment.merge(Toml::file(&config_file));
        }

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Replace the base URL, e.g. from a command-line override.
    ///
    /// # Errors
    ///
    /// Returns an error if the new base URL is invalid.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Result<Self> {
        self.metadata.base_url = base_url.into();
        self.validate()?;
        Ok(self)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let base_url = self.metadata.base_url.trim();
        let rest = base_url
            .strip_prefix("https://")
            .or_else(|| base_url.strip_prefix("http://"))
            .ok_or_else(|| {
                Error::config_validation(format!(
                    "base_url must start with http:// or https://: {base_url}"
                ))
            })?;

        if rest.is_empty() || rest.starts_with('/') {
            return Err(Error::config_validation(format!(
                "base_url has no host: {base_url}"
            )));
        }

        Ok(())
    }

    /// The configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.metadata.base_url.trim()
    }
}
