//! History configuration loaded from TOML.
//!
//! ```toml
//! # history.toml
//! limit = 64
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::stack::DEFAULT_LIMIT;

/// Errors that can occur while loading a [`StackConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration text is not valid TOML for this schema.
    #[error("failed to parse history config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The history limit must be at least 1.
    #[error("invalid history limit {0}, must be at least 1")]
    InvalidLimit(usize),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings for a [`Stack`](crate::Stack).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// Maximum number of history entries kept before the oldest is dropped.
    pub limit: usize,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
        }
    }
}

impl StackConfig {
    /// Creates a validated configuration.
    pub fn new(limit: usize) -> ConfigResult<Self> {
        let config = Self { limit };
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a configuration from TOML text. Missing keys
    /// take their default.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        log::debug!("loaded history config from {}: {config:?}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.limit == 0 {
            return Err(ConfigError::InvalidLimit(self.limit));
        }
        Ok(())
    }
}
