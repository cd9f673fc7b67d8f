//! Client configuration
//!
//! Configured by the embedding application (code, file, env), read once per
//! table when its metadata is first parsed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::Severity;

/// Default sparseness threshold. Above 1.0, so every secondary index is
/// treated as sparse unless configured otherwise.
pub const DEFAULT_SPARSENESS_THRESHOLD: f64 = 1.1;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("sparseness threshold must be a finite number, got {0}")]
    InvalidSparsenessThreshold(f64),

    #[error("invalid configuration document: {0}")]
    Decode(String),
}

impl ConfigError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::InvalidSparsenessThreshold(_) => "AUTOINDEX_CONFIG_INVALID_THRESHOLD",
            ConfigError::Decode(_) => "AUTOINDEX_CONFIG_DECODE",
        }
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Ratio of secondary-index item count to table item count at or above
    /// which the index is considered non-sparse.
    ///
    /// - `<= 0.0`: every secondary index is non-sparse
    /// - `1.0`: non-sparse only when the index holds every table item
    /// - `> 1.0`: every secondary index is sparse (default)
    ///
    /// Only affects tables whose metadata has not been parsed yet.
    #[serde(default = "default_sparseness_threshold")]
    pub sparseness_threshold: f64,

    /// Minimum severity written by the process-wide logger. When unset the
    /// client leaves the floor as it finds it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_severity: Option<Severity>,
}

fn default_sparseness_threshold() -> f64 {
    DEFAULT_SPARSENESS_THRESHOLD
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            sparseness_threshold: default_sparseness_threshold(),
            log_severity: None,
        }
    }
}

impl ClientConfig {
    /// Default config with the given sparseness threshold
    pub fn with_sparseness_threshold(threshold: f64) -> Self {
        Self {
            sparseness_threshold: threshold,
            ..Default::default()
        }
    }

    /// Parse a JSON configuration document and validate it
    pub fn from_json(document: &str) -> ConfigResult<Self> {
        let config: ClientConfig =
            serde_json::from_str(document).map_err(|e| ConfigError::Decode(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// Infinite thresholds are rejected along with NaN; use any value above
    /// 1.0 to mark every secondary index sparse.
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.sparseness_threshold.is_finite() {
            return Err(ConfigError::InvalidSparsenessThreshold(
                self.sparseness_threshold,
            ));
        }
        Ok(())
    }
}
