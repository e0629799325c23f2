//! Configuration error types.

use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config source could not be read or deserialized
    #[error("Configuration error: {0}")]
    Load(String),

    /// A value is outside its allowed range
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// Unknown search mode name
    #[error("Unknown search mode: {0} (expected bm25, vector or hybrid)")]
    UnknownMode(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::Load(err.to_string())
    }
}
