//! Configuration errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The file content did not parse
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// The file extension is not a supported format
    #[error("unsupported config format '{0}', expected .yaml, .yml or .toml")]
    UnsupportedFormat(String),

    /// An environment override held an unusable value
    #[error("invalid value for {var}: {message}")]
    InvalidOverride {
        /// Environment variable name
        var: String,
        /// What was wrong
        message: String,
    },

    /// The loaded configuration violates a constraint
    #[error("invalid configuration: {0}")]
    Validation(String),
}

impl From<validator::ValidationErrors> for ConfigError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}
