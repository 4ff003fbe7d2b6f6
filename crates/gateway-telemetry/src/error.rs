//! Telemetry errors.

use thiserror::Error;

/// Errors raised while setting up logging or metrics
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Log filter directive did not parse
    #[error("invalid log filter '{filter}': {message}")]
    InvalidFilter {
        /// The rejected directive
        filter: String,
        /// Parser message
        message: String,
    },

    /// Unknown log format name
    #[error("unsupported log format '{0}', expected 'pretty' or 'json'")]
    InvalidFormat(String),

    /// Subscriber installation failed
    #[error("failed to initialize logging: {0}")]
    Init(String),

    /// Metric creation, registration or encoding failed
    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}
