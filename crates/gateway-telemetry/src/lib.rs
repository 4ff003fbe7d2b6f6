//! # Gateway Telemetry
//!
//! Observability for the LLM Provider Gateway.
//!
//! This crate provides:
//! - Structured logging with `tracing-subscriber`
//! - Prometheus request metrics

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod logging;
pub mod metrics;

// Re-export main types
pub use error::TelemetryError;
pub use logging::{build_filter, init_logging, LogFormat, LoggingConfig};
pub use metrics::GatewayMetrics;
