//! # Gateway Resilience
//!
//! Resilience patterns for the LLM Provider Gateway:
//! - Bounded retry with exponential backoff around a single upstream call

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod retry;

// Re-export main types
pub use retry::{AttemptError, RetryConfig, RetryPolicy};
