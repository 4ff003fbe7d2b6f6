//! Error taxonomy for the gateway.
//!
//! Only `Validation`, `UnknownProvider`, `MissingCredential` and
//! `UpstreamExhausted` can be produced by a caller request. `Configuration`
//! and `Internal` are raised while the process is being assembled.

use thiserror::Error;

/// Result alias used across the gateway crates
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Maximum number of characters of upstream error text kept on
/// [`GatewayError::UpstreamExhausted`].
pub const MAX_UPSTREAM_ERROR_CHARS: usize = 200;

/// Gateway error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Malformed or missing request field
    #[error("{message}")]
    Validation {
        /// Human readable message
        message: String,
        /// Offending field, when known
        field: Option<String>,
    },

    /// Requested logical model has no registry entry
    #[error("Unknown provider for model '{model}'")]
    UnknownProvider {
        /// The logical model identifier that failed to resolve
        model: String,
    },

    /// The resolved provider's credential is absent
    #[error("Missing credential '{key}' for provider '{provider}'")]
    MissingCredential {
        /// Logical provider id
        provider: String,
        /// Environment-style lookup key
        key: String,
    },

    /// Every upstream attempt failed
    #[error(
        "Upstream failed after {attempts} attempts (last status: {}): {message}",
        .status.map_or_else(|| "none".to_string(), |s| s.to_string())
    )]
    UpstreamExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Last observed HTTP status, `None` when only transport errors occurred
        status: Option<u16>,
        /// Last error body or message, truncated
        message: String,
    },

    /// Invalid process configuration
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the problem
        message: String,
    },

    /// Unexpected internal failure
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the problem
        message: String,
    },
}

impl GatewayError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>, field: Option<&str>) -> Self {
        Self::Validation {
            message: message.into(),
            field: field.map(str::to_string),
        }
    }

    /// Create an unknown provider error
    pub fn unknown_provider(model: impl Into<String>) -> Self {
        Self::UnknownProvider {
            model: model.into(),
        }
    }

    /// Create a missing credential error
    pub fn missing_credential(provider: impl Into<String>, key: impl Into<String>) -> Self {
        Self::MissingCredential {
            provider: provider.into(),
            key: key.into(),
        }
    }

    /// Create an upstream exhausted error, truncating the message
    pub fn upstream_exhausted(attempts: u32, status: Option<u16>, message: &str) -> Self {
        Self::UpstreamExhausted {
            attempts,
            status,
            message: truncate_chars(message, MAX_UPSTREAM_ERROR_CHARS),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// HTTP status code this error surfaces as
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::UnknownProvider { .. } => 404,
            Self::UpstreamExhausted { .. } => 502,
            Self::MissingCredential { .. } | Self::Configuration { .. } | Self::Internal { .. } => {
                500
            }
        }
    }

    /// Stable tag for logs and metric labels
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_error",
            Self::UnknownProvider { .. } => "unknown_provider",
            Self::MissingCredential { .. } => "missing_credential",
            Self::UpstreamExhausted { .. } => "upstream_exhausted",
            Self::Configuration { .. } => "configuration_error",
            Self::Internal { .. } => "internal_error",
        }
    }
}

/// Truncate to at most `max` characters without splitting a code point.
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(GatewayError::validation("bad", None).status_code(), 400);
        assert_eq!(GatewayError::unknown_provider("x").status_code(), 404);
        assert_eq!(GatewayError::missing_credential("p", "K").status_code(), 500);
        assert_eq!(GatewayError::upstream_exhausted(3, None, "down").status_code(), 502);
    }

    #[test]
    fn test_upstream_exhausted_truncates() {
        let long = "é".repeat(500);
        let err = GatewayError::upstream_exhausted(3, Some(503), &long);
        match err {
            GatewayError::UpstreamExhausted { message, .. } => {
                assert_eq!(message.chars().count(), MAX_UPSTREAM_ERROR_CHARS);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_upstream_exhausted_display_without_status() {
        let err = GatewayError::upstream_exhausted(3, None, "connection refused");
        let text = err.to_string();
        assert!(text.contains("last status: none"));
        assert!(text.contains("connection refused"));

        let err = GatewayError::upstream_exhausted(3, Some(429), "slow down");
        assert!(err.to_string().contains("last status: 429"));
    }

    #[test]
    fn test_truncate_chars_short_input() {
        assert_eq!(truncate_chars("abc", 200), "abc");
        assert_eq!(truncate_chars("abcdef", 3), "abc");
    }
}
