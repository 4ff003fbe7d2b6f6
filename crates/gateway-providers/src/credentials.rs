//! Credential lookup.
//!
//! Providers name an environment-style key; the value is resolved per request
//! so a rotated or removed credential takes effect without a restart.

use gateway_core::{GatewayError, GatewayResult, ProviderConfig};
use secrecy::SecretString;
use std::collections::HashMap;
use std::fmt;

/// Source of upstream credentials
pub trait CredentialSource: Send + Sync + fmt::Debug {
    /// Look up a credential by key; empty values count as absent
    fn lookup(&self, key: &str) -> Option<SecretString>;
}

/// Reads credentials from the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn lookup(&self, key: &str) -> Option<SecretString> {
        std::env::var(key)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(SecretString::new)
    }
}

/// Fixed in-memory credentials
#[derive(Debug, Default)]
pub struct StaticCredentials {
    values: HashMap<String, SecretString>,
}

impl StaticCredentials {
    /// Create an empty credential set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a credential
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), SecretString::new(value.into()));
        self
    }
}

impl CredentialSource for StaticCredentials {
    fn lookup(&self, key: &str) -> Option<SecretString> {
        use secrecy::ExposeSecret;

        self.values
            .get(key)
            .filter(|value| !value.expose_secret().is_empty())
            .cloned()
    }
}

/// Resolve the credential a provider needs
///
/// # Errors
/// Returns `MissingCredential` when the key is absent
pub fn require_credential(
    source: &dyn CredentialSource,
    provider: &ProviderConfig,
) -> GatewayResult<SecretString> {
    source
        .lookup(&provider.credential_key)
        .ok_or_else(|| GatewayError::missing_credential(&provider.id, &provider.credential_key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_core::WireFamily;
    use secrecy::ExposeSecret;

    fn provider() -> ProviderConfig {
        ProviderConfig::new(
            "gpt-4o-mini",
            "http://localhost/v1/chat/completions",
            WireFamily::ChatCompletions,
            "gpt-4o-mini",
            "TEST_OPENAI_KEY",
        )
    }

    #[test]
    fn test_static_credentials_found() {
        let source = StaticCredentials::new().with("TEST_OPENAI_KEY", "sk-test");
        let secret = require_credential(&source, &provider()).expect("present");
        assert_eq!(secret.expose_secret(), "sk-test");
    }

    #[test]
    fn test_missing_credential() {
        let source = StaticCredentials::new();
        let err = require_credential(&source, &provider()).expect_err("absent");
        assert_eq!(
            err,
            GatewayError::missing_credential("gpt-4o-mini", "TEST_OPENAI_KEY")
        );
    }

    #[test]
    fn test_empty_credential_is_absent() {
        let source = StaticCredentials::new().with("TEST_OPENAI_KEY", "");
        assert!(require_credential(&source, &provider()).is_err());
    }

    #[test]
    fn test_debug_does_not_leak() {
        let source = StaticCredentials::new().with("TEST_OPENAI_KEY", "sk-very-secret");
        assert!(!format!("{source:?}").contains("sk-very-secret"));
    }
}
