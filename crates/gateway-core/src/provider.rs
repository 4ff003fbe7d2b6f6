//! Provider descriptions.
//!
//! A provider is pure data: where it lives, which wire dialect it speaks and
//! which credential it needs. Behaviour is selected by [`WireFamily`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Upstream protocol dialect spoken by a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WireFamily {
    /// OpenAI-style `/chat/completions`; its stream already is the canonical dialect
    ChatCompletions,
    /// `generateContent` / `streamGenerateContent` style API
    GenerateContent,
}

impl WireFamily {
    /// Wire name as used in configuration and URLs
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ChatCompletions => "chat-completions",
            Self::GenerateContent => "generate-content",
        }
    }

    /// Whether the upstream stream needs transcoding into the canonical dialect
    #[must_use]
    pub fn needs_transcoding(self) -> bool {
        matches!(self, Self::GenerateContent)
    }
}

impl fmt::Display for WireFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of one upstream provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Caller-facing logical model identifier
    pub id: String,
    /// Upstream URL. Full endpoint for chat-completions, API base for generate-content.
    pub url: String,
    /// Wire dialect
    pub wire_family: WireFamily,
    /// Model name sent upstream
    pub upstream_model: String,
    /// Environment-style key the credential is looked up under
    pub credential_key: String,
}

impl ProviderConfig {
    /// Create a provider description
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        url: impl Into<String>,
        wire_family: WireFamily,
        upstream_model: impl Into<String>,
        credential_key: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            wire_family,
            upstream_model: upstream_model.into(),
            credential_key: credential_key.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_family_serde() {
        let json = serde_json::to_string(&WireFamily::GenerateContent).expect("serialize");
        assert_eq!(json, "\"generate-content\"");

        let family: WireFamily = serde_json::from_str("\"chat-completions\"").expect("parse");
        assert_eq!(family, WireFamily::ChatCompletions);
    }

    #[test]
    fn test_needs_transcoding() {
        assert!(WireFamily::GenerateContent.needs_transcoding());
        assert!(!WireFamily::ChatCompletions.needs_transcoding());
    }
}
