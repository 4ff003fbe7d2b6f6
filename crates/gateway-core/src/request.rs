//! Request types for the gateway.
//!
//! This module defines the single request envelope accepted by the gateway and
//! the chat messages it carries.

use crate::error::GatewayError;
use crate::tools::ToolsField;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Value of `mode` selecting tool-call mode
pub const TOOL_MODE: &str = "tool";

/// Request envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayRequest {
    /// Conversation, oldest first
    pub messages: Vec<ChatMessage>,

    /// Logical model identifier; absent selects the default provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// `"tool"` selects tool-call mode; anything else streams chat
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    /// Tool declarations, kept undecoded until tool mode reads them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Value>,
}

/// Operating mode derived from the envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestMode {
    /// Streamed free text
    Chat,
    /// One structured decision
    Tool,
}

impl RequestMode {
    /// Label for logs and metrics
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Tool => "tool",
        }
    }
}

impl GatewayRequest {
    /// Create a new builder for `GatewayRequest`
    #[must_use]
    pub fn builder() -> GatewayRequestBuilder {
        GatewayRequestBuilder::default()
    }

    /// Operating mode selected by `mode`
    #[must_use]
    pub fn request_mode(&self) -> RequestMode {
        match self.mode.as_deref() {
            Some(TOOL_MODE) => RequestMode::Tool,
            _ => RequestMode::Chat,
        }
    }

    /// Requested logical model, with empty strings treated as absent
    #[must_use]
    pub fn requested_model(&self) -> Option<&str> {
        self.model.as_deref().map(str::trim).filter(|m| !m.is_empty())
    }

    /// Validate the fields shared by both modes
    ///
    /// # Errors
    /// Returns error if any field is invalid
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.messages.is_empty() {
            return Err(GatewayError::validation(
                "messages cannot be empty",
                Some("messages"),
            ));
        }

        if self.request_mode() == RequestMode::Tool {
            self.tool_declarations()?;
        }

        Ok(())
    }

    /// Decode the `tools` field into declarations
    ///
    /// Chat mode never calls this, so a malformed `tools` value only fails
    /// tool-mode requests.
    ///
    /// # Errors
    /// Returns a validation error if `tools` is absent, empty or matches
    /// neither the canonical list nor the native wrapper
    pub fn tool_declarations(&self) -> Result<ToolsField, GatewayError> {
        let raw = self.tools.as_ref().filter(|v| !v.is_null()).ok_or_else(|| {
            GatewayError::validation("tools must be a non-empty list in tool mode", Some("tools"))
        })?;
        let tools: ToolsField = serde_json::from_value(raw.clone()).map_err(|e| {
            GatewayError::validation(format!("tools could not be decoded: {e}"), Some("tools"))
        })?;
        if tools.is_empty() {
            return Err(GatewayError::validation(
                "tools must be a non-empty list in tool mode",
                Some("tools"),
            ));
        }
        Ok(tools)
    }
}

/// Builder for `GatewayRequest`
#[derive(Debug, Default)]
pub struct GatewayRequestBuilder {
    messages: Vec<ChatMessage>,
    model: Option<String>,
    mode: Option<String>,
    tools: Option<ToolsField>,
}

impl GatewayRequestBuilder {
    /// Set the model
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Add a message
    #[must_use]
    pub fn message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Set the messages
    #[must_use]
    pub fn messages(mut self, messages: Vec<ChatMessage>) -> Self {
        self.messages = messages;
        self
    }

    /// Select tool mode with the given declarations
    #[must_use]
    pub fn tools(mut self, tools: ToolsField) -> Self {
        self.mode = Some(TOOL_MODE.to_string());
        self.tools = Some(tools);
        self
    }

    /// Set the raw mode string
    #[must_use]
    pub fn mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    /// Build the request
    ///
    /// # Errors
    /// Returns error if the request fails validation
    pub fn build(self) -> Result<GatewayRequest, GatewayError> {
        let tools = self
            .tools
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| GatewayError::internal(format!("tools could not be encoded: {e}")))?;
        let request = GatewayRequest {
            messages: self.messages,
            model: self.model,
            mode: self.mode,
            tools,
        };
        request.validate()?;
        Ok(request)
    }
}

/// Chat message with role and content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message author
    pub role: MessageRole,

    /// Content of the message
    pub content: MessageContent,
}

impl ChatMessage {
    /// Create a system message
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create a user message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create an assistant message
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: MessageContent::Text(content.into()),
        }
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System message
    System,
    /// User message
    User,
    /// Assistant message
    Assistant,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// Message content (text or multimodal parts)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Simple text content
    Text(String),
    /// Multimodal content parts
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// Concatenated text of all text parts
    #[must_use]
    pub fn joined_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::ImageUrl { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Check if content is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Parts(parts) => parts.is_empty(),
        }
    }
}

/// Content part for multimodal messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Text content part
    Text {
        /// The text content
        text: String,
    },
    /// Inline image reference
    ImageUrl {
        /// Image URL details
        image_url: ImageUrl,
    },
}

/// Image reference, either a `data:` URL or an external URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    /// URL of the image
    pub url: String,
    /// Detail level for processing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<ImageDetail>,
}

/// Image detail level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageDetail {
    /// Auto detail level
    Auto,
    /// Low detail level
    Low,
    /// High detail level
    High,
}
