//! Generation parameters shared by both wire families.

/// Preamble prepended to every chat-mode conversation
pub const DEFAULT_SYSTEM_PREAMBLE: &str = "You are a helpful writing assistant embedded in a \
document editor. Answer concisely and format your answer as plain text.";

/// Sampling temperature for tool-call mode
pub const DEFAULT_TOOL_TEMPERATURE: f64 = 0.1;

/// Output ceiling for tool-call mode
pub const DEFAULT_TOOL_MAX_TOKENS: u32 = 256;

/// Settings applied when shaping upstream requests
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    /// System preamble for chat mode
    pub system_preamble: String,
    /// Tool-call mode temperature
    pub tool_temperature: f64,
    /// Tool-call mode output token ceiling
    pub tool_max_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            system_preamble: DEFAULT_SYSTEM_PREAMBLE.to_string(),
            tool_temperature: DEFAULT_TOOL_TEMPERATURE,
            tool_max_tokens: DEFAULT_TOOL_MAX_TOKENS,
        }
    }
}

impl GenerationSettings {
    /// Preamble, or `None` when configured blank
    #[must_use]
    pub fn preamble(&self) -> Option<&str> {
        let trimmed = self.system_preamble.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}
