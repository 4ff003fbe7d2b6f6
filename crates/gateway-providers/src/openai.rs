//! Chat-completions wire family (OpenAI and compatible APIs).
//!
//! This family already speaks the canonical dialect, so shaping is limited to
//! adding the preamble, the upstream model name and mode-specific parameters.

use crate::generation::GenerationSettings;
use gateway_core::{ChatMessage, GatewayRequest, ProviderConfig, ToolCallResult, ToolDeclaration};
use serde::Serialize;
use serde_json::Value;

/// Native request body
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionsRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolDeclaration>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// Build the streaming chat-mode request
#[must_use]
pub fn chat_request(
    provider: &ProviderConfig,
    request: &GatewayRequest,
    settings: &GenerationSettings,
) -> ChatCompletionsRequest {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    if let Some(preamble) = settings.preamble() {
        messages.push(ChatMessage::system(preamble));
    }
    messages.extend(request.messages.iter().cloned());

    ChatCompletionsRequest {
        model: provider.upstream_model.clone(),
        messages,
        stream: Some(true),
        tools: None,
        tool_choice: None,
        temperature: None,
        max_tokens: None,
    }
}

/// Build the single-shot tool-call-mode request
#[must_use]
pub fn tool_request(
    provider: &ProviderConfig,
    request: &GatewayRequest,
    tools: Vec<ToolDeclaration>,
    settings: &GenerationSettings,
) -> ChatCompletionsRequest {
    ChatCompletionsRequest {
        model: provider.upstream_model.clone(),
        messages: request.messages.clone(),
        stream: None,
        tools: Some(tools),
        tool_choice: Some("auto".to_string()),
        temperature: Some(settings.tool_temperature),
        max_tokens: Some(settings.tool_max_tokens),
    }
}

/// Interpret a raw chat-completions response
#[must_use]
pub fn interpret_decision(raw: &Value) -> Option<ToolCallResult> {
    let message = raw.get("choices")?.get(0)?.get("message")?;

    if let Some(function) = message
        .get("tool_calls")
        .and_then(|calls| calls.get(0))
        .and_then(|call| call.get("function"))
    {
        let name = function.get("name")?.as_str()?.to_string();
        // Arguments arrive as a JSON-encoded string
        let arguments = match function.get("arguments") {
            Some(Value::String(encoded)) => serde_json::from_str(encoded).ok()?,
            Some(value @ Value::Object(_)) => value.clone(),
            _ => Value::Object(serde_json::Map::new()),
        };
        return Some(ToolCallResult::Invocation { name, arguments });
    }

    message
        .get("content")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(|text| ToolCallResult::Text {
            text: text.to_string(),
        })
}
