//! Generate-content wire family (Google Gemini).
//!
//! Request shaping for both modes and the response types shared by the
//! streaming transcoder and tool-decision interpretation.

use crate::generation::GenerationSettings;
use gateway_core::{
    ChatMessage, ContentPart, GatewayRequest, MessageContent, MessageRole, NativeToolSet,
    ProviderConfig, ToolCallResult,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Streaming endpoint for chat mode
#[must_use]
pub fn stream_endpoint(provider: &ProviderConfig) -> String {
    format!(
        "{}/models/{}:streamGenerateContent?alt=sse",
        provider.url.trim_end_matches('/'),
        provider.upstream_model
    )
}

/// Single-shot endpoint for tool-call mode
#[must_use]
pub fn generate_endpoint(provider: &ProviderConfig) -> String {
    format!(
        "{}/models/{}:generateContent",
        provider.url.trim_end_matches('/'),
        provider.upstream_model
    )
}

/// Build the chat-mode request; the preamble leads the system instruction
#[must_use]
pub fn chat_request(request: &GatewayRequest, settings: &GenerationSettings) -> GenerateContentRequest {
    let (contents, system_instruction) = transform_messages(&request.messages, settings.preamble());

    GenerateContentRequest {
        contents,
        system_instruction,
        generation_config: None,
        tools: None,
        tool_config: None,
    }
}

/// Build the tool-call-mode request around an already-native tool set
#[must_use]
pub fn tool_request(
    request: &GatewayRequest,
    tools: NativeToolSet,
    settings: &GenerationSettings,
) -> GenerateContentRequest {
    let (contents, system_instruction) = transform_messages(&request.messages, None);

    GenerateContentRequest {
        contents,
        system_instruction,
        generation_config: Some(GenerationConfig {
            temperature: Some(settings.tool_temperature),
            max_output_tokens: Some(settings.tool_max_tokens),
        }),
        tools: Some(vec![tools]),
        tool_config: Some(ToolConfig {
            function_calling_config: FunctionCallingConfig {
                mode: "AUTO".to_string(),
            },
        }),
    }
}

fn transform_messages(
    messages: &[ChatMessage],
    preamble: Option<&str>,
) -> (Vec<Content>, Option<Content>) {
    let mut contents = Vec::with_capacity(messages.len());
    let mut instruction: Vec<Part> = preamble
        .map(|text| Part::Text {
            text: text.to_string(),
        })
        .into_iter()
        .collect();

    for message in messages {
        match message.role {
            // Gemini takes system prompts out of band
            MessageRole::System => instruction.push(Part::Text {
                text: message.content.joined_text(),
            }),
            MessageRole::User => contents.push(Content {
                role: Some("user".to_string()),
                parts: transform_content(&message.content),
            }),
            MessageRole::Assistant => contents.push(Content {
                role: Some("model".to_string()),
                parts: transform_content(&message.content),
            }),
        }
    }

    let system_instruction = (!instruction.is_empty()).then_some(Content {
        role: None,
        parts: instruction,
    });
    (contents, system_instruction)
}

fn transform_content(content: &MessageContent) -> Vec<Part> {
    match content {
        MessageContent::Text(text) => vec![Part::Text { text: text.clone() }],
        MessageContent::Parts(parts) => parts
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text { text } => Some(Part::Text { text: text.clone() }),
                ContentPart::ImageUrl { image_url } => {
                    if let Some((mime_type, data)) = parse_data_url(&image_url.url) {
                        Some(Part::InlineData {
                            inline_data: InlineData { mime_type, data },
                        })
                    } else {
                        warn!(
                            url = %image_url.url,
                            "External image URLs not supported by generate-content, skipping"
                        );
                        None
                    }
                }
            })
            .collect(),
    }
}

/// Split a `data:` URL into mime type and base64 payload
fn parse_data_url(url: &str) -> Option<(String, String)> {
    let without_prefix = url.strip_prefix("data:")?;
    let (meta, data) = without_prefix.split_once(',')?;
    let mime_type = meta.strip_suffix(";base64").unwrap_or(meta);
    if mime_type.is_empty() {
        return None;
    }
    Some((mime_type.to_string(), data.to_string()))
}

/// Interpret a raw `generateContent` response
///
/// A function call anywhere in the first candidate wins over text.
#[must_use]
pub fn interpret_decision(raw: &Value) -> Option<ToolCallResult> {
    let response: GenerateContentEvent = serde_json::from_value(raw.clone()).ok()?;
    let parts = response.candidates.into_iter().next()?.content?.parts;

    if let Some(call) = parts.iter().find_map(|p| p.function_call.as_ref()) {
        let arguments = if call.args.is_null() {
            Value::Object(serde_json::Map::new())
        } else {
            call.args.clone()
        };
        return Some(ToolCallResult::Invocation {
            name: call.name.clone(),
            arguments,
        });
    }

    let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
    (!text.is_empty()).then_some(ToolCallResult::Text { text })
}

// Request types

/// Native request body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<NativeToolSet>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_config: Option<ToolConfig>,
}

#[derive(Debug, Clone, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolConfig {
    function_calling_config: FunctionCallingConfig,
}

#[derive(Debug, Clone, Serialize)]
struct FunctionCallingConfig {
    mode: String,
}

// Response types

/// One native response object; also the payload of every streamed event
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentEvent {
    /// Candidates, usually exactly one
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Error payload sent in place of candidates
    #[serde(default)]
    pub error: Option<Value>,
}

/// Response candidate
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    /// Candidate content, absent for blocked candidates
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

/// Content of a candidate
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateContent {
    /// Response parts
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

/// A response part; unknown part kinds deserialise to an empty part
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePart {
    /// Text increment
    #[serde(default)]
    pub text: Option<String>,
    /// Function call
    #[serde(default)]
    pub function_call: Option<FunctionCall>,
}

/// Function call chosen by the model
#[derive(Debug, Clone, Deserialize)]
pub struct FunctionCall {
    /// Function name
    pub name: String,
    /// Arguments object
    #[serde(default)]
    pub args: Value,
}

impl GenerateContentEvent {
    /// Concatenated text of the first candidate
    #[must_use]
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Human-readable error message, if this event carries an error payload
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        let error = self.error.as_ref()?;
        Some(
            error
                .get("message")
                .and_then(Value::as_str)
                .map_or_else(|| error.to_string(), str::to_string),
        )
    }
}
