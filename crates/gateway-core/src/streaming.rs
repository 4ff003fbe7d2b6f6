//! Canonical streaming dialect.
//!
//! Events are framed as server-sent events: `data: <json>\n\n`, terminated by
//! `data: [DONE]\n\n`. This is byte-for-byte what chat-completions providers
//! emit, which is why their streams pass through untouched.

use bytes::Bytes;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

/// Prefix carried by every event line
pub const SSE_DATA_PREFIX: &str = "data:";

/// Payload of the end-of-stream sentinel
pub const DONE_SENTINEL: &str = "[DONE]";

/// Lazy, finite, non-restartable stream of canonical SSE bytes
pub type CanonicalStream = BoxStream<'static, Bytes>;

/// One canonical incremental chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatChunk {
    /// Object type, always `chat.completion.chunk`
    pub object: String,
    /// Choices carried by this chunk
    pub choices: Vec<ChunkChoice>,
}

/// A choice inside a chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkChoice {
    /// Candidate index
    pub index: u32,
    /// Incremental delta
    pub delta: ChunkDelta,
}

/// Incremental assistant text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkDelta {
    /// Text fragment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl ChatChunk {
    /// Chunk with a single text delta at the given index
    #[must_use]
    pub fn text(index: u32, content: impl Into<String>) -> Self {
        Self {
            object: "chat.completion.chunk".to_string(),
            choices: vec![ChunkChoice {
                index,
                delta: ChunkDelta {
                    content: Some(content.into()),
                },
            }],
        }
    }

    /// Text of the first choice, or `""`
    #[must_use]
    pub fn content(&self) -> &str {
        self.choices
            .first()
            .and_then(|c| c.delta.content.as_deref())
            .unwrap_or("")
    }
}

/// A unit of the canonical stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Content increment
    Chunk(ChatChunk),
    /// End-of-stream sentinel
    Done,
}

impl StreamEvent {
    /// Encode as one SSE event
    #[must_use]
    pub fn to_sse(&self) -> Bytes {
        match self {
            Self::Chunk(chunk) => {
                // ChatChunk holds only strings and integers, serialization cannot fail.
                let json = serde_json::to_string(chunk).unwrap_or_default();
                Bytes::from(format!("{SSE_DATA_PREFIX} {json}\n\n"))
            }
            Self::Done => Bytes::from(format!("{SSE_DATA_PREFIX} {DONE_SENTINEL}\n\n")),
        }
    }

    /// Decode one SSE `data:` payload
    #[must_use]
    pub fn parse_data(data: &str) -> Option<Self> {
        let data = data.trim();
        if data == DONE_SENTINEL {
            return Some(Self::Done);
        }
        serde_json::from_str(data).ok().map(Self::Chunk)
    }
}

/// Strip the SSE data prefix from a line, tolerating a missing space
#[must_use]
pub fn sse_data(line: &str) -> Option<&str> {
    line.strip_prefix(SSE_DATA_PREFIX)
        .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_encoding() {
        let bytes = StreamEvent::Chunk(ChatChunk::text(0, "Hello")).to_sse();
        let text = std::str::from_utf8(&bytes).expect("utf8");
        assert!(text.starts_with("data: {"));
        assert!(text.ends_with("\n\n"));
        assert!(text.contains("\"content\":\"Hello\""));
        assert!(text.contains("\"index\":0"));
    }

    #[test]
    fn test_done_encoding() {
        assert_eq!(StreamEvent::Done.to_sse(), Bytes::from_static(b"data: [DONE]\n\n"));
    }

    #[test]
    fn test_parse_data() {
        let chunk = StreamEvent::parse_data(
            r#"{"object":"chat.completion.chunk","choices":[{"index":0,"delta":{"content":"Hi"}}]}"#,
        );
        match chunk {
            Some(StreamEvent::Chunk(c)) => assert_eq!(c.content(), "Hi"),
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(StreamEvent::parse_data(" [DONE] "), Some(StreamEvent::Done));
        assert_eq!(StreamEvent::parse_data("{broken"), None);
    }

    #[test]
    fn test_sse_data_prefix() {
        assert_eq!(sse_data("data: {}"), Some("{}"));
        assert_eq!(sse_data("data:{}"), Some("{}"));
        assert_eq!(sse_data("event: ping"), None);
    }
}
