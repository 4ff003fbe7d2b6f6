//! Streaming transcoder.
//!
//! Converts a generate-content event stream into the canonical dialect while
//! it arrives. The returned stream owns the upstream body: dropping it drops
//! the upstream read. Bytes are buffered per line, so a multi-byte character
//! split across network chunks is decoded intact.

use crate::google::GenerateContentEvent;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use gateway_core::{sse_data, CanonicalStream, ChatChunk, StreamEvent, DONE_SENTINEL};
use std::fmt::Display;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// A single increment dropped from an otherwise healthy stream
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscodeSkip {
    /// The event payload was not valid JSON
    #[error("malformed event: {0}")]
    MalformedEvent(String),
    /// The provider sent an error payload instead of content
    #[error("provider error: {0}")]
    ProviderError(String),
}

enum ReadOutcome {
    Chunk(Bytes),
    End,
    Failed(String),
    Idle(Duration),
}

async fn read_next<S, E>(upstream: &mut S, idle_timeout: Option<Duration>) -> ReadOutcome
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Display,
{
    let next = match idle_timeout {
        Some(limit) => match tokio::time::timeout(limit, upstream.next()).await {
            Ok(next) => next,
            Err(_) => return ReadOutcome::Idle(limit),
        },
        None => upstream.next().await,
    };

    match next {
        Some(Ok(bytes)) => ReadOutcome::Chunk(bytes),
        Some(Err(e)) => ReadOutcome::Failed(e.to_string()),
        None => ReadOutcome::End,
    }
}

/// Decode one native event payload into its text increment
///
/// # Errors
/// Returns the reason the increment is skipped
pub fn decode_event(data: &str) -> Result<String, TranscodeSkip> {
    let event: GenerateContentEvent = serde_json::from_str(data)
        .map_err(|e| TranscodeSkip::MalformedEvent(e.to_string()))?;

    if let Some(message) = event.error_message() {
        return Err(TranscodeSkip::ProviderError(message));
    }
    Ok(event.text())
}

fn transcode_line(raw: &[u8]) -> Option<StreamEvent> {
    let line = String::from_utf8_lossy(raw);
    let data = sse_data(line.trim_end_matches(['\r', '\n']))?.trim();

    if data.is_empty() || data == DONE_SENTINEL {
        return None;
    }

    match decode_event(data) {
        Ok(text) if text.is_empty() => None,
        Ok(text) => Some(StreamEvent::Chunk(ChatChunk::text(0, text))),
        Err(skip @ TranscodeSkip::ProviderError(_)) => {
            warn!(reason = %skip, "Dropping provider error event from stream");
            None
        }
        Err(skip) => {
            debug!(reason = %skip, "Skipping malformed stream event");
            None
        }
    }
}

/// Transcode a generate-content SSE body into canonical SSE
///
/// Always ends with exactly one `[DONE]` sentinel, including when the
/// upstream fails mid-stream or stays silent longer than `idle_timeout`.
pub fn transcode_generate_content<S, E>(upstream: S, idle_timeout: Option<Duration>) -> CanonicalStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let stream = async_stream::stream! {
        let mut upstream = Box::pin(upstream);
        let mut buffer: Vec<u8> = Vec::new();

        loop {
            match read_next(&mut upstream, idle_timeout).await {
                ReadOutcome::Chunk(bytes) => {
                    buffer.extend_from_slice(&bytes);
                    while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
                        let line: Vec<u8> = buffer.drain(..=pos).collect();
                        if let Some(event) = transcode_line(&line) {
                            yield event.to_sse();
                        }
                    }
                }
                ReadOutcome::End => break,
                ReadOutcome::Failed(error) => {
                    warn!(error = %error, "Upstream stream failed, ending response");
                    break;
                }
                ReadOutcome::Idle(limit) => {
                    warn!(idle_ms = limit.as_millis() as u64, "Upstream stream idle, ending response");
                    break;
                }
            }
        }

        // Last event may lack a trailing newline
        if let Some(event) = transcode_line(&buffer) {
            yield event.to_sse();
        }
        yield StreamEvent::Done.to_sse();
    };

    Box::pin(stream)
}

/// Forward a chat-completions SSE body unchanged
///
/// Ends quietly on upstream failure or idle timeout.
pub fn passthrough<S, E>(upstream: S, idle_timeout: Option<Duration>) -> CanonicalStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let stream = async_stream::stream! {
        let mut upstream = Box::pin(upstream);
        loop {
            match read_next(&mut upstream, idle_timeout).await {
                ReadOutcome::Chunk(bytes) => yield bytes,
                ReadOutcome::End => break,
                ReadOutcome::Failed(error) => {
                    warn!(error = %error, "Upstream stream failed, ending response");
                    break;
                }
                ReadOutcome::Idle(limit) => {
                    warn!(idle_ms = limit.as_millis() as u64, "Upstream stream idle, ending response");
                    break;
                }
            }
        }
    };

    Box::pin(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use std::io;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    const HELLO: &str =
        "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Hello\"}],\"role\":\"model\"}}]}\n\n";
    const WORLD: &str =
        "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\" world\"}],\"role\":\"model\"}}]}\n\n";
    const ERROR: &str = "data: {\"error\":{\"code\":500,\"message\":\"internal\"}}\n\n";

    fn upstream(events: &[&str]) -> impl Stream<Item = Result<Bytes, io::Error>> + Send + 'static {
        let chunks: Vec<_> = events
            .iter()
            .map(|e| Ok(Bytes::from(e.to_string())))
            .collect();
        stream::iter(chunks)
    }

    async fn collect(stream: CanonicalStream) -> Vec<String> {
        stream
            .map(|b| String::from_utf8(b.to_vec()).expect("utf8"))
            .collect()
            .await
    }

    fn chunk(text: &str) -> String {
        String::from_utf8(StreamEvent::Chunk(ChatChunk::text(0, text)).to_sse().to_vec())
            .expect("utf8")
    }

    const DONE: &str = "data: [DONE]\n\n";

    #[tokio::test]
    async fn test_error_event_dropped() {
        let out = collect(transcode_generate_content(upstream(&[ERROR, HELLO, WORLD]), None)).await;
        assert_eq!(out, vec![chunk("Hello"), chunk(" world"), DONE.to_string()]);
        assert_eq!(
            out[0],
            "data: {\"object\":\"chat.completion.chunk\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Hello\"}}]}\n\n"
        );
    }

    #[tokio::test]
    async fn test_empty_stream_yields_only_sentinel() {
        let out = collect(transcode_generate_content(upstream(&[]), None)).await;
        assert_eq!(out, vec![DONE.to_string()]);
    }

    #[tokio::test]
    async fn test_malformed_lines_skipped() {
        let out = collect(transcode_generate_content(
            upstream(&["data: {not json\n\n", ": keep-alive\n\n", HELLO]),
            None,
        ))
        .await;
        assert_eq!(out, vec![chunk("Hello"), DONE.to_string()]);
    }

    #[tokio::test]
    async fn test_event_split_across_chunks() {
        let event = "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"caf\u{e9}\"}]}}]}\n\n";
        let bytes = event.as_bytes();
        // Split inside the two-byte encoding of the accented character
        let split = event.find('\u{e9}').expect("accent") + 1;
        let chunks = vec![
            Ok::<_, io::Error>(Bytes::copy_from_slice(&bytes[..split])),
            Ok(Bytes::copy_from_slice(&bytes[split..])),
        ];

        let out = collect(transcode_generate_content(stream::iter(chunks), None)).await;
        assert_eq!(out, vec![chunk("caf\u{e9}"), DONE.to_string()]);
    }

    #[tokio::test]
    async fn test_trailing_event_without_newline() {
        let out = collect(transcode_generate_content(upstream(&[HELLO.trim_end()]), None)).await;
        assert_eq!(out, vec![chunk("Hello"), DONE.to_string()]);
    }

    #[tokio::test]
    async fn test_transport_error_ends_with_sentinel() {
        let chunks = vec![
            Ok(Bytes::from_static(HELLO.as_bytes())),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
            Ok(Bytes::from_static(WORLD.as_bytes())),
        ];
        let out = collect(transcode_generate_content(stream::iter(chunks), None)).await;
        assert_eq!(out, vec![chunk("Hello"), DONE.to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_timeout_ends_stream() {
        let stalled = upstream(&[HELLO]).chain(stream::pending());
        let out = collect(transcode_generate_content(stalled, Some(Duration::from_secs(60)))).await;
        assert_eq!(out, vec![chunk("Hello"), DONE.to_string()]);
    }

    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_dropping_output_releases_upstream() {
        let released = Arc::new(AtomicBool::new(false));
        let guard = DropFlag(Arc::clone(&released));
        let never_ending = upstream(&[HELLO]).chain(stream::pending()).map(move |item| {
            let _held = &guard;
            item
        });

        let mut out = transcode_generate_content(never_ending, None);
        let first = out.next().await.expect("first chunk");
        assert_eq!(String::from_utf8(first.to_vec()).expect("utf8"), chunk("Hello"));
        assert!(!released.load(Ordering::SeqCst));

        drop(out);
        assert!(released.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_passthrough_is_byte_identical() {
        let body = [
            "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Hi\"}}]}\n\n",
            "data: [DONE]\n\n",
        ];
        let out = collect(passthrough(upstream(&body), None)).await;
        assert_eq!(out, body);
    }

    #[test]
    fn test_decode_event_reasons() {
        assert!(matches!(decode_event("{"), Err(TranscodeSkip::MalformedEvent(_))));
        assert_eq!(
            decode_event("{\"error\":{\"message\":\"quota\"}}"),
            Err(TranscodeSkip::ProviderError("quota".to_string()))
        );
        assert_eq!(decode_event("{\"candidates\":[]}"), Ok(String::new()));
    }
}
