//! Server-sent events parsing for streamed chat completions
//!
//! The response body is buffered until a blank line closes an event, the
//! event's `data:` lines are joined, and each payload is decoded as a
//! completion chunk. Reasoning and answer deltas are forwarded in the order
//! they arrive. A `[DONE]` payload ends the stream.

use super::StreamChunk;
use crate::error::{ChatError, Result};
use bytes::Bytes;
use futures::Stream;
use serde::Deserialize;
use tokio::sync::mpsc;

/// Payload marking the end of a completion stream
pub const DONE_MARKER: &str = "[DONE]";

#[derive(Debug, Deserialize)]
struct ChunkPayload {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    reasoning_content: Option<String>,
}

/// Whether the stream should keep going after an event
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Done,
}

/// Parse an SSE byte stream and forward completion deltas to `chunk_tx`
///
/// Intended to run inside `tokio::spawn`. Consumes the stream until it ends,
/// a `[DONE]` event arrives, the receiver is dropped, or the transport fails;
/// a transport failure is forwarded as the final item.
pub async fn parse_sse_stream<S>(
    byte_stream: S,
    chunk_tx: mpsc::UnboundedSender<Result<StreamChunk>>,
) where
    S: Stream<Item = reqwest::Result<Bytes>>,
{
    use futures::StreamExt;

    // Raw bytes so multi-byte characters split across chunks survive.
    let mut buffer: Vec<u8> = Vec::new();

    tokio::pin!(byte_stream);

    while let Some(chunk_result) = byte_stream.next().await {
        let chunk = match chunk_result {
            Ok(c) => c,
            Err(e) => {
                tracing::error!("Stream transport failed: {}", e);
                let _ = chunk_tx.send(Err(ChatError::Http(e).into()));
                return;
            }
        };

        buffer.extend(chunk.iter().filter(|&&b| b != b'\r'));

        while let Some(pos) = find_event_boundary(&buffer) {
            let block: Vec<u8> = buffer.drain(..pos + 2).collect();
            let text = String::from_utf8_lossy(&block[..pos]);
            if process_sse_event(&text, &chunk_tx) == Flow::Done {
                return;
            }
        }
    }

    if !buffer.is_empty() {
        let text = String::from_utf8_lossy(&buffer);
        process_sse_event(&text, &chunk_tx);
    }
}

fn find_event_boundary(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|w| w == b"\n\n")
}

/// Process a single SSE event block (the text between two blank lines)
fn process_sse_event(
    event_block: &str,
    chunk_tx: &mpsc::UnboundedSender<Result<StreamChunk>>,
) -> Flow {
    let data_lines: Vec<&str> = event_block
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim)
        .collect();

    let data = data_lines.join("\n");
    if data.is_empty() {
        return Flow::Continue;
    }
    if data == DONE_MARKER {
        tracing::debug!("Completion stream finished");
        return Flow::Done;
    }

    let payload: ChunkPayload = match serde_json::from_str(&data) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!("Skipping malformed stream chunk: {}", e);
            return Flow::Continue;
        }
    };

    for chunk in chunks_from_payload(payload) {
        if chunk_tx.send(Ok(chunk)).is_err() {
            tracing::debug!("Stream receiver dropped, stopping parser");
            return Flow::Done;
        }
    }
    Flow::Continue
}

fn chunks_from_payload(payload: ChunkPayload) -> Vec<StreamChunk> {
    let mut chunks = Vec::new();
    for choice in payload.choices.into_iter().take(1) {
        if let Some(reasoning) = choice.delta.reasoning_content.filter(|s| !s.is_empty()) {
            chunks.push(StreamChunk::Reasoning(reasoning));
        }
        if let Some(content) = choice.delta.content.filter(|s| !s.is_empty()) {
            chunks.push(StreamChunk::Answer(content));
        }
    }
    chunks
}
