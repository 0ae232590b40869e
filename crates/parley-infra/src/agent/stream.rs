//! Agent reply stream decoder and async stream adapter.
//!
//! The refund agent answers with an SSE-style chunked body. Each record
//! has the layout:
//!
//! ```text
//! data: <fragment>\n\n
//! ```
//!
//! Records arrive split across arbitrary transport chunks, so the
//! decoder keeps a rolling byte buffer and only emits a fragment once
//! the `\n\n` delimiter is complete. A `data: [DONE]` record marks the
//! end of the reply; anything after it is ignored.

use futures_util::StreamExt;
use serde::Serialize;

use parley_core::agent::ReplyStream;
use parley_types::chat::{AgentError, StreamEvent};

const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";
const RECORD_DELIMITER: &[u8; 2] = b"\n\n";

#[derive(Serialize)]
struct AgentRequest<'a> {
    message: &'a str,
}

/// Incremental decoder for the agent's record framing.
///
/// Feed raw transport chunks in arrival order; complete fragments come
/// back in the same order. Bytes after an incomplete record stay
/// buffered until the delimiter arrives. Once the `[DONE]` sentinel is
/// seen the decoder is closed and further input is discarded.
#[derive(Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    done: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the `[DONE]` sentinel has been decoded.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Consume one transport chunk and return the fragments it completed.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        if self.done {
            return Vec::new();
        }
        self.buffer.extend_from_slice(chunk);

        let mut fragments = Vec::new();
        while let Some(pos) = self
            .buffer
            .windows(RECORD_DELIMITER.len())
            .position(|window| window == RECORD_DELIMITER)
        {
            let rest = self.buffer.split_off(pos + RECORD_DELIMITER.len());
            let record = std::mem::replace(&mut self.buffer, rest);
            let record = String::from_utf8_lossy(&record[..pos]);

            let Some(payload) = record.strip_prefix(DATA_PREFIX) else {
                tracing::debug!(record = %record, "non-data record, skipping");
                continue;
            };

            if payload == DONE_SENTINEL {
                self.done = true;
                self.buffer.clear();
                break;
            }

            fragments.push(payload.to_string());
        }

        fragments
    }
}

/// Create a streaming connection to the refund agent service.
///
/// Sends the user message as JSON, checks the response status, then
/// decodes the chunked body into fragments. Yields `Connected` once the
/// body is readable, a `Fragment` per decoded record, and `Done` when
/// the sentinel arrives or the body ends.
pub fn create_reply_stream(
    client: &reqwest::Client,
    endpoint: &str,
    message: &str,
) -> ReplyStream {
    let client = client.clone();
    let endpoint = endpoint.to_string();
    let message = message.to_string();

    Box::pin(async_stream::try_stream! {
        let response = client
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .json(&AgentRequest { message: &message })
            .send()
            .await
            .map_err(|e| AgentError::Request(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        let response = if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "agent service error response");
            Err(AgentError::Status {
                status: status.as_u16(),
                body,
            })?;
            unreachable!()
        } else {
            response
        };

        yield StreamEvent::Connected;

        let mut byte_stream = response.bytes_stream();
        let mut decoder = SseDecoder::new();

        while let Some(chunk_result) = byte_stream.next().await {
            let chunk = chunk_result
                .map_err(|e| AgentError::Stream(format!("response body read: {e}")))?;

            for text in decoder.feed(&chunk) {
                yield StreamEvent::Fragment { text };
            }
            if decoder.is_done() {
                break;
            }
        }

        yield StreamEvent::Done;
    })
}
