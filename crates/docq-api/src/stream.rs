//! Streaming answer events and line-level decoding
//!
//! The ask-stream endpoint answers with a chunked body whose meaningful lines
//! look like `data: {"type":"content","data":"…"}`. Chunk boundaries fall
//! anywhere, including inside a line or inside a multi-byte character, so
//! decoding happens in two layers: [`LineDecoder`] reassembles complete lines
//! from raw byte chunks, and [`parse_event_line`] turns one line into an
//! [`AnswerEvent`] when it carries one.

use serde::{Deserialize, Serialize};
use std::pin::Pin;
use tokio_stream::Stream;

/// Marker prefix for event-bearing lines
const EVENT_PREFIX: &str = "data:";

/// Events emitted while an answer is streaming
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnswerEvent {
    /// An incremental fragment of the answer text
    Content { data: String },
    /// Answer completed successfully; no further events follow
    Done,
    /// Server-side failure; no further events follow
    Error { data: String },
}

impl AnswerEvent {
    /// Check if this is a terminal event (Done or Error)
    pub fn is_terminal(&self) -> bool {
        matches!(self, AnswerEvent::Done | AnswerEvent::Error { .. })
    }
}

/// A stream of answer events
pub type AnswerEventStream = Pin<Box<dyn Stream<Item = AnswerEvent> + Send>>;

/// Splits raw byte chunks into complete text lines
///
/// Bytes that arrive after the last newline of a chunk are carried over and
/// prepended to the next chunk, so a line (or a single UTF-8 character) split
/// across reads is reassembled before decoding. Lines are decoded lossily:
/// genuinely invalid bytes become replacement characters instead of killing
/// the stream.
#[derive(Debug, Default)]
pub struct LineDecoder {
    carry: Vec<u8>,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk, returning every line completed by it, in order
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.carry.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.carry.iter().position(|&b| b == b'\n') {
            let rest = self.carry.split_off(pos + 1);
            let mut line = std::mem::replace(&mut self.carry, rest);
            line.pop(); // the newline itself
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }

    /// Consume the decoder at stream end, returning any unterminated fragment
    ///
    /// A well-formed stream ends with a newline-terminated terminal event, so
    /// the fragment is never parsed as an event; callers log it and treat the
    /// stream as abnormally terminated if no terminal event was seen.
    pub fn finish(self) -> Option<String> {
        if self.carry.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(&self.carry).into_owned())
        }
    }
}

/// Parse one decoded line into an event, if it carries one
///
/// Blank lines, lines without the `data:` prefix, unparseable payloads, and
/// unknown event types all yield `None`. Malformed events must never abort an
/// otherwise-healthy stream, so failures are logged at debug and swallowed.
pub fn parse_event_line(line: &str) -> Option<AnswerEvent> {
    let payload = line.strip_prefix(EVENT_PREFIX)?.trim_start();
    if payload.is_empty() {
        return None;
    }
    match serde_json::from_str(payload) {
        Ok(event) => Some(event),
        Err(err) => {
            tracing::debug!("skipping malformed stream event: {err} (line: {line:?})");
            None
        }
    }
}

/// Accumulates `Content` fragments into the answer text
///
/// One builder exists per stream, created at stream start. Fragments are
/// appended verbatim; terminal events are the reconciler's business and are
/// ignored here.
#[derive(Debug, Default)]
pub struct AnswerBuilder {
    text: String,
}

impl AnswerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a streaming event, appending any content fragment
    pub fn push_event(&mut self, event: &AnswerEvent) {
        if let AnswerEvent::Content { data } = event {
            self.text.push_str(data);
        }
    }

    /// The answer accumulated so far
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Take the final answer text
    pub fn into_text(self) -> String {
        self.text
    }
}
