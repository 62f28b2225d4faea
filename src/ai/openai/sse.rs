//! Line-oriented decoding of `text/event-stream` chat completion bodies.

use super::types::ChatCompletionChunk;
use crate::{Error, Result};

/// What a single SSE line means for the caller.
#[derive(Debug, PartialEq, Eq)]
pub enum SseEvent {
    Fragment(String),
    Done,
    Skip,
}

/// Reassembles lines from arbitrarily split byte chunks.
///
/// Bytes are buffered rather than text so that multi-byte characters split
/// across network chunks survive.
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    pending: Vec<u8>,
}

impl SseLineBuffer {
    /// Append a chunk and return every line it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            lines.push(decode_line(&line[..line.len() - 1]));
        }
        lines
    }

    /// Flush a trailing line that was not newline-terminated.
    pub fn finish(&mut self) -> Vec<String> {
        if self.pending.is_empty() {
            return Vec::new();
        }
        let line = std::mem::take(&mut self.pending);
        vec![decode_line(&line)]
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    text.strip_suffix('\r').unwrap_or(&text).to_string()
}

/// Interpret one SSE line from the chat completions stream.
pub fn parse_line(line: &str) -> Result<SseEvent> {
    let Some(data) = line.strip_prefix("data:") else {
        // Blank separators, comments and other fields carry no text.
        return Ok(SseEvent::Skip);
    };
    let data = data.trim_start();

    if data == "[DONE]" {
        return Ok(SseEvent::Done);
    }

    let value: serde_json::Value = serde_json::from_str(data).map_err(|e| {
        tracing::error!("Failed to parse stream chunk: {}\nData: {}", e, data);
        Error::AiProvider(format!("Malformed stream chunk: {}", e))
    })?;

    if let Some(error) = value.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(Error::AiProvider(format!("OpenAI stream error: {}", message)));
    }

    let chunk: ChatCompletionChunk = serde_json::from_value(value)
        .map_err(|e| Error::AiProvider(format!("Malformed stream chunk: {}", e)))?;

    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|content| !content.is_empty())
        .map(SseEvent::Fragment)
        .unwrap_or(SseEvent::Skip))
}
