use crate::error::{LlmError, Result};
use serde::Deserialize;

/// Decoded server-sent event of a streaming chat completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Content fragment appended to the answer so far
    Delta(String),

    /// `data: [DONE]`
    Done,
}

#[derive(Debug, Deserialize)]
struct ChunkPayload {
    #[serde(default)]
    choices: Vec<ChunkChoice>,

    #[serde(default)]
    error: Option<ChunkError>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChunkError {
    #[serde(default)]
    message: String,
}

/// Incremental `text/event-stream` decoder.
///
/// Network chunks may split lines (and UTF-8 sequences) anywhere, so bytes
/// are buffered until a full line is available.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<StreamEvent>> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(event) = decode_line(&line)? {
                events.push(event);
            }
        }
        Ok(events)
    }

    /// Flush a trailing line that was not newline-terminated
    pub fn finish(&mut self) -> Result<Option<StreamEvent>> {
        let line = std::mem::take(&mut self.buffer);
        decode_line(&line)
    }
}

fn decode_line(raw: &[u8]) -> Result<Option<StreamEvent>> {
    let line = std::str::from_utf8(raw).map_err(|err| LlmError::MalformedStream {
        message: err.to_string(),
    })?;
    let line = line.trim_end_matches(['\r', '\n']);

    // Blank separators, comments and non-data fields carry no content
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(None);
    };
    let data = data.trim();
    if data.is_empty() {
        return Ok(None);
    }
    if data == "[DONE]" {
        return Ok(Some(StreamEvent::Done));
    }

    let payload: ChunkPayload =
        serde_json::from_str(data).map_err(|err| LlmError::MalformedStream {
            message: format!("{err}: {data}"),
        })?;
    if let Some(error) = payload.error {
        return Err(LlmError::MalformedStream {
            message: error.message,
        });
    }

    let content = payload
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|content| !content.is_empty());
    Ok(content.map(StreamEvent::Delta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn delta(content: &str) -> String {
        format!("data: {{\"choices\":[{{\"delta\":{{\"content\":\"{content}\"}}}}]}}\n\n")
    }

    #[test]
    fn decodes_deltas_and_done() {
        let mut decoder = SseDecoder::new();
        let raw = format!(
            ": keep-alive\n\ndata: {{\"choices\":[{{\"delta\":{{\"role\":\"assistant\"}}}}]}}\n\n{}{}data: [DONE]\n\n",
            delta("Hel"),
            delta("lo")
        );
        let events = decoder.push(raw.as_bytes()).unwrap();
        assert_eq!(
            events,
            vec![
                StreamEvent::Delta("Hel".into()),
                StreamEvent::Delta("lo".into()),
                StreamEvent::Done,
            ]
        );
    }

    #[test]
    fn lines_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        let raw = delta("né");
        let (head, tail) = raw.as_bytes().split_at(raw.find('é').unwrap() + 1);

        assert!(decoder.push(head).unwrap().is_empty());
        assert_eq!(
            decoder.push(tail).unwrap(),
            vec![StreamEvent::Delta("né".into())]
        );
    }

    #[test]
    fn trailing_line_is_flushed_on_finish() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: [DONE]").unwrap().is_empty());
        assert_eq!(decoder.finish().unwrap(), Some(StreamEvent::Done));
        assert_eq!(decoder.finish().unwrap(), None);
    }

    #[test]
    fn malformed_payloads_are_errors() {
        let mut decoder = SseDecoder::new();
        assert!(matches!(
            decoder.push(b"data: {not json}\n"),
            Err(LlmError::MalformedStream { .. })
        ));

        let mut decoder = SseDecoder::new();
        let err = decoder
            .push(b"data: {\"error\":{\"message\":\"quota exceeded\"}}\n")
            .unwrap_err();
        assert_eq!(
            err,
            LlmError::MalformedStream {
                message: "quota exceeded".into()
            }
        );
    }
}
