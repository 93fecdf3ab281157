use crate::config::TextGenerationConfig;
use crate::error::{LlmError, Result};
use crate::snapshot::{SnapshotAccumulator, SnapshotView};
use crate::sse::{SseDecoder, StreamEvent};
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use incident_protocol::{ChatMessage, ChatPrompt};
use reqwest::Client;
use serde::Serialize;
use std::collections::VecDeque;
use std::time::Duration;

/// Stream of cumulative content snapshots for one request
pub type SnapshotStream = BoxStream<'static, Result<String>>;

/// Streaming text-generation collaborator
pub trait TextGenerationClient: Send + Sync {
    /// Start a request for `prompt`. The request is sent when the stream is
    /// first polled and aborted when the stream is dropped.
    fn stream(&self, prompt: &ChatPrompt) -> SnapshotStream;
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    stream: bool,
    messages: Vec<ChatMessage>,
}

/// OpenAI-compatible `/chat/completions` client with `stream: true`
#[derive(Debug, Clone)]
pub struct OpenAiStreamingClient {
    url: String,
    model: String,
    api_key: Option<String>,
    client: Client,
}

impl OpenAiStreamingClient {
    /// `timeout_ms` bounds connecting and each read of the body, never the
    /// whole streamed answer.
    pub fn from_config(config: &TextGenerationConfig) -> Result<Self> {
        let timeout = Duration::from_millis(config.timeout_ms.max(1));
        let client = Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()
            .map_err(|err| LlmError::BuildClient {
                message: err.to_string(),
            })?;

        Ok(Self {
            url: config.completions_url(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            client,
        })
    }

    async fn open(self, prompt: ChatPrompt) -> Result<SnapshotStream> {
        let payload = ChatCompletionRequest {
            model: self.model.clone(),
            stream: true,
            messages: prompt.to_messages(),
        };

        log::info!("Requesting completion from {} ({})", self.url, self.model);

        let mut request = self.client.post(&self.url).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send().await.map_err(|err| LlmError::Http {
            message: err.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(LlmError::HttpStatus {
                code: status.as_u16(),
                message,
            });
        }

        let body = response
            .bytes_stream()
            .map(|chunk| {
                chunk.map(|bytes| bytes.to_vec()).map_err(|err| LlmError::Http {
                    message: err.to_string(),
                })
            })
            .boxed();
        Ok(snapshots(body))
    }
}

impl TextGenerationClient for OpenAiStreamingClient {
    fn stream(&self, prompt: &ChatPrompt) -> SnapshotStream {
        let opened = self.clone().open(prompt.clone());
        stream::once(async move {
            match opened.await {
                Ok(snapshots) => snapshots,
                Err(err) => stream::once(async move { Err(err) }).boxed(),
            }
        })
        .flatten()
        .boxed()
    }
}

struct SnapshotState {
    body: BoxStream<'static, Result<Vec<u8>>>,
    decoder: SseDecoder,
    content: SnapshotAccumulator,
    pending: VecDeque<String>,
    finished: bool,
}

impl SnapshotState {
    fn apply(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Delta(delta) => {
                if let Some(snapshot) = self.content.push(&delta) {
                    self.pending.push_back(snapshot);
                }
            }
            StreamEvent::Done => self.finished = true,
        }
    }

    fn feed(&mut self, chunk: &[u8]) -> Result<()> {
        for event in self.decoder.push(chunk)? {
            if self.finished {
                break;
            }
            self.apply(event);
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(event) = self.decoder.finish()? {
            self.apply(event);
        }
        self.finished = true;
        Ok(())
    }
}

/// Turn a raw event-stream body into cumulative snapshots; the first error
/// ends the stream.
pub fn snapshots(body: BoxStream<'static, Result<Vec<u8>>>) -> SnapshotStream {
    let state = SnapshotState {
        body,
        decoder: SseDecoder::new(),
        content: SnapshotAccumulator::default(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(Some(state), |state| async move {
        let mut state = state?;
        loop {
            if let Some(snapshot) = state.pending.pop_front() {
                return Some((Ok(snapshot), Some(state)));
            }
            if state.finished {
                return None;
            }

            let step = match state.body.next().await {
                Some(Ok(chunk)) => state.feed(&chunk),
                Some(Err(err)) => Err(err),
                None => state.flush(),
            };
            if let Err(err) = step {
                return Some((Err(err), None));
            }
        }
    })
    .boxed()
}

/// Drive a snapshot stream into `on_update`, replacing the displayed content
/// with every new snapshot. Returns the final content.
pub async fn render_snapshots<F>(mut stream: SnapshotStream, mut on_update: F) -> Result<String>
where
    F: FnMut(&str),
{
    let mut view = SnapshotView::new();
    while let Some(snapshot) = stream.next().await {
        match snapshot {
            Ok(snapshot) => {
                if view.update(&snapshot) {
                    on_update(view.content());
                }
            }
            Err(err) => {
                log::error!("Text generation failed: {err}");
                return Err(err);
            }
        }
    }

    log::debug!("Text generation finished ({} chars)", view.content().len());
    Ok(view.into_content())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn body(chunks: &[&str]) -> BoxStream<'static, Result<Vec<u8>>> {
        let chunks: Vec<Result<Vec<u8>>> = chunks.iter().map(|c| Ok(c.as_bytes().to_vec())).collect();
        stream::iter(chunks).boxed()
    }

    #[tokio::test]
    async fn body_becomes_cumulative_snapshots() {
        let stream = snapshots(body(&[
            "data: {\"choices\":[{\"delta\":{\"content\":\"Net\"}}]}\n\ndata: {\"choi",
            "ces\":[{\"delta\":{\"content\":\"work\"}}]}\n\n",
            "data: [DONE]\n\ndata: {\"choices\":[{\"delta\":{\"content\":\"late\"}}]}\n\n",
        ]));

        let collected: Vec<_> = stream.collect().await;
        assert_eq!(collected, vec![Ok("Net".to_string()), Ok("Network".to_string())]);
    }

    #[tokio::test]
    async fn malformed_chunk_ends_the_stream_with_an_error() {
        let stream = snapshots(body(&[
            "data: {\"choices\":[{\"delta\":{\"content\":\"A\"}}]}\n",
            "data: oops\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"B\"}}]}\n",
        ]));

        let collected: Vec<_> = stream.collect().await;
        assert_eq!(collected.len(), 2);
        assert_eq!(collected[0], Ok("A".to_string()));
        assert!(matches!(collected[1], Err(LlmError::MalformedStream { .. })));
    }

    #[tokio::test]
    async fn render_skips_repeated_snapshots() {
        let stream = stream::iter(vec![
            Ok("A".to_string()),
            Ok("A".to_string()),
            Ok(String::new()),
            Ok("AB".to_string()),
        ])
        .boxed();

        let mut seen = Vec::new();
        let content = render_snapshots(stream, |s| seen.push(s.to_string()))
            .await
            .unwrap();
        assert_eq!(content, "AB");
        assert_eq!(seen, vec!["A", "AB"]);
    }

    #[tokio::test]
    async fn render_surfaces_errors() {
        let stream = stream::iter(vec![
            Ok("A".to_string()),
            Err(LlmError::HttpStatus {
                code: 503,
                message: "busy".into(),
            }),
        ])
        .boxed();

        let err = render_snapshots(stream, |_| {}).await.unwrap_err();
        assert_eq!(err.to_string(), "http status 503: busy");
    }

    /// Serves one SSE response whose events arrive `gap` apart.
    async fn slow_event_server(events: Vec<&'static str>, gap: Duration) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = vec![0u8; 8192];
            let _ = socket.read(&mut request).await.unwrap();
            socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nConnection: close\r\n\r\n",
                )
                .await
                .unwrap();
            for event in events {
                tokio::time::sleep(gap).await;
                socket.write_all(event.as_bytes()).await.unwrap();
                socket.flush().await.unwrap();
            }
            let _ = socket.shutdown().await;
            while matches!(socket.read(&mut request).await, Ok(n) if n > 0) {}
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn answer_may_stream_longer_than_the_timeout() {
        let base_url = slow_event_server(
            vec![
                "data: {\"choices\":[{\"delta\":{\"content\":\"Net\"}}]}\n\n",
                "data: {\"choices\":[{\"delta\":{\"content\":\"work\"}}]}\n\n",
                "data: {\"choices\":[{\"delta\":{\"content\":\" ok\"}}]}\n\n",
                "data: [DONE]\n\n",
            ],
            Duration::from_millis(150),
        )
        .await;
        let config = TextGenerationConfig {
            base_url,
            timeout_ms: 400,
            ..TextGenerationConfig::default()
        };

        let client = OpenAiStreamingClient::from_config(&config).unwrap();
        let content = render_snapshots(client.stream(&ChatPrompt::new("sys", "hi")), |_| {})
            .await
            .unwrap();
        assert_eq!(content, "Network ok");
    }

    #[test]
    fn request_body_enables_streaming() {
        let payload = ChatCompletionRequest {
            model: "gpt-4o-mini".into(),
            stream: true,
            messages: ChatPrompt::new("sys", "hi").to_messages(),
        };
        let raw = serde_json::to_value(&payload).unwrap();
        assert_eq!(raw["stream"], true);
        assert_eq!(raw["messages"][0]["role"], "system");
        assert_eq!(raw["messages"][1]["content"], "hi");
    }
}
