//! # Incident LLM
//!
//! Streaming client for an OpenAI-compatible chat-completions service.
//!
//! ```text
//! ChatPrompt ──> OpenAiStreamingClient (reqwest, stream: true)
//!                   │
//!                   ├─ SseDecoder          (data: lines → deltas, [DONE])
//!                   ├─ SnapshotAccumulator (deltas → cumulative snapshots)
//!                   └─ SnapshotStream ──> render_snapshots / SnapshotView
//!
//! RequestSlot: one in-flight request, a new one aborts the previous
//! ```

mod client;
mod config;
mod error;
mod slot;
mod snapshot;
mod sse;

pub use client::{
    render_snapshots, snapshots, OpenAiStreamingClient, SnapshotStream, TextGenerationClient,
};
pub use config::{
    TextGenerationConfig, DEFAULT_LLM_BASE_URL, DEFAULT_LLM_MODEL, DEFAULT_LLM_TIMEOUT_MS,
    ENV_LLM_API_KEY, ENV_LLM_BASE_URL, ENV_LLM_MODEL, ENV_LLM_TIMEOUT_MS,
};
pub use error::{LlmError, Result};
pub use slot::RequestSlot;
pub use snapshot::{SnapshotAccumulator, SnapshotView};
pub use sse::{SseDecoder, StreamEvent};
