use crate::error::{LlmError, Result};
use std::future::Future;
use tokio::task::JoinHandle;

/// Holds at most one in-flight text-generation request.
///
/// Starting a request aborts the previous one first, so two responses never
/// write to the same output.
#[derive(Debug, Default)]
pub struct RequestSlot {
    current: Option<JoinHandle<Result<String>>>,
}

impl RequestSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `request` on the current tokio runtime, cancelling any request
    /// still running in this slot.
    pub fn start<F>(&mut self, request: F)
    where
        F: Future<Output = Result<String>> + Send + 'static,
    {
        self.cancel();
        self.current = Some(tokio::spawn(request));
    }

    pub fn cancel(&mut self) {
        if self.is_active() {
            log::info!("Cancelling superseded text-generation request");
        }
        if let Some(previous) = self.current.take() {
            previous.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Wait for the current request. An empty slot or an aborted request
    /// reports [`LlmError::Cancelled`].
    pub async fn wait(&mut self) -> Result<String> {
        let Some(handle) = self.current.take() else {
            return Err(LlmError::Cancelled);
        };
        match handle.await {
            Ok(result) => result,
            Err(err) if err.is_cancelled() => Err(LlmError::Cancelled),
            Err(err) => {
                log::error!("Text-generation task failed: {err}");
                Err(LlmError::Http {
                    message: err.to_string(),
                })
            }
        }
    }
}

impl Drop for RequestSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}
