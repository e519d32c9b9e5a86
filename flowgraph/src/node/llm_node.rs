//! LLM node: render prompt, call the model, write the response.
//!
//! # Streaming Support
//!
//! A node built with `streaming()` consumes `LlmClient::complete_stream`,
//! forwarding each chunk through `ExecutionContext::forward_chunk` as it
//! arrives and merging the aggregated text into state only once the
//! sequence is exhausted. A mid-stream error substitutes the fallback text
//! for the whole output, so the output key is always written.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use tokio_stream::StreamExt;
use tracing::warn;

use crate::error::NodeError;
use crate::graph::ExecutionContext;
use crate::llm::{LlmClient, LlmError};
use crate::state::{SessionState, StateUpdate};
use crate::template::render;

use super::NodeAction;

/// Ceiling for one provider call unless overridden via `with_timeout`.
pub const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(30);

/// Prompt-completion node.
///
/// Renders its prompt template against state, calls the model under the
/// timeout ceiling, writes the response text to the output key. Provider
/// failure or timeout substitutes the fallback text; the output key is
/// never left unset and provider errors never propagate past this node.
pub struct LlmNode {
    llm: Arc<dyn LlmClient>,
    prompt: String,
    output_key: String,
    timeout: Duration,
    streaming: bool,
    fallback: Option<String>,
}

impl LlmNode {
    /// Creates a blocking completion node.
    pub fn new(
        llm: Arc<dyn LlmClient>,
        prompt: impl Into<String>,
        output_key: impl Into<String>,
    ) -> Self {
        Self {
            llm,
            prompt: prompt.into(),
            output_key: output_key.into(),
            timeout: DEFAULT_LLM_TIMEOUT,
            streaming: false,
            fallback: None,
        }
    }

    /// Switches to streamed consumption (chunks forwarded live, merge
    /// deferred until the stream ends).
    pub fn streaming(mut self) -> Self {
        self.streaming = true;
        self
    }

    /// Overrides the call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the fallback text substituted on provider failure.
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    fn fallback_text(&self) -> String {
        self.fallback
            .clone()
            .unwrap_or_else(|| format!("[{} unavailable]", self.output_key))
    }

    async fn stream_completion(&self, prompt: &str, ctx: &ExecutionContext) -> String {
        let consume = async {
            let mut stream = self.llm.complete_stream(prompt).await?;
            let mut full = String::new();
            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                ctx.forward_chunk(chunk.as_str()).await;
                full.push_str(&chunk);
            }
            Ok::<String, LlmError>(full)
        };
        match timeout(self.timeout, consume).await {
            Ok(Ok(full)) => full,
            Ok(Err(error)) => {
                warn!(node = %ctx.node_id(), %error, "streamed call failed, substituting fallback");
                self.fallback_text()
            }
            Err(_) => {
                warn!(
                    node = %ctx.node_id(),
                    seconds = self.timeout.as_secs(),
                    "streamed call timed out, substituting fallback"
                );
                self.fallback_text()
            }
        }
    }
}

#[async_trait]
impl NodeAction for LlmNode {
    async fn apply(
        &self,
        state: &SessionState,
        ctx: &ExecutionContext,
    ) -> Result<StateUpdate, NodeError> {
        let prompt = render(&self.prompt, state);
        let text = if self.streaming {
            self.stream_completion(&prompt, ctx).await
        } else {
            match timeout(self.timeout, self.llm.complete(&prompt)).await {
                Ok(Ok(text)) => text,
                Ok(Err(error)) => {
                    warn!(node = %ctx.node_id(), %error, "provider call failed, substituting fallback");
                    self.fallback_text()
                }
                Err(_) => {
                    warn!(
                        node = %ctx.node_id(),
                        seconds = self.timeout.as_secs(),
                        "provider call timed out, substituting fallback"
                    );
                    self.fallback_text()
                }
            }
        };
        Ok(StateUpdate::new().with(self.output_key.clone(), text))
    }
}
