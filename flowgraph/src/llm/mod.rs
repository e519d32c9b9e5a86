//! Language-model client abstraction for prompt-driven nodes.
//!
//! Nodes depend on [`LlmClient`], never on a concrete provider. The trait
//! covers the three call shapes flows use: one-shot completion, streamed
//! completion, and label classification. Only `complete` is required; the
//! default methods express streaming as a single chunk and classification
//! as a completion over an instruction prompt.

mod mock;

pub use mock::MockLlm;

use std::pin::Pin;

use async_trait::async_trait;
use thiserror::Error;
use tokio_stream::Stream;

/// Failure of a provider call.
///
/// Never escapes a node: nodes substitute a labeled fallback string at
/// their boundary so the flow keeps moving.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The provider rejected the call or the transport failed.
    #[error("provider error: {0}")]
    Provider(String),

    /// The call outlived its deadline.
    #[error("provider call timed out after {seconds}s")]
    Timeout { seconds: u64 },
}

/// Lazy, finite sequence of response text chunks.
///
/// Consumed exactly once; a failed stream is not restartable.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

/// Client for one language-model provider.
///
/// **Interaction**: `LlmNode` calls [`complete`](LlmClient::complete) or
/// [`complete_stream`](LlmClient::complete_stream) with a rendered prompt;
/// `ClassifierNode` calls [`classify`](LlmClient::classify) and runs the
/// response through [`extract_label`](crate::extract::extract_label).
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// One completion: full response text for `prompt`.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    /// Streamed completion. The default delegates to `complete` and yields
    /// the whole response as one chunk; providers with token streaming
    /// override this.
    async fn complete_stream(&self, prompt: &str) -> Result<TextStream, LlmError> {
        let full = self.complete(prompt).await?;
        Ok(Box::pin(tokio_stream::once(Ok(full))))
    }

    /// Picks one of `labels` for `prompt`. The default wraps the input in a
    /// classification instruction and returns the raw completion; the
    /// response may be fenced JSON, bare JSON, or a plain label.
    async fn classify(&self, prompt: &str, labels: &[String]) -> Result<String, LlmError> {
        self.complete(&classification_prompt(prompt, labels)).await
    }
}

/// Instruction prompt asking the model to pick one category as JSON.
fn classification_prompt(input: &str, labels: &[String]) -> String {
    format!(
        "Classify the input into exactly one of these categories: {}.\n\
         Respond with JSON: {{\"category_name\": \"<category>\"}}.\n\n\
         Input: {}",
        labels.join(", "),
        input
    )
}
