//! Scripted in-memory client for tests and examples.

use std::time::Duration;

use async_trait::async_trait;

use super::{LlmClient, LlmError, TextStream};

/// Deterministic [`LlmClient`] with substring-matched scripted replies.
///
/// The first rule whose pattern occurs in the prompt wins; otherwise the
/// default reply is returned. Knobs cover artificial delay, forced
/// failure, mid-stream failure and chunked streaming, so fallback and
/// timeout paths run without a live provider.
pub struct MockLlm {
    rules: Vec<(String, String)>,
    default_reply: String,
    delay: Option<Duration>,
    fail_with: Option<String>,
    fail_stream_after: Option<(usize, String)>,
    chunk_size: usize,
}

impl MockLlm {
    /// Client answering every prompt with `default_reply`.
    pub fn new(default_reply: impl Into<String>) -> Self {
        Self {
            rules: Vec::new(),
            default_reply: default_reply.into(),
            delay: None,
            fail_with: None,
            fail_stream_after: None,
            chunk_size: 0,
        }
    }

    /// Adds a scripted reply for prompts containing `pattern`.
    /// Rules are checked in insertion order.
    pub fn on(mut self, pattern: impl Into<String>, reply: impl Into<String>) -> Self {
        self.rules.push((pattern.into(), reply.into()));
        self
    }

    /// Sleeps this long before every reply.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Makes every call fail with a provider error.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.fail_with = Some(message.into());
        self
    }

    /// Streams emit `chunks` items, then an error. `complete` is unaffected.
    pub fn failing_stream_after(mut self, chunks: usize, message: impl Into<String>) -> Self {
        self.fail_stream_after = Some((chunks, message.into()));
        self
    }

    /// Splits streamed replies into chunks of at most `chars` characters.
    /// Zero (the default) streams the whole reply as one chunk.
    pub fn with_chunk_size(mut self, chars: usize) -> Self {
        self.chunk_size = chars;
        self
    }

    fn reply_for(&self, prompt: &str) -> String {
        self.rules
            .iter()
            .find(|(pattern, _)| prompt.contains(pattern.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| self.default_reply.clone())
    }

    fn chunks_of(&self, reply: &str) -> Vec<String> {
        if self.chunk_size == 0 || reply.is_empty() {
            return vec![reply.to_string()];
        }
        let chars: Vec<char> = reply.chars().collect();
        chars
            .chunks(self.chunk_size)
            .map(|c| c.iter().collect())
            .collect()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.fail_with {
            return Err(LlmError::Provider(message.clone()));
        }
        Ok(self.reply_for(prompt))
    }

    async fn complete_stream(&self, prompt: &str) -> Result<TextStream, LlmError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.fail_with {
            return Err(LlmError::Provider(message.clone()));
        }
        let mut items: Vec<Result<String, LlmError>> = self
            .chunks_of(&self.reply_for(prompt))
            .into_iter()
            .map(Ok)
            .collect();
        if let Some((after, message)) = &self.fail_stream_after {
            items.truncate(*after);
            items.push(Err(LlmError::Provider(message.clone())));
        }
        Ok(Box::pin(tokio_stream::iter(items)))
    }
}
