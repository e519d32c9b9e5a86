//! Classifier node: pick one label for the rendered input.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::NodeError;
use crate::extract::{extract_label, LABEL_FIELD};
use crate::graph::ExecutionContext;
use crate::llm::LlmClient;
use crate::state::{SessionState, StateUpdate};
use crate::template::render;

use super::llm_node::DEFAULT_LLM_TIMEOUT;
use super::NodeAction;

/// Label written when the provider call fails or times out. Matches no
/// candidate, so the conditional edge sends it to the default branch, and
/// the persisted state records why that route was taken.
pub const DEFAULT_FALLBACK_LABEL: &str = "classify_failed";

/// Intent-classification node.
///
/// Renders its input template, asks the model to pick one of the candidate
/// labels, and runs the raw response through the extraction fallback chain
/// (fence strip → JSON parse → label field → trimmed text). Never errors:
/// some label is always written, and a provider failure yields the
/// fallback label, which the conditional edge sends to its default branch.
pub struct ClassifierNode {
    llm: Arc<dyn LlmClient>,
    input: String,
    labels: Vec<String>,
    output_key: String,
    timeout: Duration,
    fallback: String,
}

impl ClassifierNode {
    /// Creates a classifier over the candidate `labels`.
    pub fn new(
        llm: Arc<dyn LlmClient>,
        input: impl Into<String>,
        labels: impl IntoIterator<Item = impl Into<String>>,
        output_key: impl Into<String>,
    ) -> Self {
        Self {
            llm,
            input: input.into(),
            labels: labels.into_iter().map(Into::into).collect(),
            output_key: output_key.into(),
            timeout: DEFAULT_LLM_TIMEOUT,
            fallback: DEFAULT_FALLBACK_LABEL.into(),
        }
    }

    /// Overrides the call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the label written when the provider call fails.
    pub fn with_fallback(mut self, label: impl Into<String>) -> Self {
        self.fallback = label.into();
        self
    }
}

#[async_trait]
impl NodeAction for ClassifierNode {
    async fn apply(
        &self,
        state: &SessionState,
        ctx: &ExecutionContext,
    ) -> Result<StateUpdate, NodeError> {
        let input = render(&self.input, state);
        let raw = match timeout(self.timeout, self.llm.classify(&input, &self.labels)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(error)) => {
                warn!(node = %ctx.node_id(), %error, label = %self.fallback, "classify call failed, using fallback label");
                self.fallback.clone()
            }
            Err(_) => {
                warn!(
                    node = %ctx.node_id(),
                    seconds = self.timeout.as_secs(),
                    label = %self.fallback,
                    "classify call timed out, using fallback label"
                );
                self.fallback.clone()
            }
        };
        let label = extract_label(&raw, LABEL_FIELD);
        debug!(node = %ctx.node_id(), label = %label, "classified");
        Ok(StateUpdate::new().with(self.output_key.clone(), label))
    }
}
