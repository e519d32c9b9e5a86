//! Sub-flow node: runs a compiled child flow as one parent step.

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::error::NodeError;
use crate::graph::{CompiledFlow, ExecutionContext};
use crate::session::RunConfig;
use crate::state::{SessionState, StateUpdate};

use super::NodeAction;

/// Runs a child flow to completion inside one parent node step.
///
/// The child gets a fresh state holding only the declared input keys
/// copied from the parent, runs under a derived session id
/// (`parent:discriminator:uuid`), and on success contributes only the
/// declared output keys back. Input keys absent from the parent are not
/// copied; output keys absent from the child's terminal state are
/// skipped. A child failure surfaces as [`NodeError::SubFlow`] carrying
/// the child's error, which aborts the parent at this node.
///
/// **Interaction**: Wraps a [`CompiledFlow`]; the parent executor treats
/// it like any other node.
pub struct SubFlowNode {
    child: CompiledFlow,
    discriminator: String,
    input_keys: Vec<String>,
    output_keys: Vec<String>,
}

impl SubFlowNode {
    /// Creates a sub-flow node around `child`. The discriminator names the
    /// child in derived session ids.
    pub fn new(child: CompiledFlow, discriminator: impl Into<String>) -> Self {
        Self {
            child,
            discriminator: discriminator.into(),
            input_keys: Vec::new(),
            output_keys: Vec::new(),
        }
    }

    /// Parent keys copied into the child's initial state.
    pub fn with_inputs(mut self, keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.input_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Child terminal keys merged back into the parent.
    pub fn with_outputs(mut self, keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.output_keys = keys.into_iter().map(Into::into).collect();
        self
    }
}

#[async_trait]
impl NodeAction for SubFlowNode {
    async fn apply(
        &self,
        state: &SessionState,
        ctx: &ExecutionContext,
    ) -> Result<StateUpdate, NodeError> {
        let child_session = format!(
            "{}:{}:{}",
            ctx.session_id(),
            self.discriminator,
            Uuid::new_v4()
        );

        let mut child_state = self.child.initial_state();
        let mut seed = StateUpdate::new();
        for key in &self.input_keys {
            if let Some(value) = state.get(key) {
                seed.set(key.clone(), value.clone());
            }
        }
        child_state.apply(seed);

        debug!(
            node = %ctx.node_id(),
            child_session = %child_session,
            "entering sub-flow"
        );
        let terminal = self
            .child
            .invoke(child_state, Some(RunConfig::for_session(&child_session)))
            .await
            .map_err(|error| NodeError::SubFlow(Box::new(error)))?;

        let mut update = StateUpdate::new();
        for key in &self.output_keys {
            if let Some(value) = terminal.get(key) {
                update.set(key.clone(), value.clone());
            }
        }
        Ok(update)
    }
}
