//! Answer node: pure template render, no external call.

use async_trait::async_trait;

use crate::error::NodeError;
use crate::graph::ExecutionContext;
use crate::state::{SessionState, StateUpdate};
use crate::template::render;

use super::NodeAction;

/// Renders a template against state into the output key.
///
/// The terminal shaping step of most flows: picks the branch's reply out
/// of state (e.g. `"{chat_reply}"`) or composes several keys into one
/// user-facing answer.
pub struct AnswerNode {
    template: String,
    output_key: String,
}

impl AnswerNode {
    /// Creates an answer node rendering `template` into `output_key`.
    pub fn new(template: impl Into<String>, output_key: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            output_key: output_key.into(),
        }
    }
}

#[async_trait]
impl NodeAction for AnswerNode {
    async fn apply(
        &self,
        state: &SessionState,
        _ctx: &ExecutionContext,
    ) -> Result<StateUpdate, NodeError> {
        let text = render(&self.template, state);
        Ok(StateUpdate::new().with(self.output_key.clone(), text))
    }
}
