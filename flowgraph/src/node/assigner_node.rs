//! Assigner node: copy one state key to another.

use async_trait::async_trait;

use crate::error::NodeError;
use crate::graph::ExecutionContext;
use crate::state::{SessionState, StateUpdate, StateValue};

use super::NodeAction;

/// Copies the source key's value to the target key.
///
/// `overwrite` names the write mode: the target's previous value is fully
/// replaced, subject to the target key's own merge binding. A missing
/// source writes empty text, so downstream templates see a value either
/// way.
pub struct AssignerNode {
    source: String,
    target: String,
}

impl AssignerNode {
    /// Creates an assigner in overwrite mode.
    pub fn overwrite(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

#[async_trait]
impl NodeAction for AssignerNode {
    async fn apply(
        &self,
        state: &SessionState,
        _ctx: &ExecutionContext,
    ) -> Result<StateUpdate, NodeError> {
        let value = state
            .get(&self.source)
            .cloned()
            .unwrap_or_else(|| StateValue::Text(String::new()));
        Ok(StateUpdate::new().with(self.target.clone(), value))
    }
}
