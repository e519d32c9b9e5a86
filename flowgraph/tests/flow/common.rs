//! Shared fixtures: trivial nodes and state readers used across modules.

use std::sync::Arc;

use async_trait::async_trait;
use flowgraph::{ExecutionContext, NodeAction, NodeError, SessionState, StateUpdate, StateValue};

/// Writes a fixed value to a fixed key.
pub struct SetNode {
    key: &'static str,
    value: &'static str,
}

#[async_trait]
impl NodeAction for SetNode {
    async fn apply(
        &self,
        _state: &SessionState,
        _ctx: &ExecutionContext,
    ) -> Result<StateUpdate, NodeError> {
        Ok(StateUpdate::new().with(self.key, self.value))
    }
}

pub fn set(key: &'static str, value: &'static str) -> Arc<dyn NodeAction> {
    Arc::new(SetNode { key, value })
}

/// Appends its tag to the Append-bound `trail` key, recording traversal order.
pub struct RecordNode {
    tag: &'static str,
}

#[async_trait]
impl NodeAction for RecordNode {
    async fn apply(
        &self,
        _state: &SessionState,
        _ctx: &ExecutionContext,
    ) -> Result<StateUpdate, NodeError> {
        Ok(StateUpdate::new().with("trail", self.tag))
    }
}

pub fn record(tag: &'static str) -> Arc<dyn NodeAction> {
    Arc::new(RecordNode { tag })
}

/// Always fails.
pub struct FailNode;

#[async_trait]
impl NodeAction for FailNode {
    async fn apply(
        &self,
        _state: &SessionState,
        _ctx: &ExecutionContext,
    ) -> Result<StateUpdate, NodeError> {
        Err(NodeError::MissingKey("wanted".into()))
    }
}

pub fn failing() -> Arc<dyn NodeAction> {
    Arc::new(FailNode)
}

/// The `trail` entries as plain strings.
pub fn trail(state: &SessionState) -> Vec<String> {
    state
        .get("trail")
        .and_then(StateValue::as_list)
        .map(|items| {
            items
                .iter()
                .filter_map(StateValue::as_text)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
