//! Traversal and node execution error types.
//!
//! Build-time validation errors live in
//! [`GraphBuildError`](crate::graph::GraphBuildError); this module covers
//! everything that can go wrong while a compiled flow runs.

use thiserror::Error;

use crate::state::SessionState;

/// Error raised inside a node action.
///
/// Provider failures are normally absorbed at the node boundary (the node
/// substitutes a labeled fallback string); `Provider` exists for nodes that
/// have no meaningful fallback. Wrapped into
/// [`FlowError::NodeExecution`] with the failing node's id by the executor.
#[derive(Debug, Error)]
pub enum NodeError {
    /// External call failed and the node chose not to substitute a fallback.
    #[error("provider call failed: {0}")]
    Provider(String),

    /// A state key the node requires is absent.
    #[error("missing state key: {0}")]
    MissingKey(String),

    /// Fan-in gave up: expected result keys still missing after the bounded
    /// number of collector rounds.
    #[error("fan-in incomplete after {rounds} rounds; missing: {missing:?}")]
    JoinIncomplete {
        rounds: usize,
        missing: Vec<String>,
    },

    /// A nested sub-flow failed; the child's error is the cause.
    #[error("sub-flow failed: {0}")]
    SubFlow(#[source] Box<FlowError>),
}

/// Error aborting one traversal.
///
/// `NodeExecution` and `StepLimit` carry the state accumulated so far,
/// which is useful for diagnostics but never a valid terminal result.
#[derive(Debug, Error)]
pub enum FlowError {
    /// Routing reached a spot the graph does not define: a predicate label
    /// with no mapped target and no default branch, a node with no outgoing
    /// route, or an unknown entry node. Detected the first time traversal
    /// gets there.
    #[error("configuration error at node {node}: {message}")]
    Configuration { node: String, message: String },

    /// A node action failed; traversal aborted at that node.
    #[error("node {node} failed: {source}")]
    NodeExecution {
        node: String,
        #[source]
        source: NodeError,
        state: Box<SessionState>,
    },

    /// The step ceiling tripped, guarding against misbehaving predicates
    /// and a fan-in that never completes.
    #[error("step limit {limit} exceeded at node {node}")]
    StepLimit {
        limit: usize,
        node: String,
        state: Box<SessionState>,
    },
}

impl FlowError {
    /// State accumulated before the failure, when the variant retains it.
    pub fn partial_state(&self) -> Option<&SessionState> {
        match self {
            Self::NodeExecution { state, .. } | Self::StepLimit { state, .. } => Some(state),
            Self::Configuration { .. } => None,
        }
    }

    /// Id of the node the traversal stopped at.
    pub fn node_id(&self) -> &str {
        match self {
            Self::Configuration { node, .. }
            | Self::NodeExecution { node, .. }
            | Self::StepLimit { node, .. } => node,
        }
    }
}
