//! Graph construction error.
//!
//! Returned by `FlowGraph::compile` when the declared structure cannot be
//! executed: unknown endpoints, no entry, or ambiguous routes. Conditions
//! only observable while running (an unmapped label with no default branch,
//! a dead-end node) are reported as
//! [`FlowError::Configuration`](crate::error::FlowError::Configuration)
//! when traversal reaches them.

use thiserror::Error;

/// Error when compiling a flow graph.
#[derive(Debug, Error)]
pub enum GraphBuildError {
    /// An edge endpoint or branch target names a node never registered via
    /// `add_node` (and is not the `START`/`END` sentinel valid there).
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// No single unconditional edge leaves `START`.
    #[error("graph must have exactly one edge from START")]
    MissingStart,

    /// More than one route of the same kind leaves one source.
    #[error("duplicate edge from {0}")]
    DuplicateEdge(String),

    /// A source carries both an unconditional edge and a conditional edge;
    /// the executor would not know which one to follow.
    #[error("node {0} has both an unconditional and a conditional route")]
    ConflictingRoutes(String),

    /// A conditional edge with no labels and no default cannot route anywhere.
    #[error("conditional edge from {0} has no branches")]
    EmptyBranches(String),
}
