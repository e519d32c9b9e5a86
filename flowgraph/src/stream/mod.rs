//! Streaming types for flow runs.
//!
//! Defines the event kinds [`CompiledFlow::stream`](crate::graph::CompiledFlow::stream)
//! emits while a traversal progresses: state snapshots, per-node updates,
//! and live model-output chunks.

use crate::state::{SessionState, StateUpdate};

/// Stream mode selector: which events a streamed run emits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamMode {
    /// Full state snapshot after each node completes.
    Values,
    /// The update each node produced, with its id.
    Updates,
    /// Model-output chunks forwarded live from streaming nodes.
    Messages,
}

/// One event emitted while a flow runs.
#[derive(Clone, Debug)]
pub enum StreamEvent {
    /// Full state after a node finished and its update merged.
    Values(SessionState),
    /// The update one node produced, before the merge.
    Updates { node_id: String, update: StateUpdate },
    /// One chunk of streamed model output, forwarded as it arrives.
    Messages { node_id: String, content: String },
}
