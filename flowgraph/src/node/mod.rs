//! Node actions: the work each graph node performs.
//!
//! Every node reads the shared state and returns a partial
//! [`StateUpdate`]; the executor merges it under the session's key
//! bindings before routing. Prompt-driven nodes ([`LlmNode`],
//! [`ClassifierNode`], [`BranchWorkerNode`]) absorb provider failures at
//! their boundary by substituting fallback text, so a flow always moves
//! forward.

mod answer_node;
mod assigner_node;
mod classifier_node;
mod fanout;
mod llm_node;
mod subflow;

pub use answer_node::AnswerNode;
pub use assigner_node::AssignerNode;
pub use classifier_node::{ClassifierNode, DEFAULT_FALLBACK_LABEL};
pub use fanout::{
    BranchWorkerNode, CollectorNode, DispatcherNode, JoinTracker, DEFAULT_MAX_ROUNDS,
    DEFAULT_POLL_DELAY, STATUS_ASSIGNED, STATUS_COMPLETED,
};
pub use llm_node::{LlmNode, DEFAULT_LLM_TIMEOUT};
pub use subflow::SubFlowNode;

use async_trait::async_trait;

use crate::error::NodeError;
use crate::graph::ExecutionContext;
use crate::state::{SessionState, StateUpdate};

/// The work one graph node performs.
///
/// Implementations read state, never write it; the returned update is
/// merged by the executor. Nodes are shared across sessions behind `Arc`,
/// so anything a node keeps between visits must be keyed by
/// [`ExecutionContext::session_id`].
#[async_trait]
pub trait NodeAction: Send + Sync {
    /// Computes this node's partial update against the current state.
    async fn apply(
        &self,
        state: &SessionState,
        ctx: &ExecutionContext,
    ) -> Result<StateUpdate, NodeError>;
}
