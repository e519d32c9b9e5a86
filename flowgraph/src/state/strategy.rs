//! Per-key merge strategies: how a node's output combines with existing state.

use serde::{Deserialize, Serialize};

/// Rule governing how a write to a key combines with the key's current value.
///
/// A key is bound to exactly one strategy the first time it is written;
/// see [`SessionState::apply`](crate::state::SessionState::apply). Binding
/// the strategy to the key rather than the writer keeps node actions
/// stateless about aggregation policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MergeStrategy {
    /// New value wholly supersedes the old one. Used for fields a later turn
    /// or branch overwrites wholesale (e.g. a reply text).
    #[default]
    Replace,
    /// New value is added to an ordered sequence under the key; an absent key
    /// initializes the sequence. Used for cumulative trails (execution logs,
    /// accumulated task lists).
    Append,
}
