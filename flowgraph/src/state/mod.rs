//! Session state model: tagged values, merge strategies, keyed store.
//!
//! One state instance per session; nodes return [`StateUpdate`]s and the
//! executor merges them per key binding. See [`SessionState::apply`].

mod store;
mod strategy;
mod value;

pub use store::{SessionState, StateUpdate};
pub use strategy::MergeStrategy;
pub use value::{ChatMessage, StateValue};
