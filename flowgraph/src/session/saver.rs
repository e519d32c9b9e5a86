//! Session savers: terminal state stored per session id.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;

use crate::session::serializer::{JsonSerializer, StateSerializer};
use crate::state::SessionState;

/// Persistence failure.
#[derive(Debug, Error)]
pub enum PersistError {
    /// State could not be encoded or decoded.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The storage backend rejected the operation.
    #[error("storage backend failed: {0}")]
    Backend(String),
}

/// Stores terminal session state keyed by session id.
///
/// The executor saves after a successful run whose config names a session;
/// callers load on the next turn to continue the conversation. Failed runs
/// are never saved.
///
/// **Interaction**: Attached via
/// [`FlowGraph::compile_with_saver`](crate::graph::FlowGraph::compile_with_saver).
#[async_trait]
pub trait SessionSaver: Send + Sync {
    async fn save(&self, session_id: &str, state: &SessionState) -> Result<(), PersistError>;
    async fn load(&self, session_id: &str) -> Result<Option<SessionState>, PersistError>;
}

/// In-memory saver holding serialized snapshots in a `DashMap`.
///
/// Runs state through the configured serializer exactly as a persistent
/// backend would, so serializer problems surface in tests too. Data is
/// lost when the saver drops; use for development and tests.
pub struct MemorySaver {
    data: DashMap<String, Vec<u8>>,
    serializer: Arc<dyn StateSerializer>,
}

impl MemorySaver {
    /// Creates a saver using the JSON serializer.
    pub fn new() -> Self {
        Self::with_serializer(Arc::new(JsonSerializer))
    }

    /// Creates a saver with a custom serializer.
    pub fn with_serializer(serializer: Arc<dyn StateSerializer>) -> Self {
        Self {
            data: DashMap::new(),
            serializer,
        }
    }

    /// Number of sessions currently stored.
    pub fn session_count(&self) -> usize {
        self.data.len()
    }
}

impl Default for MemorySaver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionSaver for MemorySaver {
    async fn save(&self, session_id: &str, state: &SessionState) -> Result<(), PersistError> {
        let bytes = self.serializer.serialize(state)?;
        self.data.insert(session_id.to_string(), bytes);
        Ok(())
    }

    async fn load(&self, session_id: &str) -> Result<Option<SessionState>, PersistError> {
        match self.data.get(session_id) {
            Some(bytes) => Ok(Some(self.serializer.deserialize(&bytes)?)),
            None => Ok(None),
        }
    }
}
