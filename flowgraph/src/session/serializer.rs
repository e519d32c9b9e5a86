//! Serializer for session state (state <-> bytes).
//!
//! Used by saver implementations that hold bytes rather than live values.
//! Round-trips must preserve the key set, every value, message subtypes,
//! and the merge-strategy bindings.

use crate::session::saver::PersistError;
use crate::state::SessionState;

/// Serializes and deserializes session state for storage.
pub trait StateSerializer: Send + Sync {
    fn serialize(&self, state: &SessionState) -> Result<Vec<u8>, PersistError>;
    fn deserialize(&self, bytes: &[u8]) -> Result<SessionState, PersistError>;
}

/// JSON-based serializer.
///
/// The tagged `StateValue` representation keeps `Text`/`Message` and
/// message-role distinctions intact across the round trip.
pub struct JsonSerializer;

impl StateSerializer for JsonSerializer {
    fn serialize(&self, state: &SessionState) -> Result<Vec<u8>, PersistError> {
        serde_json::to_vec(state).map_err(|e| PersistError::Serialization(e.to_string()))
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<SessionState, PersistError> {
        serde_json::from_slice(bytes).map_err(|e| PersistError::Serialization(e.to_string()))
    }
}
