//! Session state: keyed values merged under per-key strategies.
//!
//! One `SessionState` belongs to one session and is mutated only by the
//! executor merging the current node's `StateUpdate` between steps. Nodes
//! read it and return partial updates; they never write it directly.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::strategy::MergeStrategy;
use super::value::StateValue;

/// Partial update produced by one node execution.
///
/// Entries keep insertion order so that two writes to the same Append-bound
/// key within a single update merge deterministically.
///
/// **Interaction**: Returned by
/// [`NodeAction::apply`](crate::node::NodeAction::apply); consumed by
/// [`SessionState::apply`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    entries: Vec<(String, StateValue)>,
}

impl StateUpdate {
    /// Creates an empty update (a no-op when applied).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<StateValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Adds an entry.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<StateValue>) {
        self.entries.push((key.into(), value.into()));
    }

    /// True when the update carries no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &(String, StateValue)> {
        self.entries.iter()
    }

    /// Last value written for `key` within this update, if any.
    pub fn get(&self, key: &str) -> Option<&StateValue> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

impl IntoIterator for StateUpdate {
    type Item = (String, StateValue);
    type IntoIter = std::vec::IntoIter<(String, StateValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Keyed value container for one session, with per-key merge strategies.
///
/// A key's strategy comes from an explicit [`bind`](Self::bind) declaration
/// (or the graph's bindings, seeded at invoke) and is fixed the first time
/// the key is written; undeclared keys bind [`MergeStrategy::Replace`].
///
/// **Interaction**: Built by callers or
/// [`CompiledFlow::initial_state`](crate::graph::CompiledFlow::initial_state);
/// mutated by the executor via [`apply`](Self::apply); serialized through
/// [`StateSerializer`](crate::session::StateSerializer).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    values: HashMap<String, StateValue>,
    strategies: HashMap<String, MergeStrategy>,
}

impl SessionState {
    /// Creates an empty state with no bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the merge strategy for a key, builder style.
    ///
    /// A strategy already bound (declared or fixed by a first write) wins;
    /// re-binding is ignored so a key never changes aggregation mid-session.
    pub fn bind(mut self, key: impl Into<String>, strategy: MergeStrategy) -> Self {
        self.strategies.entry(key.into()).or_insert(strategy);
        self
    }

    /// Seeds bindings for keys that have none yet. Existing bindings win.
    pub(crate) fn seed_bindings(&mut self, bindings: &HashMap<String, MergeStrategy>) {
        for (key, strategy) in bindings {
            self.strategies.entry(key.clone()).or_insert(*strategy);
        }
    }

    /// Value under `key`, if present.
    pub fn get(&self, key: &str) -> Option<&StateValue> {
        self.values.get(key)
    }

    /// True when `key` holds a value.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Text under `key`, or `default` when absent or not text.
    pub fn text_or(&self, key: &str, default: &str) -> String {
        self.get(key)
            .and_then(StateValue::as_text)
            .unwrap_or(default)
            .to_string()
    }

    /// Integer under `key`, or `default` when absent or not an integer.
    pub fn int_or(&self, key: &str, default: i64) -> i64 {
        self.get(key).and_then(StateValue::as_int).unwrap_or(default)
    }

    /// Strategy currently governing `key`: bound or declared, else Replace.
    pub fn strategy_for(&self, key: &str) -> MergeStrategy {
        self.strategies.get(key).copied().unwrap_or_default()
    }

    /// Keys currently holding a value.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Number of keys holding a value.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no key holds a value.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Merges an update, entry by entry in insertion order.
    ///
    /// Each key's strategy is fixed at its first write: `Replace` overwrites
    /// the previous value; `Append` pushes onto the key's list, initializing
    /// the list when the key is absent. Appending a `List` payload extends
    /// the sequence instead of nesting it.
    pub fn apply(&mut self, update: StateUpdate) {
        for (key, value) in update {
            let strategy = *self.strategies.entry(key.clone()).or_default();
            match strategy {
                MergeStrategy::Replace => {
                    self.values.insert(key, value);
                }
                MergeStrategy::Append => {
                    let slot = self
                        .values
                        .entry(key)
                        .or_insert_with(|| StateValue::List(Vec::new()));
                    if !matches!(slot, StateValue::List(_)) {
                        // Key was written before it was Append-bound; keep
                        // the old value as the first element.
                        let previous = std::mem::replace(slot, StateValue::List(Vec::new()));
                        if let StateValue::List(items) = slot {
                            items.push(previous);
                        }
                    }
                    if let StateValue::List(items) = slot {
                        match value {
                            StateValue::List(more) => items.extend(more),
                            single => items.push(single),
                        }
                    }
                }
            }
        }
    }
}
