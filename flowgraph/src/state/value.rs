//! Tagged state values: scalars, ordered sequences, and chat messages.
//!
//! `StateValue` is a closed enum so merge strategies can be checked against
//! the value shape when a key is first bound. Serde uses adjacent tagging,
//! which keeps `ChatMessage` subtypes distinct across serialize/deserialize
//! (an `Assistant` message never collapses into a plain string).

use serde::{Deserialize, Serialize};

/// One message in a conversation trail, tagged by role.
///
/// **Interaction**: Stored in state under `StateValue::Message`; typically
/// accumulated under an Append-bound key (e.g. `"messages"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "content")]
pub enum ChatMessage {
    /// System instruction.
    System(String),
    /// End-user input.
    User(String),
    /// Model output.
    Assistant(String),
}

impl ChatMessage {
    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::System(content.into())
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::User(content.into())
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant(content.into())
    }

    /// Message text regardless of role.
    pub fn content(&self) -> &str {
        match self {
            Self::System(s) | Self::User(s) | Self::Assistant(s) => s,
        }
    }
}

/// A value stored in session state.
///
/// Closed set: scalars (`Text`, `Int`, `Bool`), ordered sequence (`List`),
/// structured message (`Message`). Node outputs and merge strategies operate
/// on this type only; there is no open "any" escape hatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum StateValue {
    /// Plain text scalar.
    Text(String),
    /// Integer scalar (counters, round numbers).
    Int(i64),
    /// Boolean scalar (flags).
    Bool(bool),
    /// Ordered sequence; the shape Append-bound keys take.
    List(Vec<StateValue>),
    /// Structured chat message with a role subtype.
    Message(ChatMessage),
}

impl StateValue {
    /// Text content if this is a `Text` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integer content if this is an `Int` value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Sequence content if this is a `List` value.
    pub fn as_list(&self) -> Option<&[StateValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Renders the value as display text for prompt templates.
    ///
    /// Lists join their rendered items with `", "`; messages render their
    /// content without the role tag.
    pub fn display_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Int(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::List(items) => items
                .iter()
                .map(StateValue::display_text)
                .collect::<Vec<_>>()
                .join(", "),
            Self::Message(m) => m.content().to_string(),
        }
    }
}

impl From<String> for StateValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for StateValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<i64> for StateValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<bool> for StateValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<ChatMessage> for StateValue {
    fn from(m: ChatMessage) -> Self {
        Self::Message(m)
    }
}

impl From<Vec<StateValue>> for StateValue {
    fn from(items: Vec<StateValue>) -> Self {
        Self::List(items)
    }
}
