//! Domain types for the chat conversation shown next to the input box.

use serde::{Deserialize, Serialize};

/// Who spoke a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Text typed by the person using the chat widget.
    User,
    /// Status messages produced by the generator.
    Assistant,
}

impl Role {
    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single message in the conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// The message text.
    pub text: String,

    /// Who sent it.
    pub role: Role,
}

impl Turn {
    /// Create a turn spoken by the user.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            role: Role::User,
        }
    }

    /// Create a turn spoken by the assistant.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            role: Role::Assistant,
        }
    }
}

/// Opaque per-conversation context owned by the UI.
///
/// The generator threads it through untouched, so whatever the caller
/// passes in comes back out unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationState(pub Option<serde_json::Value>);

impl ConversationState {
    /// An empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an arbitrary JSON value.
    pub fn from_value(value: serde_json::Value) -> Self {
        Self(Some(value))
    }

    /// Borrow the wrapped value, if any.
    pub fn value(&self) -> Option<&serde_json::Value> {
        self.0.as_ref()
    }
}
