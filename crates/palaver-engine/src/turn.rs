//! Turns and the conversation history.
//!
//! A [`Turn`] is one message in the dialogue. The [`History`] is the ordered,
//! append-only list of turns that gets resent to the remote assistant on
//! every request.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person typing or speaking.
    User,
    /// The remote assistant (including the local welcome message).
    Assistant,
}

impl Role {
    /// Lowercase label used in logs and exports.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single message in a conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    content: String,
}

impl Turn {
    /// Create a turn with an explicit role.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Role of the author.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Message content. May contain inline markup.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Consume the turn, returning its content.
    pub fn into_content(self) -> String {
        self.content
    }
}

/// Ordered, append-only conversation history.
///
/// Turns are never reordered or removed. Roles are expected to alternate;
/// a repeated role is tolerated but logged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    turns: Vec<Turn>,
}

impl History {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn.
    pub fn push(&mut self, turn: Turn) {
        if let Some(last) = self.turns.last() {
            if last.role == turn.role {
                warn!(
                    role = %turn.role,
                    position = self.turns.len(),
                    "consecutive turns share the same role"
                );
            }
        }
        self.turns.push(turn);
    }

    /// Number of turns recorded.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether no turns have been recorded.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The most recent turn.
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// All turns in insertion order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Iterate over turns in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.turns.iter()
    }

    /// Owned copy of the turns, handed to the remote client per request.
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.clone()
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}
