//! JSON wire format for the `/chat` endpoint.
//!
//! The remote service labels assistant turns `"model"` while the rest of the
//! engine uses [`Role::Assistant`]. All translation between the two happens
//! here, in both directions.

use serde::{Deserialize, Serialize};

use crate::turn::{Role, Turn};

/// Role label as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireRole {
    User,
    Model,
}

impl From<Role> for WireRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => WireRole::User,
            Role::Assistant => WireRole::Model,
        }
    }
}

impl From<WireRole> for Role {
    fn from(role: WireRole) -> Self {
        match role {
            WireRole::User => Role::User,
            WireRole::Model => Role::Assistant,
        }
    }
}

/// One text part of a wire turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePart {
    pub text: String,
}

/// A turn as serialized in the request history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireTurn {
    pub role: WireRole,
    pub parts: Vec<WirePart>,
}

impl From<&Turn> for WireTurn {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role().into(),
            parts: vec![WirePart {
                text: turn.content().to_string(),
            }],
        }
    }
}

impl From<WireTurn> for Turn {
    fn from(wire: WireTurn) -> Self {
        let content: String = wire.parts.into_iter().map(|p| p.text).collect();
        Turn::new(wire.role.into(), content)
    }
}

/// Request body for `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The message just submitted.
    pub message: String,
    /// Full history, including the submitted message as its last user turn.
    pub history: Vec<WireTurn>,
}

impl ChatRequest {
    /// Build a request from the outgoing message and a history copy.
    pub fn new(message: impl Into<String>, history: &[Turn]) -> Self {
        Self {
            message: message.into(),
            history: history.iter().map(WireTurn::from).collect(),
        }
    }
}

/// Successful response body. Any other shape is a failure.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

impl ChatResponse {
    /// Convert the reply into an assistant turn.
    pub fn into_turn(self) -> Turn {
        Turn::assistant(self.reply)
    }
}
