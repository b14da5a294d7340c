//! Conversation session controller.
//!
//! Owns one conversation: its [`History`] and [`SessionState`]. Every
//! submission, typed or spoken, enters through [`SessionController::submit_turn`],
//! which echoes the message, records it, asks the remote assistant, and
//! renders whatever comes back.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::client::{AssistantClient, RemoteAssistantError};
use crate::config::DEFAULT_WELCOME_MESSAGE;
use crate::speech::SpeechOutput;
use crate::surface::{InputSource, Renderer};
use crate::turn::{History, Role, Turn};

/// Rendered in place of a reply when the remote assistant fails.
pub const REPLY_ERROR_MESSAGE: &str = "Error: Could not get a response from the server.";

/// Whether a reply is outstanding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Ready for a submission.
    #[default]
    Idle,
    /// A request is in flight; submission is disabled.
    AwaitingReply,
}

/// What happened to a submission.
#[derive(Debug)]
pub enum TurnOutcome {
    /// Blank input; nothing happened.
    Ignored,
    /// The assistant replied with this turn.
    Replied(Turn),
    /// The request failed; the fixed error message was rendered instead.
    Failed(RemoteAssistantError),
}

impl TurnOutcome {
    /// The reply turn, if the assistant answered.
    pub fn reply(&self) -> Option<&Turn> {
        match self {
            TurnOutcome::Replied(turn) => Some(turn),
            _ => None,
        }
    }
}

/// Drives a single conversation.
pub struct SessionController {
    id: Uuid,
    history: History,
    state: SessionState,
    welcome_message: String,
    client: Arc<dyn AssistantClient>,
    renderer: Arc<dyn Renderer>,
    input: Arc<dyn InputSource>,
    speech: Arc<dyn SpeechOutput>,
}

impl SessionController {
    /// Create a controller with an empty history, in `Idle`.
    pub fn new(
        client: Arc<dyn AssistantClient>,
        renderer: Arc<dyn Renderer>,
        input: Arc<dyn InputSource>,
        speech: Arc<dyn SpeechOutput>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            history: History::new(),
            state: SessionState::Idle,
            welcome_message: DEFAULT_WELCOME_MESSAGE.to_string(),
            client,
            renderer,
            input,
            speech,
        }
    }

    /// Replace the greeting used by [`initialize_session`](Self::initialize_session).
    #[must_use]
    pub fn with_welcome_message(mut self, message: impl Into<String>) -> Self {
        self.welcome_message = message.into();
        self
    }

    /// Session identifier, attached to log events.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The conversation so far.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Seed the conversation with the welcome message.
    ///
    /// The greeting is rendered, recorded as the first assistant turn, and
    /// spoken. Has no effect once the history is non-empty.
    pub fn initialize_session(&mut self) {
        if !self.history.is_empty() {
            warn!(session = %self.id, "session already initialized");
            return;
        }

        info!(session = %self.id, "session started");
        self.renderer
            .append_message(&self.welcome_message, Role::Assistant);
        self.history.push(Turn::assistant(self.welcome_message.clone()));
        self.speech.speak(&self.welcome_message);
    }

    /// Submit one user message and wait for the assistant.
    ///
    /// Input is trimmed; blank input is ignored. A failed request renders
    /// [`REPLY_ERROR_MESSAGE`] and leaves the user turn in the history. The
    /// typing indicator and submission lock are released on every exit,
    /// including when this future is dropped before completing.
    pub async fn submit_turn(&mut self, text: &str) -> TurnOutcome {
        let text = text.trim();
        if text.is_empty() {
            debug!(session = %self.id, "ignoring blank submission");
            return TurnOutcome::Ignored;
        }

        self.renderer.append_message(text, Role::User);
        self.history.push(Turn::user(text));
        self.input.clear();

        let _awaiting = AwaitingReply::enter(&mut self.state, self.renderer.as_ref());
        debug!(session = %self.id, turns = self.history.len(), "requesting reply");

        match self.client.send(text, self.history.snapshot()).await {
            Ok(reply) => {
                self.history.push(reply.clone());
                self.renderer.append_message(reply.content(), Role::Assistant);
                self.speech.speak(reply.content());
                debug!(session = %self.id, turns = self.history.len(), "reply received");
                TurnOutcome::Replied(reply)
            }
            Err(err) => {
                warn!(session = %self.id, error = %err, "assistant request failed");
                self.renderer
                    .append_message(REPLY_ERROR_MESSAGE, Role::Assistant);
                TurnOutcome::Failed(err)
            }
        }
    }
}

/// Holds the session in `AwaitingReply` and restores `Idle` on drop.
struct AwaitingReply<'a> {
    state: &'a mut SessionState,
    renderer: &'a dyn Renderer,
}

impl<'a> AwaitingReply<'a> {
    fn enter(state: &'a mut SessionState, renderer: &'a dyn Renderer) -> Self {
        *state = SessionState::AwaitingReply;
        renderer.set_typing_indicator(true);
        renderer.set_input_enabled(false);
        Self { state, renderer }
    }
}

impl Drop for AwaitingReply<'_> {
    fn drop(&mut self) {
        self.renderer.set_typing_indicator(false);
        self.renderer.set_input_enabled(true);
        *self.state = SessionState::Idle;
    }
}
