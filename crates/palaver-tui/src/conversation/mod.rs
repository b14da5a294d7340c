//! Conversation pane: the transcript of user and assistant messages.

mod transcript;
mod widget;

pub use transcript::{DisplayMessage, TranscriptState};
pub use widget::ConversationPane;
