//! palaver-engine: Headless engine for voice-enabled chat sessions
//!
//! This crate provides the conversation core for palaver, including:
//! - Turns, history and the `/chat` wire format
//! - The remote assistant client
//! - The session controller and its background driver
//! - Speech input and output adapters
//! - Configuration and markup presentation

pub mod client;
pub mod config;
pub mod driver;
pub mod markup;
pub mod session;
pub mod speech;
pub mod surface;
pub mod turn;
pub mod wire;

// Re-export commonly used types
pub use client::{chat_endpoint, AssistantClient, HttpAssistantClient, RemoteAssistantError};
pub use config::{Config, ConfigError, SpeechConfig, DEFAULT_CONFIG_PATH, DEFAULT_WELCOME_MESSAGE};
pub use driver::{start_session, SessionCommand, SessionHandle};
pub use markup::MarkupMode;
pub use session::{SessionController, SessionState, TurnOutcome, REPLY_ERROR_MESSAGE};
pub use speech::{
    discover_speech, select_recognizer, select_speech_output, SpeechCapabilities, SpeechError,
    SpeechInputAdapter, SpeechOutput, SpeechRecognizer, TranscriptSink,
};
pub use surface::{
    drain_events, ChannelSurface, InputSource, Renderer, SurfaceEvent, VoiceControl,
};
pub use turn::{History, Role, Turn};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_version() {
        let version = engine_version();
        assert!(!version.is_empty());
        assert!(version.starts_with("0."));
    }
}
