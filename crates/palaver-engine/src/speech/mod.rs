//! Speech input and output.
//!
//! Both directions go through external commands so the engine carries no
//! audio stack of its own. Anything missing degrades to silence or to a
//! hidden voice control; speech never blocks a conversation.

pub mod discovery;
pub mod input;
pub mod output;

use std::time::Duration;

pub use discovery::{
    discover_engine, discover_speech, select_recognizer, select_speech_output, synthesizer_argv,
    EngineInfo, SpeechCapabilities, KNOWN_SYNTHESIZERS,
};
pub use input::{CommandRecognizer, SpeechInputAdapter, SpeechRecognizer, TranscriptSink};
pub use output::{CommandSpeaker, SilentSpeech, SpeechOutput};

/// Errors from a speech command.
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    /// The command could not be started.
    #[error("failed to start speech command: {0}")]
    Spawn(#[source] std::io::Error),

    /// I/O error while the command ran.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The command exited unsuccessfully.
    #[error("speech command exited with code {code}: {stderr}")]
    Failed { code: i32, stderr: String },

    /// The capture ran past its time limit.
    #[error("speech capture timed out after {0:?}")]
    Timeout(Duration),
}
