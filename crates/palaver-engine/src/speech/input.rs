//! Voice capture.
//!
//! A [`SpeechRecognizer`] performs one capture and yields at most one final
//! transcript. The [`SpeechInputAdapter`] wraps it with the "listening"
//! flag, single-capture gating, and forwarding to a [`TranscriptSink`].

use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::SpeechError;
use crate::surface::VoiceControl;

/// Environment variable carrying the recognition language to the command.
pub const LANGUAGE_ENV: &str = "PALAVER_SPEECH_LANG";

/// One-shot speech recognition.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Capture a single utterance.
    ///
    /// Returns `Ok(None)` when capture ended without recognizable speech.
    async fn capture(&self) -> Result<Option<String>, SpeechError>;
}

/// Receives finalized transcripts as submissions.
pub trait TranscriptSink: Send + Sync {
    /// Submit a transcript exactly as if it had been typed.
    fn submit_transcript(&self, text: String);
}

/// Recognizer backed by an external command.
///
/// The command runs once per capture and prints the transcript on stdout.
/// It is killed if it outlives the capture timeout.
#[derive(Debug, Clone)]
pub struct CommandRecognizer {
    program: String,
    args: Vec<String>,
    language: String,
    timeout: Duration,
}

impl CommandRecognizer {
    /// Build from a command line. Returns `None` for an empty command.
    pub fn new(argv: Vec<String>, language: &str, timeout: Duration) -> Option<Self> {
        let mut parts = argv.into_iter();
        let program = parts.next().filter(|p| !p.trim().is_empty())?;
        Some(Self {
            program,
            args: parts.collect(),
            language: language.to_string(),
            timeout,
        })
    }

    /// Program invoked for each capture.
    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl SpeechRecognizer for CommandRecognizer {
    async fn capture(&self) -> Result<Option<String>, SpeechError> {
        let child = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .env(LANGUAGE_ENV, &self.language)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(SpeechError::Spawn)?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| SpeechError::Timeout(self.timeout))??;

        if !output.status.success() {
            return Err(SpeechError::Failed {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let transcript = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((!transcript.is_empty()).then_some(transcript))
    }
}

/// Connects a recognizer to the voice control and the session.
pub struct SpeechInputAdapter {
    recognizer: Option<Arc<dyn SpeechRecognizer>>,
    control: Arc<dyn VoiceControl>,
    capturing: AtomicBool,
}

impl SpeechInputAdapter {
    /// Create the adapter. The voice control is hidden when `recognizer` is
    /// `None` and shown otherwise.
    pub fn new(
        recognizer: Option<Arc<dyn SpeechRecognizer>>,
        control: Arc<dyn VoiceControl>,
    ) -> Self {
        control.set_voice_available(recognizer.is_some());
        if recognizer.is_none() {
            info!("speech input not supported; voice control hidden");
        }
        Self {
            recognizer,
            control,
            capturing: AtomicBool::new(false),
        }
    }

    /// Whether voice capture is supported.
    pub fn is_available(&self) -> bool {
        self.recognizer.is_some()
    }

    /// Whether a capture is in progress.
    pub fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::Acquire)
    }

    /// Run one capture, forwarding a finalized transcript to `sink`.
    ///
    /// No-op when unsupported or when a capture is already running. The
    /// listening flag is set for the duration and cleared on every exit path.
    pub async fn activate(&self, sink: &dyn TranscriptSink) {
        let Some(recognizer) = &self.recognizer else {
            debug!("voice activation ignored; speech input unsupported");
            return;
        };
        if self.capturing.swap(true, Ordering::AcqRel) {
            debug!("voice activation ignored; capture already running");
            return;
        }

        self.control.set_voice_active(true);
        let _listening = Listening { adapter: self };

        match recognizer.capture().await {
            Ok(Some(transcript)) => {
                let transcript = transcript.trim();
                if transcript.is_empty() {
                    debug!("capture produced a blank transcript");
                } else {
                    debug!(chars = transcript.chars().count(), "transcript finalized");
                    sink.submit_transcript(transcript.to_string());
                }
            }
            Ok(None) => debug!("capture ended without speech"),
            Err(e) => warn!(error = %e, "speech capture failed"),
        }
    }
}

/// Clears the listening flag when capture ends, however it ends.
struct Listening<'a> {
    adapter: &'a SpeechInputAdapter,
}

impl Drop for Listening<'_> {
    fn drop(&mut self) {
        self.adapter.control.set_voice_active(false);
        self.adapter.capturing.store(false, Ordering::Release);
    }
}
