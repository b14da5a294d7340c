//! Speech synthesis.

use std::process::Stdio;

use tracing::{debug, warn};

use crate::markup;

/// Separates configured arguments from the spoken text.
const END_OF_OPTIONS: &str = "--";

/// Speaks text aloud.
///
/// `speak` returns immediately; playback, if any, runs on its own. A failure
/// to speak is logged and never reaches the caller.
pub trait SpeechOutput: Send + Sync {
    /// Speak `text`.
    fn speak(&self, text: &str);
}

/// Speech output that says nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSpeech;

impl SpeechOutput for SilentSpeech {
    fn speak(&self, _text: &str) {}
}

/// Speech output backed by an external synthesizer command.
///
/// The text is stripped of markup and passed as the last argument, after a
/// `--` end-of-options marker so a reply starting with `-` is spoken rather
/// than parsed as flags. Each call starts a new process; overlapping
/// utterances are left to the synthesizer.
#[derive(Debug, Clone)]
pub struct CommandSpeaker {
    program: String,
    args: Vec<String>,
}

impl CommandSpeaker {
    /// Build from a command line. Returns `None` for an empty command.
    pub fn new(argv: Vec<String>) -> Option<Self> {
        let mut parts = argv.into_iter();
        let program = parts.next().filter(|p| !p.trim().is_empty())?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    /// Program invoked for each utterance.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments placed before the text.
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl SpeechOutput for CommandSpeaker {
    fn speak(&self, text: &str) {
        let text = markup::speakable(text);
        if text.is_empty() {
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(program = %self.program, "no async runtime; skipping speech");
            return;
        };
        let _enter = runtime.enter();

        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args)
            .arg(END_OF_OPTIONS)
            .arg(&text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        match cmd.spawn() {
            Ok(mut child) => {
                let program = self.program.clone();
                runtime.spawn(async move {
                    match child.wait().await {
                        Ok(status) if !status.success() => {
                            debug!(%program, code = ?status.code(), "synthesizer exited with failure");
                        }
                        Err(e) => debug!(%program, error = %e, "failed to wait for synthesizer"),
                        Ok(_) => {}
                    }
                });
            }
            Err(e) => {
                warn!(program = %self.program, error = %e, "failed to start synthesizer");
            }
        }
    }
}
