//! Speech engine discovery.
//!
//! Detects which synthesizer and recognizer commands are usable on this
//! machine, and resolves the configured speech settings into concrete
//! implementations.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::input::{CommandRecognizer, SpeechRecognizer};
use super::output::{CommandSpeaker, SilentSpeech, SpeechOutput};
use crate::config::SpeechConfig;

/// Synthesizers tried in order when no output command is configured.
pub const KNOWN_SYNTHESIZERS: &[&str] = &["say", "espeak-ng", "espeak", "spd-say"];

/// Information about a speech command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineInfo {
    /// Program name.
    pub name: String,

    /// Whether the program was found on PATH.
    pub found: bool,

    /// Path to the binary, if found.
    pub path: Option<String>,

    /// Any issues detected.
    pub issues: Vec<String>,
}

/// What speech support this machine has under a given configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechCapabilities {
    /// Every known synthesizer, found or not.
    pub synthesizers: Vec<EngineInfo>,

    /// Synthesizer command that will be used, if any.
    pub output_command: Option<Vec<String>>,

    /// The configured recognizer, if one is configured.
    pub recognizer: Option<EngineInfo>,
}

impl SpeechCapabilities {
    /// Whether assistant messages will be spoken.
    pub fn output_available(&self) -> bool {
        self.output_command.is_some()
    }

    /// Whether voice capture can be offered.
    pub fn input_available(&self) -> bool {
        self.recognizer.as_ref().is_some_and(|r| r.found)
    }
}

/// Look up a single program on PATH.
pub fn discover_engine(name: &str) -> EngineInfo {
    let mut info = EngineInfo {
        name: name.to_string(),
        found: false,
        path: None,
        issues: Vec::new(),
    };

    match which::which(name) {
        Ok(path) => {
            info.found = true;
            info.path = Some(path.display().to_string());
        }
        Err(_) => {
            info.issues.push(format!("{name} not found on PATH"));
        }
    }

    info
}

/// Discover speech support for `config`.
pub fn discover_speech(config: &SpeechConfig) -> SpeechCapabilities {
    let synthesizers: Vec<EngineInfo> = KNOWN_SYNTHESIZERS
        .iter()
        .map(|name| discover_engine(name))
        .collect();

    let output_command = if !config.output_enabled {
        None
    } else if let Some(argv) = non_empty(config.output_command.as_ref()) {
        discover_engine(&argv[0]).found.then(|| argv.clone())
    } else {
        synthesizers
            .iter()
            .find(|s| s.found)
            .map(|s| synthesizer_argv(&s.name, &config.language))
    };

    let recognizer = non_empty(config.input_command.as_ref()).map(|argv| discover_engine(&argv[0]));

    SpeechCapabilities {
        synthesizers,
        output_command,
        recognizer,
    }
}

/// Command line for a known synthesizer, without the text argument.
pub fn synthesizer_argv(name: &str, language: &str) -> Vec<String> {
    let primary = language.split(['-', '_']).next().unwrap_or(language);
    match name {
        "espeak-ng" | "espeak" => vec![name.into(), "-v".into(), language.to_lowercase()],
        "spd-say" => vec![name.into(), "-l".into(), primary.to_lowercase()],
        _ => vec![name.into()],
    }
}

/// Build the speech output for `config`. Falls back to silence.
pub fn select_speech_output(config: &SpeechConfig) -> Arc<dyn SpeechOutput> {
    let capabilities = discover_speech(config);
    match capabilities.output_command.and_then(CommandSpeaker::new) {
        Some(speaker) => {
            info!(program = speaker.program(), "speech output enabled");
            Arc::new(speaker)
        }
        None => {
            debug!(enabled = config.output_enabled, "speech output unavailable; staying silent");
            Arc::new(SilentSpeech)
        }
    }
}

/// Build the recognizer for `config`, or `None` when voice input is unsupported.
pub fn select_recognizer(config: &SpeechConfig) -> Option<Arc<dyn SpeechRecognizer>> {
    let argv = non_empty(config.input_command.as_ref())?;
    if !discover_engine(&argv[0]).found {
        info!(program = %argv[0], "speech recognizer not found; voice input disabled");
        return None;
    }
    let recognizer =
        CommandRecognizer::new(argv.clone(), &config.language, config.capture_timeout())?;
    Some(Arc::new(recognizer))
}

fn non_empty(argv: Option<&Vec<String>>) -> Option<&Vec<String>> {
    argv.filter(|a| a.first().is_some_and(|p| !p.trim().is_empty()))
}
