//! Configuration types for palaver.
//!
//! Configuration lives in a JSON file (by default `.palaver/config.json`).
//! Every field has a default, so an empty object or a missing file yields a
//! working setup pointed at a local server.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::markup::MarkupMode;

/// Default location of the config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = ".palaver/config.json";

/// Greeting shown, stored and spoken before any user input.
pub const DEFAULT_WELCOME_MESSAGE: &str = "Hi there! I'm Fin, your personal loan assistant. To get started, could you please tell me your first name (e.g., Alice, Bob, Charlie...)?";

/// Main configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the chat server; requests go to `{server_url}/chat`.
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Upper bound on a single chat request, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Greeting that seeds every session.
    #[serde(default = "default_welcome_message")]
    pub welcome_message: String,

    /// How inline markup in replies is displayed.
    #[serde(default)]
    pub markup: MarkupMode,

    /// Speech input/output settings.
    #[serde(default)]
    pub speech: SpeechConfig,
}

fn default_server_url() -> String {
    "http://127.0.0.1:5000".into()
}

fn default_request_timeout() -> u64 {
    60
}

fn default_welcome_message() -> String {
    DEFAULT_WELCOME_MESSAGE.into()
}

/// Speech settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Speak assistant messages aloud.
    #[serde(default = "default_true")]
    pub output_enabled: bool,

    /// Synthesizer command. Each utterance runs it with `--` and then the
    /// plain text appended, so the command must accept the `--` marker.
    /// When unset, the first synthesizer found on PATH is used.
    #[serde(default)]
    pub output_command: Option<Vec<String>>,

    /// Recognizer command; prints one finalized transcript on stdout.
    /// Speech input is unavailable when unset.
    #[serde(default)]
    pub input_command: Option<Vec<String>>,

    /// BCP 47 language tag for synthesis and recognition.
    #[serde(default = "default_language")]
    pub language: String,

    /// Upper bound on a single capture session, in seconds.
    #[serde(default = "default_capture_timeout")]
    pub capture_timeout_seconds: u64,
}

fn default_true() -> bool {
    true
}

fn default_language() -> String {
    "en-US".into()
}

fn default_capture_timeout() -> u64 {
    15
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            output_enabled: true,
            output_command: None,
            input_command: None,
            language: default_language(),
            capture_timeout_seconds: default_capture_timeout(),
        }
    }
}

impl SpeechConfig {
    /// Capture timeout as a duration.
    pub fn capture_timeout(&self) -> Duration {
        Duration::from_secs(self.capture_timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            request_timeout_seconds: default_request_timeout(),
            welcome_message: default_welcome_message(),
            markup: MarkupMode::default(),
            speech: SpeechConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        let config: Self = serde_json::from_str(&content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is absent.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        std::fs::write(path, content).map_err(ConfigError::Io)
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.server_url)
            .map_err(|e| ConfigError::Invalid(format!("server_url {:?}: {e}", self.server_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "server_url must use http or https, got {}",
                url.scheme()
            )));
        }
        if self.request_timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_seconds must be greater than zero".into(),
            ));
        }
        if self.speech.capture_timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "speech.capture_timeout_seconds must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Request timeout as a duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing config JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Error serializing config to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),

    /// A value is out of range or malformed.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server_url, "http://127.0.0.1:5000");
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
        assert_eq!(config.welcome_message, DEFAULT_WELCOME_MESSAGE);
        assert_eq!(config.markup, MarkupMode::Sanitize);
        assert!(config.speech.output_enabled);
        assert!(config.speech.input_command.is_none());
        assert_eq!(config.speech.language, "en-US");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_speech_section() {
        let config: Config =
            serde_json::from_str(r#"{"speech":{"input_command":["whisper-once"]}}"#).unwrap();
        assert_eq!(
            config.speech.input_command,
            Some(vec!["whisper-once".to_string()])
        );
        assert!(config.speech.output_enabled);
        assert_eq!(config.speech.capture_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            server_url: "https://chat.example.com".into(),
            request_timeout_seconds: 5,
            markup: MarkupMode::Trusted,
            ..Default::default()
        };
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_or_default_without_file() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_or_default(&dir.path().join("missing.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_rejects_bad_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad_scheme = Config {
            server_url: "ftp://example.com".into(),
            ..Default::default()
        };
        assert!(matches!(bad_scheme.validate(), Err(ConfigError::Invalid(_))));

        let not_a_url = Config {
            server_url: "localhost".into(),
            ..Default::default()
        };
        assert!(not_a_url.validate().is_err());

        let zero_timeout = Config {
            request_timeout_seconds: 0,
            ..Default::default()
        };
        assert!(zero_timeout.validate().is_err());
    }
}
