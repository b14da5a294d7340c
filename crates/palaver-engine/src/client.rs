//! Remote assistant client.
//!
//! One request per turn: the outgoing message plus the whole history go to
//! `POST {server_url}/chat`, and the reply comes back as an assistant turn.
//! Every failure mode collapses into a single [`RemoteAssistantError`].

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::debug;

use crate::turn::Turn;
use crate::wire::{ChatRequest, ChatResponse};

/// Path of the chat endpoint, relative to the server URL.
pub const CHAT_PATH: &str = "/chat";

/// The remote assistant could not produce a reply.
///
/// Deliberately coarse: the controller handles every failure the same way.
/// The detail exists for logs only.
#[derive(Debug, thiserror::Error)]
#[error("remote assistant request failed: {detail}")]
pub struct RemoteAssistantError {
    detail: String,
}

impl RemoteAssistantError {
    /// Create an error with a diagnostic detail.
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }

    /// Diagnostic detail for logging.
    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl From<reqwest::Error> for RemoteAssistantError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(format!("request timed out: {err}"))
        } else if err.is_connect() {
            Self::new(format!("could not connect: {err}"))
        } else {
            Self::new(err.to_string())
        }
    }
}

/// Sends a message with its history and returns the assistant's reply.
#[async_trait]
pub trait AssistantClient: Send + Sync {
    /// Send `message` together with an owned copy of the history.
    async fn send(&self, message: &str, history: Vec<Turn>) -> Result<Turn, RemoteAssistantError>;
}

/// HTTP implementation of [`AssistantClient`].
#[derive(Debug, Clone)]
pub struct HttpAssistantClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAssistantClient {
    /// Create a client for `server_url` with a bounded request timeout.
    pub fn new(server_url: &str, timeout: Duration) -> Result<Self, RemoteAssistantError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: chat_endpoint(server_url),
        })
    }

    /// Full URL requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AssistantClient for HttpAssistantClient {
    async fn send(&self, message: &str, history: Vec<Turn>) -> Result<Turn, RemoteAssistantError> {
        let start = Instant::now();
        let request = ChatRequest::new(message, &history);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        #[allow(clippy::cast_possible_truncation)]
        let duration_ms = start.elapsed().as_millis() as u64;
        debug!(%status, duration_ms, history_len = history.len(), "chat request finished");

        if !status.is_success() {
            return Err(RemoteAssistantError::new(format!(
                "server responded with {status}"
            )));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| RemoteAssistantError::new(format!("malformed response body: {e}")))?;

        Ok(parsed.into_turn())
    }
}

/// Join the server URL and the chat path without doubling slashes.
pub fn chat_endpoint(server_url: &str) -> String {
    format!("{}{CHAT_PATH}", server_url.trim_end_matches('/'))
}
