//! Telegram Bot API notifier.

use std::fmt;

use async_trait::async_trait;
use homework_poller::{Notifier, NotifyError};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{http_client, TransportError};

/// Default Telegram Bot API base URL.
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Body of a `sendMessage` call.
#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// The envelope every Bot API method answers with.
#[derive(Debug, Deserialize)]
struct BotApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends messages to one chat through `POST <api>/bot<token>/sendMessage`.
#[derive(Clone)]
pub struct TelegramNotifier {
    http: reqwest::Client,
    api_url: String,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    /// Creates a notifier against the public Bot API.
    pub fn new(
        token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Result<Self, TransportError> {
        Ok(Self::with_client(
            http_client()?,
            TELEGRAM_API_URL,
            token,
            chat_id,
        ))
    }

    /// Creates a notifier with an explicit HTTP client and API base URL.
    #[must_use]
    pub fn with_client(
        http: reqwest::Client,
        api_url: impl Into<String>,
        token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_url: api_url.into(),
            token: token.into(),
            chat_id: chat_id.into(),
        }
    }

    /// Returns the chat that receives messages.
    #[must_use]
    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_url.trim_end_matches('/'),
            self.token
        )
    }
}

impl fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    // Errors are stripped of their URL: it carries the bot token.
    #[instrument(skip_all, fields(chat_id = %self.chat_id))]
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let request = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
        };

        let response = self
            .http
            .post(self.send_message_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        let body: BotApiResponse = response.json().await.map_err(|e| NotifyError::Rejected {
            description: format!("unexpected response ({status}): {}", e.without_url()),
        })?;

        if body.ok {
            debug!(%status, "Telegram accepted the message");
            Ok(())
        } else {
            Err(NotifyError::Rejected {
                description: body.description.unwrap_or_else(|| status.to_string()),
            })
        }
    }
}
