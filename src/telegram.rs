//! Thin client for the Telegram Bot API `sendMessage` endpoint.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::events::Message;

const SEND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("bot token is not configured")]
    MissingToken,
    #[error("failed to reach the Telegram API: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Telegram API error ({status}): {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
}

#[derive(Debug, Serialize)]
struct InlineKeyboardButton<'a> {
    text: &'a str,
    url: &'a str,
}

#[derive(Debug, Serialize)]
struct InlineKeyboardMarkup<'a> {
    inline_keyboard: Vec<Vec<InlineKeyboardButton<'a>>>,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboardMarkup<'a>>,
}

#[derive(Clone)]
pub struct Notifier {
    client: reqwest::Client,
    token: String,
    api_base: String,
}

impl Notifier {
    pub fn new(token: impl Into<String>, api_base: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            token: token.into(),
            api_base: api_base.into(),
        }
    }

    /// Delivers a rendered message to the given chat. An empty message is a
    /// successful no-op.
    pub async fn send(&self, chat_id: &str, message: &Message) -> Result<(), NotifyError> {
        if message.is_empty() {
            return Ok(());
        }
        if self.token.is_empty() {
            return Err(NotifyError::MissingToken);
        }

        let reply_markup = message.button.as_ref().map(|button| InlineKeyboardMarkup {
            inline_keyboard: vec![vec![InlineKeyboardButton {
                text: &button.label,
                url: &button.url,
            }]],
        });
        let request = SendMessageRequest {
            chat_id,
            text: &message.text,
            parse_mode: "MarkdownV2",
            disable_web_page_preview: true,
            reply_markup,
        };

        let url = format!("{}/bot{}/sendMessage", self.api_base, self.token);
        let response = self.client.post(&url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Api { status, body });
        }

        debug!(chat_id, "message delivered");
        Ok(())
    }

    /// Replaces the bot token in error text before it is echoed to callers.
    pub fn redact(&self, text: &str) -> String {
        if self.token.is_empty() {
            text.to_string()
        } else {
            text.replace(&self.token, "$Bot")
        }
    }
}
