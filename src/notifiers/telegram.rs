use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::Value;

use crate::notifiers::{Notifier, NotifyContext};
use crate::utils::format_timestamp;

/// Telegram bot notification channel.
///
/// Posts a `sendMessage` call to the Bot API, keyed by a bot token and a
/// chat id taken from the environment.
pub struct TelegramNotifier {
    token: String,
    chat_id: String,
    client: Client,
}

impl TelegramNotifier {
    /// Create a new Telegram notification channel.
    pub fn new(token: &str, chat_id: &str) -> Self {
        Self {
            token: token.to_string(),
            chat_id: chat_id.to_string(),
            client: Client::new(),
        }
    }

    /// Build the channel from `TELEGRAM_TOKEN` and `TELEGRAM_CHAT_ID`,
    /// if both are set.
    pub fn from_env() -> Option<Self> {
        let token = std::env::var("TELEGRAM_TOKEN").ok()?;
        let chat_id = std::env::var("TELEGRAM_CHAT_ID").ok()?;
        if token.is_empty() || chat_id.is_empty() {
            return None;
        }
        Some(Self::new(&token, &chat_id))
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn deliver(&self, message: &str, context: &NotifyContext) -> Result<()> {
        if self.token.is_empty() || self.chat_id.is_empty() {
            return Err(anyhow!("Telegram token or chat id not set"));
        }

        let text = format!(
            "{}\nURL: {}\nTime: {}",
            message,
            context.url,
            format_timestamp(context.timestamp)
        );
        let params = [("chat_id", self.chat_id.as_str()), ("text", text.as_str())];
        let post_data = serde_urlencoded::to_string(params)
            .map_err(|e| anyhow!("failed to encode request parameters: {}", e))?;

        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.token);
        debug!("Sending Telegram notification to chat {}", self.chat_id);

        let res = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(post_data)
            .send()
            .await
            .map_err(|e| anyhow!("notification request failed: {}", e))?;

        let status = res.status();
        if !status.is_success() {
            return Err(anyhow!("notification request failed, status code: {}", status));
        }

        let data: Value = res
            .json()
            .await
            .map_err(|e| anyhow!("failed to parse response: {}", e))?;

        if !data["ok"].as_bool().unwrap_or(false) {
            let description = data["description"].as_str().unwrap_or("unknown error");
            return Err(anyhow!("Telegram rejected the message: {}", description));
        }

        debug!("Telegram notification sent");

        Ok(())
    }
}
