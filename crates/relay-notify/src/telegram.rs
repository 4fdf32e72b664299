//! Telegram Bot API notifier.

use std::time::Duration;

use relay_alerts::Provider;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::error::{NotifyError, NotifyResult};
use crate::http::{ProxyConfig, build_client, read_json};
use crate::notifier::{AckAction, MessageId, Notifier, NotifyFuture};

/// Default Bot API endpoint.
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

const PARSE_MODE: &str = "HTML";

/// Settings for a [`TelegramNotifier`].
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot token issued by BotFather.
    pub bot_token: String,
    /// Chat messages are posted to.
    pub chat_id: String,
    /// API endpoint, without trailing slash.
    pub api_base: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Optional outbound proxy.
    pub proxy: Option<ProxyConfig>,
}

impl TelegramConfig {
    /// Creates settings for the public Bot API with a 10 second timeout.
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            api_base: DEFAULT_TELEGRAM_API_BASE.to_string(),
            timeout: Duration::from_secs(10),
            proxy: None,
        }
    }

    /// Sets the API endpoint.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Routes requests through a proxy.
    #[must_use]
    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = Some(proxy);
        self
    }
}

/// Posts HTML-formatted messages to one Telegram chat.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    config: TelegramConfig,
    client: reqwest::Client,
}

impl TelegramNotifier {
    /// Creates a notifier.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Config` if the token or chat is empty or the
    /// proxy settings are unusable.
    pub fn new(config: TelegramConfig) -> NotifyResult<Self> {
        if config.bot_token.trim().is_empty() {
            return Err(NotifyError::Config("Telegram bot token is empty".to_string()));
        }
        if config.chat_id.trim().is_empty() {
            return Err(NotifyError::Config("Telegram chat id is empty".to_string()));
        }
        let client = build_client(config.timeout, config.proxy.as_ref())?;
        Ok(Self { config, client })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.config.api_base, self.config.bot_token)
    }

    async fn call(&self, method: &str, body: Value) -> NotifyResult<Value> {
        let response = self
            .client
            .post(self.method_url(method))
            .json(&body)
            .send()
            .await?;
        let reply = read_json(self.name(), response).await?;

        if reply.get("ok").and_then(Value::as_bool) != Some(true) {
            let description = reply
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or("request was not ok")
                .to_string();
            return Err(NotifyError::Api {
                status: 200,
                body: description,
            });
        }
        Ok(reply)
    }
}

impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    fn provider(&self) -> Provider {
        Provider::Telegram
    }

    fn channel_id(&self) -> &str {
        &self.config.chat_id
    }

    fn send<'a>(&'a self, text: &'a str) -> NotifyFuture<'a, MessageId> {
        Box::pin(async move {
            let body = json!({
                "chat_id": self.config.chat_id,
                "text": text,
                "parse_mode": PARSE_MODE,
            });
            let reply = self.call("sendMessage", body).await?;

            let id = reply
                .pointer("/result/message_id")
                .and_then(Value::as_i64)
                .ok_or_else(|| NotifyError::InvalidResponse("missing result.message_id".to_string()))?;

            info!(chat_id = %self.config.chat_id, message_id = id, "sent Telegram message");
            Ok(MessageId::new(id.to_string()))
        })
    }

    fn update<'a>(
        &'a self,
        channel_id: &'a str,
        message_id: &'a MessageId,
        text: &'a str,
        action: Option<&'a AckAction>,
    ) -> NotifyFuture<'a, ()> {
        Box::pin(async move {
            if action.is_some() {
                debug!("Telegram messages carry no actions, ignoring");
            }
            let numeric_id: i64 = message_id.as_str().parse().map_err(|_| {
                NotifyError::InvalidResponse(format!("not a Telegram message id: {message_id}"))
            })?;

            let body = json!({
                "chat_id": channel_id,
                "message_id": numeric_id,
                "text": text,
                "parse_mode": PARSE_MODE,
            });
            self.call("editMessageText", body).await?;

            info!(chat_id = %channel_id, message_id = numeric_id, "edited Telegram message");
            Ok(())
        })
    }
}
