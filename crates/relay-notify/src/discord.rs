//! Discord REST notifier with button components.

use std::time::Duration;

use relay_alerts::Provider;
use serde_json::{Value, json};
use tracing::info;

use crate::error::{NotifyError, NotifyResult};
use crate::http::{build_client, read_json};
use crate::notifier::{AckAction, MessageId, Notifier, NotifyFuture};

/// Default REST endpoint.
pub const DEFAULT_DISCORD_API_BASE: &str = "https://discord.com/api/v10";

const ACTION_ROW: u8 = 1;
const BUTTON: u8 = 2;
const PRIMARY_STYLE: u8 = 1;

/// Settings for a [`DiscordNotifier`].
#[derive(Debug, Clone)]
pub struct DiscordConfig {
    /// Bot token, sent as `Authorization: Bot <token>`.
    pub bot_token: String,
    /// Channel messages are posted to.
    pub channel_id: String,
    /// API endpoint, without trailing slash.
    pub api_base: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl DiscordConfig {
    /// Creates settings for the public API with a 10 second timeout.
    pub fn new(bot_token: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            channel_id: channel_id.into(),
            api_base: DEFAULT_DISCORD_API_BASE.to_string(),
            timeout: Duration::from_secs(10),
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
}

/// Posts Markdown messages, optionally with a button, to one Discord channel.
#[derive(Debug, Clone)]
pub struct DiscordNotifier {
    config: DiscordConfig,
    client: reqwest::Client,
}

impl DiscordNotifier {
    /// Creates a notifier.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Config` if the token or channel is empty.
    pub fn new(config: DiscordConfig) -> NotifyResult<Self> {
        if config.bot_token.trim().is_empty() {
            return Err(NotifyError::Config("Discord bot token is empty".to_string()));
        }
        if config.channel_id.trim().is_empty() {
            return Err(NotifyError::Config("Discord channel id is empty".to_string()));
        }
        let client = build_client(config.timeout, None)?;
        Ok(Self { config, client })
    }

    fn messages_url(&self, channel_id: &str) -> String {
        format!("{}/channels/{channel_id}/messages", self.config.api_base)
    }

    fn authorization(&self) -> String {
        format!("Bot {}", self.config.bot_token)
    }

    async fn post_message(&self, body: Value) -> NotifyResult<MessageId> {
        let response = self
            .client
            .post(self.messages_url(&self.config.channel_id))
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .json(&body)
            .send()
            .await?;
        let reply = read_json(self.name(), response).await?;

        let id = reply
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| NotifyError::InvalidResponse("missing message id".to_string()))?;

        info!(channel_id = %self.config.channel_id, message_id = %id, "sent Discord message");
        Ok(MessageId::new(id))
    }
}

/// Message components holding a single button, or none.
#[must_use]
pub fn components(action: Option<&AckAction>) -> Value {
    match action {
        Some(action) => json!([{
            "type": ACTION_ROW,
            "components": [{
                "type": BUTTON,
                "style": PRIMARY_STYLE,
                "label": action.label,
                "custom_id": action.custom_id,
                "disabled": action.disabled,
            }],
        }]),
        None => json!([]),
    }
}

impl Notifier for DiscordNotifier {
    fn name(&self) -> &str {
        "discord"
    }

    fn provider(&self) -> Provider {
        Provider::Discord
    }

    fn channel_id(&self) -> &str {
        &self.config.channel_id
    }

    fn supports_actions(&self) -> bool {
        true
    }

    fn send<'a>(&'a self, text: &'a str) -> NotifyFuture<'a, MessageId> {
        Box::pin(async move { self.post_message(json!({ "content": text })).await })
    }

    fn send_with_action<'a>(
        &'a self,
        text: &'a str,
        action: &'a AckAction,
    ) -> NotifyFuture<'a, MessageId> {
        Box::pin(async move {
            self.post_message(json!({
                "content": text,
                "components": components(Some(action)),
            }))
            .await
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
            let url = format!("{}/{message_id}", self.messages_url(channel_id));
            let response = self
                .client
                .patch(url)
                .header(reqwest::header::AUTHORIZATION, self.authorization())
                .json(&json!({
                    "content": text,
                    "components": components(action),
                }))
                .send()
                .await?;
            read_json(self.name(), response).await?;

            info!(channel_id = %channel_id, message_id = %message_id, "edited Discord message");
            Ok(())
        })
    }
}
