//! Relay configuration.
//!
//! Built once at startup from command-line flags and environment variables,
//! validated, then passed by reference into every component.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use relay_notify::{
    DEFAULT_DISCORD_API_BASE, DEFAULT_TELEGRAM_API_BASE, DiscordConfig, ProxyConfig, ProxyKind,
    TelegramConfig,
};

use crate::error::{RelayError, RelayResult};
use crate::verify::InteractionVerifier;

/// Configuration for the relay server.
#[derive(Debug, Clone, Parser)]
#[command(name = "alert-relay")]
#[command(about = "Relays Grafana alerts to Telegram and Discord with acknowledgment suppression")]
#[command(version)]
pub struct RelayConfig {
    /// Address to bind the HTTP server to.
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen_addr: SocketAddr,

    /// Telegram bot token.
    #[arg(long, env = "BOT_TOKEN", hide_env_values = true)]
    pub telegram_bot_token: String,

    /// Telegram chat to post to.
    #[arg(long, env = "CHAT_ID")]
    pub telegram_chat_id: String,

    /// Telegram Bot API endpoint.
    #[arg(long, env = "TELEGRAM_API_BASE", default_value = DEFAULT_TELEGRAM_API_BASE)]
    pub telegram_api_base: String,

    /// Discord bot token.
    #[arg(long, env = "DISCORD_BOT_TOKEN", hide_env_values = true)]
    pub discord_bot_token: String,

    /// Discord channel to post to.
    #[arg(long, env = "DISCORD_CHANNEL_ID")]
    pub discord_channel_id: String,

    /// Hex-encoded Ed25519 key used to verify interaction callbacks.
    #[arg(long, env = "DISCORD_PUBLIC_KEY")]
    pub discord_public_key: String,

    /// Discord application id (informational).
    #[arg(long, env = "DISCORD_APPLICATION_ID")]
    pub discord_application_id: Option<String>,

    /// Discord REST endpoint.
    #[arg(long, env = "DISCORD_API_BASE", default_value = DEFAULT_DISCORD_API_BASE)]
    pub discord_api_base: String,

    /// Directory for the suppression snapshot. In-memory when unset.
    #[arg(long, env = "SUPPRESSION_STORE_PATH")]
    pub store_path: Option<PathBuf>,

    /// How long an acknowledgment suppresses firing alerts, in hours.
    #[arg(long, env = "ACK_WINDOW_HOURS", default_value_t = 72)]
    pub ack_window_hours: u32,

    /// Maximum age of a signed interaction timestamp, in seconds. 0 disables.
    #[arg(long, env = "INTERACTION_MAX_SKEW_SECS", default_value_t = 0)]
    pub max_timestamp_skew_secs: u64,

    /// Proxy for Telegram requests.
    #[arg(long, env = "PROXY_URL")]
    pub proxy_url: Option<String>,

    /// Proxy protocol: `socks5`, anything else means HTTP.
    #[arg(long, env = "PROXY_TYPE", default_value = "http")]
    pub proxy_type: String,

    /// Proxy username.
    #[arg(long, env = "PROXY_USER")]
    pub proxy_user: Option<String>,

    /// Proxy password.
    #[arg(long, env = "PROXY_PASS", hide_env_values = true)]
    pub proxy_pass: Option<String>,

    /// Timeout of provider requests, in seconds.
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 10)]
    pub http_timeout_secs: u64,

    /// Emit logs as JSON.
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,
}

impl RelayConfig {
    /// Checks required values once at startup.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Config` for an empty credential, a zero window or
    /// timeout, or an unusable public key.
    pub fn validate(&self) -> RelayResult<()> {
        for (name, value) in [
            ("BOT_TOKEN", &self.telegram_bot_token),
            ("CHAT_ID", &self.telegram_chat_id),
            ("DISCORD_BOT_TOKEN", &self.discord_bot_token),
            ("DISCORD_CHANNEL_ID", &self.discord_channel_id),
            ("DISCORD_PUBLIC_KEY", &self.discord_public_key),
        ] {
            if value.trim().is_empty() {
                return Err(RelayError::Config(format!("{name} must not be empty")));
            }
        }
        if self.ack_window_hours == 0 {
            return Err(RelayError::Config("ACK_WINDOW_HOURS must be greater than 0".to_string()));
        }
        if self.http_timeout_secs == 0 {
            return Err(RelayError::Config("HTTP_TIMEOUT_SECS must be greater than 0".to_string()));
        }
        self.verifier()?;
        Ok(())
    }

    /// The acknowledgment window.
    #[must_use]
    pub fn ack_window(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.ack_window_hours))
    }

    /// Timeout of provider requests.
    #[must_use]
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Replay window for interaction timestamps, if enabled.
    #[must_use]
    pub const fn max_timestamp_skew(&self) -> Option<Duration> {
        if self.max_timestamp_skew_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.max_timestamp_skew_secs))
        }
    }

    /// Proxy settings, if a proxy URL is configured.
    #[must_use]
    pub fn proxy(&self) -> Option<ProxyConfig> {
        let url = self.proxy_url.as_deref().filter(|u| !u.trim().is_empty())?;
        let proxy = ProxyConfig::new(url, ProxyKind::parse(&self.proxy_type));
        let user = self.proxy_user.as_deref().filter(|u| !u.is_empty());
        let pass = self.proxy_pass.as_deref().filter(|p| !p.is_empty());
        Some(match (user, pass) {
            (Some(user), Some(pass)) => proxy.with_credentials(user, pass),
            _ => proxy,
        })
    }

    /// Telegram client settings.
    #[must_use]
    pub fn telegram(&self) -> TelegramConfig {
        let config = TelegramConfig::new(&self.telegram_bot_token, &self.telegram_chat_id)
            .with_api_base(&self.telegram_api_base)
            .with_timeout(self.http_timeout());
        match self.proxy() {
            Some(proxy) => config.with_proxy(proxy),
            None => config,
        }
    }

    /// Discord client settings.
    #[must_use]
    pub fn discord(&self) -> DiscordConfig {
        DiscordConfig::new(&self.discord_bot_token, &self.discord_channel_id)
            .with_api_base(&self.discord_api_base)
            .with_timeout(self.http_timeout())
    }

    /// Interaction verifier for the configured key.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Config` if the public key is unusable.
    pub fn verifier(&self) -> RelayResult<InteractionVerifier> {
        Ok(InteractionVerifier::from_hex(&self.discord_public_key)?
            .with_max_skew(self.max_timestamp_skew()))
    }
}
