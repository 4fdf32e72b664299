//! Shared state for the relay server.

use std::sync::Arc;

use chrono::Utc;
use relay_notify::{DiscordNotifier, Notifier, TelegramNotifier};
use relay_suppress::{FileSuppressionStore, MemorySuppressionStore, SuppressionStore};
use tracing::info;

use crate::config::RelayConfig;
use crate::dispatcher::AlertDispatcher;
use crate::error::RelayResult;
use crate::verify::InteractionVerifier;

/// Everything a request handler needs, built once at startup.
#[derive(Debug, Clone)]
pub struct AppState {
    dispatcher: AlertDispatcher,
    telegram: Arc<dyn Notifier>,
    discord: Arc<dyn Notifier>,
    verifier: InteractionVerifier,
}

impl AppState {
    /// Assembles state from already built components.
    #[must_use]
    pub fn new(
        dispatcher: AlertDispatcher,
        telegram: Arc<dyn Notifier>,
        discord: Arc<dyn Notifier>,
        verifier: InteractionVerifier,
    ) -> Self {
        Self {
            dispatcher,
            telegram,
            discord,
            verifier,
        }
    }

    /// Builds the store, both provider clients and the verifier from
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be loaded, a client cannot be
    /// built, or the public key is unusable.
    pub fn from_config(config: &RelayConfig) -> RelayResult<Self> {
        let store: Arc<dyn SuppressionStore> = match &config.store_path {
            Some(dir) => {
                let store = FileSuppressionStore::open(dir, Utc::now())?;
                info!(path = %store.path().display(), "using file suppression store");
                Arc::new(store)
            }
            None => {
                info!("using in-memory suppression store");
                Arc::new(MemorySuppressionStore::new())
            }
        };

        let telegram = TelegramNotifier::new(config.telegram())?;
        let discord = DiscordNotifier::new(config.discord())?;

        Ok(Self::new(
            AlertDispatcher::new(store, config.ack_window()),
            Arc::new(telegram),
            Arc::new(discord),
            config.verifier()?,
        ))
    }

    /// The suppression dispatcher.
    #[must_use]
    pub const fn dispatcher(&self) -> &AlertDispatcher {
        &self.dispatcher
    }

    /// The Telegram client.
    #[must_use]
    pub fn telegram(&self) -> &dyn Notifier {
        self.telegram.as_ref()
    }

    /// The Discord client.
    #[must_use]
    pub fn discord(&self) -> &dyn Notifier {
        self.discord.as_ref()
    }

    /// The interaction verifier.
    #[must_use]
    pub const fn verifier(&self) -> &InteractionVerifier {
        &self.verifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use ed25519_dalek::SigningKey;
    use relay_alerts::Provider;

    fn config(extra: &[&str]) -> RelayConfig {
        let key = hex::encode(SigningKey::from_bytes(&[3u8; 32]).verifying_key().to_bytes());
        let mut args = vec![
            "alert-relay",
            "--telegram-bot-token",
            "123:abc",
            "--telegram-chat-id",
            "-100",
            "--discord-bot-token",
            "discord-token",
            "--discord-channel-id",
            "998877",
            "--discord-public-key",
            &key,
        ];
        args.extend_from_slice(extra);
        RelayConfig::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_from_config_in_memory() {
        let state = AppState::from_config(&config(&[])).unwrap();

        assert_eq!(state.telegram().provider(), Provider::Telegram);
        assert_eq!(state.discord().provider(), Provider::Discord);
        assert!(state.discord().supports_actions());
        assert!(!state.telegram().supports_actions());
        assert_eq!(state.dispatcher().ack_window(), chrono::Duration::hours(72));
        assert!(state.dispatcher().store().list_active(Utc::now()).unwrap().is_empty());
    }

    #[test]
    fn test_from_config_with_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state");
        let state =
            AppState::from_config(&config(&["--store-path", path.to_str().unwrap()])).unwrap();

        state
            .dispatcher()
            .store()
            .upsert(
                relay_suppress::ResourceKey::new("h1", "sda"),
                Utc::now() + chrono::Duration::hours(1),
                "test",
            )
            .unwrap();

        assert!(path.join(relay_suppress::file::SNAPSHOT_FILE).exists());
    }
}
