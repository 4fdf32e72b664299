//! Chat provider notifiers for alert-relay.
//!
//! The [`Notifier`] trait is the only thing the dispatcher knows about a chat
//! provider: post text, optionally with an acknowledgment button, and edit a
//! message that was posted earlier.
//!
//! # Providers
//!
//! - [`TelegramNotifier`]: Bot API `sendMessage` / `editMessageText` in HTML
//!   parse mode, optionally through an HTTP or SOCKS5 proxy.
//! - [`DiscordNotifier`]: channel messages with a primary button component.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod discord;
pub mod error;
pub mod http;
pub mod notifier;
pub mod telegram;

pub use discord::{DEFAULT_DISCORD_API_BASE, DiscordConfig, DiscordNotifier};
pub use error::{NotifyError, NotifyResult};
pub use http::{ProxyConfig, ProxyKind};
pub use notifier::{AckAction, MessageId, Notifier, NotifyFuture};
pub use telegram::{DEFAULT_TELEGRAM_API_BASE, TelegramConfig, TelegramNotifier};
