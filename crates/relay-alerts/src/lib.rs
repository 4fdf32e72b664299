//! Alert model, provider templates and message batching for alert-relay.
//!
//! `relay-alerts` is the pure, I/O-free core of the relay: it decodes the
//! webhook body posted by the alert source, renders alerts into each chat
//! provider's template and packs the rendered text into messages that fit
//! the provider's size limit.
//!
//! # Example
//!
//! ```rust
//! use relay_alerts::{MessageBatcher, Provider, WebhookPayload};
//!
//! let body = br#"{"alerts": [{
//!     "status": "firing",
//!     "labels": {"instance": "node1", "device": "sda"},
//!     "annotations": {"summary": "disk full"},
//!     "values": {"B": 63072000}
//! }]}"#;
//!
//! let payload = WebhookPayload::from_slice(body).unwrap();
//! let batcher = MessageBatcher::new(Provider::Telegram, Provider::Telegram.max_message_len());
//! let messages = batcher.batch(&payload.alerts);
//!
//! assert_eq!(messages.len(), 1);
//! assert!(messages[0].text.contains("2.00"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod batch;
pub mod error;
pub mod numeric;
pub mod render;
pub mod types;

// Re-export main types at crate root
pub use batch::{Message, MessageBatcher};
pub use error::{AlertError, Result};
pub use numeric::{NumericValue, safe_divide};
pub use render::{
    DISCORD_MAX_MESSAGE_LEN, Provider, Renderer, TELEGRAM_MAX_MESSAGE_LEN, escape_html,
    format_uptime,
};
pub use types::{
    Alert, AlertStatus, DEVICE_LABEL, INSTANCE_LABEL, SECONDS_PER_YEAR, SUMMARY_ANNOTATION,
    UPTIME_VALUE_KEY, WebhookPayload,
};
