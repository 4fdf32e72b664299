//! The notifier capability shared by every chat provider.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use relay_alerts::Provider;
use serde::{Deserialize, Serialize};

use crate::error::NotifyResult;

/// Boxed future returned by notifier methods.
pub type NotifyFuture<'a, T> = Pin<Box<dyn Future<Output = NotifyResult<T>> + Send + 'a>>;

/// Provider-assigned identifier of a delivered message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Wraps a provider identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A clickable acknowledgment control attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckAction {
    /// Opaque identifier echoed back in the signed callback.
    pub custom_id: String,
    /// Button text.
    pub label: String,
    /// Whether the control can still be clicked.
    pub disabled: bool,
}

impl AckAction {
    /// Creates an enabled action.
    pub fn new(custom_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            custom_id: custom_id.into(),
            label: label.into(),
            disabled: false,
        }
    }

    /// Marks the action as disabled.
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

/// Sends and edits messages in one chat destination.
///
/// Implementations hold their own destination (chat or channel) and
/// credentials. Every call is a single provider request with no retry.
pub trait Notifier: Send + Sync + fmt::Debug {
    /// Returns the name of this notifier, used in logs.
    fn name(&self) -> &str;

    /// Returns the provider whose template and size ceiling apply.
    fn provider(&self) -> Provider;

    /// Returns the destination messages are posted to.
    fn channel_id(&self) -> &str;

    /// Returns true if messages can carry an [`AckAction`].
    fn supports_actions(&self) -> bool {
        false
    }

    /// Posts `text` and returns the new message's identifier.
    fn send<'a>(&'a self, text: &'a str) -> NotifyFuture<'a, MessageId>;

    /// Posts `text` with an acknowledgment control.
    ///
    /// Notifiers without action support post the text alone.
    fn send_with_action<'a>(
        &'a self,
        text: &'a str,
        action: &'a AckAction,
    ) -> NotifyFuture<'a, MessageId> {
        let _ = action;
        self.send(text)
    }

    /// Replaces the text (and control, when supported) of a delivered message.
    fn update<'a>(
        &'a self,
        channel_id: &'a str,
        message_id: &'a MessageId,
        text: &'a str,
        action: Option<&'a AckAction>,
    ) -> NotifyFuture<'a, ()>;
}
