//! Interaction callback payloads, custom ids and replies.

use relay_suppress::ResourceKey;
use serde::{Deserialize, Serialize};

use crate::error::{RelayError, RelayResult};

/// Action name carried in acknowledgment custom ids.
pub const RESOLVE_ACTION: &str = "resolve";

const PING: u8 = 1;
const MESSAGE_COMPONENT: u8 = 3;
const PONG: u8 = 1;
const CHANNEL_MESSAGE_WITH_SOURCE: u8 = 4;
const EPHEMERAL: u64 = 1 << 6;

/// Builds the custom id `resolve:<instance>:<device>` for a resource.
#[must_use]
pub fn build_custom_id(key: &ResourceKey) -> String {
    format!("{RESOLVE_ACTION}:{}:{}", key.instance, key.device)
}

/// Parses a `resolve:<instance>:<device>` custom id.
///
/// The id must have exactly three colon-separated fields, so an instance or
/// device containing `:` cannot be acknowledged.
///
/// # Errors
///
/// Returns `RelayError::InvalidRequest` for any other shape or action.
pub fn parse_custom_id(custom_id: &str) -> RelayResult<ResourceKey> {
    let parts: Vec<&str> = custom_id.split(':').collect();
    match parts.as_slice() {
        [action, instance, device] if *action == RESOLVE_ACTION => {
            Ok(ResourceKey::new(*instance, *device))
        }
        [action, _, _] => Err(RelayError::InvalidRequest(format!(
            "unknown action '{action}' in custom id"
        ))),
        _ => Err(RelayError::InvalidRequest(format!(
            "invalid custom id format: {custom_id}"
        ))),
    }
}

/// Button label for an acknowledgment window.
#[must_use]
pub fn action_label(window_hours: i64) -> String {
    format!("Resolve for {window_hours}h")
}

/// Replacement text for a message after it was acknowledged.
#[must_use]
pub fn suppressed_notice(window_hours: i64, actor: &str) -> String {
    format!("**Alert suppressed for {window_hours} hours by {actor}**")
}

/// Private confirmation sent to the user who acknowledged.
#[must_use]
pub fn confirmation(key: &ResourceKey, window_hours: i64) -> String {
    format!(
        "Alert for {} {} has been suppressed for {window_hours} hours.",
        key.instance, key.device
    )
}

/// Kind of an inbound interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    /// Endpoint liveness check.
    Ping,
    /// A click on a message component.
    MessageComponent,
    /// Any kind this relay does not handle.
    Other(u8),
}

/// An inbound interaction callback.
#[derive(Debug, Clone, Deserialize)]
pub struct Interaction {
    /// Raw interaction type.
    #[serde(rename = "type")]
    pub kind: u8,
    /// Channel the interaction happened in.
    #[serde(default)]
    pub channel_id: Option<String>,
    /// Component data for message-component interactions.
    #[serde(default)]
    pub data: Option<ComponentData>,
    /// Message the clicked component belongs to.
    #[serde(default)]
    pub message: Option<InteractionMessage>,
    /// Acting guild member, for interactions in a guild.
    #[serde(default)]
    pub member: Option<Member>,
    /// Acting user, for interactions in a DM.
    #[serde(default)]
    pub user: Option<User>,
}

/// Component data of a click.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentData {
    /// Custom id of the clicked component.
    #[serde(default)]
    pub custom_id: String,
}

/// Reference to the message carrying the component.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionMessage {
    /// Message id.
    pub id: String,
    /// Channel of the message.
    #[serde(default)]
    pub channel_id: Option<String>,
}

/// Guild member wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    /// The member's user.
    pub user: User,
}

/// A user.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    /// User id.
    #[serde(default)]
    pub id: String,
    /// Username.
    #[serde(default)]
    pub username: String,
}

impl Interaction {
    /// Decodes an interaction from the raw, already verified, request body.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::InvalidRequest` if the body is not an interaction.
    pub fn from_slice(body: &[u8]) -> RelayResult<Self> {
        serde_json::from_slice(body)
            .map_err(|e| RelayError::InvalidRequest(format!("invalid interaction payload: {e}")))
    }

    /// Returns the interaction kind.
    #[must_use]
    pub const fn kind(&self) -> InteractionKind {
        match self.kind {
            PING => InteractionKind::Ping,
            MESSAGE_COMPONENT => InteractionKind::MessageComponent,
            other => InteractionKind::Other(other),
        }
    }

    /// Returns the custom id of the clicked component.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::InvalidRequest` if there is no component data.
    pub fn custom_id(&self) -> RelayResult<&str> {
        self.data
            .as_ref()
            .map(|d| d.custom_id.as_str())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| RelayError::InvalidRequest("missing component custom_id".to_string()))
    }

    /// Name of the acting user, or `unknown`.
    #[must_use]
    pub fn actor(&self) -> &str {
        self.member
            .as_ref()
            .map(|m| &m.user)
            .or(self.user.as_ref())
            .map(|u| u.username.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or("unknown")
    }

    /// Channel and message id of the originating message, if present.
    ///
    /// The channel is taken from the message, then from the interaction,
    /// then `default_channel`.
    #[must_use]
    pub fn origin<'a>(&'a self, default_channel: &'a str) -> Option<(&'a str, &'a str)> {
        let message = self.message.as_ref()?;
        let channel = message
            .channel_id
            .as_deref()
            .or(self.channel_id.as_deref())
            .unwrap_or(default_channel);
        Some((channel, message.id.as_str()))
    }
}

/// Reply body for an interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractionResponse {
    /// Response type.
    #[serde(rename = "type")]
    pub kind: u8,
    /// Message data for message responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

/// Message content of an interaction reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseData {
    /// Text.
    pub content: String,
    /// Message flags.
    pub flags: u64,
}

impl InteractionResponse {
    /// Acknowledges a ping.
    #[must_use]
    pub const fn pong() -> Self {
        Self {
            kind: PONG,
            data: None,
        }
    }

    /// A reply only the acting user can see.
    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            kind: CHANNEL_MESSAGE_WITH_SOURCE,
            data: Some(ResponseData {
                content: content.into(),
                flags: EPHEMERAL,
            }),
        }
    }
}
