//! Error types for notifiers.

use thiserror::Error;

/// Errors raised while talking to a chat provider.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The request could not be sent or its response could not be read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a failure.
    #[error("provider returned {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body or provider description.
        body: String,
    },

    /// The provider answered with a body this client cannot interpret.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),

    /// The notifier was configured with unusable settings.
    #[error("invalid notifier configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for NotifyError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

/// Result type for notifier operations.
pub type NotifyResult<T> = std::result::Result<T, NotifyError>;
