//! Error types for the relay-alerts crate.

use thiserror::Error;

/// Errors raised while decoding inbound alert payloads.
#[derive(Debug, Error)]
pub enum AlertError {
    /// The request body is not a valid webhook payload.
    #[error("invalid alert payload: {0}")]
    InvalidPayload(String),

    /// The payload decoded but carried no alerts.
    #[error("no alerts found in request")]
    EmptyBatch,
}

impl From<serde_json::Error> for AlertError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidPayload(err.to_string())
    }
}

/// Result type for alert operations.
pub type Result<T> = std::result::Result<T, AlertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_invalid_payload() {
        let err = AlertError::InvalidPayload("expected value".to_string());
        assert_eq!(err.to_string(), "invalid alert payload: expected value");
    }

    #[test]
    fn error_display_empty_batch() {
        assert_eq!(AlertError::EmptyBatch.to_string(), "no alerts found in request");
    }

    #[test]
    fn error_from_serde_json() {
        let json_err = serde_json::from_str::<String>("invalid json").unwrap_err();
        let err: AlertError = json_err.into();
        assert!(matches!(err, AlertError::InvalidPayload(_)));
    }
}
