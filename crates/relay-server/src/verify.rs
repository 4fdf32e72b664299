//! Ed25519 verification of signed interaction callbacks.
//!
//! The signed message is the timestamp header followed by the raw request
//! body, byte for byte. Verification must run on the bytes received, before
//! any JSON decoding.

use std::time::Duration;

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use tracing::{debug, warn};

use crate::error::{RelayError, RelayResult};

/// Header carrying the hex-encoded signature.
pub const SIGNATURE_HEADER: &str = "x-signature-ed25519";

/// Header carrying the signed timestamp.
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

/// Verifies `signature_hex` over `timestamp || body` with `public_key_hex`.
///
/// Malformed hex or wrong lengths for either the signature or the key fail
/// closed and return `false`.
#[must_use]
pub fn verify_signature(signature_hex: &str, timestamp: &str, body: &[u8], public_key_hex: &str) -> bool {
    match parse_public_key(public_key_hex) {
        Ok(key) => verify_with_key(&key, signature_hex, timestamp, body),
        Err(_) => false,
    }
}

fn parse_public_key(public_key_hex: &str) -> RelayResult<VerifyingKey> {
    let bytes: [u8; 32] = hex::decode(public_key_hex.trim())
        .map_err(|e| RelayError::Config(format!("invalid public key hex: {e}")))?
        .try_into()
        .map_err(|_| RelayError::Config("public key must be 32 bytes (64 hex chars)".to_string()))?;
    VerifyingKey::from_bytes(&bytes)
        .map_err(|e| RelayError::Config(format!("invalid public key: {e}")))
}

fn verify_with_key(key: &VerifyingKey, signature_hex: &str, timestamp: &str, body: &[u8]) -> bool {
    let Ok(bytes) = hex::decode(signature_hex.trim()) else {
        debug!("signature is not valid hex");
        return false;
    };
    let Ok(bytes) = <[u8; 64]>::try_from(bytes) else {
        debug!("signature has the wrong length");
        return false;
    };
    let signature = Signature::from_bytes(&bytes);

    let mut message = Vec::with_capacity(timestamp.len() + body.len());
    message.extend_from_slice(timestamp.as_bytes());
    message.extend_from_slice(body);

    key.verify(&message, &signature).is_ok()
}

/// Checks interaction signatures against one configured public key.
#[derive(Debug, Clone)]
pub struct InteractionVerifier {
    key: VerifyingKey,
    max_skew: Option<Duration>,
}

impl InteractionVerifier {
    /// Parses the hex-encoded public key.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Config` if the key is not 32 bytes of valid hex
    /// or not a valid curve point.
    pub fn from_hex(public_key_hex: &str) -> RelayResult<Self> {
        Ok(Self::new(parse_public_key(public_key_hex)?))
    }

    /// Creates a verifier for an already parsed key.
    #[must_use]
    pub fn new(key: VerifyingKey) -> Self {
        Self { key, max_skew: None }
    }

    /// Rejects timestamps further than `max_skew` from the current time.
    ///
    /// `None` disables the check.
    #[must_use]
    pub fn with_max_skew(mut self, max_skew: Option<Duration>) -> Self {
        self.max_skew = max_skew;
        self
    }

    /// Returns the configured key.
    #[must_use]
    pub const fn key(&self) -> &VerifyingKey {
        &self.key
    }

    /// Verifies a signature using the current time for the skew check.
    #[must_use]
    pub fn verify(&self, signature_hex: &str, timestamp: &str, body: &[u8]) -> bool {
        self.verify_at(signature_hex, timestamp, body, Utc::now())
    }

    /// Verifies a signature, evaluating the skew check at `now`.
    #[must_use]
    pub fn verify_at(
        &self,
        signature_hex: &str,
        timestamp: &str,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> bool {
        if !self.timestamp_fresh(timestamp, now) {
            warn!(timestamp, "interaction timestamp outside allowed skew");
            return false;
        }
        verify_with_key(&self.key, signature_hex, timestamp, body)
    }

    /// Extracts the signature headers and verifies `body`.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Unauthorized` if either header is missing or the
    /// signature does not verify.
    pub fn verify_request(&self, headers: &HeaderMap, body: &[u8], now: DateTime<Utc>) -> RelayResult<()> {
        let signature = header(headers, SIGNATURE_HEADER)?;
        let timestamp = header(headers, TIMESTAMP_HEADER)?;

        if self.verify_at(signature, timestamp, body, now) {
            Ok(())
        } else {
            Err(RelayError::Unauthorized("invalid request signature".to_string()))
        }
    }

    fn timestamp_fresh(&self, timestamp: &str, now: DateTime<Utc>) -> bool {
        let Some(max_skew) = self.max_skew else {
            return true;
        };
        let Ok(secs) = timestamp.trim().parse::<i64>() else {
            return false;
        };
        now.timestamp().abs_diff(secs) <= max_skew.as_secs()
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> RelayResult<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| RelayError::Unauthorized(format!("missing {name} header")))
}
