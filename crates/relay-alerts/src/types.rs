//! Inbound alert model.
//!
//! Mirrors the Grafana unified-alerting webhook body. Decoding is lenient:
//! unknown fields are ignored and missing or `null` maps become empty.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{AlertError, Result};
use crate::numeric::{safe_divide, NumericValue};

/// Annotation holding the human-readable description of an alert.
pub const SUMMARY_ANNOTATION: &str = "summary";

/// Label naming the host an alert refers to.
pub const INSTANCE_LABEL: &str = "instance";

/// Label naming the device on that host.
pub const DEVICE_LABEL: &str = "device";

/// Value key carrying the resource's uptime in seconds.
pub const UPTIME_VALUE_KEY: &str = "B";

/// Seconds in a 365-day year.
pub const SECONDS_PER_YEAR: f64 = 31_536_000.0;

/// Lifecycle state reported by the alert source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    /// The condition is currently active.
    Firing,
    /// The condition has ended.
    Resolved,
    /// Any status this relay does not act on.
    #[default]
    #[serde(other)]
    Unknown,
}

impl AlertStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Firing => "firing",
            Self::Resolved => "resolved",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observed condition instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Lifecycle state.
    #[serde(default)]
    pub status: AlertStatus,
    /// Identity labels (`instance` and `device` are load-bearing).
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: BTreeMap<String, String>,
    /// Free-form annotations (`summary` is load-bearing).
    #[serde(default, deserialize_with = "null_as_default")]
    pub annotations: BTreeMap<String, String>,
    /// Numeric sample values keyed by query reference.
    #[serde(default, deserialize_with = "null_as_default")]
    pub values: BTreeMap<String, NumericValue>,
    /// When the condition started.
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    /// When the condition ended (zero time while firing).
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    /// Source-side dedup key. Not used for suppression.
    #[serde(default)]
    pub fingerprint: String,
    /// Link back to the rule in the alert source.
    #[serde(default, rename = "generatorURL")]
    pub generator_url: Option<String>,
    /// Link that pre-fills a silence in the alert source.
    #[serde(default, rename = "silenceURL")]
    pub silence_url: Option<String>,
    /// Dashboard link, if the rule is attached to one.
    #[serde(default, rename = "dashboardURL")]
    pub dashboard_url: Option<String>,
    /// Panel link, if the rule is attached to one.
    #[serde(default, rename = "panelURL")]
    pub panel_url: Option<String>,
    /// Pre-formatted value summary from the source.
    #[serde(default)]
    pub value_string: Option<String>,
}

impl Alert {
    /// Creates an alert with the given status and no labels or values.
    #[must_use]
    pub fn new(status: AlertStatus) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    /// Adds a label.
    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Adds an annotation.
    #[must_use]
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    /// Adds a sample value.
    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<NumericValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Returns the `summary` annotation, or an empty string.
    #[must_use]
    pub fn summary(&self) -> &str {
        self.annotations
            .get(SUMMARY_ANNOTATION)
            .map_or("", String::as_str)
    }

    /// Returns a label value if present.
    #[must_use]
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    /// Returns the `instance` label, treating an empty value as absent.
    #[must_use]
    pub fn instance(&self) -> Option<&str> {
        self.label(INSTANCE_LABEL).filter(|v| !v.is_empty())
    }

    /// Returns the `device` label, treating an empty value as absent.
    #[must_use]
    pub fn device(&self) -> Option<&str> {
        self.label(DEVICE_LABEL).filter(|v| !v.is_empty())
    }

    /// Uptime in years derived from the `B` value; `0.0` when missing.
    #[must_use]
    pub fn uptime_years(&self) -> f64 {
        self.values
            .get(UPTIME_VALUE_KEY)
            .map_or(0.0, |v| safe_divide(v, SECONDS_PER_YEAR))
    }
}

/// Webhook body posted by the alert source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    /// The alerts, in source order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub alerts: Vec<Alert>,
    /// Receiver name configured in the source.
    #[serde(default)]
    pub receiver: Option<String>,
    /// Group-level status.
    #[serde(default)]
    pub status: Option<String>,
    /// Link to the source's alert list.
    #[serde(default, rename = "externalURL")]
    pub external_url: Option<String>,
}

impl WebhookPayload {
    /// Decodes a raw request body.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::InvalidPayload` for malformed JSON and
    /// `AlertError::EmptyBatch` when the alert list is missing or empty.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let payload: Self = serde_json::from_slice(body)?;
        if payload.alerts.is_empty() {
            return Err(AlertError::EmptyBatch);
        }
        Ok(payload)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
