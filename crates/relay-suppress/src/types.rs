//! Resource keys and suppression records.

use std::fmt;

use chrono::{DateTime, Utc};
use relay_alerts::Alert;
use serde::{Deserialize, Serialize};

/// Identity of the resource an acknowledgment applies to.
///
/// Built from the `instance` and `device` labels. A missing label is stored
/// as an empty string so alerts lacking it still share one key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceKey {
    /// Host the alert refers to.
    pub instance: String,
    /// Device on that host.
    pub device: String,
}

impl ResourceKey {
    /// Creates a key from its two components.
    pub fn new(instance: impl Into<String>, device: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
            device: device.into(),
        }
    }

    /// Extracts the key from an alert's labels.
    #[must_use]
    pub fn from_alert(alert: &Alert) -> Self {
        Self::new(
            alert.instance().unwrap_or_default(),
            alert.device().unwrap_or_default(),
        )
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.instance, self.device)
    }
}

/// A statement that alerts for a resource are acknowledged until a deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppressionRecord {
    /// The acknowledged resource.
    #[serde(flatten)]
    pub key: ResourceKey,
    /// Firing alerts for the key are dropped until this instant.
    pub suppressed_until: DateTime<Utc>,
    /// Free-text reason, e.g. who acknowledged it and how.
    pub reason: String,
}

impl SuppressionRecord {
    /// Creates a record.
    pub fn new(key: ResourceKey, suppressed_until: DateTime<Utc>, reason: impl Into<String>) -> Self {
        Self {
            key,
            suppressed_until,
            reason: reason.into(),
        }
    }

    /// Returns true while `now` is strictly before the deadline.
    #[must_use]
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.suppressed_until > now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use relay_alerts::{AlertStatus, DEVICE_LABEL, INSTANCE_LABEL};

    #[test]
    fn key_from_alert_labels() {
        let alert = Alert::new(AlertStatus::Firing)
            .with_label(INSTANCE_LABEL, "node1")
            .with_label(DEVICE_LABEL, "sda1");

        assert_eq!(ResourceKey::from_alert(&alert), ResourceKey::new("node1", "sda1"));
    }

    #[test]
    fn key_from_alert_missing_labels() {
        let alert = Alert::new(AlertStatus::Resolved).with_label(INSTANCE_LABEL, "node1");
        assert_eq!(ResourceKey::from_alert(&alert), ResourceKey::new("node1", ""));
    }

    #[test]
    fn key_display() {
        assert_eq!(ResourceKey::new("h1", "sda").to_string(), "h1/sda");
    }

    #[test]
    fn record_activity_is_strict() {
        let now = Utc::now();
        let record = SuppressionRecord::new(ResourceKey::new("h1", "sda"), now, "ack");

        assert!(!record.is_active(now));
        assert!(record.is_active(now - Duration::seconds(1)));
        assert!(!record.is_active(now + Duration::seconds(1)));
    }

    #[test]
    fn record_serializes_flat() {
        let until = "2024-05-01T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let record = SuppressionRecord::new(ResourceKey::new("h1", "sda"), until, "ack");

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["instance"], "h1");
        assert_eq!(json["device"], "sda");
        assert_eq!(json["reason"], "ack");

        let back: SuppressionRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
