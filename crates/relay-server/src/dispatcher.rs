//! The suppression state machine.
//!
//! Per resource key there are two states. With no active record the key is
//! `Active` and alerts deliver normally. With an active record it is
//! `Suppressed` and firing alerts are dropped until the record expires.
//!
//! - firing, Active: deliver with an acknowledgment action.
//! - firing, Suppressed: drop without any provider call.
//! - resolved, any state: deliver, then delete the key's record.
//! - acknowledgment: upsert `now + window`, edit the originating message.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use relay_alerts::{Alert, AlertStatus, MessageBatcher, Renderer};
use relay_notify::{AckAction, MessageId, Notifier};
use relay_suppress::{ResourceKey, SuppressionRecord, SuppressionStore};
use serde::Serialize;
use tracing::{debug, error, info};

use crate::error::RelayResult;
use crate::interaction::{action_label, build_custom_id, confirmation, suppressed_notice};

/// Outcome of dispatching one webhook's alerts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    /// Messages delivered to the provider.
    pub messages_sent: usize,
    /// Firing alerts dropped because their key is acknowledged.
    pub suppressed: usize,
    /// Alerts with a status this relay does not act on.
    pub ignored: usize,
    /// Provider ids of the delivered messages, in order.
    pub message_ids: Vec<MessageId>,
}

/// Result of an acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acknowledgement {
    /// The record that now suppresses the key.
    pub record: SuppressionRecord,
    /// Confirmation text for the acting user.
    pub confirmation: String,
}

/// Where an acknowledged message lives.
#[derive(Debug, Clone, Copy)]
pub struct MessageOrigin<'a> {
    /// Channel of the message.
    pub channel_id: &'a str,
    /// Message id.
    pub message_id: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    Deliver,
    Suppress,
    Ignore,
}

/// Applies suppression to inbound alerts and acknowledgments to the store.
#[derive(Debug, Clone)]
pub struct AlertDispatcher {
    store: Arc<dyn SuppressionStore>,
    ack_window: Duration,
}

impl AlertDispatcher {
    /// Creates a dispatcher over `store` with the given acknowledgment window.
    #[must_use]
    pub fn new(store: Arc<dyn SuppressionStore>, ack_window: Duration) -> Self {
        Self { store, ack_window }
    }

    /// Returns the store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn SuppressionStore> {
        &self.store
    }

    /// Returns the acknowledgment window.
    #[must_use]
    pub const fn ack_window(&self) -> Duration {
        self.ack_window
    }

    fn window_hours(&self) -> i64 {
        self.ack_window.num_hours()
    }

    fn gate(&self, alert: &Alert, key: &ResourceKey, now: DateTime<Utc>) -> RelayResult<Gate> {
        match alert.status {
            AlertStatus::Firing => {
                let active = self.store.lookup_active(key, now).inspect_err(|e| {
                    error!(key = %key, error = %e, "suppression lookup failed");
                })?;
                match active {
                    Some(record) => {
                        info!(
                            instance = %key.instance,
                            device = %key.device,
                            until = %record.suppressed_until,
                            "alert suppressed"
                        );
                        Ok(Gate::Suppress)
                    }
                    None => Ok(Gate::Deliver),
                }
            }
            AlertStatus::Resolved => Ok(Gate::Deliver),
            AlertStatus::Unknown => {
                debug!(key = %key, "ignoring alert with unhandled status");
                Ok(Gate::Ignore)
            }
        }
    }

    fn clear(&self, key: &ResourceKey) -> RelayResult<()> {
        let existed = self.store.delete(key).inspect_err(|e| {
            error!(key = %key, error = %e, "failed to clear suppression");
        })?;
        debug!(key = %key, existed, "cleared suppression for resolved alert");
        Ok(())
    }

    /// Dispatches `alerts` to `notifier` using the current time.
    ///
    /// # Errors
    ///
    /// The first store or delivery failure aborts the rest of the batch.
    /// Messages already delivered stay delivered.
    pub async fn dispatch(&self, notifier: &dyn Notifier, alerts: &[Alert]) -> RelayResult<DispatchReport> {
        self.dispatch_at(notifier, alerts, Utc::now()).await
    }

    /// Dispatches `alerts`, evaluating suppression at `now`.
    ///
    /// Notifiers with action support get one message per alert; the others
    /// get the deliverable alerts packed under the provider's size ceiling.
    ///
    /// # Errors
    ///
    /// The first store or delivery failure aborts the rest of the batch.
    pub async fn dispatch_at(
        &self,
        notifier: &dyn Notifier,
        alerts: &[Alert],
        now: DateTime<Utc>,
    ) -> RelayResult<DispatchReport> {
        let report = if notifier.supports_actions() {
            self.dispatch_each(notifier, alerts, now).await?
        } else {
            self.dispatch_batched(notifier, alerts, now).await?
        };

        info!(
            notifier = notifier.name(),
            alerts = alerts.len(),
            sent = report.messages_sent,
            suppressed = report.suppressed,
            ignored = report.ignored,
            "dispatched alerts"
        );
        Ok(report)
    }

    async fn dispatch_each(
        &self,
        notifier: &dyn Notifier,
        alerts: &[Alert],
        now: DateTime<Utc>,
    ) -> RelayResult<DispatchReport> {
        let mut report = DispatchReport::default();
        let provider = notifier.provider();

        for alert in alerts {
            let key = ResourceKey::from_alert(alert);
            match self.gate(alert, &key, now)? {
                Gate::Suppress => report.suppressed += 1,
                Gate::Ignore => report.ignored += 1,
                Gate::Deliver => {
                    let text = provider.render(alert);
                    let sent = if alert.status == AlertStatus::Firing {
                        let action = AckAction::new(build_custom_id(&key), action_label(self.window_hours()));
                        notifier.send_with_action(&text, &action).await
                    } else {
                        notifier.send(&text).await
                    };
                    let id = sent.inspect_err(|e| {
                        error!(notifier = notifier.name(), key = %key, error = %e, "delivery failed");
                    })?;

                    report.messages_sent += 1;
                    report.message_ids.push(id);

                    if alert.status == AlertStatus::Resolved {
                        self.clear(&key)?;
                    }
                }
            }
        }
        Ok(report)
    }

    async fn dispatch_batched(
        &self,
        notifier: &dyn Notifier,
        alerts: &[Alert],
        now: DateTime<Utc>,
    ) -> RelayResult<DispatchReport> {
        let mut report = DispatchReport::default();
        let mut deliverable = Vec::with_capacity(alerts.len());
        // Keys an earlier resolved alert in this batch clears before any
        // later alert is delivered.
        let mut clearing: HashSet<ResourceKey> = HashSet::new();

        for alert in alerts {
            let key = ResourceKey::from_alert(alert);
            let gate = if alert.status == AlertStatus::Firing && clearing.contains(&key) {
                debug!(key = %key, "firing after resolved in the same batch, not suppressed");
                Gate::Deliver
            } else {
                self.gate(alert, &key, now)?
            };
            match gate {
                Gate::Suppress => report.suppressed += 1,
                Gate::Ignore => report.ignored += 1,
                Gate::Deliver => {
                    if alert.status == AlertStatus::Resolved {
                        clearing.insert(key);
                    }
                    deliverable.push(alert.clone());
                }
            }
        }

        let provider = notifier.provider();
        let batcher = MessageBatcher::new(provider, provider.max_message_len());

        for message in batcher.batch(&deliverable) {
            let id = notifier.send(&message.text).await.inspect_err(|e| {
                error!(
                    notifier = notifier.name(),
                    ordinal = message.ordinal,
                    error = %e,
                    "delivery failed"
                );
            })?;
            report.messages_sent += 1;
            report.message_ids.push(id);

            for alert in &deliverable[message.alerts.clone()] {
                if alert.status == AlertStatus::Resolved {
                    self.clear(&ResourceKey::from_alert(alert))?;
                }
            }
        }
        Ok(report)
    }

    /// Acknowledges `key` at the current time.
    ///
    /// # Errors
    ///
    /// Returns a store error if the upsert fails, or a delivery error if the
    /// originating message cannot be edited.
    pub async fn acknowledge(
        &self,
        notifier: &dyn Notifier,
        key: ResourceKey,
        actor: &str,
        origin: Option<MessageOrigin<'_>>,
    ) -> RelayResult<Acknowledgement> {
        self.acknowledge_at(notifier, key, actor, origin, Utc::now()).await
    }

    /// Suppresses `key` until `now + window`, then edits the originating
    /// message to show who acknowledged it and disables its button.
    ///
    /// # Errors
    ///
    /// Returns a store error if the upsert fails, or a delivery error if the
    /// originating message cannot be edited. The record is kept in the latter
    /// case.
    pub async fn acknowledge_at(
        &self,
        notifier: &dyn Notifier,
        key: ResourceKey,
        actor: &str,
        origin: Option<MessageOrigin<'_>>,
        now: DateTime<Utc>,
    ) -> RelayResult<Acknowledgement> {
        let hours = self.window_hours();
        let reason = format!("acknowledged by {actor} via {}", notifier.name());
        let record = self
            .store
            .upsert(key.clone(), now + self.ack_window, &reason)
            .inspect_err(|e| error!(key = %key, error = %e, "failed to store acknowledgment"))?;

        info!(
            instance = %key.instance,
            device = %key.device,
            actor,
            until = %record.suppressed_until,
            "alert acknowledged"
        );

        match origin {
            Some(origin) => {
                let action = AckAction::new(build_custom_id(&key), action_label(hours)).disabled();
                notifier
                    .update(
                        origin.channel_id,
                        &MessageId::new(origin.message_id),
                        &suppressed_notice(hours, actor),
                        Some(&action),
                    )
                    .await
                    .inspect_err(|e| {
                        error!(key = %key, error = %e, "failed to update acknowledged message");
                    })?;
            }
            None => debug!(key = %key, "acknowledgment has no originating message to update"),
        }

        Ok(Acknowledgement {
            confirmation: confirmation(&key, hours),
            record,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_alerts::{DEVICE_LABEL, INSTANCE_LABEL, Provider, SUMMARY_ANNOTATION, UPTIME_VALUE_KEY};
    use relay_notify::{NotifyError, NotifyFuture, NotifyResult};
    use relay_suppress::{MemorySuppressionStore, StoreError, StoreResult};
    use parking_lot::Mutex;

    use crate::error::RelayError;

    type Sent = (String, Option<AckAction>);
    type Update = (String, String, String, Option<AckAction>);

    #[derive(Debug, Default)]
    struct RecordingNotifier {
        actions: bool,
        fail_on: Option<usize>,
        sent: Mutex<Vec<Sent>>,
        updates: Mutex<Vec<Update>>,
    }

    impl RecordingNotifier {
        fn interactive() -> Self {
            Self {
                actions: true,
                ..Self::default()
            }
        }

        fn batched() -> Self {
            Self::default()
        }

        fn record(&self, text: &str, action: Option<AckAction>) -> NotifyResult<MessageId> {
            let mut sent = self.sent.lock();
            if self.fail_on == Some(sent.len()) {
                return Err(NotifyError::Api {
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            sent.push((text.to_string(), action));
            Ok(MessageId::new(format!("m{}", sent.len())))
        }
    }

    impl Notifier for RecordingNotifier {
        fn name(&self) -> &str {
            "recording"
        }

        fn provider(&self) -> Provider {
            if self.actions { Provider::Discord } else { Provider::Telegram }
        }

        fn channel_id(&self) -> &str {
            "chan"
        }

        fn supports_actions(&self) -> bool {
            self.actions
        }

        fn send<'a>(&'a self, text: &'a str) -> NotifyFuture<'a, MessageId> {
            Box::pin(async move { self.record(text, None) })
        }

        fn send_with_action<'a>(&'a self, text: &'a str, action: &'a AckAction) -> NotifyFuture<'a, MessageId> {
            Box::pin(async move { self.record(text, Some(action.clone())) })
        }

        fn update<'a>(
            &'a self,
            channel_id: &'a str,
            message_id: &'a MessageId,
            text: &'a str,
            action: Option<&'a AckAction>,
        ) -> NotifyFuture<'a, ()> {
            Box::pin(async move {
                self.updates.lock().push((
                    channel_id.to_string(),
                    message_id.to_string(),
                    text.to_string(),
                    action.cloned(),
                ));
                Ok(())
            })
        }
    }

    /// Memory store that counts deletes and can be made to fail.
    #[derive(Debug, Default)]
    struct CountingStore {
        inner: MemorySuppressionStore,
        deletes: Mutex<Vec<ResourceKey>>,
        lookups: Mutex<usize>,
        fail: bool,
    }

    impl CountingStore {
        fn check(&self) -> StoreResult<()> {
            if self.fail {
                Err(StoreError::Backend("unreachable".to_string()))
            } else {
                Ok(())
            }
        }
    }

    impl SuppressionStore for CountingStore {
        fn lookup_active(&self, key: &ResourceKey, now: DateTime<Utc>) -> StoreResult<Option<SuppressionRecord>> {
            *self.lookups.lock() += 1;
            self.check()?;
            self.inner.lookup_active(key, now)
        }

        fn upsert(&self, key: ResourceKey, until: DateTime<Utc>, reason: &str) -> StoreResult<SuppressionRecord> {
            self.check()?;
            self.inner.upsert(key, until, reason)
        }

        fn delete(&self, key: &ResourceKey) -> StoreResult<bool> {
            self.deletes.lock().push(key.clone());
            self.check()?;
            self.inner.delete(key)
        }

        fn list_active(&self, now: DateTime<Utc>) -> StoreResult<Vec<SuppressionRecord>> {
            self.check()?;
            self.inner.list_active(now)
        }
    }

    fn alert(status: AlertStatus, instance: &str, device: &str, summary: &str) -> Alert {
        Alert::new(status)
            .with_label(INSTANCE_LABEL, instance)
            .with_label(DEVICE_LABEL, device)
            .with_annotation(SUMMARY_ANNOTATION, summary)
            .with_value(UPTIME_VALUE_KEY, 3_153_600_000_i64)
    }

    fn firing(instance: &str, device: &str) -> Alert {
        alert(AlertStatus::Firing, instance, device, "disk full")
    }

    fn resolved(instance: &str, device: &str) -> Alert {
        alert(AlertStatus::Resolved, instance, device, "disk full")
    }

    fn setup() -> (Arc<CountingStore>, AlertDispatcher) {
        let store = Arc::new(CountingStore::default());
        let dispatcher = AlertDispatcher::new(store.clone(), Duration::hours(72));
        (store, dispatcher)
    }

    #[tokio::test]
    async fn firing_alert_is_sent_with_action() {
        let (_store, dispatcher) = setup();
        let notifier = RecordingNotifier::interactive();

        let report = dispatcher.dispatch(&notifier, &[firing("h1", "sda")]).await.unwrap();

        assert_eq!(report.messages_sent, 1);
        assert_eq!(report.message_ids, vec![MessageId::new("m1")]);
        let sent = notifier.sent.lock();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].0.contains("disk full"));
        assert!(sent[0].0.contains("100.00"));
        let action = sent[0].1.as_ref().unwrap();
        assert_eq!(action.custom_id, "resolve:h1:sda");
        assert_eq!(action.label, "Resolve for 72h");
        assert!(!action.disabled);
    }

    #[tokio::test]
    async fn suppressed_firing_alert_is_not_sent() {
        let (store, dispatcher) = setup();
        let now = Utc::now();
        store.upsert(ResourceKey::new("node1", "sda1"), now + Duration::hours(1), "ack").unwrap();
        let notifier = RecordingNotifier::interactive();

        let report = dispatcher.dispatch_at(&notifier, &[firing("node1", "sda1")], now).await.unwrap();

        assert_eq!(report.suppressed, 1);
        assert_eq!(report.messages_sent, 0);
        assert!(notifier.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn suppression_is_per_key() {
        let (store, dispatcher) = setup();
        let now = Utc::now();
        store.upsert(ResourceKey::new("node1", "sda1"), now + Duration::hours(1), "ack").unwrap();
        let notifier = RecordingNotifier::interactive();

        let alerts = [firing("node1", "sda1"), firing("node1", "sdb1")];
        let report = dispatcher.dispatch_at(&notifier, &alerts, now).await.unwrap();

        assert_eq!(report.suppressed, 1);
        assert_eq!(report.messages_sent, 1);
        assert_eq!(notifier.sent.lock()[0].1.as_ref().unwrap().custom_id, "resolve:node1:sdb1");
    }

    #[tokio::test]
    async fn expired_suppression_delivers() {
        let (store, dispatcher) = setup();
        let now = Utc::now();
        store.upsert(ResourceKey::new("h1", "sda"), now - Duration::seconds(1), "old").unwrap();
        let notifier = RecordingNotifier::interactive();

        let report = dispatcher.dispatch_at(&notifier, &[firing("h1", "sda")], now).await.unwrap();

        assert_eq!(report.messages_sent, 1);
    }

    #[tokio::test]
    async fn resolved_alert_is_sent_and_clears_suppression_once() {
        let (store, dispatcher) = setup();
        let now = Utc::now();
        let key = ResourceKey::new("node1", "sda1");
        store.upsert(key.clone(), now + Duration::hours(1), "ack").unwrap();
        let notifier = RecordingNotifier::interactive();

        let report = dispatcher.dispatch_at(&notifier, &[resolved("node1", "sda1")], now).await.unwrap();

        assert_eq!(report.messages_sent, 1);
        assert!(notifier.sent.lock()[0].1.is_none());
        assert_eq!(*store.deletes.lock(), vec![key.clone()]);
        assert!(store.lookup_active(&key, now).unwrap().is_none());
    }

    #[tokio::test]
    async fn resolved_without_record_still_deletes_once() {
        let (store, dispatcher) = setup();
        let notifier = RecordingNotifier::interactive();

        dispatcher.dispatch(&notifier, &[resolved("h1", "sda")]).await.unwrap();

        assert_eq!(store.deletes.lock().len(), 1);
    }

    #[tokio::test]
    async fn unknown_status_is_ignored_without_store_calls() {
        let (store, dispatcher) = setup();
        let notifier = RecordingNotifier::interactive();

        let report = dispatcher
            .dispatch(&notifier, &[alert(AlertStatus::Unknown, "h1", "sda", "x")])
            .await
            .unwrap();

        assert_eq!(report.ignored, 1);
        assert_eq!(report.messages_sent, 0);
        assert!(notifier.sent.lock().is_empty());
        assert_eq!(*store.lookups.lock(), 0);
        assert!(store.deletes.lock().is_empty());
    }

    #[tokio::test]
    async fn batched_provider_packs_alerts_without_actions() {
        let (store, dispatcher) = setup();
        let now = Utc::now();
        store.upsert(ResourceKey::new("h2", "sda"), now + Duration::hours(1), "ack").unwrap();
        let notifier = RecordingNotifier::batched();

        let alerts = [
            firing("h1", "sda"),
            firing("h2", "sda"),
            alert(AlertStatus::Unknown, "h3", "sda", "x"),
            resolved("h4", "sda"),
        ];
        let report = dispatcher.dispatch_at(&notifier, &alerts, now).await.unwrap();

        assert_eq!(report.messages_sent, 1);
        assert_eq!(report.suppressed, 1);
        assert_eq!(report.ignored, 1);

        let sent = notifier.sent.lock();
        assert!(sent[0].1.is_none());
        assert!(sent[0].0.contains("Node = h1"));
        assert!(!sent[0].0.contains("Node = h2"));
        assert!(sent[0].0.contains("Node = h4"));
        assert_eq!(*store.deletes.lock(), vec![ResourceKey::new("h4", "sda")]);
    }

    #[tokio::test]
    async fn batched_provider_splits_over_limit() {
        let (_store, dispatcher) = setup();
        let notifier = RecordingNotifier::batched();
        let long = "x".repeat(1500);
        let alerts: Vec<Alert> = (0..6)
            .map(|i| alert(AlertStatus::Firing, &format!("h{i}"), "sda", &long))
            .collect();

        let report = dispatcher.dispatch(&notifier, &alerts).await.unwrap();

        assert!(report.messages_sent > 1);
        for (text, _) in notifier.sent.lock().iter() {
            assert!(text.chars().count() <= Provider::Telegram.max_message_len());
        }
    }

    #[tokio::test]
    async fn all_suppressed_sends_nothing() {
        let (store, dispatcher) = setup();
        let now = Utc::now();
        store.upsert(ResourceKey::new("h1", "sda"), now + Duration::hours(1), "ack").unwrap();
        let notifier = RecordingNotifier::batched();

        let report = dispatcher.dispatch_at(&notifier, &[firing("h1", "sda")], now).await.unwrap();

        assert_eq!(report, DispatchReport { suppressed: 1, ..DispatchReport::default() });
        assert!(notifier.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn delivery_failure_aborts_remaining_alerts() {
        let (store, dispatcher) = setup();
        let notifier = RecordingNotifier {
            fail_on: Some(1),
            ..RecordingNotifier::interactive()
        };

        let alerts = [firing("h1", "sda"), resolved("h2", "sda"), firing("h3", "sda")];
        let err = dispatcher.dispatch(&notifier, &alerts).await.unwrap_err();

        assert!(matches!(err, RelayError::Delivery(_)));
        assert_eq!(notifier.sent.lock().len(), 1);
        assert!(store.deletes.lock().is_empty());
    }

    #[tokio::test]
    async fn store_failure_is_fatal() {
        let store = Arc::new(CountingStore {
            fail: true,
            ..CountingStore::default()
        });
        let dispatcher = AlertDispatcher::new(store, Duration::hours(72));
        let notifier = RecordingNotifier::interactive();

        let err = dispatcher.dispatch(&notifier, &[firing("h1", "sda")]).await.unwrap_err();

        assert!(matches!(err, RelayError::Store(_)));
        assert!(notifier.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn acknowledge_upserts_and_updates_message() {
        let (store, dispatcher) = setup();
        let notifier = RecordingNotifier::interactive();
        let now = Utc::now();
        let key = ResourceKey::new("h1", "sda");
        let origin = MessageOrigin {
            channel_id: "998877",
            message_id: "555",
        };

        let ack = dispatcher
            .acknowledge_at(&notifier, key.clone(), "alice", Some(origin), now)
            .await
            .unwrap();

        assert_eq!(ack.record.suppressed_until, now + Duration::hours(72));
        assert_eq!(ack.confirmation, "Alert for h1 sda has been suppressed for 72 hours.");
        assert!(store.lookup_active(&key, now).unwrap().is_some());

        let updates = notifier.updates.lock();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].0, "998877");
        assert_eq!(updates[0].1, "555");
        assert_eq!(updates[0].2, "**Alert suppressed for 72 hours by alice**");
        let action = updates[0].3.as_ref().unwrap();
        assert!(action.disabled);
        assert_eq!(action.custom_id, "resolve:h1:sda");
    }

    #[tokio::test]
    async fn acknowledge_without_origin_skips_update() {
        let (_store, dispatcher) = setup();
        let notifier = RecordingNotifier::interactive();

        dispatcher
            .acknowledge(&notifier, ResourceKey::new("h1", "sda"), "alice", None)
            .await
            .unwrap();

        assert!(notifier.updates.lock().is_empty());
    }

    #[tokio::test]
    async fn acknowledge_resets_expiry() {
        let (store, dispatcher) = setup();
        let notifier = RecordingNotifier::interactive();
        let key = ResourceKey::new("h1", "sda");
        let now = Utc::now();
        store.upsert(key.clone(), now + Duration::hours(1), "earlier").unwrap();

        dispatcher.acknowledge_at(&notifier, key.clone(), "bob", None, now).await.unwrap();

        let record = store.lookup_active(&key, now).unwrap().unwrap();
        assert_eq!(record.suppressed_until, now + Duration::hours(72));
        assert!(record.reason.contains("bob"));
    }

    #[tokio::test]
    async fn acknowledgment_gates_later_firing_on_every_provider() {
        let (_store, dispatcher) = setup();
        let discord = RecordingNotifier::interactive();
        let telegram = RecordingNotifier::batched();
        let now = Utc::now();

        dispatcher
            .acknowledge_at(&discord, ResourceKey::new("h1", "sda"), "alice", None, now)
            .await
            .unwrap();

        let later = now + Duration::hours(71);
        let d = dispatcher.dispatch_at(&discord, &[firing("h1", "sda")], later).await.unwrap();
        let t = dispatcher.dispatch_at(&telegram, &[firing("h1", "sda")], later).await.unwrap();
        assert_eq!((d.suppressed, t.suppressed), (1, 1));

        let after = now + Duration::hours(73);
        let d = dispatcher.dispatch_at(&discord, &[firing("h1", "sda")], after).await.unwrap();
        assert_eq!(d.messages_sent, 1);
    }

    #[tokio::test]
    async fn firing_after_resolved_same_key_is_delivered_on_every_provider() {
        for notifier in [RecordingNotifier::interactive(), RecordingNotifier::batched()] {
            let (store, dispatcher) = setup();
            let now = Utc::now();
            let key = ResourceKey::new("h1", "sda");
            store.upsert(key.clone(), now + Duration::hours(1), "ack").unwrap();

            let alerts = [
                alert(AlertStatus::Resolved, "h1", "sda", "old issue"),
                alert(AlertStatus::Firing, "h1", "sda", "new issue"),
            ];
            let report = dispatcher.dispatch_at(&notifier, &alerts, now).await.unwrap();

            let provider = notifier.provider();
            assert_eq!(report.suppressed, 0, "{provider}");
            let sent = notifier.sent.lock();
            assert!(sent.iter().any(|(text, _)| text.contains("new issue")), "{provider}");
            assert_eq!(*store.deletes.lock(), vec![key.clone()], "{provider}");
            assert!(store.lookup_active(&key, now).unwrap().is_none(), "{provider}");
        }
    }

    #[tokio::test]
    async fn firing_before_resolved_same_key_stays_suppressed() {
        let (store, dispatcher) = setup();
        let now = Utc::now();
        store.upsert(ResourceKey::new("h1", "sda"), now + Duration::hours(1), "ack").unwrap();
        let notifier = RecordingNotifier::batched();

        let alerts = [
            alert(AlertStatus::Firing, "h1", "sda", "still firing"),
            alert(AlertStatus::Resolved, "h1", "sda", "now resolved"),
        ];
        let report = dispatcher.dispatch_at(&notifier, &alerts, now).await.unwrap();

        assert_eq!(report.suppressed, 1);
        assert_eq!(report.messages_sent, 1);
        assert!(!notifier.sent.lock()[0].0.contains("still firing"));
    }
}
