//! The suppression store capability and its in-memory backend.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::debug;

use crate::error::StoreResult;
use crate::types::{ResourceKey, SuppressionRecord};

/// Keyed persistence for suppression records.
///
/// Each mutating call is one atomic insert-or-replace or remove. Callers never
/// read, modify and write back a record themselves, so concurrent writers for
/// the same key resolve to the last write.
pub trait SuppressionStore: Send + Sync + fmt::Debug {
    /// Returns the record for `key` if it is still active at `now`.
    ///
    /// An expired record is reported as absent but is not removed.
    fn lookup_active(
        &self,
        key: &ResourceKey,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<SuppressionRecord>>;

    /// Creates or replaces the record for `key`, regardless of its prior state.
    fn upsert(
        &self,
        key: ResourceKey,
        suppressed_until: DateTime<Utc>,
        reason: &str,
    ) -> StoreResult<SuppressionRecord>;

    /// Removes any record for `key`. Returns whether one existed.
    fn delete(&self, key: &ResourceKey) -> StoreResult<bool>;

    /// Returns every record active at `now`, ordered by key.
    fn list_active(&self, now: DateTime<Utc>) -> StoreResult<Vec<SuppressionRecord>>;
}

impl<S: SuppressionStore + ?Sized> SuppressionStore for Arc<S> {
    fn lookup_active(
        &self,
        key: &ResourceKey,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<SuppressionRecord>> {
        (**self).lookup_active(key, now)
    }

    fn upsert(
        &self,
        key: ResourceKey,
        suppressed_until: DateTime<Utc>,
        reason: &str,
    ) -> StoreResult<SuppressionRecord> {
        (**self).upsert(key, suppressed_until, reason)
    }

    fn delete(&self, key: &ResourceKey) -> StoreResult<bool> {
        (**self).delete(key)
    }

    fn list_active(&self, now: DateTime<Utc>) -> StoreResult<Vec<SuppressionRecord>> {
        (**self).list_active(now)
    }
}

/// Records active at `now`, sorted by key.
pub(crate) fn active_records<'a>(
    records: impl Iterator<Item = &'a SuppressionRecord>,
    now: DateTime<Utc>,
) -> Vec<SuppressionRecord> {
    let mut active: Vec<SuppressionRecord> =
        records.filter(|r| r.is_active(now)).cloned().collect();
    active.sort_by(|a, b| a.key.cmp(&b.key));
    active
}

/// Process-local store. Records are lost on restart.
#[derive(Debug, Default)]
pub struct MemorySuppressionStore {
    records: RwLock<HashMap<ResourceKey, SuppressionRecord>>,
}

impl MemorySuppressionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns true if no records are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl SuppressionStore for MemorySuppressionStore {
    fn lookup_active(
        &self,
        key: &ResourceKey,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<SuppressionRecord>> {
        Ok(self
            .records
            .read()
            .get(key)
            .filter(|r| r.is_active(now))
            .cloned())
    }

    fn upsert(
        &self,
        key: ResourceKey,
        suppressed_until: DateTime<Utc>,
        reason: &str,
    ) -> StoreResult<SuppressionRecord> {
        let record = SuppressionRecord::new(key.clone(), suppressed_until, reason);
        self.records.write().insert(key, record.clone());
        debug!(key = %record.key, until = %suppressed_until, "upserted suppression");
        Ok(record)
    }

    fn delete(&self, key: &ResourceKey) -> StoreResult<bool> {
        Ok(self.records.write().remove(key).is_some())
    }

    fn list_active(&self, now: DateTime<Utc>) -> StoreResult<Vec<SuppressionRecord>> {
        Ok(active_records(self.records.read().values(), now))
    }
}
