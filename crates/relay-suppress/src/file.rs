//! File-backed suppression store.
//!
//! Records live in memory and are snapshotted as JSON to
//! `<dir>/suppressions.json` after every mutation. The snapshot is written to
//! a temporary file and renamed into place so a crash never leaves a torn
//! file behind.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::store::{SuppressionStore, active_records};
use crate::types::{ResourceKey, SuppressionRecord};

/// Snapshot file name inside the store directory.
pub const SNAPSHOT_FILE: &str = "suppressions.json";

/// Suppression store that survives restarts.
#[derive(Debug)]
pub struct FileSuppressionStore {
    path: PathBuf,
    records: RwLock<HashMap<ResourceKey, SuppressionRecord>>,
}

impl FileSuppressionStore {
    /// Opens the store in `dir`, creating the directory if needed.
    ///
    /// Records already expired at `now` are dropped while loading.
    pub fn open(dir: &Path, now: DateTime<Utc>) -> StoreResult<Self> {
        fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
        let path = dir.join(SNAPSHOT_FILE);

        let loaded: Vec<SuppressionRecord> = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(StoreError::io(&path, e)),
        };

        let total = loaded.len();
        let records: HashMap<ResourceKey, SuppressionRecord> = loaded
            .into_iter()
            .filter(|r| r.is_active(now))
            .map(|r| (r.key.clone(), r))
            .collect();

        info!(
            path = %path.display(),
            loaded = records.len(),
            expired = total - records.len(),
            "opened suppression store"
        );

        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    /// Path of the snapshot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn snapshot(&self, records: &HashMap<ResourceKey, SuppressionRecord>) -> StoreResult<()> {
        let mut ordered: Vec<&SuppressionRecord> = records.values().collect();
        ordered.sort_by(|a, b| a.key.cmp(&b.key));
        let json = serde_json::to_vec_pretty(&ordered)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| StoreError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| StoreError::io(&self.path, e))?;
        debug!(path = %self.path.display(), count = ordered.len(), "wrote suppression snapshot");
        Ok(())
    }
}

impl SuppressionStore for FileSuppressionStore {
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
        let mut records = self.records.write();
        let previous = records.insert(key.clone(), record.clone());

        if let Err(e) = self.snapshot(&records) {
            warn!(key = %key, error = %e, "failed to persist suppression, rolling back");
            match previous {
                Some(prev) => records.insert(key, prev),
                None => records.remove(&key),
            };
            return Err(e);
        }
        Ok(record)
    }

    fn delete(&self, key: &ResourceKey) -> StoreResult<bool> {
        let mut records = self.records.write();
        let Some(previous) = records.remove(key) else {
            return Ok(false);
        };

        if let Err(e) = self.snapshot(&records) {
            warn!(key = %key, error = %e, "failed to persist deletion, rolling back");
            records.insert(key.clone(), previous);
            return Err(e);
        }
        Ok(true)
    }

    fn list_active(&self, now: DateTime<Utc>) -> StoreResult<Vec<SuppressionRecord>> {
        Ok(active_records(self.records.read().values(), now))
    }
}
