//! Acknowledgment suppression for alert-relay.
//!
//! A suppression record says that firing alerts for one resource, identified
//! by its `instance` and `device` labels, have been acknowledged by a human
//! and must not be re-delivered until a deadline. Expiry is evaluated lazily
//! on every read; nothing sweeps expired records in the background.
//!
//! Two backends implement [`SuppressionStore`]:
//!
//! - [`MemorySuppressionStore`] keeps records for the life of the process.
//! - [`FileSuppressionStore`] snapshots them to a JSON file after each change.
//!
//! # Example
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use relay_suppress::{MemorySuppressionStore, ResourceKey, SuppressionStore};
//!
//! let store = MemorySuppressionStore::new();
//! let key = ResourceKey::new("node1", "sda1");
//! let now = Utc::now();
//!
//! store.upsert(key.clone(), now + Duration::hours(72), "acknowledged").unwrap();
//! assert!(store.lookup_active(&key, now).unwrap().is_some());
//! assert!(store.lookup_active(&key, now + Duration::hours(73)).unwrap().is_none());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod file;
pub mod store;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use file::FileSuppressionStore;
pub use store::{MemorySuppressionStore, SuppressionStore};
pub use types::{ResourceKey, SuppressionRecord};
