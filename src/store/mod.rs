//! In-memory record storage
//!
//! Defines the four-operation storage contract (`get`, `add`, `update`,
//! `delete`) and the single-lock in-memory implementation of it.
//! This module is independent of configuration and the HTTP surface.

mod error;
mod memory;
mod record;

pub use error::{ConflictReporting, StorageError, StorageResult};
pub use memory::MemoryRecordStore;
pub use record::{Record, Version, VersionedValue};

use bytes::Bytes;
use std::time::SystemTime;

/// Storage backend contract
///
/// Every operation is atomic with respect to every other operation on the
/// same key. Implementations never retry and never log failures; the caller
/// decides what a `StorageError` means for it.
pub trait RecordStorage: Send + Sync {
    /// Get the current value and version of a record
    fn get(&self, key: &str) -> StorageResult<VersionedValue>;

    /// Create a record at version 0
    ///
    /// Fails with `EntryAlreadyExists` if the key is present; the existing
    /// record is left untouched.
    fn add(&self, key: &str, value: Bytes, created_at: SystemTime) -> StorageResult<()>;

    /// Replace a record's value if its version still equals `expected_version`
    ///
    /// On success the stored version becomes `expected_version + 1`.
    fn update(
        &self,
        key: &str,
        value: Bytes,
        updated_at: SystemTime,
        expected_version: Version,
    ) -> StorageResult<()>;

    /// Remove a record
    fn delete(&self, key: &str) -> StorageResult<()>;

    /// Statistics about the stored records
    fn stats(&self) -> StoreStats;

    /// Whether the `created_at`/`updated_at` arguments influence behavior
    ///
    /// The shipped implementations accept the timestamps for contract
    /// compatibility and discard them: no expiry, no auditing.
    fn tracks_timestamps(&self) -> bool {
        false
    }
}

/// Statistics about a record store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct StoreStats {
    /// Number of records held
    pub records: usize,

    /// Sum of value lengths in bytes
    pub value_bytes: usize,

    /// Approximate memory used by keys, values and versions
    pub used_memory_bytes: usize,
}

impl std::ops::Add for StoreStats {
    type Output = StoreStats;

    fn add(self, other: StoreStats) -> StoreStats {
        StoreStats {
            records: self.records + other.records,
            value_bytes: self.value_bytes + other.value_bytes,
            used_memory_bytes: self.used_memory_bytes + other.used_memory_bytes,
        }
    }
}
