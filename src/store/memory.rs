//! Single-lock in-memory record store

use super::error::{ConflictReporting, StorageError, StorageResult};
use super::record::{Record, Version, VersionedValue};
use super::{RecordStorage, StoreStats};
use bytes::Bytes;
use parking_lot::Mutex;
use siphasher::sip::SipHasher13;
use std::collections::HashMap;
use std::hash::BuildHasherDefault;
use std::time::SystemTime;

/// Type alias for our hash map with SipHasher
type RecordMap = HashMap<String, Record, BuildHasherDefault<SipHasher13>>;

/// In-memory record store
///
/// All operations take one exclusive lock over the whole map and release it
/// before returning. There is no reader/writer split: a `get` excludes
/// writers and other readers for its duration.
///
/// The map has no size cap and no eviction. Fine for tests and small
/// deployments, not for anything that must bound its memory.
pub struct MemoryRecordStore {
    records: Mutex<RecordMap>,
    conflict_reporting: ConflictReporting,
}

impl MemoryRecordStore {
    /// Create a new record store with default capacity
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    /// Create a new record store with specified initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        MemoryRecordStore {
            records: Mutex::new(HashMap::with_capacity_and_hasher(
                capacity,
                BuildHasherDefault::<SipHasher13>::default(),
            )),
            conflict_reporting: ConflictReporting::default(),
        }
    }

    /// Choose how stale-version updates are reported
    pub fn with_conflict_reporting(mut self, conflict_reporting: ConflictReporting) -> Self {
        self.conflict_reporting = conflict_reporting;
        self
    }

    /// The configured conflict reporting mode
    pub fn conflict_reporting(&self) -> ConflictReporting {
        self.conflict_reporting
    }

    /// Number of records held
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if a record exists for the key
    pub fn contains_key(&self, key: &str) -> bool {
        self.records.lock().contains_key(key)
    }

    /// Get all keys (snapshot, for debugging/admin)
    pub fn keys(&self) -> Vec<String> {
        self.records.lock().keys().cloned().collect()
    }

    /// Remove all records
    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl RecordStorage for MemoryRecordStore {
    fn get(&self, key: &str) -> StorageResult<VersionedValue> {
        let records = self.records.lock();
        records
            .get(key)
            .map(VersionedValue::from)
            .ok_or(StorageError::EntryNotFound)
    }

    fn add(&self, key: &str, value: Bytes, _created_at: SystemTime) -> StorageResult<()> {
        let mut records = self.records.lock();
        if records.contains_key(key) {
            return Err(StorageError::EntryAlreadyExists);
        }
        records.insert(key.to_owned(), Record::new(key, value));
        Ok(())
    }

    fn update(
        &self,
        key: &str,
        value: Bytes,
        _updated_at: SystemTime,
        expected_version: Version,
    ) -> StorageResult<()> {
        let mut records = self.records.lock();
        let record = records.get_mut(key).ok_or(StorageError::EntryNotFound)?;
        if record.version != expected_version {
            return Err(self
                .conflict_reporting
                .conflict(expected_version, record.version));
        }
        record.replace(value);
        Ok(())
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        let mut records = self.records.lock();
        match records.remove(key) {
            Some(_) => Ok(()),
            None => Err(StorageError::EntryNotFound),
        }
    }

    fn stats(&self) -> StoreStats {
        let records = self.records.lock();
        records.values().fold(StoreStats::default(), |mut stats, record| {
            stats.records += 1;
            stats.value_bytes += record.value.len();
            stats.used_memory_bytes += record.memory_usage();
            stats
        })
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}
