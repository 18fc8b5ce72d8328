//! Sharded record storage
//!
//! Splits the key space across several `MemoryRecordStore` shards, each with
//! its own lock. Every key routes to exactly one shard, so single-key
//! operations keep the same atomicity as the unsharded store while unrelated
//! keys no longer contend on one lock.

mod router;

pub use router::ShardRouter;

use crate::store::{
    ConflictReporting, MemoryRecordStore, RecordStorage, StorageResult, StoreStats, Version,
    VersionedValue,
};
use bytes::Bytes;
use std::time::SystemTime;
use tracing::info;

/// Record store that owns several shards and routes each key to one of them
pub struct ShardedRecordStore {
    shards: Vec<MemoryRecordStore>,
    router: ShardRouter,
}

impl ShardedRecordStore {
    /// Create a sharded store with the specified number of shards
    pub fn new(num_shards: usize) -> Self {
        Self::with_options(num_shards, 1024, ConflictReporting::default())
    }

    /// Create a sharded store with per-shard capacity and conflict mode
    pub fn with_options(
        num_shards: usize,
        capacity_per_shard: usize,
        conflict_reporting: ConflictReporting,
    ) -> Self {
        let router = ShardRouter::new(num_shards);
        let shards = (0..router.num_shards())
            .map(|_| {
                MemoryRecordStore::with_capacity(capacity_per_shard)
                    .with_conflict_reporting(conflict_reporting)
            })
            .collect();

        info!("Record store initialized with {} shards", router.num_shards());

        ShardedRecordStore { shards, router }
    }

    /// The shard responsible for a key
    fn shard_for(&self, key: &str) -> &MemoryRecordStore {
        &self.shards[self.router.route_key(key)]
    }

    /// Get number of shards
    pub fn num_shards(&self) -> usize {
        self.shards.len()
    }

    /// Number of records across all shards
    ///
    /// Shards are visited one at a time; concurrent writers may make the
    /// total differ from any single instant's true count.
    pub fn len(&self) -> usize {
        self.shards.iter().map(MemoryRecordStore::len).sum()
    }

    /// Check if every shard is empty
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(MemoryRecordStore::is_empty)
    }

    /// Get all keys across shards
    pub fn keys(&self) -> Vec<String> {
        self.shards.iter().flat_map(MemoryRecordStore::keys).collect()
    }

    /// Get detailed statistics for each shard
    pub fn shard_stats(&self) -> Vec<ShardStats> {
        self.shards
            .iter()
            .enumerate()
            .map(|(shard_id, shard)| ShardStats {
                shard_id,
                stats: shard.stats(),
            })
            .collect()
    }
}

impl RecordStorage for ShardedRecordStore {
    fn get(&self, key: &str) -> StorageResult<VersionedValue> {
        self.shard_for(key).get(key)
    }

    fn add(&self, key: &str, value: Bytes, created_at: SystemTime) -> StorageResult<()> {
        self.shard_for(key).add(key, value, created_at)
    }

    fn update(
        &self,
        key: &str,
        value: Bytes,
        updated_at: SystemTime,
        expected_version: Version,
    ) -> StorageResult<()> {
        self.shard_for(key)
            .update(key, value, updated_at, expected_version)
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        self.shard_for(key).delete(key)
    }

    fn stats(&self) -> StoreStats {
        self.shards
            .iter()
            .map(MemoryRecordStore::stats)
            .fold(StoreStats::default(), |acc, s| acc + s)
    }
}

/// Statistics for a single shard
#[derive(Debug, Clone, serde::Serialize)]
pub struct ShardStats {
    pub shard_id: usize,
    #[serde(flatten)]
    pub stats: StoreStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StorageError;

    #[test]
    fn test_operations_route_consistently() {
        let store = ShardedRecordStore::new(4);
        let now = SystemTime::now();

        for i in 0..100 {
            store.add(&format!("key_{}", i), Bytes::from("v"), now).unwrap();
        }
        assert_eq!(store.len(), 100);

        for i in 0..100 {
            let key = format!("key_{}", i);
            store.update(&key, Bytes::from("w"), now, 0).unwrap();
            assert_eq!(store.get(&key).unwrap().version, 1);
        }

        store.delete("key_7").unwrap();
        assert_eq!(store.get("key_7"), Err(StorageError::EntryNotFound));
        assert_eq!(store.len(), 99);
    }

    #[test]
    fn test_stats_aggregate_shards() {
        let store = ShardedRecordStore::new(3);
        let now = SystemTime::now();
        for i in 0..30 {
            store.add(&format!("k{}", i), Bytes::from("xy"), now).unwrap();
        }

        let stats = store.stats();
        assert_eq!(stats.records, 30);
        assert_eq!(stats.value_bytes, 60);

        let per_shard = store.shard_stats();
        assert_eq!(per_shard.len(), 3);
        assert_eq!(per_shard.iter().map(|s| s.stats.records).sum::<usize>(), 30);
        assert_eq!(store.keys().len(), 30);
    }

    #[test]
    fn test_key_placement_same_across_stores() {
        let first = ShardedRecordStore::new(5);
        let second = ShardedRecordStore::new(5);
        let now = SystemTime::now();

        for i in 0..40 {
            let key = format!("session:{}", i);
            first.add(&key, Bytes::from("a"), now).unwrap();
            second.add(&key, Bytes::from("b"), now).unwrap();
        }

        let counts = |store: &ShardedRecordStore| {
            store
                .shard_stats()
                .into_iter()
                .map(|s| s.stats.records)
                .collect::<Vec<_>>()
        };
        assert_eq!(counts(&first), counts(&second));
    }

    #[test]
    fn test_strict_mode_applies_to_every_shard() {
        let store = ShardedRecordStore::with_options(2, 16, ConflictReporting::Strict);
        let now = SystemTime::now();
        store.add("a", Bytes::from("1"), now).unwrap();
        store.update("a", Bytes::from("2"), now, 0).unwrap();

        assert_eq!(
            store.update("a", Bytes::from("3"), now, 0),
            Err(StorageError::VersionConflict { expected: 0, actual: 1 })
        );
    }

    #[test]
    fn test_zero_shards_still_usable() {
        let store = ShardedRecordStore::new(0);
        assert_eq!(store.num_shards(), 1);
        store.add("k", Bytes::from("v"), SystemTime::now()).unwrap();
        assert!(!store.is_empty());
    }
}
