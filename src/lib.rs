//! recordstore - An in-memory versioned record store
//!
//! Records are opaque byte values keyed by string, each carrying a version
//! counter for optimistic concurrency control:
//! - `store` holds the storage contract and the single-lock implementation
//! - `cluster` shards the key space across several single-lock stores
//! - `config` selects and builds a store
//! - `web` exposes a store over HTTP

pub mod store;
pub mod cluster;
pub mod config;
pub mod web;

/// Re-export commonly used types
pub use store::{
    ConflictReporting, MemoryRecordStore, Record, RecordStorage, StorageError, StorageResult,
    StoreStats, Version, VersionedValue,
};
pub use cluster::{ShardRouter, ShardedRecordStore};
pub use config::StoreConfig;
