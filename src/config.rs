//! Store configuration
//!
//! Loaded from a JSON file named by `RECORDSTORE_CONFIG`. Every field has a
//! default, so an empty object (or no file at all) is a valid configuration.

use crate::cluster::ShardedRecordStore;
use crate::store::{ConflictReporting, MemoryRecordStore, RecordStorage};
use anyhow::Context;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Environment variable holding the path of the JSON configuration file
pub const CONFIG_ENV: &str = "RECORDSTORE_CONFIG";

fn default_shards() -> usize {
    1
}

fn default_initial_capacity() -> usize {
    1024
}

fn default_web_addr() -> String {
    "127.0.0.1:8080".to_string()
}

/// Record store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Number of shards. `1` selects the single-lock store, `0` means one
    /// shard per CPU core.
    #[serde(default = "default_shards")]
    pub shards: usize,

    /// Initial map capacity, per shard
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: usize,

    /// How stale-version updates are reported
    #[serde(default)]
    pub conflict_reporting: ConflictReporting,

    /// Address the HTTP surface binds to
    #[serde(default = "default_web_addr")]
    pub web_addr: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            shards: default_shards(),
            initial_capacity: default_initial_capacity(),
            conflict_reporting: ConflictReporting::default(),
            web_addr: default_web_addr(),
        }
    }
}

impl StoreConfig {
    /// Parse a configuration from JSON text
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let config: StoreConfig =
            serde_json::from_str(json).context("invalid record store configuration")?;
        Ok(config)
    }

    /// Read and parse a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_json_str(&json)
    }

    /// Load from the file named by `RECORDSTORE_CONFIG`, or use defaults
    pub fn from_env() -> anyhow::Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => {
                info!("Loading configuration from {:?}", path);
                Self::from_file(path)
            }
            None => {
                info!("{} not set, using default configuration", CONFIG_ENV);
                Ok(Self::default())
            }
        }
    }

    /// Shard count after resolving `0` to the CPU count (min 1, max 16)
    pub fn resolved_shards(&self) -> usize {
        match self.shards {
            0 => num_cpus::get().clamp(1, 16),
            n => n,
        }
    }

    /// Build the configured store
    pub fn build_store(&self) -> Arc<dyn RecordStorage> {
        let shards = self.resolved_shards();
        if shards == 1 {
            info!(
                "Using single-lock record store ({:?} conflict reporting)",
                self.conflict_reporting
            );
            Arc::new(
                MemoryRecordStore::with_capacity(self.initial_capacity)
                    .with_conflict_reporting(self.conflict_reporting),
            )
        } else {
            Arc::new(ShardedRecordStore::with_options(
                shards,
                self.initial_capacity,
                self.conflict_reporting,
            ))
        }
    }
}
