//! Record key to shard mapping

use siphasher::sip::SipHasher13;
use std::hash::Hasher;

/// Maps record keys onto shard indices
///
/// The mapping depends only on the key bytes and the shard count: two
/// routers with the same count agree on every key. SipHash-1-3 is run with
/// a zero key, so the result is stable across processes too.
#[derive(Debug, Clone)]
pub struct ShardRouter {
    num_shards: usize,
}

impl ShardRouter {
    /// `num_shards` is raised to 1 if zero
    pub fn new(num_shards: usize) -> Self {
        ShardRouter {
            num_shards: num_shards.max(1),
        }
    }

    /// Shard index owning `key`, in `0..num_shards`
    pub fn route_key(&self, key: &str) -> usize {
        let mut hasher = SipHasher13::new();
        hasher.write(key.as_bytes());
        (hasher.finish() % self.num_shards as u64) as usize
    }

    pub fn num_shards(&self) -> usize {
        self.num_shards
    }
}
