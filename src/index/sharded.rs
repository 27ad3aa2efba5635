//! Fingerprint index split into independently locked buckets
//!
//! Hashes are uniformly distributed digest bits, so the low bits of the hash
//! value pick a shard evenly. Writers to different shards never contend.

use super::{Bucket, FingerprintIndex, IndexEntry, TrackId, TrackRecord};
use crate::error::FingerprintError;
use crate::features::hashing::FingerprintHash;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Default number of shards
pub const DEFAULT_SHARDS: usize = 16;

type Shard = RwLock<HashMap<FingerprintHash, Bucket>>;

/// Index with per-bucket locking
#[derive(Debug)]
pub struct ShardedIndex {
    shards: Vec<Shard>,
    tracks: RwLock<HashMap<TrackId, TrackRecord>>,
}

impl Default for ShardedIndex {
    fn default() -> Self {
        Self::with_shards(DEFAULT_SHARDS)
    }
}

impl ShardedIndex {
    /// Create an index with [`DEFAULT_SHARDS`] shards
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an index with `count` shards (at least one)
    pub fn with_shards(count: usize) -> Self {
        let count = count.max(1);
        Self {
            shards: (0..count).map(|_| RwLock::new(HashMap::new())).collect(),
            tracks: RwLock::new(HashMap::new()),
        }
    }

    /// Number of shards
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn shard(&self, hash: &FingerprintHash) -> &Shard {
        let slot = (hash.value() % self.shards.len() as u128) as usize;
        &self.shards[slot]
    }
}

impl FingerprintIndex for ShardedIndex {
    fn register_track(&self, record: TrackRecord) -> Result<(), FingerprintError> {
        self.tracks.write().insert(record.id.clone(), record);
        Ok(())
    }

    fn insert(
        &self,
        hash: FingerprintHash,
        offset: u32,
        track_id: &TrackId,
    ) -> Result<(), FingerprintError> {
        let entry = IndexEntry {
            track_id: track_id.clone(),
            offset,
        };
        self.shard(&hash).write().entry(hash).or_default().push(entry);
        Ok(())
    }

    fn lookup(&self, hash: &FingerprintHash) -> Result<Vec<IndexEntry>, FingerprintError> {
        Ok(self
            .shard(hash)
            .read()
            .get(hash)
            .map_or_else(Vec::new, |bucket| bucket.entries().to_vec()))
    }

    fn remove(&self, hash: &FingerprintHash) -> Result<usize, FingerprintError> {
        Ok(self.shard(hash).write().remove(hash).map_or(0, |bucket| bucket.len()))
    }

    fn track(&self, id: &TrackId) -> Result<Option<TrackRecord>, FingerprintError> {
        Ok(self.tracks.read().get(id).cloned())
    }

    fn hash_count(&self) -> Result<usize, FingerprintError> {
        Ok(self.shards.iter().map(|s| s.read().len()).sum())
    }

    fn track_count(&self) -> Result<usize, FingerprintError> {
        Ok(self.tracks.read().len())
    }
}
