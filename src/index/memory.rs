//! In-memory fingerprint index behind a single reader-writer lock

use super::{Bucket, FingerprintIndex, IndexEntry, TrackId, TrackRecord};
use crate::error::FingerprintError;
use crate::features::hashing::FingerprintHash;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Hash map index; readers proceed in parallel, writers take the lock in turn
#[derive(Debug, Default)]
pub struct MemoryIndex {
    entries: RwLock<HashMap<FingerprintHash, Bucket>>,
    tracks: RwLock<HashMap<TrackId, TrackRecord>>,
}

impl MemoryIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of (hash, track, offset) associations
    pub fn entry_count(&self) -> usize {
        self.entries.read().values().map(Bucket::len).sum()
    }

    /// Drop every fingerprint and track record
    pub fn clear(&self) {
        self.entries.write().clear();
        self.tracks.write().clear();
    }
}

impl FingerprintIndex for MemoryIndex {
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
        self.entries.write().entry(hash).or_default().push(entry);
        Ok(())
    }

    fn lookup(&self, hash: &FingerprintHash) -> Result<Vec<IndexEntry>, FingerprintError> {
        Ok(self
            .entries
            .read()
            .get(hash)
            .map_or_else(Vec::new, |bucket| bucket.entries().to_vec()))
    }

    fn remove(&self, hash: &FingerprintHash) -> Result<usize, FingerprintError> {
        Ok(self.entries.write().remove(hash).map_or(0, |bucket| bucket.len()))
    }

    fn track(&self, id: &TrackId) -> Result<Option<TrackRecord>, FingerprintError> {
        Ok(self.tracks.read().get(id).cloned())
    }

    fn hash_count(&self) -> Result<usize, FingerprintError> {
        Ok(self.entries.read().len())
    }

    fn track_count(&self) -> Result<usize, FingerprintError> {
        Ok(self.tracks.read().len())
    }
}
