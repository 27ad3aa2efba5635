//! Fingerprint index
//!
//! Associates fingerprint hashes with the tracks (and anchor time bins) they
//! were enrolled from. The index is a multimap: one hash can belong to many
//! tracks, and inserting for one track never removes another track's entry.
//!
//! Backends:
//! - [`MemoryIndex`]: one reader-writer lock around a hash map
//! - [`ShardedIndex`]: independently locked buckets for write-heavy workloads

pub mod memory;
pub mod sharded;
pub mod track;

pub use memory::MemoryIndex;
pub use sharded::ShardedIndex;
pub use track::{TrackId, TrackRecord};

use crate::error::FingerprintError;
use crate::features::hashing::{Fingerprint, FingerprintHash};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One association of a hash: which track, at which anchor time bin
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Enrolled track
    pub track_id: TrackId,

    /// Anchor time bin within that track
    pub offset: u32,
}

/// Storage backend for fingerprints and track records
///
/// All methods take `&self`; implementations synchronize internally so a
/// single index can be shared between enrolling and matching threads.
pub trait FingerprintIndex: Send + Sync {
    /// Store a track record, replacing any record with the same id
    fn register_track(&self, record: TrackRecord) -> Result<(), FingerprintError>;

    /// Associate `hash` with (`track_id`, `offset`)
    ///
    /// Existing associations of the hash are kept; inserting the same
    /// (track, offset) pair twice stores it once.
    fn insert(
        &self,
        hash: FingerprintHash,
        offset: u32,
        track_id: &TrackId,
    ) -> Result<(), FingerprintError>;

    /// All associations of `hash`, in insertion order; empty if unknown
    fn lookup(&self, hash: &FingerprintHash) -> Result<Vec<IndexEntry>, FingerprintError>;

    /// Drop every association of `hash`, returning how many there were
    fn remove(&self, hash: &FingerprintHash) -> Result<usize, FingerprintError>;

    /// Record for `id`, if one was registered
    fn track(&self, id: &TrackId) -> Result<Option<TrackRecord>, FingerprintError>;

    /// Number of distinct hashes stored
    fn hash_count(&self) -> Result<usize, FingerprintError>;

    /// Number of registered tracks
    fn track_count(&self) -> Result<usize, FingerprintError>;

    /// Register `record` and insert every fingerprint for it
    ///
    /// Returns the number of fingerprints processed.
    fn insert_many<'a, I>(&self, record: &TrackRecord, fingerprints: I) -> Result<usize, FingerprintError>
    where
        I: IntoIterator<Item = &'a Fingerprint>,
        Self: Sized,
    {
        self.register_track(record.clone())?;

        let mut count = 0;
        for fp in fingerprints {
            self.insert(fp.hash, fp.offset, &record.id)?;
            count += 1;
        }

        log::debug!("Inserted {} hashes for track {}", count, record.id);
        Ok(count)
    }
}

/// Associations of one hash, in insertion order and without repeats
#[derive(Debug, Default)]
pub(crate) struct Bucket {
    entries: Vec<IndexEntry>,
    seen: HashSet<IndexEntry>,
}

impl Bucket {
    /// Append `entry` unless it is already stored
    pub(crate) fn push(&mut self, entry: IndexEntry) {
        if self.seen.insert(entry.clone()) {
            self.entries.push(entry);
        }
    }

    pub(crate) fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
