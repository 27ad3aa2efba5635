//! Alignment vote tally
//!
//! Every index hit proposes an alignment `diff = stored_anchor - query_offset`
//! for one track. True matches pile their votes onto a single (diff, track)
//! pair; chance collisions scatter.

use crate::index::TrackId;
use std::collections::HashMap;

/// Two-level tally `count[diff][track]` with a running leader
#[derive(Debug, Default)]
pub struct AlignmentVotes {
    counts: HashMap<i64, HashMap<TrackId, u32>>,
    leader: Option<(i64, TrackId, u32)>,
    total: u64,
}

impl AlignmentVotes {
    /// Empty tally
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one vote for `track` at alignment `diff`
    ///
    /// The leader only changes when a pair strictly exceeds the current
    /// maximum, so among equal counts the first pair to get there wins.
    pub fn record(&mut self, diff: i64, track: &TrackId) {
        self.total += 1;

        let slot = self
            .counts
            .entry(diff)
            .or_default()
            .entry(track.clone())
            .or_insert(0);
        *slot += 1;
        let count = *slot;

        let leading = self.leader.as_ref().map_or(0, |(_, _, c)| *c);
        if count > leading {
            self.leader = Some((diff, track.clone(), count));
        }
    }

    /// Votes recorded for one (diff, track) pair
    pub fn count(&self, diff: i64, track: &TrackId) -> u32 {
        self.counts
            .get(&diff)
            .and_then(|per_track| per_track.get(track))
            .copied()
            .unwrap_or(0)
    }

    /// Leading (diff, track, count), or `None` if nothing was recorded
    pub fn leader(&self) -> Option<(i64, &TrackId, u32)> {
        self.leader.as_ref().map(|(diff, track, count)| (*diff, track, *count))
    }

    /// Total number of votes recorded
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Whether no vote was recorded
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
