//! Query matching
//!
//! Looks every query fingerprint up in the index, votes on the implied
//! alignment between query and enrolled track, and resolves the winner.

pub mod result;
pub mod votes;

pub use result::MatchResult;
pub use votes::AlignmentVotes;

use crate::config::FingerprintConfig;
use crate::error::FingerprintError;
use crate::features::hashing::Fingerprint;
use crate::index::FingerprintIndex;

/// Tally alignment votes for a sequence of query fingerprints
///
/// Votes are recorded in iteration order, which decides ties.
pub fn tally_votes<'a, I, F>(index: &I, fingerprints: F) -> Result<AlignmentVotes, FingerprintError>
where
    I: FingerprintIndex + ?Sized,
    F: IntoIterator<Item = &'a Fingerprint>,
{
    let mut votes = AlignmentVotes::new();
    let mut queried = 0usize;

    for fp in fingerprints {
        queried += 1;
        for entry in index.lookup(&fp.hash)? {
            let diff = entry.offset as i64 - fp.offset as i64;
            votes.record(diff, &entry.track_id);
        }
    }

    log::debug!("Queried {} hashes, {} index hits", queried, votes.total());
    Ok(votes)
}

/// Find the track and alignment best supported by the query fingerprints
///
/// # Arguments
///
/// * `index` - Index to search
/// * `fingerprints` - Query fingerprints, in the order votes should be cast
/// * `sample_rate` - Sample rate of the query, used for the seconds conversion
/// * `config` - Hop size for the seconds conversion
///
/// # Returns
///
/// `None` when no fingerprint hit the index, or when the winning track has no
/// record (the index may lag behind a separate metadata store).
pub fn best_match<'a, I, F>(
    index: &I,
    fingerprints: F,
    sample_rate: u32,
    config: &FingerprintConfig,
) -> Result<Option<MatchResult>, FingerprintError>
where
    I: FingerprintIndex + ?Sized,
    F: IntoIterator<Item = &'a Fingerprint>,
{
    let votes = tally_votes(index, fingerprints)?;

    let Some((offset, track_id, hit_count)) = votes.leader() else {
        log::debug!("No index hits, no match");
        return Ok(None);
    };

    let Some(track) = index.track(track_id)? else {
        log::warn!("Best candidate {} has no track record, reporting no match", track_id);
        return Ok(None);
    };

    let offset_seconds = config.offset_to_seconds(offset, sample_rate);
    log::debug!(
        "Matched {} at offset {} ({:.3}s) with {} hits",
        track.id,
        offset,
        offset_seconds,
        hit_count
    );

    Ok(Some(MatchResult {
        track,
        offset,
        offset_seconds,
        hit_count,
    }))
}
