//! Match result type

use crate::index::TrackRecord;
use serde::{Deserialize, Serialize};

/// Best match for a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Matched track
    pub track: TrackRecord,

    /// Alignment in time bins: where the query starts within the track
    pub offset: i64,

    /// Alignment in seconds, rounded to 5 decimals
    pub offset_seconds: f64,

    /// Votes for the winning alignment; a rough confidence score
    ///
    /// The engine applies no cutoff. Callers decide what counts as a match.
    pub hit_count: u32,
}
