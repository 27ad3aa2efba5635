//! # Lafayette
//!
//! Content-based audio identification using peak-pair fingerprints.
//!
//! Enrolled tracks are reduced to sets of locally sensitive hashes; an
//! unknown clip is identified by looking its hashes up and voting on the
//! time alignment they imply.
//!
//! ## Quick Start
//!
//! ```no_run
//! use lafayette::{EnrollMode, FingerprintConfig, MemoryIndex, Recognizer, TrackRecord};
//! use lafayette::io::decoder::{AudioDecoder, SymphoniaDecoder};
//! use std::path::Path;
//!
//! let recognizer = Recognizer::new(FingerprintConfig::default(), MemoryIndex::new())?;
//!
//! // Enroll a track
//! let song = SymphoniaDecoder.decode(Path::new("song.mp3"))?;
//! recognizer.enroll(&song.channels, TrackRecord::new("song"), EnrollMode::Store)?;
//!
//! // Identify a clip
//! if let Some(hit) = recognizer.match_file(Path::new("clip.wav"), &SymphoniaDecoder)? {
//!     println!("{} at {:.2}s ({} hits)", hit.track.id, hit.offset_seconds, hit.hit_count);
//! }
//! # Ok::<(), lafayette::FingerprintError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Samples → Spectrogram → Peaks → Hashes → Index (enroll)
//!                                        ↘ Matcher (query)
//! ```
//!
//! Channels are fingerprinted independently and their hash sets unioned.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod features;
pub mod index;
pub mod io;
pub mod matching;
pub mod recognizer;

// Re-export main types
pub use config::FingerprintConfig;
pub use error::FingerprintError;
pub use features::hashing::{Fingerprint, FingerprintHash, FingerprintSet};
pub use features::peaks::Peak;
pub use features::{fingerprint_channels, fingerprint_samples};
pub use index::{FingerprintIndex, IndexEntry, MemoryIndex, ShardedIndex, TrackId, TrackRecord};
pub use matching::MatchResult;
pub use recognizer::{BatchReport, EnrollMode, EnrolledFile, Recognizer};
