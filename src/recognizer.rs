//! Enrollment and recognition facade
//!
//! A [`Recognizer`] owns a validated configuration and a shared index. It
//! fingerprints audio, writes fingerprints for enrolled tracks, and matches
//! queries against everything enrolled so far.
//!
//! # Example
//!
//! ```
//! use lafayette::{EnrollMode, FingerprintConfig, MemoryIndex, Recognizer, TrackRecord};
//! use lafayette::io::sample_buffer::SampleBuffer;
//!
//! let recognizer = Recognizer::new(FingerprintConfig::default(), MemoryIndex::new())?;
//!
//! let silence = vec![SampleBuffer::new(vec![0.0; 44100], 44100)];
//! let inserted = recognizer.enroll(&silence, TrackRecord::new("quiet"), EnrollMode::Store)?;
//! assert!(inserted.is_empty());
//! assert!(recognizer.match_channels(&silence)?.is_none());
//! # Ok::<(), lafayette::FingerprintError>(())
//! ```

use crate::config::FingerprintConfig;
use crate::error::FingerprintError;
use crate::features::fingerprint_channels;
use crate::features::hashing::{FingerprintHash, FingerprintSet};
use crate::index::{FingerprintIndex, MemoryIndex, TrackId, TrackRecord};
use crate::io::decoder::{file_digest, track_name, AudioDecoder};
use crate::io::sample_buffer::SampleBuffer;
use crate::matching::{best_match, MatchResult};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Whether enrollment writes to the index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollMode {
    /// Insert fingerprints into the index
    Store,
    /// Only compute and return fingerprints
    DryRun,
}

/// Outcome of enrolling one file of a batch
#[derive(Debug, Clone)]
pub struct EnrolledFile {
    /// File that was enrolled
    pub path: PathBuf,
    /// Track id it was enrolled under
    pub track_id: TrackId,
    /// Number of unique fingerprints inserted
    pub fingerprints: usize,
}

/// Result of a batch enrollment
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Files enrolled successfully, in input order
    pub enrolled: Vec<EnrolledFile>,
    /// Files that failed, in input order, with the reason
    pub failed: Vec<(PathBuf, FingerprintError)>,
}

/// Fingerprinting engine bound to one index
#[derive(Debug)]
pub struct Recognizer<I: FingerprintIndex = MemoryIndex> {
    config: FingerprintConfig,
    index: Arc<I>,
}

impl<I: FingerprintIndex> Clone for Recognizer<I> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            index: Arc::clone(&self.index),
        }
    }
}

impl<I: FingerprintIndex> Recognizer<I> {
    /// Create a recognizer owning `index`
    ///
    /// # Errors
    ///
    /// Returns `FingerprintError::InvalidConfig` if `config` fails validation.
    pub fn new(config: FingerprintConfig, index: I) -> Result<Self, FingerprintError> {
        Self::with_shared_index(config, Arc::new(index))
    }

    /// Create a recognizer over an index shared with other owners
    pub fn with_shared_index(config: FingerprintConfig, index: Arc<I>) -> Result<Self, FingerprintError> {
        config.validate()?;
        Ok(Self { config, index })
    }

    /// Active configuration
    pub fn config(&self) -> &FingerprintConfig {
        &self.config
    }

    /// Underlying index
    pub fn index(&self) -> &Arc<I> {
        &self.index
    }

    /// Fingerprint audio without touching the index
    ///
    /// Channels are fingerprinted independently and the sets unioned.
    pub fn fingerprint(&self, channels: &[SampleBuffer]) -> Result<FingerprintSet, FingerprintError> {
        fingerprint_channels(channels, &self.config)
    }

    /// Fingerprint a track and, in [`EnrollMode::Store`], add it to the index
    ///
    /// # Returns
    ///
    /// The unique fingerprints of the track
    pub fn enroll(
        &self,
        channels: &[SampleBuffer],
        track: TrackRecord,
        mode: EnrollMode,
    ) -> Result<FingerprintSet, FingerprintError> {
        let fingerprints = self.fingerprint(channels)?;

        if mode == EnrollMode::Store {
            self.index.insert_many(&track, &fingerprints)?;
        }

        log::debug!(
            "Enrolled {} ({:?}): {} fingerprints from {} channels",
            track.id,
            mode,
            fingerprints.len(),
            channels.len()
        );

        Ok(fingerprints)
    }

    /// Identify audio against the enrolled tracks
    ///
    /// The first channel's sample rate (or the configured default, for no
    /// channels) is used to convert the offset to seconds.
    pub fn match_channels(&self, channels: &[SampleBuffer]) -> Result<Option<MatchResult>, FingerprintError> {
        let fingerprints = self.fingerprint(channels)?;
        let sample_rate = channels
            .first()
            .map_or(self.config.sample_rate, |c| c.sample_rate());
        self.match_fingerprints(&fingerprints, sample_rate)
    }

    /// Identify a precomputed fingerprint set
    pub fn match_fingerprints(
        &self,
        fingerprints: &FingerprintSet,
        sample_rate: u32,
    ) -> Result<Option<MatchResult>, FingerprintError> {
        best_match(self.index.as_ref(), fingerprints, sample_rate, &self.config)
    }

    /// Remove every index association of the given hashes
    ///
    /// # Returns
    ///
    /// Number of associations actually removed
    pub fn remove_fingerprints<'a, H>(&self, hashes: H) -> Result<usize, FingerprintError>
    where
        H: IntoIterator<Item = &'a FingerprintHash>,
    {
        let mut removed = 0;
        for hash in hashes {
            removed += self.index.remove(hash)?;
        }
        log::debug!("Removed {} index entries", removed);
        Ok(removed)
    }

    /// Look up an enrolled track
    pub fn track(&self, id: &TrackId) -> Result<Option<TrackRecord>, FingerprintError> {
        self.index.track(id)
    }

    /// Decode and enroll one file
    ///
    /// The track id is the file name without its extension; the record also
    /// carries the source path and the SHA-1 of the file contents.
    pub fn enroll_file<D: AudioDecoder + ?Sized>(
        &self,
        path: &Path,
        decoder: &D,
    ) -> Result<(TrackRecord, FingerprintSet), FingerprintError> {
        let audio = decoder.decode(path)?;
        let name = track_name(path);
        let record = TrackRecord::new(name.clone())
            .with_title(name)
            .with_source_path(path)
            .with_file_digest(file_digest(path)?);

        let fingerprints = self.enroll(&audio.channels, record.clone(), EnrollMode::Store)?;
        Ok((record, fingerprints))
    }

    /// Decode one file and identify it
    pub fn match_file<D: AudioDecoder + ?Sized>(
        &self,
        path: &Path,
        decoder: &D,
    ) -> Result<Option<MatchResult>, FingerprintError> {
        let audio = decoder.decode(path)?;
        let fingerprints = self.fingerprint(&audio.channels)?;
        self.match_fingerprints(&fingerprints, audio.sample_rate)
    }

    /// Enroll many files in parallel
    ///
    /// A file that fails to decode or fingerprint is logged and reported in
    /// [`BatchReport::failed`]; the rest of the batch carries on.
    pub fn enroll_files<D, P>(&self, paths: &[P], decoder: &D) -> BatchReport
    where
        D: AudioDecoder + ?Sized,
        P: AsRef<Path> + Sync,
    {
        log::debug!("Enrolling batch of {} files", paths.len());

        let outcomes: Vec<(PathBuf, Result<EnrolledFile, FingerprintError>)> = paths
            .par_iter()
            .map(|p| {
                let path = p.as_ref();
                let outcome = self.enroll_file(path, decoder).map(|(record, fingerprints)| EnrolledFile {
                    path: path.to_path_buf(),
                    track_id: record.id,
                    fingerprints: fingerprints.len(),
                });
                (path.to_path_buf(), outcome)
            })
            .collect();

        let mut report = BatchReport::default();
        for (path, outcome) in outcomes {
            match outcome {
                Ok(file) => report.enrolled.push(file),
                Err(e) => {
                    log::warn!("Failed to enroll {}: {}", path.display(), e);
                    report.failed.push((path, e));
                }
            }
        }

        log::debug!(
            "Batch done: {} enrolled, {} failed",
            report.enrolled.len(),
            report.failed.len()
        );
        report
    }
}
