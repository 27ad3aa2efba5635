//! Fingerprint extraction modules
//!
//! The pipeline stages, leaves first:
//! - Spectrogram (short-time power spectrum)
//! - Morphology (footprint, maximum filter, background erosion)
//! - Peak extraction
//! - Peak-pair hashing

pub mod hashing;
pub mod morphology;
pub mod peaks;
pub mod spectrogram;

use crate::config::FingerprintConfig;
use crate::error::FingerprintError;
use crate::io::sample_buffer::SampleBuffer;
use hashing::{generate_hashes, FingerprintSet};
use rayon::prelude::*;

/// Fingerprint one channel
///
/// Runs spectrogram, peak extraction and hashing, and collects the hash
/// stream into a deduplicated set. An empty buffer yields an empty set.
///
/// # Errors
///
/// Returns `FingerprintError::InvalidInput` if `sample_rate` is 0.
pub fn fingerprint_samples(
    samples: &[f32],
    sample_rate: u32,
    config: &FingerprintConfig,
) -> Result<FingerprintSet, FingerprintError> {
    let spec = spectrogram::build_spectrogram(samples, sample_rate, config)?;
    let peaks = peaks::find_peaks(&spec, config);
    let fingerprints: FingerprintSet = generate_hashes(peaks, config).collect();

    log::debug!(
        "Fingerprinted {} samples at {} Hz: {} unique fingerprints",
        samples.len(),
        sample_rate,
        fingerprints.len()
    );

    Ok(fingerprints)
}

/// Fingerprint every channel independently and union the results
pub fn fingerprint_channels(
    channels: &[SampleBuffer],
    config: &FingerprintConfig,
) -> Result<FingerprintSet, FingerprintError> {
    let per_channel = channels
        .par_iter()
        .map(|channel| fingerprint_samples(channel.samples(), channel.sample_rate(), config))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(per_channel.into_iter().flatten().collect())
}
