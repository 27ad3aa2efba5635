//! 2D spectral peak extraction
//!
//! Finds time-frequency cells that dominate their neighborhood.
//!
//! # Algorithm
//!
//! 1. Grow a 3x3 cross into a diamond footprint (`peak_neighborhood_size` times)
//! 2. Candidate: cell equals the maximum over the footprint centered on it
//! 3. Keep candidates strictly above `amp_min`
//! 4. Erode the zero-background mask by the same footprint
//! 5. Peak: remaining candidate that is not eroded background
//!
//! Peaks come out frequency-major (row by row, time ascending within a row).

use super::morphology::{maximum_filter, Footprint};
use super::spectrogram::Spectrogram;
use crate::config::FingerprintConfig;
use serde::{Deserialize, Serialize};

/// A locally dominant spectrogram cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Peak {
    /// Frequency bin (row)
    pub freq_bin: u32,

    /// Time bin (column)
    pub time_bin: u32,
}

impl Peak {
    /// Create a peak at (`freq_bin`, `time_bin`)
    pub fn new(freq_bin: u32, time_bin: u32) -> Self {
        Self { freq_bin, time_bin }
    }
}

/// Find the spectral peaks of a spectrogram
///
/// # Arguments
///
/// * `spec` - Power spectrogram
/// * `config` - Uses `peak_neighborhood_size` and `amp_min`
///
/// # Returns
///
/// Peaks in frequency-major order
///
/// # Example
///
/// ```
/// use lafayette::features::peaks::{find_peaks, Peak};
/// use lafayette::features::spectrogram::Spectrogram;
/// use lafayette::FingerprintConfig;
///
/// let mut rows = vec![vec![1.0f32; 8]; 8];
/// rows[3][4] = 50.0;
/// let spec = Spectrogram::from_rows(rows)?;
///
/// let config = FingerprintConfig { peak_neighborhood_size: 2, ..Default::default() };
/// assert_eq!(find_peaks(&spec, &config), vec![Peak::new(3, 4)]);
/// # Ok::<(), lafayette::FingerprintError>(())
/// ```
pub fn find_peaks(spec: &Spectrogram, config: &FingerprintConfig) -> Vec<Peak> {
    if spec.is_empty() {
        return vec![];
    }

    let footprint = Footprint::grown_cross(config.peak_neighborhood_size);
    let local_max = maximum_filter(spec, &footprint);
    let cols = spec.time_bins();

    let mut peaks = Vec::new();
    let mut candidates = 0usize;

    for f in 0..spec.freq_bins() {
        for t in 0..cols {
            let value = spec.get(f, t);
            if value != local_max[f * cols + t] {
                continue;
            }
            candidates += 1;

            if value <= config.amp_min {
                continue;
            }

            // Flat zero regions are their own maximum; drop the ones fully
            // surrounded by zeros. Only reachable with a negative threshold.
            if value == 0.0 && footprint.is_eroded_background(spec, f, t) {
                continue;
            }

            peaks.push(Peak::new(f as u32, t as u32));
        }
    }

    log::debug!(
        "Found {} peaks ({} local-maximum candidates) in {}x{} spectrogram",
        peaks.len(),
        candidates,
        spec.freq_bins(),
        cols
    );

    peaks
}
