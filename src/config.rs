//! Configuration parameters for fingerprinting and matching

use crate::error::FingerprintError;
use serde::{Deserialize, Serialize};

/// Number of hex characters in a SHA-1 digest
pub const DIGEST_HEX_LEN: usize = 40;

/// Fingerprinting configuration parameters
///
/// Every stage of the pipeline receives this struct explicitly, so several
/// configurations can run side by side in one process. Deserialization fills
/// missing fields from [`FingerprintConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerprintConfig {
    /// Default sample rate in Hz when the source does not provide one (default: 44100)
    pub sample_rate: u32,

    // Spectrogram
    /// FFT window size in samples (default: 4096)
    /// Larger windows give finer frequency resolution and coarser time resolution
    pub window_size: usize,

    /// Fraction of each window shared with the next one (default: 0.5)
    /// Higher overlap gives finer offset granularity and more fingerprints
    pub overlap_ratio: f32,

    /// Apply a 10*log10 transform to the power spectrum (default: false)
    pub log_scale: bool,

    // Peak extraction
    /// Minimum spectrogram value for a cell to count as a peak (default: 10.0)
    pub amp_min: f32,

    /// Number of times the cross-shaped neighborhood is grown (default: 20)
    /// Higher values yield fewer, more prominent peaks
    pub peak_neighborhood_size: usize,

    // Hashing
    /// Maximum number of forward pairings per peak, plus one (default: 15)
    pub fan_value: usize,

    /// Minimum time-bin distance between paired peaks (default: 0)
    pub min_hash_time_delta: u32,

    /// Maximum time-bin distance between paired peaks (default: 200)
    pub max_hash_time_delta: u32,

    /// Leading hex characters dropped from each SHA-1 digest (default: 20)
    /// Dropping more shrinks storage at the cost of more collisions
    pub hash_prefix_drop: usize,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            window_size: 4096,
            overlap_ratio: 0.5,
            log_scale: false,
            amp_min: 10.0,
            peak_neighborhood_size: 20,
            fan_value: 15,
            min_hash_time_delta: 0,
            max_hash_time_delta: 200,
            hash_prefix_drop: 20,
        }
    }
}

impl FingerprintConfig {
    /// Parse a (possibly partial) JSON document and validate the result
    ///
    /// # Example
    ///
    /// ```
    /// use lafayette::FingerprintConfig;
    ///
    /// let config = FingerprintConfig::from_json(r#"{ "fan_value": 5 }"#)?;
    /// assert_eq!(config.fan_value, 5);
    /// assert_eq!(config.window_size, 4096);
    /// # Ok::<(), lafayette::FingerprintError>(())
    /// ```
    pub fn from_json(json: &str) -> Result<Self, FingerprintError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| FingerprintError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every parameter is usable by the pipeline
    ///
    /// # Errors
    ///
    /// Returns `FingerprintError::InvalidConfig` naming the first offending field
    pub fn validate(&self) -> Result<(), FingerprintError> {
        if self.sample_rate == 0 {
            return Err(FingerprintError::InvalidConfig(
                "sample_rate must be > 0".to_string(),
            ));
        }

        if self.window_size < 2 {
            return Err(FingerprintError::InvalidConfig(format!(
                "window_size must be >= 2, got {}",
                self.window_size
            )));
        }

        if !(0.0..1.0).contains(&self.overlap_ratio) {
            return Err(FingerprintError::InvalidConfig(format!(
                "overlap_ratio must be in [0, 1), got {}",
                self.overlap_ratio
            )));
        }

        if !self.amp_min.is_finite() {
            return Err(FingerprintError::InvalidConfig(
                "amp_min must be finite".to_string(),
            ));
        }

        if self.fan_value == 0 {
            return Err(FingerprintError::InvalidConfig(
                "fan_value must be > 0".to_string(),
            ));
        }

        if self.min_hash_time_delta > self.max_hash_time_delta {
            return Err(FingerprintError::InvalidConfig(format!(
                "min_hash_time_delta ({}) exceeds max_hash_time_delta ({})",
                self.min_hash_time_delta, self.max_hash_time_delta
            )));
        }

        // The kept digest suffix must fit in a u128 and be non-empty
        if self.hash_prefix_drop < DIGEST_HEX_LEN - 32 || self.hash_prefix_drop >= DIGEST_HEX_LEN {
            return Err(FingerprintError::InvalidConfig(format!(
                "hash_prefix_drop must be in [{}, {}), got {}",
                DIGEST_HEX_LEN - 32,
                DIGEST_HEX_LEN,
                self.hash_prefix_drop
            )));
        }

        Ok(())
    }

    /// Number of samples shared by two consecutive windows
    pub fn overlap_samples(&self) -> usize {
        (self.window_size as f64 * self.overlap_ratio as f64) as usize
    }

    /// Number of samples between the starts of two consecutive windows
    pub fn hop_size(&self) -> usize {
        self.window_size - self.overlap_samples()
    }

    /// Number of hex characters kept from each digest
    pub fn hash_width(&self) -> usize {
        DIGEST_HEX_LEN - self.hash_prefix_drop
    }

    /// Convert an offset in time bins to seconds, rounded to 5 decimals
    ///
    /// One time bin spans one hop, so this is `offset * hop_size / sample_rate`.
    /// With the default 50% overlap it equals
    /// `offset / sample_rate * window_size * overlap_ratio`. At any other
    /// overlap the two differ, and only the hop-based value is the real
    /// position of the bin in the audio.
    ///
    /// # Example
    ///
    /// ```
    /// use lafayette::FingerprintConfig;
    ///
    /// let config = FingerprintConfig::default();
    /// assert_eq!(config.offset_to_seconds(0, 44100), 0.0);
    /// assert_eq!(config.offset_to_seconds(1, 44100), 0.04644);
    /// ```
    pub fn offset_to_seconds(&self, offset: i64, sample_rate: u32) -> f64 {
        let seconds = offset as f64 * self.hop_size() as f64 / sample_rate as f64;
        (seconds * 1e5).round() / 1e5
    }
}
