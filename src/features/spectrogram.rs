//! Short-time power spectrogram
//!
//! Splits a channel into overlapping rectangular windows and computes the
//! one-sided power spectral density of each window.
//!
//! # Algorithm
//!
//! 1. Frame the signal: `window_size` samples per frame, advancing by
//!    `hop_size` samples. A buffer shorter than one window is zero-padded.
//! 2. FFT each frame (no tapering, no detrending).
//! 3. `|X_k|^2 / (sample_rate * window_size)`, doubled for every bin except
//!    DC and Nyquist.
//! 4. Optionally `10 * log10(power)`, with non-finite values clamped to 0.
//!
//! # Example
//!
//! ```
//! use lafayette::features::spectrogram::build_spectrogram;
//! use lafayette::FingerprintConfig;
//!
//! let config = FingerprintConfig::default();
//! let samples = vec![0.0f32; 44100];
//! let spec = build_spectrogram(&samples, 44100, &config)?;
//! assert_eq!(spec.freq_bins(), 2049);
//! assert_eq!(spec.time_bins(), 20);
//! # Ok::<(), lafayette::FingerprintError>(())
//! ```

use crate::config::FingerprintConfig;
use crate::error::FingerprintError;
use rayon::prelude::*;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Dense time-frequency matrix, frequency-major
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrogram {
    /// Row-major values: `data[freq * time_bins + time]`
    data: Vec<f32>,
    freq_bins: usize,
    time_bins: usize,
}

impl Spectrogram {
    /// Build a spectrogram from a row-major `[freq][time]` matrix
    ///
    /// # Errors
    ///
    /// Returns `FingerprintError::InvalidInput` if the rows differ in length.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self, FingerprintError> {
        let freq_bins = rows.len();
        let time_bins = rows.first().map_or(0, |r| r.len());

        if rows.iter().any(|r| r.len() != time_bins) {
            return Err(FingerprintError::InvalidInput(
                "Spectrogram rows must all have the same length".to_string(),
            ));
        }

        Ok(Self {
            data: rows.into_iter().flatten().collect(),
            freq_bins,
            time_bins,
        })
    }

    /// Number of frequency bins (rows)
    pub fn freq_bins(&self) -> usize {
        self.freq_bins
    }

    /// Number of time bins (columns)
    pub fn time_bins(&self) -> usize {
        self.time_bins
    }

    /// Whether the matrix has no cells
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Value at (`freq`, `time`)
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    #[inline]
    pub fn get(&self, freq: usize, time: usize) -> f32 {
        self.data[freq * self.time_bins + time]
    }

    /// Raw row-major values
    pub fn values(&self) -> &[f32] {
        &self.data
    }
}

/// Compute the power spectrogram of one channel
///
/// # Arguments
///
/// * `samples` - Channel samples (16-bit PCM scale)
/// * `sample_rate` - Sample rate in Hz
/// * `config` - Window size, overlap ratio and log scaling
///
/// # Returns
///
/// Spectrogram with `window_size / 2 + 1` frequency bins. An empty input
/// yields a spectrogram with zero time bins.
///
/// # Errors
///
/// Returns `FingerprintError::InvalidInput` if `sample_rate` is 0 or the
/// window parameters leave no hop.
pub fn build_spectrogram(
    samples: &[f32],
    sample_rate: u32,
    config: &FingerprintConfig,
) -> Result<Spectrogram, FingerprintError> {
    if sample_rate == 0 {
        return Err(FingerprintError::InvalidInput(
            "Sample rate must be > 0".to_string(),
        ));
    }

    let window_size = config.window_size;
    let hop_size = config.hop_size();
    if window_size == 0 || hop_size == 0 {
        return Err(FingerprintError::InvalidInput(format!(
            "Window size ({}) and hop size ({}) must be > 0",
            window_size, hop_size
        )));
    }

    let freq_bins = window_size / 2 + 1;

    if samples.is_empty() {
        log::debug!("Empty sample buffer, returning empty spectrogram");
        return Ok(Spectrogram {
            data: Vec::new(),
            freq_bins,
            time_bins: 0,
        });
    }

    // Pad short buffers up to a single window
    let padded;
    let samples = if samples.len() < window_size {
        let mut buf = samples.to_vec();
        buf.resize(window_size, 0.0);
        padded = buf;
        &padded[..]
    } else {
        samples
    };

    let time_bins = (samples.len() - window_size) / hop_size + 1;

    log::debug!(
        "Computing spectrogram: {} samples, window={}, hop={}, {} frames x {} bins",
        samples.len(),
        window_size,
        hop_size,
        time_bins,
        freq_bins
    );

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(window_size);

    // One-sided PSD scaling, see module docs
    let scale = 1.0 / (sample_rate as f32 * window_size as f32);
    let nyquist = if window_size % 2 == 0 {
        Some(window_size / 2)
    } else {
        None
    };

    let columns: Vec<Vec<f32>> = (0..time_bins)
        .into_par_iter()
        .map(|frame| {
            let start = frame * hop_size;
            let mut buffer: Vec<Complex<f32>> = samples[start..start + window_size]
                .iter()
                .map(|&v| Complex { re: v, im: 0.0 })
                .collect();
            fft.process(&mut buffer);

            buffer[..freq_bins]
                .iter()
                .enumerate()
                .map(|(k, c)| {
                    let mut power = c.norm_sqr() * scale;
                    if k != 0 && Some(k) != nyquist {
                        power *= 2.0;
                    }
                    if config.log_scale {
                        power = 10.0 * power.log10();
                    }
                    if power.is_finite() {
                        power
                    } else {
                        0.0
                    }
                })
                .collect()
        })
        .collect();

    // Transpose frame columns into frequency-major storage
    let mut data = vec![0.0f32; freq_bins * time_bins];
    for (t, column) in columns.iter().enumerate() {
        for (f, &value) in column.iter().enumerate() {
            data[f * time_bins + t] = value;
        }
    }

    Ok(Spectrogram {
        data,
        freq_bins,
        time_bins,
    })
}
