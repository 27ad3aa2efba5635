//! Peak-pair hashing
//!
//! Pairs each peak with the peaks that follow it in time and turns every
//! pair into a fingerprint: a truncated SHA-1 of `"<f1>|<f2>|<delta>"`
//! anchored at the earlier peak's time bin.
//!
//! # Example
//!
//! ```
//! use lafayette::features::hashing::generate_hashes;
//! use lafayette::features::peaks::Peak;
//! use lafayette::FingerprintConfig;
//!
//! let peaks = vec![Peak::new(10, 0), Peak::new(20, 5), Peak::new(15, 50)];
//! let hashes: Vec<_> = generate_hashes(peaks, &FingerprintConfig::default()).collect();
//!
//! assert_eq!(hashes.len(), 3);
//! assert_eq!(hashes[0].hash.to_string(), "f02bf9c6c77b928c8a94");
//! assert_eq!(hashes[0].offset, 0);
//! ```

use super::peaks::Peak;
use crate::config::{FingerprintConfig, DIGEST_HEX_LEN};
use crate::error::FingerprintError;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Truncated SHA-1 digest identifying a peak pair
///
/// Holds the trailing `width` hex characters of the digest. Serialized as
/// lower-case hex, the same text the digest suffix has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct FingerprintHash {
    value: u128,
    width: u8,
}

impl FingerprintHash {
    /// Hash one peak pair
    ///
    /// # Arguments
    ///
    /// * `freq1` - Frequency bin of the earlier peak
    /// * `freq2` - Frequency bin of the later peak
    /// * `delta` - Time-bin distance between the peaks
    /// * `prefix_drop` - Leading hex characters of the digest to discard
    ///
    /// At most 32 hex characters fit, and at least one is kept, so
    /// `prefix_drop` is clamped to `8..=39`.
    pub fn from_peak_pair(freq1: u32, freq2: u32, delta: u32, prefix_drop: usize) -> Self {
        let prefix_drop = prefix_drop.clamp(DIGEST_HEX_LEN - 32, DIGEST_HEX_LEN - 1);
        let digest = Sha1::digest(format!("{}|{}|{}", freq1, freq2, delta).as_bytes());

        // Trailing 16 bytes, then mask down to the kept hex characters
        let mut tail = [0u8; 16];
        tail.copy_from_slice(&digest[digest.len() - 16..]);
        let width = DIGEST_HEX_LEN - prefix_drop;

        Self {
            value: u128::from_be_bytes(tail) & width_mask(width),
            width: width as u8,
        }
    }

    /// Numeric value of the kept digest bits
    pub fn value(&self) -> u128 {
        self.value
    }

    /// Number of hex characters kept
    pub fn width(&self) -> usize {
        self.width as usize
    }
}

fn width_mask(width: usize) -> u128 {
    if width >= 32 {
        u128::MAX
    } else {
        (1u128 << (width * 4)) - 1
    }
}

impl fmt::Display for FingerprintHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$x}", self.value, width = self.width as usize)
    }
}

impl FromStr for FingerprintHash {
    type Err = FingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.len() > 32 {
            return Err(FingerprintError::InvalidInput(format!(
                "Fingerprint hash must be 1-32 hex characters, got {}",
                s.len()
            )));
        }

        if let Some(bad) = s.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(FingerprintError::InvalidInput(format!(
                "Invalid fingerprint hash {:?}: unexpected character {:?}",
                s, bad
            )));
        }

        let value = u128::from_str_radix(s, 16).map_err(|e| {
            FingerprintError::InvalidInput(format!("Invalid fingerprint hash {:?}: {}", s, e))
        })?;

        Ok(Self {
            value,
            width: s.len() as u8,
        })
    }
}

impl From<FingerprintHash> for String {
    fn from(hash: FingerprintHash) -> Self {
        hash.to_string()
    }
}

impl TryFrom<String> for FingerprintHash {
    type Error = FingerprintError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// One fingerprint: a peak-pair hash and the time bin of the earlier peak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint {
    /// Peak-pair hash
    pub hash: FingerprintHash,

    /// Anchor time bin
    pub offset: u32,
}

/// Deduplicated fingerprints of one source
///
/// Ordered so that iterating it (and therefore matching) is deterministic.
pub type FingerprintSet = BTreeSet<Fingerprint>;

/// Lazy, single-pass stream of fingerprints over a time-sorted peak list
///
/// Created by [`generate_hashes`]. The stream cannot be restarted; collect it
/// into a [`FingerprintSet`] if it is needed more than once.
#[derive(Debug)]
pub struct Hashes {
    peaks: Vec<Peak>,
    fan_value: usize,
    min_delta: u32,
    max_delta: u32,
    prefix_drop: usize,
    anchor: usize,
    step: usize,
}

impl Iterator for Hashes {
    type Item = Fingerprint;

    fn next(&mut self) -> Option<Fingerprint> {
        while self.anchor < self.peaks.len() {
            let i = self.anchor;
            let j = i + self.step;

            if self.step >= self.fan_value || j >= self.peaks.len() {
                self.anchor += 1;
                self.step = 1;
                continue;
            }
            self.step += 1;

            let (first, second) = (self.peaks[i], self.peaks[j]);
            let delta = second.time_bin - first.time_bin;
            if delta < self.min_delta || delta > self.max_delta {
                continue;
            }

            return Some(Fingerprint {
                hash: FingerprintHash::from_peak_pair(
                    first.freq_bin,
                    second.freq_bin,
                    delta,
                    self.prefix_drop,
                ),
                offset: first.time_bin,
            });
        }

        None
    }
}

/// Turn peaks into a stream of fingerprints
///
/// Peaks are stable-sorted by time bin, so ties keep their discovery order.
/// Peak `i` is paired with peaks `i+1 ..= i+fan_value-1`; pairs whose time
/// distance falls outside `[min_hash_time_delta, max_hash_time_delta]` are
/// skipped.
pub fn generate_hashes(mut peaks: Vec<Peak>, config: &FingerprintConfig) -> Hashes {
    peaks.sort_by_key(|p| p.time_bin);

    log::debug!(
        "Generating hashes from {} peaks, fan_value={}, delta=[{}, {}]",
        peaks.len(),
        config.fan_value,
        config.min_hash_time_delta,
        config.max_hash_time_delta
    );

    Hashes {
        peaks,
        fan_value: config.fan_value,
        min_delta: config.min_hash_time_delta,
        max_delta: config.max_hash_time_delta,
        prefix_drop: config.hash_prefix_drop,
        anchor: 0,
        step: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash(freq1: u32, freq2: u32, delta: u32) -> FingerprintHash {
        FingerprintHash::from_peak_pair(freq1, freq2, delta, 20)
    }

    #[test]
    fn test_known_digests() {
        // sha1("10|20|5") = 249ff335934a621f1029f02bf9c6c77b928c8a94
        assert_eq!(hash(10, 20, 5).to_string(), "f02bf9c6c77b928c8a94");
        // sha1("10|15|50") = b19ed87946e561c05be33bdc635cc5c861b5abf4
        assert_eq!(hash(10, 15, 50).to_string(), "3bdc635cc5c861b5abf4");
        // sha1("20|15|45") = 8304fec193ea4381791441671dfd9958302e3155
        assert_eq!(hash(20, 15, 45).to_string(), "41671dfd9958302e3155");
    }

    #[test]
    fn test_prefix_drop_controls_width() {
        let wide = FingerprintHash::from_peak_pair(10, 20, 5, 8);
        assert_eq!(wide.width(), 32);
        assert_eq!(wide.to_string(), "934a621f1029f02bf9c6c77b928c8a94");

        let narrow = FingerprintHash::from_peak_pair(10, 20, 5, 30);
        assert_eq!(narrow.width(), 10);
        assert_eq!(narrow.to_string(), "7b928c8a94");
        assert_ne!(wide, narrow);
    }

    #[test]
    fn test_prefix_drop_outside_range_is_clamped() {
        // Fewer than 8 dropped would exceed 32 characters
        let over_wide = FingerprintHash::from_peak_pair(10, 20, 5, 0);
        assert_eq!(over_wide, FingerprintHash::from_peak_pair(10, 20, 5, 8));
        assert_eq!(over_wide.width(), 32);

        // Dropping the whole digest still keeps its last character
        let too_narrow = FingerprintHash::from_peak_pair(10, 20, 5, 50);
        assert_eq!(too_narrow.width(), 1);
        assert_eq!(too_narrow.to_string(), "4");
    }

    #[test]
    fn test_three_peak_scenario() {
        let peaks = vec![Peak::new(10, 0), Peak::new(20, 5), Peak::new(15, 50)];
        let fingerprints: Vec<Fingerprint> =
            generate_hashes(peaks, &FingerprintConfig::default()).collect();

        assert_eq!(
            fingerprints,
            vec![
                Fingerprint { hash: hash(10, 20, 5), offset: 0 },
                Fingerprint { hash: hash(10, 15, 50), offset: 0 },
                Fingerprint { hash: hash(20, 15, 45), offset: 5 },
            ]
        );
    }

    #[test]
    fn test_peaks_sorted_by_time_before_pairing() {
        let peaks = vec![Peak::new(15, 50), Peak::new(20, 5), Peak::new(10, 0)];
        let fingerprints: Vec<Fingerprint> =
            generate_hashes(peaks, &FingerprintConfig::default()).collect();
        assert_eq!(fingerprints[0], Fingerprint { hash: hash(10, 20, 5), offset: 0 });
        assert_eq!(fingerprints.len(), 3);
    }

    #[test]
    fn test_delta_window_filters_pairs() {
        let config = FingerprintConfig {
            min_hash_time_delta: 1,
            max_hash_time_delta: 10,
            ..Default::default()
        };
        let peaks = vec![Peak::new(1, 0), Peak::new(2, 0), Peak::new(3, 5), Peak::new(4, 30)];
        let fingerprints: Vec<Fingerprint> = generate_hashes(peaks, &config).collect();

        // (0,1) delta 0 and anything reaching t=30 are out of range
        assert_eq!(
            fingerprints,
            vec![
                Fingerprint { hash: hash(1, 3, 5), offset: 0 },
                Fingerprint { hash: hash(2, 3, 5), offset: 0 },
            ]
        );
    }

    #[test]
    fn test_fan_out_bound() {
        let config = FingerprintConfig {
            fan_value: 4,
            ..Default::default()
        };
        let n = 10;
        let peaks: Vec<Peak> = (0..n).map(|i| Peak::new(i * 3, i)).collect();
        let fingerprints: Vec<Fingerprint> = generate_hashes(peaks, &config).collect();

        for i in 0..n {
            let from_i = fingerprints.iter().filter(|fp| fp.offset == i).count();
            let bound = (config.fan_value as u32 - 1).min(n - 1 - i) as usize;
            assert_eq!(from_i, bound, "peak {} contributed {}", i, from_i);
        }
    }

    #[test]
    fn test_fan_value_one_pairs_nothing() {
        let config = FingerprintConfig {
            fan_value: 1,
            ..Default::default()
        };
        let peaks = vec![Peak::new(1, 0), Peak::new(2, 1)];
        assert_eq!(generate_hashes(peaks, &config).count(), 0);
    }

    #[test]
    fn test_hash_text_round_trip() {
        let h = hash(10, 20, 5);
        let parsed: FingerprintHash = "f02bf9c6c77b928c8a94".parse().unwrap();
        assert_eq!(parsed, h);

        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, "\"f02bf9c6c77b928c8a94\"");

        assert!("".parse::<FingerprintHash>().is_err());
        assert!("xyz".parse::<FingerprintHash>().is_err());
    }

    #[test]
    fn test_hash_text_rejects_sign_and_whitespace() {
        assert!("+f02bf9c6c77b928c8a9".parse::<FingerprintHash>().is_err());
        assert!("-f02bf9c6c77b928c8a9".parse::<FingerprintHash>().is_err());
        assert!(" f02bf9c6c77b928c8a9".parse::<FingerprintHash>().is_err());
        assert!("F02BF9C6C77B928C8A94".parse::<FingerprintHash>().is_ok());
    }

    #[test]
    fn test_leading_zeros_preserved() {
        let h: FingerprintHash = "000000000000000000ab".parse().unwrap();
        assert_eq!(h.to_string(), "000000000000000000ab");
        assert_eq!(h.width(), 20);
    }
}
