//! Integration tests for enrollment and recognition

use lafayette::features::hashing::generate_hashes;
use lafayette::io::decoder::{AudioDecoder, SymphoniaDecoder};
use lafayette::io::sample_buffer::SampleBuffer;
use lafayette::{
    EnrollMode, Fingerprint, FingerprintConfig, FingerprintHash, FingerprintIndex, FingerprintSet,
    MemoryIndex, Peak, Recognizer, ShardedIndex, TrackId, TrackRecord,
};
use std::path::Path;
use std::sync::Arc;

const SAMPLE_RATE: u32 = 44100;

/// Deterministic two-voice melody; different seeds give different tracks
fn synth_track(seed: u32, seconds: f32) -> Vec<f32> {
    let mut state = seed;
    let mut next = move || {
        state = state.wrapping_mul(1664525).wrapping_add(1013904223);
        200.0 + (state >> 20) as f32 % 3500.0
    };

    let note_len = (SAMPLE_RATE as f32 * 0.12) as usize;
    let total = (SAMPLE_RATE as f32 * seconds) as usize;
    let tau = 2.0 * std::f32::consts::PI;
    let mut voices = (0.0f32, 0.0f32);

    (0..total)
        .map(|i| {
            if i % note_len == 0 {
                voices = (next(), next());
            }
            let t = i as f32 / SAMPLE_RATE as f32;
            7000.0 * (tau * voices.0 * t).sin() + 3500.0 * (tau * voices.1 * t).sin()
        })
        .collect()
}

fn mono(samples: Vec<f32>) -> Vec<SampleBuffer> {
    vec![SampleBuffer::new(samples, SAMPLE_RATE)]
}

fn write_stereo_wav(path: &Path, left: &[f32], right: &[f32]) -> Result<(), Box<dyn std::error::Error>> {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for (l, r) in left.iter().zip(right) {
        writer.write_sample(l.clamp(-32768.0, 32767.0) as i16)?;
        writer.write_sample(r.clamp(-32768.0, 32767.0) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}

#[test]
fn test_concrete_three_peak_scenario() {
    let config = FingerprintConfig::default();
    let peaks = vec![Peak::new(10, 0), Peak::new(20, 5), Peak::new(15, 50)];
    let fingerprints: Vec<Fingerprint> = generate_hashes(peaks, &config).collect();

    let rendered: Vec<(String, u32)> = fingerprints
        .iter()
        .map(|fp| (fp.hash.to_string(), fp.offset))
        .collect();

    assert_eq!(
        rendered,
        vec![
            ("f02bf9c6c77b928c8a94".to_string(), 0),
            ("3bdc635cc5c861b5abf4".to_string(), 0),
            ("41671dfd9958302e3155".to_string(), 5),
        ]
    );
}

#[test]
fn test_enroll_and_match_excerpt_from_middle() {
    let recognizer = Recognizer::new(FingerprintConfig::default(), MemoryIndex::new()).unwrap();
    let config = recognizer.config().clone();

    let tracks: Vec<(String, Vec<f32>)> = (1..=3)
        .map(|seed| (format!("track-{}", seed), synth_track(seed * 7919, 8.0)))
        .collect();

    for (name, samples) in &tracks {
        recognizer
            .enroll(&mono(samples.clone()), TrackRecord::new(name.as_str()), EnrollMode::Store)
            .unwrap();
    }
    assert_eq!(recognizer.index().track_count().unwrap(), 3);

    // Excerpt starting 65 hops (about 3s) into the track
    let start = 65 * config.hop_size();
    let excerpt = tracks[1].1[start..start + SAMPLE_RATE as usize * 3].to_vec();

    let result = recognizer
        .match_channels(&mono(excerpt))
        .unwrap()
        .expect("excerpt should match");

    let hop_seconds = config.hop_size() as f64 / SAMPLE_RATE as f64;
    let true_start = start as f64 / SAMPLE_RATE as f64;

    assert_eq!(result.track.id, TrackId::new("track-2"));
    assert!(result.hit_count > 0);
    assert_eq!(result.offset, 65);
    assert!(
        (result.offset_seconds - true_start).abs() <= hop_seconds,
        "offset {:.3}s too far from {:.3}s",
        result.offset_seconds,
        true_start
    );
}

#[test]
fn test_query_without_overlap_returns_none() {
    let recognizer = Recognizer::new(FingerprintConfig::default(), MemoryIndex::new()).unwrap();
    recognizer
        .enroll(&mono(synth_track(1, 4.0)), TrackRecord::new("only"), EnrollMode::Store)
        .unwrap();

    // Silence: no peaks, no fingerprints
    let silence = mono(vec![0.0; SAMPLE_RATE as usize * 2]);
    assert!(recognizer.match_channels(&silence).unwrap().is_none());

    // Fingerprints that share nothing with the index
    let unrelated: FingerprintSet = (0..50u32)
        .map(|i| Fingerprint {
            hash: FingerprintHash::from_peak_pair(5000 + i, 6000 + i, i, 20),
            offset: i,
        })
        .filter(|fp| recognizer.index().lookup(&fp.hash).unwrap().is_empty())
        .collect();
    assert!(!unrelated.is_empty());
    assert!(recognizer.match_fingerprints(&unrelated, SAMPLE_RATE).unwrap().is_none());
}

#[test]
fn test_empty_input_is_not_an_error() {
    let recognizer = Recognizer::new(FingerprintConfig::default(), MemoryIndex::new()).unwrap();
    let fingerprints = recognizer
        .enroll(&mono(vec![]), TrackRecord::new("empty"), EnrollMode::Store)
        .unwrap();
    assert!(fingerprints.is_empty());
    assert!(recognizer.match_channels(&mono(vec![])).unwrap().is_none());
}

#[test]
fn test_fingerprints_respect_delta_bounds() {
    let config = FingerprintConfig {
        min_hash_time_delta: 2,
        max_hash_time_delta: 12,
        ..Default::default()
    };
    let recognizer = Recognizer::new(config.clone(), MemoryIndex::new()).unwrap();
    let samples = synth_track(42, 4.0);

    // Reconstruct the pairs: every fingerprint hash must come from a pair
    // of peaks whose time distance is within bounds
    let spec = lafayette::features::spectrogram::build_spectrogram(&samples, SAMPLE_RATE, &config).unwrap();
    let peaks = lafayette::features::peaks::find_peaks(&spec, &config);
    let allowed: std::collections::HashSet<FingerprintHash> = peaks
        .iter()
        .flat_map(|a| peaks.iter().map(move |b| (a, b)))
        .filter(|(a, b)| b.time_bin >= a.time_bin)
        .map(|(a, b)| (a.freq_bin, b.freq_bin, b.time_bin - a.time_bin))
        .filter(|&(_, _, delta)| (2..=12).contains(&delta))
        .map(|(f1, f2, delta)| FingerprintHash::from_peak_pair(f1, f2, delta, config.hash_prefix_drop))
        .collect();

    let fingerprints = recognizer.fingerprint(&mono(samples)).unwrap();
    assert!(!fingerprints.is_empty());
    assert!(fingerprints.iter().all(|fp| allowed.contains(&fp.hash)));
}

#[test]
fn test_concurrent_enrollment_into_sharded_index() {
    let index = Arc::new(ShardedIndex::with_shards(8));
    let recognizer = Recognizer::with_shared_index(FingerprintConfig::default(), Arc::clone(&index)).unwrap();

    let handles: Vec<_> = (1..=4u32)
        .map(|seed| {
            let recognizer = recognizer.clone();
            std::thread::spawn(move || {
                recognizer
                    .enroll(
                        &mono(synth_track(seed * 104729, 4.0)),
                        TrackRecord::new(format!("t{}", seed)),
                        EnrollMode::Store,
                    )
                    .unwrap()
                    .len()
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap() > 0);
    }
    assert_eq!(index.track_count().unwrap(), 4);

    let query = synth_track(3 * 104729, 4.0);
    let result = recognizer.match_channels(&mono(query)).unwrap().unwrap();
    assert_eq!(result.track.id, TrackId::new("t3"));
    assert_eq!(result.offset, 0);
}

#[test]
fn test_stereo_wav_round_trip_through_decoder() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("duet.wav");

    let left = synth_track(77, 5.0);
    let right = synth_track(78, 5.0);
    write_stereo_wav(&path, &left, &right).unwrap();

    let decoded = SymphoniaDecoder.decode(&path).unwrap();
    assert_eq!(decoded.sample_rate, SAMPLE_RATE);
    assert_eq!(decoded.channels.len(), 2);
    assert_eq!(decoded.channels[0].len(), left.len());

    let recognizer = Recognizer::new(FingerprintConfig::default(), MemoryIndex::new()).unwrap();
    let (record, fingerprints) = recognizer.enroll_file(&path, &SymphoniaDecoder).unwrap();
    assert_eq!(record.id, TrackId::new("duet"));
    assert!(!fingerprints.is_empty());

    // Either channel alone identifies the file
    let right_only: Vec<f32> = right.iter().map(|s| s.clamp(-32768.0, 32767.0).trunc()).collect();
    let result = recognizer.match_channels(&mono(right_only)).unwrap().unwrap();
    assert_eq!(result.track.id, TrackId::new("duet"));
    assert_eq!(result.offset, 0);
}
