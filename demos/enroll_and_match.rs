//! Example: Enroll audio files and identify a clip
//!
//! Usage:
//!   cargo run --release --example enroll_and_match -- [--config cfg.json] <clip> <track1> <track2> ...
//!
//! Tracks are enrolled in parallel; files that fail to decode are reported
//! and skipped. The clip is then matched against everything enrolled.

use lafayette::io::decoder::SymphoniaDecoder;
use lafayette::{FingerprintConfig, FingerprintIndex, MemoryIndex, Recognizer};
use std::env;
use std::path::PathBuf;
use std::time::Instant;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args: Vec<String> = env::args().skip(1).collect();
    let mut config = FingerprintConfig::default();

    if args.first().map(String::as_str) == Some("--config") {
        args.remove(0);
        let path = args.first().cloned().ok_or("--config requires a path")?;
        args.remove(0);
        config = FingerprintConfig::from_json(&std::fs::read_to_string(path)?)?;
    }

    if args.len() < 2 {
        eprintln!("Usage: enroll_and_match [--config cfg.json] <clip> <track1> <track2> ...");
        std::process::exit(2);
    }

    let clip = PathBuf::from(args.remove(0));
    let tracks: Vec<PathBuf> = args.into_iter().map(PathBuf::from).collect();

    let recognizer = Recognizer::new(config, MemoryIndex::new())?;

    let t0 = Instant::now();
    let report = recognizer.enroll_files(&tracks, &SymphoniaDecoder);
    for file in &report.enrolled {
        println!("  enrolled {} ({} fingerprints)", file.track_id, file.fingerprints);
    }
    for (path, err) in &report.failed {
        eprintln!("  skipped {}: {}", path.display(), err);
    }
    println!(
        "Enrolled {} tracks, {} hashes in {:.2}s",
        report.enrolled.len(),
        recognizer.index().hash_count()?,
        t0.elapsed().as_secs_f32()
    );

    let t1 = Instant::now();
    match recognizer.match_file(&clip, &SymphoniaDecoder)? {
        Some(hit) => {
            println!("Match: {}", hit.track.id);
            println!("  offset: {} bins ({:.2}s)", hit.offset, hit.offset_seconds);
            println!("  hits:   {}", hit.hit_count);
            println!("  {}", serde_json::to_string(&hit)?);
        }
        None => println!("No match"),
    }
    println!("Matched in {:.2} ms", t1.elapsed().as_secs_f32() * 1000.0);

    Ok(())
}
