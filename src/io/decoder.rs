//! Audio decoding using Symphonia
//!
//! Decoding is an external collaborator of the fingerprinting engine: it only
//! has to hand back one sample buffer per channel plus the sample rate. The
//! [`AudioDecoder`] trait is the seam; [`SymphoniaDecoder`] is the default
//! implementation.

use crate::error::FingerprintError;
use crate::io::sample_buffer::SampleBuffer;
use sha1::{Digest, Sha1};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use symphonia::core::audio::SampleBuffer as PcmBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Block size used when hashing file contents
const DIGEST_BLOCK_SIZE: usize = 1 << 20;

/// Decoded audio: one buffer per channel, in channel order
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Per-channel samples on the 16-bit PCM scale
    pub channels: Vec<SampleBuffer>,

    /// Sample rate in Hz
    pub sample_rate: u32,
}

/// Turns an audio file into per-channel PCM
pub trait AudioDecoder: Send + Sync {
    /// Decode the file at `path`
    ///
    /// # Errors
    ///
    /// Returns `FingerprintError::DecodingError` for unreadable, unsupported
    /// or corrupt input.
    fn decode(&self, path: &Path) -> Result<DecodedAudio, FingerprintError>;
}

/// Decoder backed by Symphonia's default codec and format registries
#[derive(Debug, Clone, Copy, Default)]
pub struct SymphoniaDecoder;

impl AudioDecoder for SymphoniaDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedAudio, FingerprintError> {
        log::debug!("Decoding audio file: {}", path.display());

        let src = File::open(path)?;
        let mss = MediaSourceStream::new(Box::new(src), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe().format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| {
                FingerprintError::DecodingError(format!(
                    "No supported audio track in {}",
                    path.display()
                ))
            })?;

        let track_id = track.id;
        let mut sample_rate = track.codec_params.sample_rate;
        let mut channel_count = track.codec_params.channels.map(|c| c.count());
        let mut decoder =
            symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

        let mut interleaved: Vec<f32> = Vec::new();
        let mut skipped_packets = 0usize;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => return Err(e.into()),
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    sample_rate.get_or_insert(spec.rate);
                    channel_count.get_or_insert(spec.channels.count());

                    let mut pcm = PcmBuffer::<i16>::new(decoded.capacity() as u64, spec);
                    pcm.copy_interleaved_ref(decoded);
                    interleaved.extend(pcm.samples().iter().map(|&s| s as f32));
                }
                Err(SymphoniaError::DecodeError(msg)) => {
                    // Corrupt packets are skipped; the rest of the stream is still usable
                    log::warn!("Skipping undecodable packet in {}: {}", path.display(), msg);
                    skipped_packets += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        let sample_rate = sample_rate.ok_or_else(|| {
            FingerprintError::DecodingError(format!("Unknown sample rate for {}", path.display()))
        })?;
        let channel_count = channel_count.unwrap_or(1);

        let channels = SampleBuffer::deinterleave(&interleaved, channel_count, sample_rate);

        log::debug!(
            "Decoded {}: {} channels, {} frames at {} Hz ({} packets skipped)",
            path.display(),
            channels.len(),
            channels.first().map_or(0, |c| c.len()),
            sample_rate,
            skipped_packets
        );

        Ok(DecodedAudio {
            channels,
            sample_rate,
        })
    }
}

/// Derive a track id from a file path: the file name without its extension
///
/// # Example
///
/// ```
/// use lafayette::io::decoder::track_name;
/// use std::path::Path;
///
/// assert_eq!(track_name(Path::new("/music/Artist - Song.mp3")), "Artist - Song");
/// ```
pub fn track_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// SHA-1 of a file's contents as upper-case hex
///
/// Identifies a file independently of its name, so already-enrolled files
/// can be recognised before decoding them again.
pub fn file_digest(path: &Path) -> Result<String, FingerprintError> {
    let mut file = File::open(path)?;
    let mut hasher = Sha1::new();
    let mut block = vec![0u8; DIGEST_BLOCK_SIZE];

    loop {
        let read = file.read(&mut block)?;
        if read == 0 {
            break;
        }
        hasher.update(&block[..read]);
    }

    Ok(hex::encode_upper(hasher.finalize()))
}
