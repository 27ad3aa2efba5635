//! Per-channel sample buffers

/// Scale factor between normalized floats and 16-bit PCM amplitudes
const PCM_I16_SCALE: f32 = 32768.0;

/// One channel of audio
///
/// Samples are stored on the signed 16-bit PCM scale so that the default
/// peak amplitude threshold means the same thing regardless of how the
/// audio was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    /// Sample data
    data: Vec<f32>,
    /// Sample rate in Hz
    sample_rate: u32,
}

impl SampleBuffer {
    /// Create a buffer from samples already on the 16-bit PCM scale
    pub fn new(data: Vec<f32>, sample_rate: u32) -> Self {
        Self { data, sample_rate }
    }

    /// Create a buffer from 16-bit PCM samples
    pub fn from_i16(samples: &[i16], sample_rate: u32) -> Self {
        Self::new(samples.iter().map(|&s| s as f32).collect(), sample_rate)
    }

    /// Create a buffer from samples normalized to [-1.0, 1.0]
    pub fn from_normalized(samples: &[f32], sample_rate: u32) -> Self {
        Self::new(
            samples.iter().map(|&s| s * PCM_I16_SCALE).collect(),
            sample_rate,
        )
    }

    /// Split interleaved frames into one buffer per channel
    ///
    /// A trailing partial frame is dropped.
    ///
    /// # Example
    ///
    /// ```
    /// use lafayette::io::sample_buffer::SampleBuffer;
    ///
    /// let channels = SampleBuffer::deinterleave(&[1.0, -1.0, 2.0, -2.0], 2, 8000);
    /// assert_eq!(channels[0].samples(), &[1.0, 2.0]);
    /// assert_eq!(channels[1].samples(), &[-1.0, -2.0]);
    /// ```
    pub fn deinterleave(interleaved: &[f32], channels: usize, sample_rate: u32) -> Vec<Self> {
        if channels == 0 {
            return vec![];
        }

        let frames = interleaved.len() / channels;
        (0..channels)
            .map(|ch| {
                let data = (0..frames).map(|i| interleaved[i * channels + ch]).collect();
                Self::new(data, sample_rate)
            })
            .collect()
    }

    /// Sample data
    pub fn samples(&self) -> &[f32] {
        &self.data
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer holds no samples
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Duration in seconds
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.data.len() as f64 / self.sample_rate as f64
    }

    /// Copy of the samples in `start..end`, clipped to the buffer
    pub fn slice(&self, start: usize, end: usize) -> Self {
        let end = end.min(self.data.len());
        let start = start.min(end);
        Self::new(self.data[start..end].to_vec(), self.sample_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_i16_keeps_scale() {
        let buffer = SampleBuffer::from_i16(&[i16::MIN, 0, i16::MAX], 44100);
        assert_eq!(buffer.samples(), &[-32768.0, 0.0, 32767.0]);
        assert_eq!(buffer.sample_rate(), 44100);
    }

    #[test]
    fn test_from_normalized_scales_up() {
        let buffer = SampleBuffer::from_normalized(&[-1.0, 0.5], 22050);
        assert_eq!(buffer.samples(), &[-32768.0, 16384.0]);
    }

    #[test]
    fn test_deinterleave_drops_partial_frame() {
        let channels = SampleBuffer::deinterleave(&[1.0, 2.0, 3.0, 4.0, 5.0], 2, 8000);
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[0].samples(), &[1.0, 3.0]);
        assert_eq!(channels[1].samples(), &[2.0, 4.0]);

        assert!(SampleBuffer::deinterleave(&[1.0], 0, 8000).is_empty());
    }

    #[test]
    fn test_slice_and_duration() {
        let buffer = SampleBuffer::new(vec![0.0; 44100], 44100);
        assert!((buffer.duration_seconds() - 1.0).abs() < 1e-9);

        let part = buffer.slice(100, 50_000);
        assert_eq!(part.len(), 44000);
        assert!(buffer.slice(50_000, 60_000).is_empty());
    }
}
