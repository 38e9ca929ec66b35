// Audio buffers
//
// Tones are carried as mono f32 internally; the conversion to interleaved
// 16-bit stereo happens once, at the edge, when a buffer is finalized for an
// output sink or a file writer.

/// A finite rendered tone: mono samples plus the rate they were rendered at.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of mono samples (frames).
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Largest absolute sample value.
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
    }

    /// Finalize for output: duplicate the mono signal into two interleaved
    /// channels scaled to 16-bit integers.
    pub fn to_interleaved_i16(&self) -> Vec<i16> {
        let mut frames = Vec::with_capacity(self.samples.len() * 2);
        for &sample in &self.samples {
            let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            frames.push(value);
            frames.push(value);
        }
        frames
    }
}
