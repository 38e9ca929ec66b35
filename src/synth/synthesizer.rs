// ToneSynthesizer - renders one tone request into a finite audio buffer
//
// Stateless aside from the sample rate fixed at construction. The three
// timbres share the additive-synthesis step and differ only in their
// harmonic weight table and post-processing (envelope, resonator,
// normalization).

use crate::audio::buffer::AudioBuffer;
use crate::synth::envelope::{AdsrShape, linear_decay};
use crate::synth::resonator::TwoPoleResonator;
use crate::synth::tone::{
    PIANO_HARMONIC_WEIGHTS, SynthError, Timbre, ToneRequest, XYLOPHONE_HARMONIC_WEIGHTS,
};

use std::f32::consts::PI;

pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Deterministic tone renderer.
#[derive(Debug, Clone)]
pub struct ToneSynthesizer {
    sample_rate: u32,
}

impl ToneSynthesizer {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Render a tone request into a mono buffer.
    ///
    /// Fails with [`SynthError::InvalidToneRequest`] for non-positive
    /// frequency or duration; a silent empty buffer is never produced.
    pub fn render(&self, request: &ToneRequest) -> Result<AudioBuffer, SynthError> {
        request.validate()?;
        let num_samples = (request.duration as f64 * self.sample_rate as f64).round() as usize;

        let samples = match request.timbre {
            Timbre::Piano => self.render_piano(request.frequency, num_samples),
            Timbre::Xylophone => self.render_xylophone(request.frequency, num_samples),
            Timbre::VideoGame => self.render_video_game(request.frequency, num_samples),
        };

        Ok(AudioBuffer::new(samples, self.sample_rate))
    }

    /// Sum of weighted sine harmonics: Σ wₖ·sin(2π·f·k·t), k starting at 1.
    fn additive(&self, frequency: f32, num_samples: usize, weights: &[f32]) -> Vec<f32> {
        let sr = self.sample_rate as f32;
        (0..num_samples)
            .map(|i| {
                let t = i as f32 / sr;
                weights
                    .iter()
                    .enumerate()
                    .map(|(k, weight)| {
                        let harmonic = (k + 1) as f32;
                        weight * (2.0 * PI * frequency * harmonic * t).sin()
                    })
                    .sum()
            })
            .collect()
    }

    fn render_piano(&self, frequency: f32, num_samples: usize) -> Vec<f32> {
        let mut samples = self.additive(frequency, num_samples, &PIANO_HARMONIC_WEIGHTS);

        let envelope = AdsrShape::default().amplitudes(num_samples);
        for (sample, amp) in samples.iter_mut().zip(&envelope) {
            *sample *= amp;
        }

        normalize(&mut samples);
        samples
    }

    fn render_xylophone(&self, frequency: f32, num_samples: usize) -> Vec<f32> {
        let mut samples = self.additive(frequency, num_samples, &XYLOPHONE_HARMONIC_WEIGHTS);
        for sample in samples.iter_mut() {
            *sample *= 0.5 * PI;
        }

        if let Some(&first) = samples.first() {
            let mut resonator = TwoPoleResonator::new(frequency, self.sample_rate as f32);
            resonator.prime(first);
            resonator.process_buffer(&mut samples);
        }

        let envelope = linear_decay(num_samples);
        for (sample, amp) in samples.iter_mut().zip(&envelope) {
            *sample *= amp;
        }

        normalize(&mut samples);
        samples
    }

    fn render_video_game(&self, frequency: f32, num_samples: usize) -> Vec<f32> {
        let sr = self.sample_rate as f32;
        (0..num_samples)
            .map(|i| {
                let t = i as f32 / sr;
                let s = (2.0 * PI * frequency * t).sin();
                // Bipolar square; a zero crossing lands exactly on 0.
                if s > 0.0 {
                    1.0
                } else if s < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            })
            .collect()
    }
}

impl Default for ToneSynthesizer {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE)
    }
}

/// Scale the buffer so its peak reaches exactly 1.0.
///
/// An all-zero buffer is left untouched rather than divided by zero.
fn normalize(samples: &mut [f32]) {
    let peak = samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
    if peak > 0.0 {
        for sample in samples.iter_mut() {
            *sample /= peak;
        }
    }
}
