// ADSR Envelope implementation
//
// Buffer-shaping envelopes: the whole tone is rendered at once, so the
// envelope is computed as an amplitude curve over the exact sample count
// rather than processed sample by sample against wall time. The segment
// lengths are fractions of the buffer; the sustain plateau absorbs the
// integer rounding so the curve always matches the buffer length.

/// ADSR envelope with segment lengths expressed as fractions of the buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdsrShape {
    /// Fraction of the buffer spent ramping 0 → 1 (0.0 to 1.0).
    pub attack_percent: f32,
    /// Fraction spent ramping 1 → sustain level.
    pub decay_percent: f32,
    /// Plateau amplitude (0.0 to 1.0).
    pub sustain_level: f32,
    /// Fraction at the end spent ramping sustain level → 0.
    pub release_percent: f32,
}

impl AdsrShape {
    /// Create a shape with the fractions clamped to sane ranges.
    pub fn new(
        attack_percent: f32,
        decay_percent: f32,
        sustain_level: f32,
        release_percent: f32,
    ) -> Self {
        Self {
            attack_percent: attack_percent.clamp(0.0, 1.0),
            decay_percent: decay_percent.clamp(0.0, 1.0),
            sustain_level: sustain_level.clamp(0.0, 1.0),
            release_percent: release_percent.clamp(0.0, 1.0),
        }
    }

    /// Amplitude curve of exactly `num_samples` values.
    ///
    /// Ramps exclude their end point (the attack reaches 1.0 at the first
    /// decay sample, not at its own last sample), which keeps the very first
    /// sample of the attack at 0.
    pub fn amplitudes(&self, num_samples: usize) -> Vec<f32> {
        let attack = (num_samples as f32 * self.attack_percent) as usize;
        let decay = (num_samples as f32 * self.decay_percent) as usize;
        let release = (num_samples as f32 * self.release_percent) as usize;
        let sustain = num_samples.saturating_sub(attack + decay + release);

        let mut curve = Vec::with_capacity(attack + decay + sustain + release);
        for i in 0..attack {
            curve.push(i as f32 / attack as f32);
        }
        for i in 0..decay {
            curve.push(1.0 - (1.0 - self.sustain_level) * i as f32 / decay as f32);
        }
        for _ in 0..sustain {
            curve.push(self.sustain_level);
        }
        for i in 0..release {
            curve.push(self.sustain_level * (1.0 - i as f32 / release as f32));
        }

        // The segments can only overshoot (never undershoot) num_samples.
        curve.truncate(num_samples);
        curve
    }
}

impl Default for AdsrShape {
    fn default() -> Self {
        Self {
            attack_percent: 0.01,
            decay_percent: 0.1,
            sustain_level: 0.3,
            release_percent: 0.1,
        }
    }
}

/// Straight 1 → 0 ramp across the whole buffer, end points included.
pub fn linear_decay(num_samples: usize) -> Vec<f32> {
    match num_samples {
        0 => Vec::new(),
        1 => vec![1.0],
        n => (0..n).map(|i| 1.0 - i as f32 / (n - 1) as f32).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_length_matches_exactly() {
        let shape = AdsrShape::default();
        for n in [0, 1, 7, 99, 100, 22050, 44100, 44101] {
            assert_eq!(shape.amplitudes(n).len(), n, "length mismatch for n={}", n);
        }
    }

    #[test]
    fn test_attack_starts_at_zero() {
        let curve = AdsrShape::default().amplitudes(22050);
        assert_eq!(curve[0], 0.0);
    }

    #[test]
    fn test_attack_reaches_one() {
        let curve = AdsrShape::default().amplitudes(22050);
        let attack_samples = (22050.0 * 0.01) as usize;
        // Last attack sample is just under 1.0, first decay sample is 1.0.
        assert!(curve[attack_samples - 1] < 1.0);
        assert_eq!(curve[attack_samples], 1.0);
    }

    #[test]
    fn test_sustain_plateau_level() {
        let shape = AdsrShape::default();
        let n = 44100;
        let curve = shape.amplitudes(n);
        // Middle of the buffer sits on the plateau.
        assert_eq!(curve[n / 2], shape.sustain_level);
    }

    #[test]
    fn test_release_falls_towards_zero() {
        let shape = AdsrShape::default();
        let n = 10000;
        let curve = shape.amplitudes(n);
        let release_samples = (n as f32 * shape.release_percent) as usize;
        let release_start = n - release_samples;
        assert_eq!(curve[release_start], shape.sustain_level);
        assert!(curve[n - 1] < curve[release_start]);
        assert!(curve[n - 1] >= 0.0);
    }

    #[test]
    fn test_tiny_buffers_do_not_panic() {
        let shape = AdsrShape::default();
        for n in 0..16 {
            let curve = shape.amplitudes(n);
            assert_eq!(curve.len(), n);
            assert!(curve.iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn test_new_clamps_fractions() {
        let shape = AdsrShape::new(-0.5, 2.0, 1.5, -1.0);
        assert_eq!(shape.attack_percent, 0.0);
        assert_eq!(shape.decay_percent, 1.0);
        assert_eq!(shape.sustain_level, 1.0);
        assert_eq!(shape.release_percent, 0.0);
    }

    #[test]
    fn test_linear_decay_endpoints() {
        let curve = linear_decay(11);
        assert_eq!(curve.len(), 11);
        assert_eq!(curve[0], 1.0);
        assert_eq!(curve[10], 0.0);
        assert!((curve[5] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_linear_decay_degenerate_lengths() {
        assert!(linear_decay(0).is_empty());
        assert_eq!(linear_decay(1), vec![1.0]);
    }
}
