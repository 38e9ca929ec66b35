// Resonator - second-order filter for the metallic xylophone color
//
// The analog prototype places a conjugate pole pair at radius 0.95 and angle
// 2π·f/Fs, with a double zero at DC:
//
//     H(s) = s² / (s² − 2·0.95·cos(2π·f/Fs)·s + 0.95²)
//
// and is discretized with the bilinear transform at the audio sample rate.
// Processing runs in direct form II transposed. The initial filter state can
// be primed to the steady-state response scaled by the first input sample so
// the very first output carries no startup transient.
//
// Coefficients and state are kept in f64: the bilinear substitution works
// with K² = (2·Fs)², which would swallow the low-order terms in f32.

const POLE_RADIUS: f64 = 0.95;

/// Second-order resonant filter (direct form II transposed).
#[derive(Debug, Clone)]
pub struct TwoPoleResonator {
    // Normalized digital coefficients, a[0] == 1.
    b: [f64; 3],
    a: [f64; 3],
    // Delay-line state.
    s0: f64,
    s1: f64,
}

impl TwoPoleResonator {
    /// Build the resonator for a given fundamental, discretized at `sample_rate`.
    pub fn new(frequency: f32, sample_rate: f32) -> Self {
        let fs = sample_rate as f64;
        let theta = 2.0 * std::f64::consts::PI * frequency as f64 / fs;

        // Analog prototype, descending powers of s.
        let b_analog = [1.0, 0.0, 0.0];
        let a_analog = [
            1.0,
            -2.0 * POLE_RADIUS * theta.cos(),
            POLE_RADIUS * POLE_RADIUS,
        ];

        let (b, a) = bilinear(b_analog, a_analog, fs);
        Self {
            b,
            a,
            s0: 0.0,
            s1: 0.0,
        }
    }

    /// Set the delay line to the steady-state response scaled by
    /// `first_sample`, removing the startup transient.
    pub fn prime(&mut self, first_sample: f32) {
        let [_, a1, a2] = self.a;
        let [b0, b1, b2] = self.b;

        let r0 = b1 - a1 * b0;
        let r1 = b2 - a2 * b0;
        let det = 1.0 + a1 + a2;

        let z0 = (r0 + r1) / det;
        let z1 = ((1.0 + a1) * r1 - a2 * r0) / det;

        self.s0 = z0 * first_sample as f64;
        self.s1 = z1 * first_sample as f64;
    }

    /// Clear the delay line.
    pub fn reset(&mut self) {
        self.s0 = 0.0;
        self.s1 = 0.0;
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let x = input as f64;
        let y = self.b[0] * x + self.s0;
        self.s0 = self.b[1] * x - self.a[1] * y + self.s1;
        self.s1 = self.b[2] * x - self.a[2] * y;
        y as f32
    }

    /// Filter a whole buffer in place.
    pub fn process_buffer(&mut self, samples: &mut [f32]) {
        for sample in samples.iter_mut() {
            *sample = self.process(*sample);
        }
    }
}

/// Bilinear transform of a second-order analog section (descending powers
/// of s) into normalized digital coefficients.
fn bilinear(b: [f64; 3], a: [f64; 3], fs: f64) -> ([f64; 3], [f64; 3]) {
    let k = 2.0 * fs;
    let k2 = k * k;

    // Substitute s = K·(z−1)/(z+1) and collect powers of z.
    let bz = [
        b[0] * k2 + b[1] * k + b[2],
        -2.0 * b[0] * k2 + 2.0 * b[2],
        b[0] * k2 - b[1] * k + b[2],
    ];
    let az = [
        a[0] * k2 + a[1] * k + a[2],
        -2.0 * a[0] * k2 + 2.0 * a[2],
        a[0] * k2 - a[1] * k + a[2],
    ];

    let norm = az[0];
    (
        [bz[0] / norm, bz[1] / norm, bz[2] / norm],
        [1.0, az[1] / norm, az[2] / norm],
    )
}
