// Timbres et requêtes de tonalité
//
// A timbre selects a synthesis recipe. The harmonic content of the additive
// timbres is carried here as data so the synthesizer has a single render path
// instead of one near-duplicate method per instrument.

/// Synthesis variant for a tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timbre {
    Piano,
    Xylophone,
    VideoGame,
}

/// Piano: 8 harmonics, each weight exactly half the previous one.
pub const PIANO_HARMONIC_WEIGHTS: [f32; 8] = [
    0.5, 0.25, 0.125, 0.0625, 0.03125, 0.015625, 0.0078125, 0.00390625,
];

/// Xylophone: 12 harmonics with a slower roll-off for the metallic color.
pub const XYLOPHONE_HARMONIC_WEIGHTS: [f32; 12] = [
    0.5, 0.4, 0.35, 0.3, 0.25, 0.2, 0.15, 0.1, 0.05, 0.03, 0.02, 0.01,
];

impl Timbre {
    /// All timbres, in instrument-panel order.
    pub const ALL: [Timbre; 3] = [Timbre::Piano, Timbre::Xylophone, Timbre::VideoGame];

    /// Instrument index as used by the recorder and the settings file.
    pub fn index(&self) -> usize {
        match self {
            Timbre::Piano => 0,
            Timbre::Xylophone => 1,
            Timbre::VideoGame => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Timbre> {
        Timbre::ALL.get(index).copied()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Timbre::Piano => "piano",
            Timbre::Xylophone => "xylophone",
            Timbre::VideoGame => "videogame",
        }
    }

    pub fn from_name(name: &str) -> Option<Timbre> {
        Timbre::ALL.iter().copied().find(|t| t.name() == name)
    }

    /// Whether playback picks a frequency by octave for this instrument.
    /// Only the piano spans several octaves; the others use the base octave.
    pub fn is_octave_aware(&self) -> bool {
        matches!(self, Timbre::Piano)
    }
}

/// One tone to render. Immutable and short-lived.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneRequest {
    /// Fundamental frequency in Hz, must be > 0.
    pub frequency: f32,
    /// Length in seconds, must be > 0.
    pub duration: f32,
    pub timbre: Timbre,
}

impl ToneRequest {
    pub fn new(frequency: f32, duration: f32, timbre: Timbre) -> Self {
        Self {
            frequency,
            duration,
            timbre,
        }
    }

    /// Reject requests with a non-positive or non-finite frequency or
    /// duration. These never fall back to a silent empty buffer.
    pub fn validate(&self) -> Result<(), SynthError> {
        if self.frequency > 0.0
            && self.frequency.is_finite()
            && self.duration > 0.0
            && self.duration.is_finite()
        {
            Ok(())
        } else {
            Err(SynthError::InvalidToneRequest {
                frequency: self.frequency,
                duration: self.duration,
            })
        }
    }
}

/// Synthesis errors. Fatal to the single render call only.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SynthError {
    #[error("invalid tone request: frequency {frequency} Hz, duration {duration} s")]
    InvalidToneRequest { frequency: f32, duration: f32 },
}
