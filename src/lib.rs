// Toneboard - Library exports for tests and benchmarks

pub mod audio;
pub mod notes;
pub mod sequencer;
pub mod settings;
pub mod synth;

// Re-export commonly used types for convenience
pub use audio::buffer::AudioBuffer;
pub use audio::export::{ExportReport, ExportSettings, export_score};
pub use audio::sink::{AudioSink, CpalSink, DEFAULT_OUTPUT_VOLUME, NullSink, SinkError};
pub use notes::{NoteFrequencyTable, NotePitch, UnknownNote};
pub use sequencer::{
    AlreadyActive, ClickDurations, PlayError, PlaybackOutcome, PlaybackSettings, RecordedEvent,
    Score, ScoreEntry, ScoreError, ScorePlayer, SequenceRecorder, SessionState, SharedSession,
};
pub use settings::{SettingsError, UserSettings};
pub use synth::synthesizer::{DEFAULT_SAMPLE_RATE, ToneSynthesizer};
pub use synth::tone::{SynthError, Timbre, ToneRequest};
