// Module séquenceur - Capture, encodage et relecture de partitions

pub mod player;
pub mod recorder;
pub mod score;
pub mod transport;

pub use player::{PlayError, PlaybackOutcome, PlaybackSettings, ScorePlayer};
pub use recorder::{ClickDurations, RecordedEvent, SequenceRecorder};
pub use score::{REST_TOKEN, Score, ScoreEntry, ScoreError};
pub use transport::{AlreadyActive, SessionState, SharedSession};
