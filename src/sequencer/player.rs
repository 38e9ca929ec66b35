// Score playback - drives the synthesizer through a score, entry by entry
//
// The player owns the playback cursor: entries run strictly in order, each
// scaled by the tempo factor, and the full scaled duration elapses before
// the cursor advances whether or not a tone was rendered (rests are real
// time). The inter-entry wait is the only suspension point and is cancelled
// promptly by a stop request on the shared session.
//
// Tone submission is fire-and-forget: the sink call returns immediately and
// the wait provides the pacing, so sequence tones never overlap.

use crate::audio::buffer::AudioBuffer;
use crate::audio::sink::AudioSink;
use crate::notes::NoteFrequencyTable;
use crate::sequencer::score::{Score, ScoreEntry};
use crate::sequencer::transport::{AlreadyActive, SessionState, SharedSession};
use crate::synth::synthesizer::ToneSynthesizer;
use crate::synth::tone::{Timbre, ToneRequest};
use std::sync::Arc;
use std::time::Duration;

/// How a score should be performed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSettings {
    pub timbre: Timbre,
    /// Speed multiplier applied to every entry; > 1 speeds up. Must be > 0.
    pub tempo_factor: f64,
    /// Octave used by octave-aware instruments (1..=3).
    pub octave: u8,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            timbre: Timbre::Piano,
            tempo_factor: 1.0,
            octave: 1,
        }
    }
}

/// Whether playback ran to the end or was interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    Completed,
    Stopped,
}

#[derive(Debug, thiserror::Error)]
pub enum PlayError {
    #[error(transparent)]
    Busy(#[from] AlreadyActive),
    #[error("tempo factor must be positive, got {0}")]
    InvalidTempo(f64),
}

/// Plays parsed scores through the synthesizer and an audio sink.
pub struct ScorePlayer {
    session: Arc<SharedSession>,
    synth: ToneSynthesizer,
    notes: Arc<NoteFrequencyTable>,
    sink: Box<dyn AudioSink>,
}

impl ScorePlayer {
    pub fn new(
        session: Arc<SharedSession>,
        synth: ToneSynthesizer,
        notes: Arc<NoteFrequencyTable>,
        sink: Box<dyn AudioSink>,
    ) -> Self {
        Self {
            session,
            synth,
            notes,
            sink,
        }
    }

    /// Clone of the shared session, for stopping playback from another
    /// thread while `play` blocks this one.
    pub fn session(&self) -> Arc<SharedSession> {
        Arc::clone(&self.session)
    }

    pub fn is_playing(&self) -> bool {
        self.session.state() == SessionState::Playing
    }

    /// Ask an in-progress `play` to stop before its next entry. Idempotent
    /// and safe to call when nothing is playing.
    pub fn stop(&self) {
        self.session.request_stop();
    }

    /// Perform the score, blocking until the end or until a stop request.
    ///
    /// `on_entry` fires once per entry as its playback begins, with the
    /// rendered buffer for audible notes and `None` for rests, unknown
    /// notes and failed renders. Those entries still occupy their full
    /// scaled duration as silence; a bad note never aborts the sequence.
    pub fn play<F>(
        &mut self,
        score: &Score,
        settings: &PlaybackSettings,
        mut on_entry: F,
    ) -> Result<PlaybackOutcome, PlayError>
    where
        F: FnMut(usize, &ScoreEntry, Option<&AudioBuffer>),
    {
        if !(settings.tempo_factor > 0.0) {
            return Err(PlayError::InvalidTempo(settings.tempo_factor));
        }
        self.session.try_begin(SessionState::Playing)?;

        let octave = if settings.timbre.is_octave_aware() {
            settings.octave
        } else {
            1
        };

        for (index, entry) in score.entries().iter().enumerate() {
            let scaled = entry.duration / settings.tempo_factor;

            let mut rendered: Option<AudioBuffer> = None;
            if !entry.is_rest() {
                if let Ok(frequency) = self.notes.frequency(&entry.note, octave) {
                    let request = ToneRequest::new(frequency, scaled as f32, settings.timbre);
                    if let Ok(buffer) = self.synth.render(&request) {
                        self.sink.submit(&buffer.to_interleaved_i16());
                        rendered = Some(buffer);
                    }
                }
            }

            on_entry(index, entry, rendered.as_ref());

            if self
                .session
                .wait_or_stop(Duration::from_secs_f64(scaled.max(0.0)))
            {
                self.session.finish();
                return Ok(PlaybackOutcome::Stopped);
            }
        }

        self.session.finish();
        Ok(PlaybackOutcome::Completed)
    }
}
