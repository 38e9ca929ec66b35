// Sequence recorder - captures live note triggers and flushes them to a score
//
// Instrument panels push (note, timestamp) into the recorder while it is
// armed. On stop the event log is delta-encoded: the silence since the
// previous note, minus the click's own audible length, becomes a rest entry.
// Gaps shorter than one click carry no rest; those notes sit back to back.

use crate::sequencer::score::{Score, ScoreEntry};
use crate::sequencer::transport::{AlreadyActive, SessionState, SharedSession};
use crate::synth::tone::Timbre;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Canonical audible length of one key press, per instrument. Used both as
/// the default note length and as the quantum subtracted from recorded gaps.
/// Configured once at startup and immutable for the session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClickDurations {
    pub piano: f64,
    pub xylophone: f64,
    pub video_game: f64,
}

impl ClickDurations {
    pub fn for_timbre(&self, timbre: Timbre) -> f64 {
        match timbre {
            Timbre::Piano => self.piano,
            Timbre::Xylophone => self.xylophone,
            Timbre::VideoGame => self.video_game,
        }
    }
}

impl Default for ClickDurations {
    fn default() -> Self {
        Self {
            piano: 0.5,
            xylophone: 0.5,
            video_game: 0.1,
        }
    }
}

/// One captured note trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    pub note: String,
    /// Seconds on the caller's clock; non-decreasing within a session.
    pub timestamp: f64,
    pub timbre: Timbre,
}

/// Captures a live stream of note triggers into a replayable score.
pub struct SequenceRecorder {
    session: Arc<SharedSession>,
    clicks: ClickDurations,
    events: Vec<RecordedEvent>,
}

impl SequenceRecorder {
    pub fn new(session: Arc<SharedSession>, clicks: ClickDurations) -> Self {
        Self {
            session,
            clicks,
            events: Vec::new(),
        }
    }

    pub fn clicks(&self) -> ClickDurations {
        self.clicks
    }

    pub fn is_recording(&self) -> bool {
        self.session.state() == SessionState::Recording
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Arm the recorder. Clears any previous log. Fails when the session is
    /// already recording or playing.
    pub fn start(&mut self) -> Result<(), AlreadyActive> {
        self.session.try_begin(SessionState::Recording)?;
        self.events.clear();
        Ok(())
    }

    /// Append a note trigger. A silent no-op when the recorder is not
    /// armed; instrument panels stay wired up after a stop and may still
    /// fire.
    pub fn capture_event(&mut self, note: &str, timbre: Timbre, timestamp: f64) {
        if !self.is_recording() {
            return;
        }
        self.events.push(RecordedEvent {
            note: note.to_string(),
            timestamp,
            timbre,
        });
    }

    /// Disarm and flush the log to a score.
    ///
    /// A no-op returning an empty score when the recorder was not armed.
    pub fn stop(&mut self) -> Score {
        if !self.is_recording() {
            return Score::default();
        }

        let score = encode(&self.events, &self.clicks);
        self.events.clear();
        self.session.finish();
        score
    }

    /// Disarm and throw the log away.
    pub fn discard(&mut self) {
        if !self.is_recording() {
            return;
        }
        self.events.clear();
        self.session.finish();
    }
}

/// Delta-encode captured events into score entries.
///
/// Each event contributes a note entry of one click length; when the gap
/// since the previous event exceeds the click, the excess is emitted first
/// as a rest. Gaps of at most one click produce back-to-back notes.
fn encode(events: &[RecordedEvent], clicks: &ClickDurations) -> Score {
    let mut entries = Vec::new();
    let Some(first) = events.first() else {
        return Score::default();
    };

    let mut prev = first.timestamp;
    for event in events {
        let delta = event.timestamp - prev;
        let click = clicks.for_timbre(event.timbre);
        if delta > click {
            entries.push(ScoreEntry::rest(delta - click));
        }
        entries.push(ScoreEntry::note(event.note.clone(), click));
        prev = event.timestamp;
    }

    Score::from_entries(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::score::REST_TOKEN;

    fn recorder() -> SequenceRecorder {
        SequenceRecorder::new(SharedSession::new(), ClickDurations::default())
    }

    #[test]
    fn test_gap_longer_than_click_becomes_a_rest() {
        let mut rec = recorder();
        rec.start().unwrap();
        rec.capture_event("Do", Timbre::Piano, 0.0);
        rec.capture_event("Mi", Timbre::Piano, 0.8);
        let score = rec.stop();

        let entries = score.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], ScoreEntry::note("Do", 0.5));
        assert_eq!(entries[1].note, REST_TOKEN);
        assert!((entries[1].duration - 0.3).abs() < 1e-9);
        assert_eq!(entries[2], ScoreEntry::note("Mi", 0.5));
    }

    #[test]
    fn test_gap_within_click_is_dropped() {
        let mut rec = recorder();
        rec.start().unwrap();
        rec.capture_event("Do", Timbre::Piano, 0.0);
        rec.capture_event("Mi", Timbre::Piano, 0.4);
        let score = rec.stop();

        // No rest: the two notes sit back to back.
        assert_eq!(score.len(), 2);
        assert!(score.entries().iter().all(|e| !e.is_rest()));
    }

    #[test]
    fn test_click_follows_each_events_instrument() {
        let mut rec = recorder();
        rec.start().unwrap();
        rec.capture_event("Do", Timbre::Piano, 0.0);
        rec.capture_event("C7", Timbre::VideoGame, 1.0);
        let score = rec.stop();

        let entries = score.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].duration, 0.5);
        // Video-game click is 0.1, so the 1.0s gap leaves a 0.9s rest.
        assert!((entries[1].duration - 0.9).abs() < 1e-9);
        assert_eq!(entries[2].duration, 0.1);
    }

    #[test]
    fn test_capture_outside_recording_is_a_noop() {
        let mut rec = recorder();
        rec.capture_event("Do", Timbre::Piano, 0.0);
        assert_eq!(rec.event_count(), 0);
        assert!(rec.stop().is_empty());
    }

    #[test]
    fn test_stop_twice_is_a_noop() {
        let mut rec = recorder();
        rec.start().unwrap();
        rec.capture_event("Do", Timbre::Piano, 0.0);
        let first = rec.stop();
        assert_eq!(first.len(), 1);

        let second = rec.stop();
        assert!(second.is_empty());
        assert!(!rec.is_recording());
    }

    #[test]
    fn test_start_clears_previous_log() {
        let mut rec = recorder();
        rec.start().unwrap();
        rec.capture_event("Do", Timbre::Piano, 0.0);
        rec.discard();

        rec.start().unwrap();
        assert_eq!(rec.event_count(), 0);
        rec.capture_event("Sol", Timbre::Piano, 0.0);
        let score = rec.stop();
        assert_eq!(score.entries()[0].note, "Sol");
    }

    #[test]
    fn test_double_start_is_a_conflict() {
        let mut rec = recorder();
        rec.start().unwrap();
        let err = rec.start().unwrap_err();
        assert_eq!(err, AlreadyActive(SessionState::Recording));
        // The original log is untouched by the failed start.
        rec.capture_event("Do", Timbre::Piano, 0.0);
        assert_eq!(rec.event_count(), 1);
    }

    #[test]
    fn test_empty_recording_flushes_to_empty_score() {
        let mut rec = recorder();
        rec.start().unwrap();
        assert!(rec.stop().is_empty());
    }

    #[test]
    fn test_roundtrip_preserves_total_span() {
        let mut rec = recorder();
        rec.start().unwrap();
        rec.capture_event("Do", Timbre::Piano, 0.0);
        rec.capture_event("Mi", Timbre::Piano, 0.8);
        rec.capture_event("Sol", Timbre::Piano, 2.0);
        let score = rec.stop();

        // Span from first trigger to the end of the last click.
        let expected = 2.0 + 0.5;
        assert!((score.total_duration() - expected).abs() < 1e-3);

        let reparsed = Score::parse(&score.to_text(), 0.5).unwrap();
        assert!((reparsed.total_duration() - expected).abs() < 1e-3);
    }
}
