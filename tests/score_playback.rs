//! End-to-end scenarios: record, encode, persist, reload and play back.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use toneboard::audio::sink::NullSink;
use toneboard::{
    ClickDurations, NoteFrequencyTable, PlaybackOutcome, PlaybackSettings, Score, ScorePlayer,
    SequenceRecorder, SharedSession, Timbre, ToneRequest, ToneSynthesizer,
};

fn make_player(session: Arc<SharedSession>) -> ScorePlayer {
    ScorePlayer::new(
        session,
        ToneSynthesizer::default(),
        Arc::new(NoteFrequencyTable::standard()),
        Box::new(NullSink::new()),
    )
}

#[test]
fn test_recording_encodes_gaps_as_rests() {
    let mut recorder = SequenceRecorder::new(SharedSession::new(), ClickDurations::default());
    recorder.start().unwrap();
    recorder.capture_event("Do", Timbre::Piano, 0.0);
    recorder.capture_event("Mi", Timbre::Piano, 0.8);
    let score = recorder.stop();

    let durations: Vec<(String, f64)> = score
        .entries()
        .iter()
        .map(|e| (e.note.clone(), e.duration))
        .collect();
    assert_eq!(durations.len(), 3);
    assert_eq!(durations[0].0, "Do");
    assert_eq!(durations[0].1, 0.5);
    assert_eq!(durations[1].0, "0");
    assert!((durations[1].1 - 0.3).abs() < 1e-9);
    assert_eq!(durations[2].0, "Mi");
    assert_eq!(durations[2].1, 0.5);
}

#[test]
fn test_record_save_load_play_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("take.txt");

    // Record a short phrase (timestamps come from the capture boundary, so
    // the test owns the clock).
    let mut recorder = SequenceRecorder::new(SharedSession::new(), ClickDurations::default());
    recorder.start().unwrap();
    recorder.capture_event("Do", Timbre::Piano, 0.00);
    recorder.capture_event("Mi", Timbre::Piano, 0.80);
    recorder.capture_event("Sol", Timbre::Piano, 1.30);
    let recorded = recorder.stop();
    let span = recorded.total_duration();

    // Flush to disk and reload.
    recorded.save(&path).unwrap();
    let loaded = Score::load(&path, 0.5).unwrap();
    assert!((loaded.total_duration() - span).abs() < 1e-3);

    // Scale everything down so playback is fast, then perform it.
    let fast = Score::from_entries(
        loaded
            .entries()
            .iter()
            .map(|e| toneboard::ScoreEntry::note(e.note.clone(), e.duration / 100.0))
            .collect(),
    );

    let mut player = make_player(SharedSession::new());
    let mut rendered = 0;
    let outcome = player
        .play(&fast, &PlaybackSettings::default(), |_, _, buf| {
            if buf.is_some() {
                rendered += 1;
            }
        })
        .unwrap();

    assert_eq!(outcome, PlaybackOutcome::Completed);
    assert_eq!(rendered, 3);
}

#[test]
fn test_parsed_score_triggers_expected_renders() {
    // "Do 0.5\n0 0.2\nMi 0.5\n" scaled down by 50x to keep the test quick:
    // 3 entries, exactly 2 audible renders, and the rest still takes time.
    let score = Score::parse("Do 0.01\n0 0.004\nMi 0.01\n", 0.5).unwrap();

    let mut player = make_player(SharedSession::new());
    let mut seen = Vec::new();
    let start = Instant::now();
    player
        .play(&score, &PlaybackSettings::default(), |index, entry, buf| {
            seen.push((index, entry.is_rest(), buf.is_some()));
        })
        .unwrap();
    let elapsed = start.elapsed();

    assert_eq!(seen, vec![(0, false, true), (1, true, false), (2, false, true)]);
    // Total playing time covers notes and the rest alike.
    assert!(elapsed >= Duration::from_millis(20), "elapsed {elapsed:?}");
}

#[test]
fn test_tempo_factor_scales_wall_clock() {
    let score = Score::parse("Do 0.1\nMi 0.1\n", 0.5).unwrap();
    let mut player = make_player(SharedSession::new());

    let start = Instant::now();
    player
        .play(&score, &PlaybackSettings::default(), |_, _, _| {})
        .unwrap();
    let normal = start.elapsed();

    let start = Instant::now();
    player
        .play(
            &score,
            &PlaybackSettings {
                tempo_factor: 2.0,
                ..Default::default()
            },
            |_, _, _| {},
        )
        .unwrap();
    let fast = start.elapsed();

    assert!(normal >= Duration::from_millis(190));
    assert!(fast >= Duration::from_millis(95));
    assert!(fast < normal);
}

#[test]
fn test_piano_render_sample_count_and_attack() {
    let synth = ToneSynthesizer::default();
    let buffer = synth
        .render(&ToneRequest::new(440.0, 0.5, Timbre::Piano))
        .unwrap();
    assert_eq!(buffer.len(), 22050);
    assert_eq!(buffer.samples()[0], 0.0);
}

#[test]
fn test_octave_selection_only_affects_piano() {
    let table = NoteFrequencyTable::standard();
    // The piano follows the configured octave.
    assert_eq!(table.frequency("La", 3).unwrap(), 1760.0);
    // Playback for the other instruments resolves at the base octave; the
    // player encodes that by passing octave 1 for non-octave-aware timbres.
    assert!(!Timbre::Xylophone.is_octave_aware());
    assert!(!Timbre::VideoGame.is_octave_aware());
    assert!(Timbre::Piano.is_octave_aware());
}

#[test]
fn test_stop_during_rest_interrupts_promptly() {
    let score = Score::parse("0 30\n", 0.5).unwrap();

    let mut player = make_player(SharedSession::new());
    let session = player.session();
    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(40));
        session.request_stop();
    });

    let start = Instant::now();
    let outcome = player
        .play(&score, &PlaybackSettings::default(), |_, _, _| {})
        .unwrap();
    stopper.join().unwrap();

    assert_eq!(outcome, PlaybackOutcome::Stopped);
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[test]
fn test_recording_blocks_playback_and_vice_versa() {
    let session = SharedSession::new();
    let mut recorder = SequenceRecorder::new(Arc::clone(&session), ClickDurations::default());
    let mut player = make_player(Arc::clone(&session));

    recorder.start().unwrap();
    let score = Score::parse("Do 0.01\n", 0.5).unwrap();
    assert!(
        player
            .play(&score, &PlaybackSettings::default(), |_, _, _| {})
            .is_err()
    );

    recorder.stop();
    assert!(
        player
            .play(&score, &PlaybackSettings::default(), |_, _, _| {})
            .is_ok()
    );
    // After playback the session is idle again and recording may resume.
    assert!(recorder.start().is_ok());
    recorder.discard();
}

#[test]
fn test_stop_twice_from_idle_everywhere() {
    let session = SharedSession::new();
    let mut recorder = SequenceRecorder::new(Arc::clone(&session), ClickDurations::default());
    let player = make_player(Arc::clone(&session));

    assert!(recorder.stop().is_empty());
    assert!(recorder.stop().is_empty());
    player.stop();
    player.stop();
    assert!(session.state().is_idle());
}
