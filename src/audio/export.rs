// Audio Export - Offline rendering of a score to a WAV file
//
// Unlike live playback this renders as fast as possible, writing each entry
// back to back. The error policy matches playback: rests, unknown notes and
// failed renders all become silence of the entry's scaled duration, so the
// exported file keeps the score's timing.

use crate::audio::buffer::AudioBuffer;
use crate::notes::NoteFrequencyTable;
use crate::sequencer::score::Score;
use crate::synth::synthesizer::ToneSynthesizer;
use crate::synth::tone::{Timbre, ToneRequest};
use hound::{WavSpec, WavWriter};
use std::path::Path;

/// How a score should be bounced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportSettings {
    pub timbre: Timbre,
    /// Octave used by octave-aware instruments (1..=3).
    pub octave: u8,
    /// Playback speed multiplier, > 1 speeds up.
    pub tempo_factor: f64,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            timbre: Timbre::Piano,
            octave: 1,
            tempo_factor: 1.0,
        }
    }
}

/// What an export produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportReport {
    /// Entries consumed from the score.
    pub entries: usize,
    /// Entries that produced an audible tone.
    pub rendered: usize,
    /// Total written duration in seconds.
    pub duration_seconds: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("tempo factor must be positive, got {0}")]
    InvalidTempo(f64),
    #[error("WAV write error: {0}")]
    Wav(#[from] hound::Error),
}

/// Bounce a score to a 16-bit stereo WAV file at the synthesizer's rate.
pub fn export_score<P: AsRef<Path>>(
    path: P,
    score: &Score,
    synth: &ToneSynthesizer,
    notes: &NoteFrequencyTable,
    settings: &ExportSettings,
) -> Result<ExportReport, ExportError> {
    if !(settings.tempo_factor > 0.0) {
        return Err(ExportError::InvalidTempo(settings.tempo_factor));
    }

    let sample_rate = synth.sample_rate();
    let spec = WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;

    let octave = if settings.timbre.is_octave_aware() {
        settings.octave
    } else {
        1
    };

    let mut rendered = 0usize;
    let mut written_frames = 0u64;

    for entry in score.entries() {
        let scaled = entry.duration / settings.tempo_factor;

        let buffer: Option<AudioBuffer> = if entry.is_rest() {
            None
        } else {
            notes
                .frequency(&entry.note, octave)
                .ok()
                .and_then(|frequency| {
                    let request = ToneRequest::new(frequency, scaled as f32, settings.timbre);
                    synth.render(&request).ok()
                })
        };

        match buffer {
            Some(buffer) => {
                for value in buffer.to_interleaved_i16() {
                    writer.write_sample(value)?;
                }
                written_frames += buffer.len() as u64;
                rendered += 1;
            }
            None => {
                let frames = (scaled * sample_rate as f64).round() as u64;
                for _ in 0..frames {
                    writer.write_sample(0i16)?;
                    writer.write_sample(0i16)?;
                }
                written_frames += frames;
            }
        }
    }

    writer.finalize()?;

    Ok(ExportReport {
        entries: score.len(),
        rendered,
        duration_seconds: written_frames as f64 / sample_rate as f64,
    })
}
