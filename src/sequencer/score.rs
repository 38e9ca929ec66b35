// Score text format
//
// One entry per non-blank line: `<note> [<duration-seconds>]`. The note is a
// key into the frequency table or the literal "0" for a rest; a missing
// duration falls back to the caller's default (the piano click). Durations
// are written with four fractional digits. Parsing is atomic: a single bad
// line fails the whole load and nothing is returned.

use std::fs;
use std::path::Path;

/// Note token reserved for silence.
pub const REST_TOKEN: &str = "0";

/// One playable step: a note (or rest) and how long it lasts.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreEntry {
    pub note: String,
    /// Seconds, never negative.
    pub duration: f64,
}

impl ScoreEntry {
    pub fn note(note: impl Into<String>, duration: f64) -> Self {
        Self {
            note: note.into(),
            duration,
        }
    }

    pub fn rest(duration: f64) -> Self {
        Self {
            note: REST_TOKEN.to_string(),
            duration,
        }
    }

    pub fn is_rest(&self) -> bool {
        self.note == REST_TOKEN
    }
}

/// An ordered sequence of entries; the order is the playback order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Score {
    entries: Vec<ScoreEntry>,
}

#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    #[error("malformed score at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[error("score I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Score {
    pub fn from_entries(entries: Vec<ScoreEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all entry durations in seconds.
    pub fn total_duration(&self) -> f64 {
        self.entries.iter().map(|e| e.duration).sum()
    }

    /// Parse score text. Blank lines are ignored; everything else must be a
    /// note token optionally followed by a duration in seconds.
    pub fn parse(text: &str, default_duration: f64) -> Result<Self, ScoreError> {
        let mut entries = Vec::new();

        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            let mut tokens = line.split_whitespace();

            let Some(note) = tokens.next() else {
                continue;
            };

            let duration = match tokens.next() {
                Some(token) => token.parse::<f64>().map_err(|_| ScoreError::Malformed {
                    line: line_no,
                    reason: format!("invalid duration {token:?}"),
                })?,
                None => default_duration,
            };

            if !duration.is_finite() || duration < 0.0 {
                return Err(ScoreError::Malformed {
                    line: line_no,
                    reason: format!("duration out of range: {duration}"),
                });
            }

            entries.push(ScoreEntry::note(note, duration));
        }

        Ok(Self { entries })
    }

    /// Serialize to score text, one entry per line, durations with four
    /// fractional digits. No blank lines are emitted.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for entry in &self.entries {
            text.push_str(&format!("{} {:.4}\n", entry.note, entry.duration));
        }
        text
    }

    /// Read and parse a score file.
    pub fn load<P: AsRef<Path>>(path: P, default_duration: f64) -> Result<Self, ScoreError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text, default_duration)
    }

    /// Write the score to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ScoreError> {
        fs::write(path, self.to_text())?;
        Ok(())
    }
}
