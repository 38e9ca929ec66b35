// Persisted user settings
//
// The click durations, default octave count and selected instrument survive
// across runs in a JSON file under the platform config directory. A missing
// file or missing fields fall back to defaults; a corrupt file is reported,
// not silently replaced.

use crate::sequencer::recorder::ClickDurations;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "toneboard";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("no config directory available on this platform")]
    NoConfigDir,
    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings format error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything the user can tweak that outlives the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub clicks: ClickDurations,
    /// Piano octave count, 1 to 3.
    pub octaves: u8,
    /// Selected instrument index.
    pub instrument: usize,
    pub tempo_factor: f64,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            clicks: ClickDurations::default(),
            octaves: 1,
            instrument: 0,
            tempo_factor: 1.0,
        }
    }
}

impl UserSettings {
    /// Location of the settings file, when the platform has a config dir.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
    }

    /// Load from the default location. A missing file yields the defaults.
    pub fn load() -> Result<Self, SettingsError> {
        let path = Self::config_path().ok_or(SettingsError::NoConfigDir)?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path)?;
        let settings: UserSettings = serde_json::from_str(&text)?;
        Ok(settings.normalized())
    }

    /// Save to the default location, creating the directory if needed.
    pub fn save(&self) -> Result<PathBuf, SettingsError> {
        let path = Self::config_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), SettingsError> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Pull out-of-range values back to something usable.
    fn normalized(mut self) -> Self {
        self.octaves = self.octaves.clamp(1, 3);
        if self.instrument > 2 {
            self.instrument = 0;
        }
        if !(self.tempo_factor > 0.0) {
            self.tempo_factor = 1.0;
        }
        self
    }
}
