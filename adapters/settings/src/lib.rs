#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Flat settings file shared by every screen of Puzzle Defence.
//!
//! The record is stored as TOML. A missing or unreadable file never surfaces
//! to the player: [`SettingsStore::load`] falls back to defaults and logs why.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

/// Default location of the settings file relative to the working directory.
pub const DEFAULT_SETTINGS_PATH: &str = "settings.toml";

/// Persisted player preferences and progression.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Draws every colour as its RGB complement.
    pub invert_colors: bool,
    /// Number of levels the player may enter.
    pub unlocked_levels: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            invert_colors: false,
            unlocked_levels: 1,
        }
    }
}

impl Settings {
    /// Flips the colour inversion flag.
    pub fn toggle_invert(&mut self) {
        self.invert_colors = !self.invert_colors;
    }

    /// Unlocks the level following `level`; the count never decreases.
    pub fn record_level_complete(&mut self, level: u32) {
        self.unlocked_levels = self.unlocked_levels.max(level.saturating_add(1));
    }

    /// Reports whether the 1-based `level` may be entered.
    #[must_use]
    pub fn is_unlocked(&self, level: u32) -> bool {
        level >= 1 && level <= self.unlocked_levels
    }
}

/// Errors raised while reading or writing the settings file.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The file could not be read or written.
    #[error("settings file {path} is not accessible")]
    Io {
        /// Location of the settings file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The file exists but is not a valid settings record.
    #[error("settings file is malformed")]
    Parse(#[from] toml::de::Error),
    /// The record could not be encoded.
    #[error("settings could not be encoded")]
    Encode(#[from] toml::ser::Error),
}

/// Handle to the settings file on disk.
#[derive(Clone, Debug)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Creates a store backed by the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the settings file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the settings file, propagating any failure.
    pub fn try_load(&self) -> Result<Settings, SettingsError> {
        let contents = fs::read_to_string(&self.path).map_err(|source| SettingsError::Io {
            path: self.path.clone(),
            source,
        })?;
        let mut settings: Settings = toml::from_str(&contents)?;
        // Level one is always playable, whatever the file says.
        settings.unlocked_levels = settings.unlocked_levels.max(1);
        Ok(settings)
    }

    /// Reads the settings file, falling back to defaults on any failure.
    #[must_use]
    pub fn load(&self) -> Settings {
        match self.try_load() {
            Ok(settings) => settings,
            Err(SettingsError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "settings file absent, using defaults");
                Settings::default()
            }
            Err(error) => {
                tracing::warn!(path = %self.path.display(), %error, "settings unreadable, using defaults");
                Settings::default()
            }
        }
    }

    /// Writes the record to disk, replacing the previous contents.
    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let contents = toml::to_string(settings)?;
        fs::write(&self.path, contents).map_err(|source| SettingsError::Io {
            path: self.path.clone(),
            source,
        })
    }

    /// Loads the record, applies `change` and saves the result.
    pub fn update<F>(&self, change: F) -> Result<Settings, SettingsError>
    where
        F: FnOnce(&mut Settings),
    {
        let mut settings = self.load();
        change(&mut settings);
        self.save(&settings)?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_twice_restores_original() {
        let mut settings = Settings::default();
        settings.toggle_invert();
        assert!(settings.invert_colors);
        settings.toggle_invert();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn completing_a_level_never_relocks() {
        let mut settings = Settings {
            invert_colors: false,
            unlocked_levels: 4,
        };
        settings.record_level_complete(1);
        assert_eq!(settings.unlocked_levels, 4);
        settings.record_level_complete(4);
        assert_eq!(settings.unlocked_levels, 5);
    }

    #[test]
    fn level_zero_is_never_unlocked() {
        let settings = Settings::default();
        assert!(!settings.is_unlocked(0));
        assert!(settings.is_unlocked(1));
        assert!(!settings.is_unlocked(2));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let settings: Settings = toml::from_str("invert_colors = true").expect("parse");
        assert!(settings.invert_colors);
        assert_eq!(settings.unlocked_levels, 1);
    }
}
