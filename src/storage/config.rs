//! User settings loaded from `settings.json`.
//!
//! Loading never fails: a missing file, malformed JSON or an invalid value
//! falls back to the built-in default for the affected field and logs a
//! warning.

use crate::exercises::types::RepRange;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// File name of the settings file inside the config directory.
pub const SETTINGS_FILE: &str = "settings.json";

/// File name of the database inside the data directory.
pub const DATABASE_FILE: &str = "heraclis.db";

/// Keys accepted by [`Settings::set`].
pub const SETTING_KEYS: &[&str] = &[
    "default_workout_size",
    "default_rep_range",
    "timer_sound_path",
    "database_path",
];

/// Application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Number of exercises in a randomized workout
    pub default_workout_size: usize,
    /// Target range for exercises without their own rep range
    pub default_rep_range: RepRange,
    /// Sound played by the workout timer
    pub timer_sound_path: Option<PathBuf>,
    /// Database location; the platform data directory when unset
    pub database_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_workout_size: 4,
            default_rep_range: RepRange::default(),
            timer_sound_path: None,
            database_path: None,
        }
    }
}

impl Settings {
    /// Build settings from JSON text, keeping every valid field and falling
    /// back to the default for the rest.
    pub fn from_json(content: &str) -> Self {
        let defaults = Self::default();

        let value: Value = match serde_json::from_str(content) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Malformed settings file, using defaults: {}", e);
                return defaults;
            }
        };

        let Value::Object(map) = value else {
            tracing::warn!("Settings file is not a JSON object, using defaults");
            return defaults;
        };

        Self {
            default_workout_size: field(&map, "default_workout_size", defaults.default_workout_size)
                .filter(|size| *size >= 1)
                .unwrap_or_else(|| {
                    warn_invalid("default_workout_size");
                    defaults.default_workout_size
                }),
            default_rep_range: field(&map, "default_rep_range", defaults.default_rep_range)
                .filter(RepRange::is_valid)
                .unwrap_or_else(|| {
                    warn_invalid("default_rep_range");
                    defaults.default_rep_range
                }),
            timer_sound_path: field(&map, "timer_sound_path", defaults.timer_sound_path.clone())
                .unwrap_or_else(|| {
                    warn_invalid("timer_sound_path");
                    None
                }),
            database_path: field(&map, "database_path", defaults.database_path.clone())
                .unwrap_or_else(|| {
                    warn_invalid("database_path");
                    None
                }),
        }
    }

    /// Where the database lives.
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| get_data_dir().join(DATABASE_FILE))
    }

    /// Update one setting from its textual form.
    ///
    /// An empty value clears the optional path settings.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        let value = value.trim();
        match key {
            "default_workout_size" => {
                let size: usize = value.parse().map_err(|_| SettingsError::InvalidValue {
                    key: key.to_string(),
                    reason: format!("'{}' is not a whole number", value),
                })?;
                if size == 0 {
                    return Err(SettingsError::InvalidValue {
                        key: key.to_string(),
                        reason: "workout size must be at least 1".to_string(),
                    });
                }
                self.default_workout_size = size;
            }
            "default_rep_range" => {
                self.default_rep_range =
                    parse_rep_range(value).map_err(|reason| SettingsError::InvalidValue {
                        key: key.to_string(),
                        reason,
                    })?;
            }
            "timer_sound_path" => self.timer_sound_path = optional_path(value),
            "database_path" => self.database_path = optional_path(value),
            _ => return Err(SettingsError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

/// Parse "MIN-MAX" into a rep range.
pub fn parse_rep_range(value: &str) -> Result<RepRange, String> {
    let (min, max) = value
        .split_once('-')
        .ok_or_else(|| format!("'{}' is not of the form MIN-MAX", value))?;

    let min: u32 = min
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a whole number", min.trim()))?;
    let max: u32 = max
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a whole number", max.trim()))?;

    RepRange::new(min, max).map_err(str::to_string)
}

fn optional_path(value: &str) -> Option<PathBuf> {
    if value.is_empty() {
        None
    } else {
        Some(PathBuf::from(value))
    }
}

/// Read one field; `Some(default)` when absent, `None` when present but invalid.
fn field<T>(map: &serde_json::Map<String, Value>, key: &str, default: T) -> Option<T>
where
    T: for<'de> Deserialize<'de>,
{
    match map.get(key) {
        None => Some(default),
        Some(value) => serde_json::from_value(value.clone()).ok(),
    }
}

fn warn_invalid(key: &str) {
    tracing::warn!(key, "Invalid value in settings file, using default");
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "heraclis", "heraclis")
}

/// Get the application data directory.
pub fn get_data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the application config directory.
pub fn get_config_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the settings file path.
pub fn get_settings_path() -> PathBuf {
    get_config_dir().join(SETTINGS_FILE)
}

/// Load settings from `path`, falling back to defaults.
pub fn load_settings(path: &Path) -> Settings {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No settings file, using defaults");
        return Settings::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => Settings::from_json(&content),
        Err(e) => {
            tracing::warn!(path = %path.display(), "Could not read settings file: {}", e);
            Settings::default()
        }
    }
}

/// Save settings to `path` as pretty-printed JSON.
pub fn save_settings(path: &Path, settings: &Settings) -> Result<(), SettingsError> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SettingsError::IoError(e.to_string()))?;
        }
    }

    let content = serde_json::to_string_pretty(settings)
        .map_err(|e| SettingsError::SerializeError(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| SettingsError::IoError(e.to_string()))?;

    tracing::info!(path = %path.display(), "Saved settings");
    Ok(())
}

/// Settings errors.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Unknown setting '{0}'")]
    UnknownKey(String),

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}
