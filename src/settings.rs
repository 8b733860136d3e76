//! Local preference store
//!
//! Persists small key/value flags between runs: spell unlocks, mastery flags,
//! usage counters, the player's name and display toggles. Values are either
//! ints or strings, keyed by plain names such as `"BasicMastery_Fireball"`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PrefsError;

/// Key/value preferences saved as RON.
#[derive(Resource, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    ints: BTreeMap<String, i32>,
    #[serde(default)]
    strings: BTreeMap<String, String>,
    /// Where `save` writes to (None = in-memory only)
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl Preferences {
    /// In-memory store that is never written to disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load preferences from file, or return an empty store bound to `path`
    /// if the file doesn't exist or can't be parsed.
    pub fn load(path: &Path) -> Self {
        let mut prefs = if path.exists() {
            match fs::read_to_string(path) {
                Ok(contents) => match ron::from_str::<Preferences>(&contents) {
                    Ok(prefs) => {
                        info!("Loaded preferences from {:?}", path);
                        prefs
                    }
                    Err(e) => {
                        warn!("Failed to parse preferences file: {}", e);
                        Self::default()
                    }
                },
                Err(e) => {
                    warn!("Failed to read preferences file: {}", e);
                    Self::default()
                }
            }
        } else {
            info!("No preferences file at {:?}, starting fresh", path);
            Self::default()
        };
        prefs.path = Some(path.to_path_buf());
        prefs
    }

    /// Save preferences to the file they were loaded from.
    /// In-memory stores succeed without writing anything.
    pub fn save(&self) -> Result<(), PrefsError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let contents = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| PrefsError::Serialize(e.to_string()))?;
        fs::write(path, contents).map_err(|e| PrefsError::WriteError {
            path: path.display().to_string(),
            details: e.to_string(),
        })?;
        debug!("Saved preferences to {:?}", path);
        Ok(())
    }

    pub fn get_int(&self, key: &str, default: i32) -> i32 {
        self.ints.get(key).copied().unwrap_or(default)
    }

    pub fn set_int(&mut self, key: impl Into<String>, value: i32) {
        self.ints.insert(key.into(), value);
    }

    pub fn get_string(&self, key: &str, default: &str) -> String {
        self.strings
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    pub fn set_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.strings.insert(key.into(), value.into());
    }

    /// True if either an int or a string is stored under `key`
    pub fn has_key(&self, key: &str) -> bool {
        self.ints.contains_key(key) || self.strings.contains_key(key)
    }

    pub fn delete_key(&mut self, key: &str) {
        self.ints.remove(key);
        self.strings.remove(key);
    }

    /// Read an int flag as a bool (non-zero = set)
    pub fn get_flag(&self, key: &str) -> bool {
        self.get_int(key, 0) != 0
    }

    pub fn set_flag(&mut self, key: impl Into<String>, value: bool) {
        self.set_int(key, i32::from(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_missing_keys() {
        let prefs = Preferences::in_memory();
        assert_eq!(prefs.get_int("InitialSetup", 7), 7);
        assert_eq!(prefs.get_string("Username", "Wizard"), "Wizard");
        assert!(!prefs.has_key("InitialSetup"));
    }

    #[test]
    fn test_delete_removes_both_kinds() {
        let mut prefs = Preferences::in_memory();
        prefs.set_int("Key", 1);
        prefs.set_string("Key", "value");
        prefs.delete_key("Key");
        assert!(!prefs.has_key("Key"));
    }

    #[test]
    fn test_flags() {
        let mut prefs = Preferences::in_memory();
        prefs.set_flag("ShowTimers", true);
        assert!(prefs.get_flag("ShowTimers"));
        prefs.set_flag("ShowTimers", false);
        assert!(!prefs.get_flag("ShowTimers"));
    }

    #[test]
    fn test_in_memory_save_is_noop() {
        let prefs = Preferences::in_memory();
        assert!(prefs.save().is_ok());
    }
}
