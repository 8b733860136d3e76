//! JSON configuration parsing for headless mode
//!
//! Describes one run: where to start, how long to play, the player's stats
//! and which spells are available.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::arena::spells::CardDrawMode;
use crate::error::ConfigError;

/// Largest hand the autopilot will manage
pub const MAX_HAND_SIZE: usize = 8;

/// Player stats for a headless run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub max_health: f32,
    pub max_mana: f32,
    /// Base mana per second before wisdom scaling
    pub mana_regen: f32,
    pub strength: f32,
    pub wisdom: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            max_mana: 100.0,
            mana_regen: 5.0,
            strength: 0.0,
            wisdom: 0.0,
        }
    }
}

/// Headless run configuration loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadlessRunConfig {
    /// 0-based wave to start at (past the authored waves = survival)
    #[serde(default)]
    pub start_wave: usize,
    /// Stop after clearing this many waves
    #[serde(default)]
    pub max_waves: Option<u32>,
    /// Maximum run duration in seconds (default: 300)
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: f32,
    /// Random seed for deterministic run reproduction
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Custom output path for the combat log (optional)
    #[serde(default)]
    pub output_path: Option<String>,
    /// Simulation steps per second (default: 60)
    #[serde(default = "default_tick_rate")]
    pub tick_rate: u32,
    #[serde(default)]
    pub player: PlayerConfig,
    /// Spells unlocked on top of the defaults, by name
    #[serde(default)]
    pub unlocked_spells: Vec<String>,
    #[serde(default = "default_hand_size")]
    pub hand_size: usize,
    #[serde(default)]
    pub draw_mode: CardDrawMode,
    /// Preference file holding spell progress (in-memory if absent)
    #[serde(default)]
    pub prefs_path: Option<PathBuf>,
    /// Directory containing `assets/config`
    #[serde(default = "default_assets_root")]
    pub assets_root: PathBuf,
}

fn default_max_duration() -> f32 {
    300.0
}

fn default_tick_rate() -> u32 {
    60
}

fn default_hand_size() -> usize {
    4
}

fn default_assets_root() -> PathBuf {
    PathBuf::from(".")
}

impl Default for HeadlessRunConfig {
    fn default() -> Self {
        Self {
            start_wave: 0,
            max_waves: None,
            max_duration_secs: default_max_duration(),
            random_seed: None,
            output_path: None,
            tick_rate: default_tick_rate(),
            player: PlayerConfig::default(),
            unlocked_spells: Vec::new(),
            hand_size: default_hand_size(),
            draw_mode: CardDrawMode::default(),
            prefs_path: None,
            assets_root: default_assets_root(),
        }
    }
}

impl HeadlessRunConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            details: e.to_string(),
        })?;
        Self::from_json_str(&contents, &path.display().to_string())
    }

    /// Parse and validate JSON text; `origin` names the source in errors.
    pub fn from_json_str(contents: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: HeadlessRunConfig =
            serde_json::from_str(contents).map_err(|e| ConfigError::ParseError {
                path: origin.to_string(),
                details: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_duration_secs <= 0.0 {
            return Err(ConfigError::Invalid(
                "max_duration_secs must be positive".to_string(),
            ));
        }
        if self.tick_rate == 0 {
            return Err(ConfigError::Invalid("tick_rate must be positive".to_string()));
        }
        if self.hand_size == 0 || self.hand_size > MAX_HAND_SIZE {
            return Err(ConfigError::Invalid(format!(
                "hand_size must be 1-{}",
                MAX_HAND_SIZE
            )));
        }
        if self.player.max_health <= 0.0 {
            return Err(ConfigError::Invalid(
                "player max_health must be positive".to_string(),
            ));
        }
        if self.player.max_mana < 0.0 || self.player.mana_regen < 0.0 {
            return Err(ConfigError::Invalid(
                "player mana stats must not be negative".to_string(),
            ));
        }
        if self.player.strength < 0.0 || self.player.wisdom < 0.0 {
            return Err(ConfigError::Invalid(
                "player strength and wisdom must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timestep(&self) -> f32 {
        1.0 / self.tick_rate as f32
    }
}
