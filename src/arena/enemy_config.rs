//! Data-Driven Enemy Configuration
//!
//! Per-archetype stats live in `assets/config/enemies.ron`. Boss archetypes
//! additionally carry an ability table, an optional enrage rule and an
//! optional stage transition.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::ConfigError;

use super::components::EnemyKind;
use super::enemy_ai::boss::BossAbility;

/// Default location of the enemy definitions file
pub const ENEMIES_CONFIG_PATH: &str = "assets/config/enemies.ron";

fn default_projectile_speed() -> f32 {
    9.0
}

/// Stats for one enemy archetype.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnemyDefinition {
    pub max_health: f32,
    pub move_speed: f32,
    /// Damage of one ranged attack
    #[serde(default)]
    pub attack_damage: f32,
    /// Damage of one body hit
    #[serde(default)]
    pub contact_damage: f32,
    #[serde(default = "default_projectile_speed")]
    pub projectile_speed: f32,
    /// Engagement band: stay at least this far from the player
    #[serde(default)]
    pub closest_radius: f32,
    /// Engagement band: approach until this close
    #[serde(default)]
    pub furthest_radius: f32,
    #[serde(default)]
    pub fire_immune: bool,
    #[serde(default)]
    pub freeze_immune: bool,
    #[serde(default)]
    pub boss: Option<BossDefinition>,
}

/// One row of a boss ability table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AbilityEntry {
    pub ability: BossAbility,
    pub cooldown: f32,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct EnrageDefinition {
    /// Health fraction at or below which the boss enrages
    pub threshold: f32,
    /// Multiplier on every ability cooldown once enraged
    pub cooldown_scale: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransitionDefinition {
    /// Health fraction at or below which the transition starts
    pub threshold: f32,
    /// Seconds the boss channels before being replaced
    pub duration: f32,
    pub spawns: Vec<EnemyKind>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BossDefinition {
    pub abilities: Vec<AbilityEntry>,
    #[serde(default)]
    pub enrage: Option<EnrageDefinition>,
    #[serde(default)]
    pub transition: Option<TransitionDefinition>,
    #[serde(default)]
    pub teleports: bool,
}

/// Root structure for the enemies.ron file
#[derive(Debug, Serialize, Deserialize)]
pub struct EnemiesConfig {
    pub enemies: HashMap<EnemyKind, EnemyDefinition>,
}

/// Resource containing every enemy definition.
#[derive(Resource, Debug, Clone)]
pub struct EnemyDefinitions {
    enemies: HashMap<EnemyKind, EnemyDefinition>,
}

impl EnemyDefinitions {
    pub fn new(config: EnemiesConfig) -> Result<Self, ConfigError> {
        let definitions = Self {
            enemies: config.enemies,
        };
        definitions.validate()?;
        Ok(definitions)
    }

    pub fn from_ron_str(contents: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: EnemiesConfig = ron::from_str(contents).map_err(|e| ConfigError::ParseError {
            path: origin.to_string(),
            details: e.to_string(),
        })?;
        Self::new(config)
    }

    pub fn get(&self, kind: EnemyKind) -> Option<&EnemyDefinition> {
        self.enemies.get(&kind)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for kind in EnemyKind::all() {
            let Some(def) = self.enemies.get(kind) else {
                return Err(ConfigError::Invalid(format!(
                    "missing definition for enemy '{}'",
                    kind.name()
                )));
            };
            if def.max_health <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "enemy '{}' must have positive max_health",
                    kind.name()
                )));
            }
            if def.closest_radius > def.furthest_radius {
                return Err(ConfigError::Invalid(format!(
                    "enemy '{}' has closest_radius beyond furthest_radius",
                    kind.name()
                )));
            }
            if let Some(boss) = &def.boss {
                if boss.abilities.iter().any(|entry| entry.cooldown <= 0.0) {
                    return Err(ConfigError::Invalid(format!(
                        "enemy '{}' has an ability with a non-positive cooldown",
                        kind.name()
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Load enemy definitions from a RON file
pub fn load_enemy_definitions(path: &Path) -> Result<EnemyDefinitions, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        details: e.to_string(),
    })?;
    let definitions = EnemyDefinitions::from_ron_str(&contents, &path.display().to_string())?;
    info!("Loaded {} enemy definitions from {}", definitions.enemies.len(), path.display());
    Ok(definitions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_kind_rejected() {
        let err = EnemyDefinitions::from_ron_str(
            "(enemies: { Bee: (max_health: 10.0, move_speed: 3.0) })",
            "inline",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
