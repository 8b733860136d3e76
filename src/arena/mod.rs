//! Arena simulation
//!
//! Everything that happens during a run: combatants and their status
//! effects, enemy brains, the player's spell hand, projectiles and waves.
//!
//! Game data (spells, enemies, waves) is loaded from RON by the caller and
//! inserted as resources before `ArenaPlugin` starts ticking.

use bevy::prelude::*;
use std::path::Path;

pub mod components;
pub mod constants;
pub mod enemies;
pub mod enemy_ai;
pub mod enemy_config;
pub mod projectiles;
pub mod resolution;
pub mod spells;
pub mod status;
pub mod systems;
pub mod waves;

use crate::combat::CombatPlugin;
use crate::error::ConfigError;

use enemy_config::{load_enemy_definitions, EnemyDefinitions, ENEMIES_CONFIG_PATH};
use spells::config::SPELLS_CONFIG_PATH;
use spells::{load_spell_definitions, SpellDefinitions};
use waves::{load_wave_definitions, WaveDefinitions, WAVES_CONFIG_PATH};

/// Adds combat events and the arena systems. Systems always run once added.
pub struct ArenaPlugin;

impl Plugin for ArenaPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(CombatPlugin)
            .init_resource::<components::RunStats>();

        systems::configure_arena_system_ordering(app);
        systems::add_core_arena_systems(app, || true);
    }
}

/// All data-driven definitions a run needs.
#[derive(Debug, Clone)]
pub struct GameData {
    pub spells: SpellDefinitions,
    pub enemies: EnemyDefinitions,
    pub waves: WaveDefinitions,
}

impl GameData {
    /// Load spells, enemies and waves from the `assets/config` directory
    /// under `root`.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        Ok(Self {
            spells: load_spell_definitions(&root.join(SPELLS_CONFIG_PATH))?,
            enemies: load_enemy_definitions(&root.join(ENEMIES_CONFIG_PATH))?,
            waves: load_wave_definitions(&root.join(WAVES_CONFIG_PATH))?,
        })
    }
}
