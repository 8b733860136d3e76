//! Data-Driven Spell Configuration
//!
//! Spells are defined in `assets/config/spells.ron` instead of code. Each
//! spell carries three tiers (basic, flawless, masterful) with their own
//! mana cost, cooldown and effect.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::arena::status::StatusPayload;
use crate::error::ConfigError;

use super::mastery::MasteryTier;

/// Default location of the spell definitions file
pub const SPELLS_CONFIG_PATH: &str = "assets/config/spells.ron";

fn default_count() -> u32 {
    1
}

/// What a spell does when cast.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SpellEffect {
    /// Fan of projectiles towards the aim point
    Projectile {
        damage: f32,
        speed: f32,
        #[serde(default = "default_count")]
        count: u32,
        #[serde(default)]
        spread_deg: f32,
        #[serde(default)]
        is_fire: bool,
        #[serde(default)]
        on_hit: Option<StatusPayload>,
    },
    /// Instant damage to every enemy within `radius` of the caster
    Nova {
        damage: f32,
        radius: f32,
        #[serde(default)]
        is_fire: bool,
        #[serde(default)]
        on_hit: Option<StatusPayload>,
    },
    /// Restore the caster's health
    Heal { amount: f32 },
    /// Restore the caster's mana
    RestoreMana { amount: f32 },
    /// Apply a status effect to the caster
    SelfStatus(StatusPayload),
}

impl SpellEffect {
    /// True if the effect needs an enemy to be useful
    pub fn is_offensive(&self) -> bool {
        matches!(self, SpellEffect::Projectile { .. } | SpellEffect::Nova { .. })
    }
}

/// Per-tier numbers for one spell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpellTier {
    #[serde(default)]
    pub mana_cost: f32,
    #[serde(default)]
    pub cooldown: f32,
    pub effect: SpellEffect,
}

/// A spell definition loaded from RON.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpellDefinition {
    pub name: String,
    /// Copies of this spell in the deck
    pub amount_in_deck: u32,
    #[serde(default)]
    pub unlocked_by_default: bool,
    /// Casts needed to reach Flawless
    pub flawless_requirement: u32,
    /// Casts past Flawless needed to reach Masterful
    pub masterful_requirement: u32,
    pub basic: SpellTier,
    pub flawless: SpellTier,
    pub masterful: SpellTier,
}

impl SpellDefinition {
    pub fn tier(&self, tier: MasteryTier) -> &SpellTier {
        match tier {
            MasteryTier::Basic => &self.basic,
            MasteryTier::Flawless => &self.flawless,
            MasteryTier::Masterful => &self.masterful,
        }
    }

    pub fn tier_for_usage(&self, usage: u32) -> MasteryTier {
        MasteryTier::for_usage(usage, self.flawless_requirement, self.masterful_requirement)
    }
}

/// Root structure for the spells.ron file
#[derive(Debug, Serialize, Deserialize)]
pub struct SpellsConfig {
    pub spells: Vec<SpellDefinition>,
}

/// Resource containing all spell definitions, indexed by position.
///
/// Card slots and decks refer to spells by this index.
#[derive(Resource, Debug, Clone)]
pub struct SpellDefinitions {
    spells: Vec<SpellDefinition>,
}

impl SpellDefinitions {
    pub fn new(config: SpellsConfig) -> Result<Self, ConfigError> {
        let definitions = Self {
            spells: config.spells,
        };
        definitions.validate()?;
        Ok(definitions)
    }

    /// Parse from RON text; `origin` names the source in errors.
    pub fn from_ron_str(contents: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: SpellsConfig = ron::from_str(contents).map_err(|e| ConfigError::ParseError {
            path: origin.to_string(),
            details: e.to_string(),
        })?;
        Self::new(config)
    }

    pub fn get(&self, index: usize) -> Option<&SpellDefinition> {
        self.spells.get(index)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.spells.iter().position(|s| s.name == name)
    }

    pub fn len(&self) -> usize {
        self.spells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpellDefinition> {
        self.spells.iter()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.spells.is_empty() {
            return Err(ConfigError::Invalid("no spells defined".to_string()));
        }
        let mut seen = HashSet::new();
        for spell in &self.spells {
            if spell.name.is_empty() {
                return Err(ConfigError::Invalid("spell with empty name".to_string()));
            }
            if !seen.insert(spell.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate spell name '{}'",
                    spell.name
                )));
            }
            for tier in [&spell.basic, &spell.flawless, &spell.masterful] {
                if tier.mana_cost < 0.0 || tier.cooldown < 0.0 {
                    return Err(ConfigError::Invalid(format!(
                        "spell '{}' has a negative mana cost or cooldown",
                        spell.name
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Load spell definitions from a RON file
pub fn load_spell_definitions(path: &Path) -> Result<SpellDefinitions, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        details: e.to_string(),
    })?;
    let definitions = SpellDefinitions::from_ron_str(&contents, &path.display().to_string())?;
    info!("Loaded {} spell definitions from {}", definitions.len(), path.display());
    Ok(definitions)
}
