//! Component Definitions for the Arena
//!
//! ECS components and resources used during a run, plus the combatant
//! health/mana model that every damage path goes through.

use bevy::prelude::*;
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use super::constants::{
    IMMORTAL_HEALTH_FLOOR, STRENGTH_MITIGATION_CONSTANT, VELOCITY_DAMPING, WISDOM_REGEN_SCALE,
};

// ============================================================================
// Resources
// ============================================================================

/// Seeded random number generator for deterministic simulation.
///
/// When a seed is provided (e.g., via headless config), the same seed will
/// always produce the same run. Without a seed, uses system entropy.
#[derive(Resource)]
pub struct GameRng {
    rng: StdRng,
    /// The seed used to initialize this RNG (if deterministic)
    pub seed: Option<u64>,
}

impl GameRng {
    /// Create a new GameRng with a specific seed for deterministic behavior
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Create a new GameRng with random entropy (non-deterministic)
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            seed: None,
        }
    }

    /// Generate a random f32 in the range [0.0, 1.0)
    pub fn random_f32(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Generate a random f32 in the given range
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        min + self.random_f32() * (max - min)
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    pub fn random_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    /// Random unit vector in the plane
    pub fn random_direction(&mut self) -> Vec2 {
        let angle = self.random_f32() * std::f32::consts::TAU;
        Vec2::new(angle.cos(), angle.sin())
    }

    /// Random sign: -1.0 or 1.0
    pub fn random_sign(&mut self) -> f32 {
        if self.rng.gen_bool(0.5) {
            1.0
        } else {
            -1.0
        }
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

/// Running totals for the current run, reported when it ends.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    pub spells_cast: u32,
    pub cards_discarded: u32,
    pub enemies_killed: u32,
    pub waves_cleared: u32,
    pub masteries_reached: u32,
}

// ============================================================================
// Marker Components
// ============================================================================

/// Marker for the player-controlled wizard.
#[derive(Component)]
pub struct Player;

/// Marker added once a combatant has gone through its death transition.
#[derive(Component)]
pub struct Dead;

/// Planar velocity used for movement, knockback and impulses.
#[derive(Component, Default, Debug, Clone, Copy)]
pub struct Velocity {
    /// Steering velocity set by AI each tick
    pub steering: Vec2,
    /// Impulse velocity that decays over time (knockback, jumps)
    pub impulse: Vec2,
}

impl Velocity {
    /// Decay the impulse part towards zero
    pub fn damp(&mut self, dt: f32) {
        let factor = (1.0 - VELOCITY_DAMPING * dt).max(0.0);
        self.impulse *= factor;
        if self.impulse.length_squared() < 1e-4 {
            self.impulse = Vec2::ZERO;
        }
    }
}

// ============================================================================
// Enemy Types
// ============================================================================

/// Every enemy archetype that can be spawned.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum EnemyKind {
    Bee,
    Boar,
    Slime,
    FireWizard,
    HealingWizard,
    ShieldWizard,
    /// First boss; splits into stage-two bosses
    BossStageOne,
    Pyromancer,
    Cryomancer,
    Cleric,
    Warden,
}

impl EnemyKind {
    pub fn all() -> &'static [EnemyKind] {
        &[
            EnemyKind::Bee,
            EnemyKind::Boar,
            EnemyKind::Slime,
            EnemyKind::FireWizard,
            EnemyKind::HealingWizard,
            EnemyKind::ShieldWizard,
            EnemyKind::BossStageOne,
            EnemyKind::Pyromancer,
            EnemyKind::Cryomancer,
            EnemyKind::Cleric,
            EnemyKind::Warden,
        ]
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            EnemyKind::Bee => "Bee",
            EnemyKind::Boar => "Boar",
            EnemyKind::Slime => "Slime",
            EnemyKind::FireWizard => "Fire Wizard",
            EnemyKind::HealingWizard => "Healing Wizard",
            EnemyKind::ShieldWizard => "Shield Wizard",
            EnemyKind::BossStageOne => "Archmage",
            EnemyKind::Pyromancer => "Pyromancer",
            EnemyKind::Cryomancer => "Cryomancer",
            EnemyKind::Cleric => "Cleric",
            EnemyKind::Warden => "Warden",
        }
    }

    pub fn is_boss(&self) -> bool {
        matches!(
            self,
            EnemyKind::BossStageOne
                | EnemyKind::Pyromancer
                | EnemyKind::Cryomancer
                | EnemyKind::Cleric
                | EnemyKind::Warden
        )
    }
}

/// Enemy component: archetype plus the scaling it was spawned with.
#[derive(Component, Debug, Clone)]
pub struct Enemy {
    pub kind: EnemyKind,
    /// Multiplier applied to every point of damage this enemy deals
    pub damage_multiplier: f32,
}

// ============================================================================
// Combatant Health/Mana Model
// ============================================================================

/// Result of pushing damage through a combatant's intake pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DamageOutcome {
    /// Damage soaked by the shield
    pub absorbed: f32,
    /// Health actually removed
    pub health_lost: f32,
    /// Damage to send back to the attacker
    pub reflected: f32,
    /// True only on the frame the combatant died
    pub killed: bool,
}

/// Health, shield and mana container shared by the player and every enemy.
#[derive(Component, Debug, Clone)]
pub struct Combatant {
    /// Display name used in the combat log
    pub name: String,
    pub max_health: f32,
    pub current_health: f32,
    /// Shield depth; absorbs damage before health
    pub shield: f32,
    pub max_mana: f32,
    pub current_mana: f32,
    /// Base mana regeneration per second (before wisdom)
    pub mana_regen: f32,
    /// Damage reduction stat
    pub strength: f32,
    /// Mana regeneration stat
    pub wisdom: f32,
    /// Fraction of incoming health damage sent back to the attacker
    pub reflect_intensity: f32,
    pub frozen: bool,
    pub burning: bool,
    pub fire_immune: bool,
    pub freeze_immune: bool,
    /// Floors health at 1 instead of dying
    pub immortal: bool,
    dead: bool,
    /// Total damage this combatant has dealt
    pub damage_dealt: f32,
    /// Total health damage this combatant has taken
    pub damage_taken: f32,
}

impl Combatant {
    pub fn new(name: impl Into<String>, max_health: f32, max_mana: f32) -> Self {
        Self {
            name: name.into(),
            max_health,
            current_health: max_health,
            shield: 0.0,
            max_mana,
            current_mana: max_mana,
            mana_regen: 0.0,
            strength: 0.0,
            wisdom: 0.0,
            reflect_intensity: 0.0,
            frozen: false,
            burning: false,
            fire_immune: false,
            freeze_immune: false,
            immortal: false,
            dead: false,
            damage_dealt: 0.0,
            damage_taken: 0.0,
        }
    }

    pub fn with_regen(mut self, mana_regen: f32) -> Self {
        self.mana_regen = mana_regen;
        self
    }

    pub fn with_stats(mut self, strength: f32, wisdom: f32) -> Self {
        self.strength = strength;
        self.wisdom = wisdom;
        self
    }

    pub fn is_alive(&self) -> bool {
        !self.dead
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Health as a fraction of max (0.0 to 1.0)
    pub fn health_fraction(&self) -> f32 {
        if self.max_health > 0.0 {
            self.current_health / self.max_health
        } else {
            0.0
        }
    }

    /// Damage after strength mitigation
    pub fn mitigate(&self, amount: f32) -> f32 {
        if self.strength <= 0.0 {
            return amount;
        }
        amount * (1.0 - self.strength / (self.strength + STRENGTH_MITIGATION_CONSTANT))
    }

    /// Push damage through shield, health and death.
    ///
    /// Shield soaks first. Only damage that reaches health is reflected: the
    /// overflow past the shield, or `min(amount, health)` with no shield up.
    pub fn take_damage(&mut self, amount: f32, is_fire: bool) -> DamageOutcome {
        let mut outcome = DamageOutcome::default();
        if self.dead || amount <= 0.0 || (is_fire && self.fire_immune) {
            return outcome;
        }

        let amount = self.mitigate(amount);
        let health_before = self.current_health;

        let to_health = if self.shield > 0.0 {
            if amount <= self.shield {
                self.shield -= amount;
                outcome.absorbed = amount;
                0.0
            } else {
                let overflow = amount - self.shield;
                outcome.absorbed = self.shield;
                self.shield = 0.0;
                outcome.reflected = overflow * self.reflect_intensity;
                overflow
            }
        } else {
            outcome.reflected = amount.min(health_before) * self.reflect_intensity;
            amount
        };

        if to_health > 0.0 {
            self.current_health = (self.current_health - to_health).clamp(0.0, self.max_health);
            if self.current_health <= 0.0 {
                if self.immortal {
                    self.current_health = IMMORTAL_HEALTH_FLOOR.min(self.max_health);
                } else {
                    self.dead = true;
                    outcome.killed = true;
                }
            }
            outcome.health_lost = health_before - self.current_health;
            self.damage_taken += outcome.health_lost;
        }

        outcome
    }

    /// Restore health, clamped to max. Returns the amount actually healed.
    pub fn add_health(&mut self, amount: f32) -> f32 {
        if self.dead {
            return 0.0;
        }
        let before = self.current_health;
        self.current_health = (self.current_health + amount).clamp(0.0, self.max_health);
        self.current_health - before
    }

    /// Restore mana, clamped to max. Returns the amount actually restored.
    pub fn add_mana(&mut self, amount: f32) -> f32 {
        let before = self.current_mana;
        self.current_mana = (self.current_mana + amount).clamp(0.0, self.max_mana);
        self.current_mana - before
    }

    /// Spend mana if there is enough; leaves mana untouched otherwise.
    pub fn spend_mana(&mut self, amount: f32) -> bool {
        if self.current_mana < amount {
            return false;
        }
        self.current_mana = (self.current_mana - amount).clamp(0.0, self.max_mana);
        true
    }

    /// Mana regeneration per second after wisdom scaling
    pub fn mana_regen_rate(&self) -> f32 {
        self.mana_regen * (1.0 + self.wisdom * WISDOM_REGEN_SCALE)
    }

    pub fn regenerate_mana(&mut self, dt: f32) {
        if self.dead {
            return;
        }
        let rate = self.mana_regen_rate();
        self.add_mana(rate * dt);
    }

    /// Raise max health by `amount` and grant the same amount of current health.
    pub fn raise_max_health(&mut self, amount: f32) {
        self.max_health += amount;
        self.current_health += amount;
    }

    /// Lower max health and re-clamp current health (never kills).
    pub fn lower_max_health(&mut self, amount: f32) {
        self.max_health = (self.max_health - amount).max(IMMORTAL_HEALTH_FLOOR);
        self.current_health = self
            .current_health
            .clamp(IMMORTAL_HEALTH_FLOOR.min(self.max_health), self.max_health);
    }

    pub fn raise_max_mana(&mut self, amount: f32) {
        self.max_mana += amount;
        self.current_mana += amount;
    }

    pub fn lower_max_mana(&mut self, amount: f32) {
        self.max_mana = (self.max_mana - amount).max(0.0);
        self.current_mana = self.current_mana.clamp(0.0, self.max_mana);
    }
}
