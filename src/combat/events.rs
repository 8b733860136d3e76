//! Combat events
//!
//! Messages queued during a frame and consumed by the resolution systems.
//! Spells, projectiles and enemy AI never mutate another entity directly;
//! they send one of these instead.

use bevy::prelude::*;

use crate::arena::components::EnemyKind;
use crate::arena::spells::MasteryTier;
use crate::arena::status::StatusKind;

/// What dealt a point of damage
#[derive(Debug, Clone, PartialEq)]
pub enum DamageCause {
    /// Player spell (by name)
    Spell(String),
    /// Enemy projectile or ability (by enemy name)
    EnemyAbility(String),
    /// Enemy body contact
    Contact(String),
    /// Damage bounced back by a Reflect status
    Reflect,
}

impl DamageCause {
    pub fn label(&self) -> &str {
        match self {
            DamageCause::Spell(name)
            | DamageCause::EnemyAbility(name)
            | DamageCause::Contact(name) => name,
            DamageCause::Reflect => "Reflect",
        }
    }
}

/// Event fired when damage is dealt
#[derive(Event, Debug, Clone)]
pub struct DamageEvent {
    /// Entity dealing the damage (None for environment)
    pub source: Option<Entity>,
    /// Entity receiving the damage
    pub target: Entity,
    /// Amount of damage before shield and mitigation
    pub amount: f32,
    pub is_fire: bool,
    pub cause: DamageCause,
}

/// Event fired when healing is requested
#[derive(Event, Debug, Clone)]
pub struct HealingEvent {
    pub target: Entity,
    pub amount: f32,
    pub source: String,
}

/// Request to apply a status effect
#[derive(Event, Debug, Clone)]
pub struct ApplyStatusEvent {
    pub target: Entity,
    pub kind: StatusKind,
    pub magnitude: f32,
    pub duration: f32,
    /// Name of whatever applied it, for the log
    pub source: String,
}

/// Player asks to cast (or discard) the card in a hand slot
#[derive(Event, Debug, Clone, Copy)]
pub struct CastSpellEvent {
    pub slot: usize,
    /// Aim point for projectile spells
    pub aim: Vec2,
    /// Discard instead of casting
    pub discard: bool,
}

/// Spell usage crossed a mastery threshold
#[derive(Event, Debug, Clone)]
pub struct MasteryReachedEvent {
    pub spell: String,
    pub tier: MasteryTier,
}

/// Request to spawn an enemy
#[derive(Event, Debug, Clone, Copy)]
pub struct SpawnEnemyEvent {
    pub kind: EnemyKind,
    pub position: Vec2,
    /// Health/damage multiplier from survival waves
    pub difficulty: f32,
}

/// Event fired when a combatant dies
#[derive(Event, Debug, Clone)]
pub struct CombatantDeathEvent {
    pub victim: Entity,
    pub name: String,
    pub was_player: bool,
}
