//! Combat Constants
//!
//! Centralized location for magic numbers used throughout the combat core.

// ============================================================================
// Damage & Resources
// ============================================================================

/// Strength mitigation constant: damage *= 1 - strength / (strength + K)
pub const STRENGTH_MITIGATION_CONSTANT: f32 = 10.0;

/// Each point of wisdom adds this fraction to base mana regeneration.
pub const WISDOM_REGEN_SCALE: f32 = 0.1;

/// Health that an immortal combatant is floored at.
pub const IMMORTAL_HEALTH_FLOOR: f32 = 1.0;

// ============================================================================
// Status Effects
// ============================================================================

/// Burn damage dealt once per second while burning (before survival scaling).
pub const BURN_TICK_DAMAGE: f32 = 10.0;

/// Seconds between burn ticks.
pub const BURN_TICK_INTERVAL: f32 = 1.0;

/// Slack for status timers built from summed frame deltas. Well under one
/// frame at any supported tick rate.
pub const STATUS_TIMER_EPSILON: f32 = 1e-3;

/// Movement multiplier while frozen.
pub const FROZEN_MOVE_MULTIPLIER: f32 = 0.0;

// ============================================================================
// Enemy AI
// ============================================================================

/// Furthest radius multiplier applied while an enemy is engaged.
pub const ENGAGEMENT_WIDEN_FACTOR: f32 = 1.75;

/// Minimum angle between a boar's rush vector and the knockback it deals.
pub const BOAR_MIN_KNOCKBACK_DEVIATION_DEG: f32 = 30.0;

/// Distance at which two bodies are considered touching.
pub const CONTACT_RADIUS: f32 = 0.8;

/// Minimum seconds between two contact hits from the same enemy.
pub const CONTACT_COOLDOWN: f32 = 0.75;

/// Velocity decay per second for knockback and impulses.
pub const VELOCITY_DAMPING: f32 = 4.0;

// ============================================================================
// Projectiles
// ============================================================================

/// Projectile hits when within this distance of a combatant.
pub const PROJECTILE_HIT_RADIUS: f32 = 0.6;

/// Projectiles despawn after this many seconds.
pub const PROJECTILE_LIFETIME: f32 = 4.0;

// ============================================================================
// Waves
// ============================================================================

/// Enemies appear on a circle of this radius around the arena origin.
pub const SPAWN_RADIUS: f32 = 12.0;
