//! Enemy AI
//!
//! Each archetype is a small state machine in its own module. Every frame
//! the ECS side builds an `AiInput` snapshot, calls `EnemyBrain::tick`, and
//! applies the returned `AiCommand`s (movement, projectiles, self buffs,
//! contact hits). The state machines never touch the ECS, so each one can
//! be tested on its own.
//!
//! ## Shared pieces
//!
//! - `EngagementBand`: the closest/furthest radius pair with hysteresis,
//!   used by wizards and the boss to decide between moving and fighting.
//! - `teleport::Teleporter`: random-interval teleport sequence.

pub mod bee;
pub mod boar;
pub mod boss;
pub mod slime;
pub mod teleport;
pub mod wizard;

use bevy::prelude::*;
use smallvec::SmallVec;

use super::components::{EnemyKind, GameRng};
use super::constants::ENGAGEMENT_WIDEN_FACTOR;
use super::enemy_config::EnemyDefinition;
use super::status::{StatusKind, StatusPayload};

pub use bee::BeeAi;
pub use boar::BoarAi;
pub use boss::BossAi;
pub use slime::SlimeAi;
pub use teleport::{TeleportPhase, Teleporter};
pub use wizard::WizardAi;

/// Per-frame snapshot of one enemy and the player.
#[derive(Clone, Copy, Debug)]
pub struct AiInput {
    pub dt: f32,
    pub position: Vec2,
    pub player_position: Vec2,
    pub health_fraction: f32,
    pub max_health: f32,
    pub frozen: bool,
}

impl AiInput {
    pub fn distance(&self) -> f32 {
        self.position.distance(self.player_position)
    }

    /// Unit vector towards the player (zero when on top of them)
    pub fn to_player(&self) -> Vec2 {
        (self.player_position - self.position).normalize_or_zero()
    }
}

/// Who an AI-issued status effect lands on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AiTarget {
    Myself,
    Player,
}

/// One thing an enemy wants to do this frame.
#[derive(Clone, Debug, PartialEq)]
pub enum AiCommand {
    /// Steer towards a point
    MoveToward { target: Vec2, speed: f32 },
    /// Steer along a direction
    MoveDirection { direction: Vec2, speed: f32 },
    /// Clear steering
    Stop,
    /// Add an instantaneous velocity (jumps, recoil)
    Impulse(Vec2),
    /// Fan of projectiles aimed at the player
    FireProjectiles {
        count: u32,
        spread_deg: f32,
        damage: f32,
        speed: f32,
        is_fire: bool,
        on_hit: Option<StatusPayload>,
    },
    /// Delayed strikes scattered around the player
    MeteorShower {
        count: u32,
        damage: f32,
        radius: f32,
        delay: f32,
    },
    /// Body hit on the player, with knockback velocity
    ContactDamage { amount: f32, knockback: Vec2 },
    Heal(f32),
    ApplyStatus {
        target: AiTarget,
        kind: StatusKind,
        magnitude: f32,
        duration: f32,
    },
    /// Jump to a new position
    Teleport(Vec2),
    /// Teleport sequence moved to a new phase
    TeleportPhase(TeleportPhase),
    Enrage,
    /// Boss started channeling its stage change
    BeginStageTransition,
    /// Replace this enemy with the given ones
    SpawnStageTwo(Vec<EnemyKind>),
}

pub type AiCommands = SmallVec<[AiCommand; 4]>;

/// Shorthand for a self-targeted status command
pub fn self_status(kind: StatusKind, magnitude: f32, duration: f32) -> AiCommand {
    AiCommand::ApplyStatus {
        target: AiTarget::Myself,
        kind,
        magnitude,
        duration,
    }
}

/// Outer state shared by the ranged archetypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OuterState {
    Moving,
    UsingSkills,
}

/// Closest/furthest radius pair with hysteresis.
///
/// Once the player is inside the band the furthest radius widens, so small
/// movements at the edge do not flip the enemy back to moving.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngagementBand {
    pub closest: f32,
    base_furthest: f32,
    furthest: f32,
    engaged: bool,
}

impl EngagementBand {
    pub fn new(closest: f32, furthest: f32) -> Self {
        Self {
            closest,
            base_furthest: furthest,
            furthest,
            engaged: false,
        }
    }

    pub fn furthest(&self) -> f32 {
        self.furthest
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    /// Update with the current distance. Returns true while inside the band.
    pub fn update(&mut self, distance: f32) -> bool {
        let inside = distance >= self.closest && distance <= self.furthest;
        if inside && !self.engaged {
            self.engaged = true;
            self.furthest = self.base_furthest * ENGAGEMENT_WIDEN_FACTOR;
        } else if !inside && self.engaged {
            self.engaged = false;
            self.furthest = self.base_furthest;
        }
        inside
    }

    /// Steering that brings the enemy back into the band.
    pub fn steer(&self, input: &AiInput, speed: f32) -> AiCommand {
        let distance = input.distance();
        if distance < self.closest {
            AiCommand::MoveDirection {
                direction: -input.to_player(),
                speed,
            }
        } else if distance > self.furthest {
            AiCommand::MoveToward {
                target: input.player_position,
                speed,
            }
        } else {
            AiCommand::Stop
        }
    }
}

/// A per-archetype state machine.
pub trait EnemyBehavior {
    fn tick(&mut self, input: &AiInput, rng: &mut GameRng) -> AiCommands;
    /// Current state, for logs and tests
    fn state_name(&self) -> &'static str;
}

/// The AI attached to an enemy entity.
#[derive(Component, Debug, Clone)]
pub enum EnemyBrain {
    Bee(BeeAi),
    Boar(BoarAi),
    Slime(SlimeAi),
    Wizard(WizardAi),
    Boss(BossAi),
}

impl EnemyBrain {
    pub fn for_kind(kind: EnemyKind, def: &EnemyDefinition, rng: &mut GameRng) -> Self {
        match kind {
            EnemyKind::Bee => EnemyBrain::Bee(BeeAi::new(def)),
            EnemyKind::Boar => EnemyBrain::Boar(BoarAi::new(def)),
            EnemyKind::Slime => EnemyBrain::Slime(SlimeAi::new(def, rng)),
            EnemyKind::FireWizard => {
                EnemyBrain::Wizard(WizardAi::new(wizard::WizardSchool::Fire, def, rng))
            }
            EnemyKind::HealingWizard => {
                EnemyBrain::Wizard(WizardAi::new(wizard::WizardSchool::Healing, def, rng))
            }
            EnemyKind::ShieldWizard => {
                EnemyBrain::Wizard(WizardAi::new(wizard::WizardSchool::Shield, def, rng))
            }
            EnemyKind::BossStageOne
            | EnemyKind::Pyromancer
            | EnemyKind::Cryomancer
            | EnemyKind::Cleric
            | EnemyKind::Warden => EnemyBrain::Boss(BossAi::new(def, rng)),
        }
    }

    fn behavior(&mut self) -> &mut dyn EnemyBehavior {
        match self {
            EnemyBrain::Bee(ai) => ai,
            EnemyBrain::Boar(ai) => ai,
            EnemyBrain::Slime(ai) => ai,
            EnemyBrain::Wizard(ai) => ai,
            EnemyBrain::Boss(ai) => ai,
        }
    }

    pub fn tick(&mut self, input: &AiInput, rng: &mut GameRng) -> AiCommands {
        self.behavior().tick(input, rng)
    }

    pub fn state_name(&mut self) -> &'static str {
        self.behavior().state_name()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn input(position: Vec2, player_position: Vec2, dt: f32) -> AiInput {
        AiInput {
            dt,
            position,
            player_position,
            health_fraction: 1.0,
            max_health: 100.0,
            frozen: false,
        }
    }

    pub fn definition() -> EnemyDefinition {
        EnemyDefinition {
            max_health: 100.0,
            move_speed: 3.0,
            attack_damage: 8.0,
            contact_damage: 12.0,
            projectile_speed: 9.0,
            closest_radius: 4.0,
            furthest_radius: 8.0,
            fire_immune: false,
            freeze_immune: false,
            boss: None,
        }
    }
}
