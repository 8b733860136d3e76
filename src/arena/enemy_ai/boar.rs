//! Boar AI
//!
//! Walk → PreRush (telegraph) → Rushing → Recovering → Walk.
//! A rush that connects knocks the player away at an angle of at least
//! 30 degrees from the rush line, so the player is never pinned in front
//! of the boar.

use bevy::prelude::*;

use crate::arena::components::GameRng;
use crate::arena::constants::{BOAR_MIN_KNOCKBACK_DEVIATION_DEG, CONTACT_RADIUS};
use crate::arena::enemy_config::EnemyDefinition;

use super::{AiCommand, AiCommands, AiInput, EnemyBehavior};

const RUSH_TRIGGER_RANGE: f32 = 7.0;
const TELEGRAPH_TIME: f32 = 0.8;
const RUSH_TIME: f32 = 1.2;
const RECOVERY_TIME: f32 = 1.5;
const RUSH_SPEED_MULTIPLIER: f32 = 3.5;
const KNOCKBACK_FORCE: f32 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BoarState {
    Walking,
    PreRush { remaining: f32 },
    Rushing { direction: Vec2, remaining: f32, hit: bool },
    Recovering { remaining: f32 },
}

#[derive(Clone, Debug)]
pub struct BoarAi {
    pub state: BoarState,
    speed: f32,
    contact_damage: f32,
}

impl BoarAi {
    pub fn new(def: &EnemyDefinition) -> Self {
        Self {
            state: BoarState::Walking,
            speed: def.move_speed,
            contact_damage: def.contact_damage,
        }
    }
}

/// Knockback direction for a rush hit.
///
/// Starts from the boar→player vector and rotates it away from the rush
/// line until the angle between them is at least the minimum deviation.
pub fn knockback_direction(rush_direction: Vec2, to_target: Vec2, rng: &mut GameRng) -> Vec2 {
    let rush = rush_direction.normalize_or(Vec2::X);
    let base = to_target.normalize_or(rush);
    let min_angle = BOAR_MIN_KNOCKBACK_DEVIATION_DEG.to_radians();

    let mut angle = rush.perp_dot(base).atan2(rush.dot(base));
    if angle.abs() < min_angle {
        let side = if angle == 0.0 {
            rng.random_sign()
        } else {
            angle.signum()
        };
        angle = side * min_angle;
    }
    Vec2::from_angle(angle).rotate(rush)
}

impl EnemyBehavior for BoarAi {
    fn tick(&mut self, input: &AiInput, rng: &mut GameRng) -> AiCommands {
        let mut commands = AiCommands::new();
        let distance = input.distance();

        self.state = match self.state {
            BoarState::Walking => {
                if distance <= RUSH_TRIGGER_RANGE {
                    commands.push(AiCommand::Stop);
                    BoarState::PreRush {
                        remaining: TELEGRAPH_TIME,
                    }
                } else {
                    commands.push(AiCommand::MoveToward {
                        target: input.player_position,
                        speed: self.speed,
                    });
                    BoarState::Walking
                }
            }
            BoarState::PreRush { remaining } => {
                let remaining = remaining - input.dt;
                if remaining <= 0.0 {
                    // Direction locks at the end of the telegraph
                    let direction = input.to_player().normalize_or(Vec2::X);
                    commands.push(AiCommand::MoveDirection {
                        direction,
                        speed: self.speed * RUSH_SPEED_MULTIPLIER,
                    });
                    BoarState::Rushing {
                        direction,
                        remaining: RUSH_TIME,
                        hit: false,
                    }
                } else {
                    BoarState::PreRush { remaining }
                }
            }
            BoarState::Rushing {
                direction,
                remaining,
                mut hit,
            } => {
                if !hit && distance <= CONTACT_RADIUS {
                    hit = true;
                    let knockback = knockback_direction(
                        direction,
                        input.player_position - input.position,
                        rng,
                    );
                    commands.push(AiCommand::ContactDamage {
                        amount: self.contact_damage,
                        knockback: knockback * KNOCKBACK_FORCE,
                    });
                }
                let remaining = remaining - input.dt;
                if remaining <= 0.0 {
                    commands.push(AiCommand::Stop);
                    BoarState::Recovering {
                        remaining: RECOVERY_TIME,
                    }
                } else {
                    BoarState::Rushing {
                        direction,
                        remaining,
                        hit,
                    }
                }
            }
            BoarState::Recovering { remaining } => {
                let remaining = remaining - input.dt;
                if remaining <= 0.0 {
                    BoarState::Walking
                } else {
                    BoarState::Recovering { remaining }
                }
            }
        };
        commands
    }

    fn state_name(&self) -> &'static str {
        match self.state {
            BoarState::Walking => "Walking",
            BoarState::PreRush { .. } => "PreRush",
            BoarState::Rushing { .. } => "Rushing",
            BoarState::Recovering { .. } => "Recovering",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{definition, input};
    use super::*;

    fn angle_between(a: Vec2, b: Vec2) -> f32 {
        a.perp_dot(b).atan2(a.dot(b)).abs()
    }

    #[test]
    fn test_knockback_head_on_deviates() {
        let mut rng = GameRng::from_seed(9);
        let knock = knockback_direction(Vec2::X, Vec2::X, &mut rng);
        let deviation = angle_between(Vec2::X, knock).to_degrees();
        assert!((deviation - 30.0).abs() < 1e-3);
    }

    #[test]
    fn test_knockback_keeps_wide_angles() {
        let mut rng = GameRng::from_seed(9);
        let knock = knockback_direction(Vec2::X, Vec2::Y, &mut rng);
        assert!((knock - Vec2::Y).length() < 1e-5);
    }

    #[test]
    fn test_knockback_pushes_to_the_side_player_was_on() {
        let mut rng = GameRng::from_seed(9);
        let slightly_left = Vec2::from_angle(10f32.to_radians());
        let knock = knockback_direction(Vec2::X, slightly_left, &mut rng);
        assert!(knock.y > 0.0);
        assert!(angle_between(Vec2::X, knock).to_degrees() >= 30.0 - 1e-3);
    }

    fn tick_until(boar: &mut BoarAi, near: &AiInput, rng: &mut GameRng, state: &str) -> bool {
        for _ in 0..50 {
            boar.tick(near, rng);
            if boar.state_name() == state {
                return true;
            }
        }
        false
    }

    #[test]
    fn test_full_rush_cycle() {
        let mut boar = BoarAi::new(&definition());
        let mut rng = GameRng::from_seed(2);
        let near = input(Vec2::ZERO, Vec2::new(0.5, 0.0), 0.1);

        boar.tick(&near, &mut rng);
        assert_eq!(boar.state_name(), "PreRush");
        assert!(tick_until(&mut boar, &near, &mut rng, "Rushing"));

        let hit = boar.tick(&near, &mut rng);
        assert!(hit
            .iter()
            .any(|c| matches!(c, AiCommand::ContactDamage { amount, .. } if *amount == 12.0)));
        // Only one hit per rush
        let again = boar.tick(&near, &mut rng);
        assert!(!again.iter().any(|c| matches!(c, AiCommand::ContactDamage { .. })));

        assert!(tick_until(&mut boar, &near, &mut rng, "Recovering"));
        assert!(tick_until(&mut boar, &near, &mut rng, "Walking"));
    }
}
