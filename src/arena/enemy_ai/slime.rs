//! Slime AI
//!
//! No steering at all: the slime hops towards the player on a cooldown and
//! bounces off after a body hit.

use bevy::prelude::*;

use crate::arena::components::GameRng;
use crate::arena::constants::{CONTACT_COOLDOWN, CONTACT_RADIUS};
use crate::arena::enemy_config::EnemyDefinition;

use super::{AiCommand, AiCommands, AiInput, EnemyBehavior};

const JUMP_COOLDOWN: f32 = 1.6;
const JUMP_FORCE_MULTIPLIER: f32 = 2.5;
const AGGRO_RANGE: f32 = 15.0;
const KNOCKBACK_FORCE: f32 = 6.0;

#[derive(Clone, Debug)]
pub struct SlimeAi {
    jump_timer: f32,
    contact_timer: f32,
    jump_force: f32,
    contact_damage: f32,
}

impl SlimeAi {
    /// Jump timers start staggered so a pack does not hop in unison.
    pub fn new(def: &EnemyDefinition, rng: &mut GameRng) -> Self {
        Self {
            jump_timer: rng.random_range(0.2, JUMP_COOLDOWN),
            contact_timer: 0.0,
            jump_force: def.move_speed * JUMP_FORCE_MULTIPLIER,
            contact_damage: def.contact_damage,
        }
    }
}

impl EnemyBehavior for SlimeAi {
    fn tick(&mut self, input: &AiInput, _rng: &mut GameRng) -> AiCommands {
        let mut commands = AiCommands::new();
        commands.push(AiCommand::Stop);
        self.jump_timer -= input.dt;
        self.contact_timer -= input.dt;

        let distance = input.distance();
        let toward = input.to_player();

        if distance <= CONTACT_RADIUS && self.contact_timer <= 0.0 {
            self.contact_timer = CONTACT_COOLDOWN;
            commands.push(AiCommand::ContactDamage {
                amount: self.contact_damage,
                knockback: toward * KNOCKBACK_FORCE,
            });
            commands.push(AiCommand::Impulse(-toward * KNOCKBACK_FORCE * 0.5));
            return commands;
        }

        if self.jump_timer <= 0.0 && distance <= AGGRO_RANGE && !input.frozen {
            self.jump_timer = JUMP_COOLDOWN;
            commands.push(AiCommand::Impulse(toward * self.jump_force));
        }
        commands
    }

    fn state_name(&self) -> &'static str {
        if self.jump_timer > 0.0 {
            "Waiting"
        } else {
            "Ready"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{definition, input};
    use super::*;

    #[test]
    fn test_jumps_on_cooldown() {
        let mut rng = GameRng::from_seed(4);
        let mut slime = SlimeAi::new(&definition(), &mut rng);
        let mid = input(Vec2::ZERO, Vec2::new(6.0, 0.0), 0.1);

        let mut jumps = 0;
        for _ in 0..40 {
            jumps += slime
                .tick(&mid, &mut rng)
                .iter()
                .filter(|c| matches!(c, AiCommand::Impulse(v) if v.x > 0.0))
                .count();
        }
        // 4 seconds at a 1.6s cooldown with a random first delay
        assert!((2..=3).contains(&jumps));
    }

    #[test]
    fn test_contact_hit_respects_cooldown() {
        let mut rng = GameRng::from_seed(4);
        let mut slime = SlimeAi::new(&definition(), &mut rng);
        let touching = input(Vec2::ZERO, Vec2::new(0.5, 0.0), 0.1);

        let hits: usize = (0..10)
            .map(|_| {
                slime
                    .tick(&touching, &mut rng)
                    .iter()
                    .filter(|c| matches!(c, AiCommand::ContactDamage { .. }))
                    .count()
            })
            .sum();
        // t = 0.1 and t = 0.9
        assert_eq!(hits, 2);
    }
}
