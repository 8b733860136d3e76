//! Bee AI
//!
//! Searches for the player, then hovers at range firing stinger bursts and
//! dodging sideways. Below a third of its health it enrages: bigger, faster
//! bursts.

use bevy::prelude::*;

use crate::arena::components::GameRng;
use crate::arena::enemy_config::EnemyDefinition;

use super::{AiCommand, AiCommands, AiInput, EnemyBehavior};

const ENRAGE_THRESHOLD: f32 = 0.33;
const BURST_INTERVAL: f32 = 2.5;
const DODGE_INTERVAL: f32 = 1.2;
const BURST_SPREAD_DEG: f32 = 30.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BeeState {
    Searching,
    Aggressive,
}

#[derive(Clone, Debug)]
pub struct BeeAi {
    pub state: BeeState,
    pub enraged: bool,
    attack_range: f32,
    speed: f32,
    damage: f32,
    projectile_speed: f32,
    burst_count: u32,
    burst_interval: f32,
    burst_timer: f32,
    dodge_timer: f32,
}

impl BeeAi {
    pub fn new(def: &EnemyDefinition) -> Self {
        Self {
            state: BeeState::Searching,
            enraged: false,
            attack_range: def.furthest_radius.max(1.0),
            speed: def.move_speed,
            damage: def.attack_damage,
            projectile_speed: def.projectile_speed,
            burst_count: 2,
            burst_interval: BURST_INTERVAL,
            burst_timer: 0.0,
            dodge_timer: DODGE_INTERVAL,
        }
    }

    pub fn burst_count(&self) -> u32 {
        self.burst_count
    }
}

impl EnemyBehavior for BeeAi {
    fn tick(&mut self, input: &AiInput, rng: &mut GameRng) -> AiCommands {
        let mut commands = AiCommands::new();

        if !self.enraged && input.health_fraction <= ENRAGE_THRESHOLD {
            self.enraged = true;
            self.burst_count += 2;
            self.burst_interval *= 0.6;
            commands.push(AiCommand::Enrage);
        }

        let distance = input.distance();
        match self.state {
            BeeState::Searching => {
                if distance <= self.attack_range {
                    self.state = BeeState::Aggressive;
                    self.burst_timer = self.burst_interval * 0.5;
                    commands.push(AiCommand::Stop);
                } else {
                    commands.push(AiCommand::MoveToward {
                        target: input.player_position,
                        speed: self.speed,
                    });
                }
            }
            BeeState::Aggressive => {
                if distance > self.attack_range * 2.0 {
                    self.state = BeeState::Searching;
                    commands.push(AiCommand::MoveToward {
                        target: input.player_position,
                        speed: self.speed,
                    });
                    return commands;
                }

                self.burst_timer -= input.dt;
                if self.burst_timer <= 0.0 {
                    self.burst_timer = self.burst_interval;
                    commands.push(AiCommand::FireProjectiles {
                        count: self.burst_count,
                        spread_deg: BURST_SPREAD_DEG,
                        damage: self.damage,
                        speed: self.projectile_speed,
                        is_fire: false,
                        on_hit: None,
                    });
                }

                self.dodge_timer -= input.dt;
                if self.dodge_timer <= 0.0 {
                    self.dodge_timer = DODGE_INTERVAL;
                    let sideways = input.to_player().perp() * rng.random_sign();
                    commands.push(AiCommand::MoveDirection {
                        direction: sideways,
                        speed: self.speed,
                    });
                }
            }
        }
        commands
    }

    fn state_name(&self) -> &'static str {
        match self.state {
            BeeState::Searching => "Searching",
            BeeState::Aggressive => "Aggressive",
        }
    }
}
