//! Wizard AI
//!
//! Three schools share one state machine. Moving/UsingSkills is decided by
//! the engagement band; while using skills a basic-attack timer and a
//! special-ability timer run side by side. Each school has a one-time
//! survival skill that fires the first time health drops below a threshold:
//!
//! - Fire: gains Reflect
//! - Healing: heals and flees for a few seconds (no teleporting meanwhile)
//! - Shield: raises a large shield

use bevy::prelude::*;

use crate::arena::components::GameRng;
use crate::arena::enemy_config::EnemyDefinition;
use crate::arena::status::{StatusKind, StatusPayload};

use super::teleport::Teleporter;
use super::{
    self_status, AiCommand, AiCommands, AiInput, EnemyBehavior, EngagementBand, OuterState,
};

const BASIC_INTERVAL: f32 = 1.5;
const SPECIAL_INTERVAL: f32 = 6.0;
const SURVIVAL_THRESHOLD: f32 = 0.4;
const FLEE_DURATION: f32 = 3.0;
const FLEE_SPEED_MULTIPLIER: f32 = 1.4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WizardSchool {
    Fire,
    Healing,
    Shield,
}

#[derive(Clone, Debug)]
pub struct WizardAi {
    pub school: WizardSchool,
    pub state: OuterState,
    band: EngagementBand,
    speed: f32,
    damage: f32,
    projectile_speed: f32,
    basic_timer: f32,
    special_timer: f32,
    survival_used: bool,
    flee_remaining: f32,
    teleporter: Teleporter,
}

impl WizardAi {
    pub fn new(school: WizardSchool, def: &EnemyDefinition, rng: &mut GameRng) -> Self {
        Self {
            school,
            state: OuterState::Moving,
            band: EngagementBand::new(def.closest_radius, def.furthest_radius),
            speed: def.move_speed,
            damage: def.attack_damage,
            projectile_speed: def.projectile_speed,
            basic_timer: BASIC_INTERVAL,
            special_timer: SPECIAL_INTERVAL,
            survival_used: false,
            flee_remaining: 0.0,
            teleporter: Teleporter::new(6.0, 10.0, def.closest_radius, def.furthest_radius, rng),
        }
    }

    pub fn survival_used(&self) -> bool {
        self.survival_used
    }

    pub fn is_fleeing(&self) -> bool {
        self.flee_remaining > 0.0
    }

    fn survival_skill(&mut self, input: &AiInput, out: &mut AiCommands) {
        self.survival_used = true;
        match self.school {
            WizardSchool::Fire => out.push(self_status(StatusKind::Reflect, 0.5, 8.0)),
            WizardSchool::Healing => {
                out.push(AiCommand::Heal(input.max_health * 0.35));
                self.flee_remaining = FLEE_DURATION;
            }
            WizardSchool::Shield => {
                out.push(self_status(StatusKind::Shield, input.max_health * 0.6, 10.0))
            }
        }
    }

    fn basic_attack(&self) -> AiCommand {
        AiCommand::FireProjectiles {
            count: 1,
            spread_deg: 0.0,
            damage: self.damage,
            speed: self.projectile_speed,
            is_fire: self.school == WizardSchool::Fire,
            on_hit: None,
        }
    }

    fn special(&self, input: &AiInput) -> AiCommand {
        match self.school {
            WizardSchool::Fire => AiCommand::FireProjectiles {
                count: 5,
                spread_deg: 50.0,
                damage: self.damage,
                speed: self.projectile_speed,
                is_fire: true,
                on_hit: Some(StatusPayload {
                    kind: StatusKind::Burn,
                    magnitude: 0.0,
                    duration: 3.0,
                }),
            },
            WizardSchool::Healing => AiCommand::Heal(input.max_health * 0.15),
            WizardSchool::Shield => self_status(StatusKind::Shield, input.max_health * 0.25, 6.0),
        }
    }
}

impl EnemyBehavior for WizardAi {
    fn tick(&mut self, input: &AiInput, rng: &mut GameRng) -> AiCommands {
        let mut commands = AiCommands::new();

        if !self.survival_used && input.health_fraction <= SURVIVAL_THRESHOLD {
            self.survival_skill(input, &mut commands);
        }

        self.teleporter
            .tick(input, rng, self.is_fleeing(), &mut commands);
        if self.teleporter.is_running() {
            commands.push(AiCommand::Stop);
            return commands;
        }

        if self.is_fleeing() {
            self.flee_remaining -= input.dt;
            commands.push(AiCommand::MoveDirection {
                direction: -input.to_player(),
                speed: self.speed * FLEE_SPEED_MULTIPLIER,
            });
            return commands;
        }

        let in_band = self.band.update(input.distance());
        match self.state {
            OuterState::Moving => {
                if in_band {
                    self.state = OuterState::UsingSkills;
                    commands.push(AiCommand::Stop);
                } else {
                    commands.push(self.band.steer(input, self.speed));
                }
            }
            OuterState::UsingSkills => {
                if !in_band {
                    self.state = OuterState::Moving;
                    commands.push(self.band.steer(input, self.speed));
                    return commands;
                }
                self.basic_timer -= input.dt;
                self.special_timer -= input.dt;
                if self.basic_timer <= 0.0 {
                    self.basic_timer = BASIC_INTERVAL;
                    commands.push(self.basic_attack());
                }
                if self.special_timer <= 0.0 {
                    self.special_timer = SPECIAL_INTERVAL;
                    commands.push(self.special(input));
                }
            }
        }
        commands
    }

    fn state_name(&self) -> &'static str {
        if self.teleporter.is_running() {
            return "Teleporting";
        }
        if self.is_fleeing() {
            return "Fleeing";
        }
        match self.state {
            OuterState::Moving => "Moving",
            OuterState::UsingSkills => "UsingSkills",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{definition, input};
    use super::*;

    #[test]
    fn test_moves_into_band_then_attacks() {
        let mut rng = GameRng::from_seed(3);
        let mut wizard = WizardAi::new(WizardSchool::Fire, &definition(), &mut rng);

        let far = input(Vec2::ZERO, Vec2::new(20.0, 0.0), 0.1);
        assert!(matches!(wizard.tick(&far, &mut rng)[0], AiCommand::MoveToward { .. }));

        let in_range = input(Vec2::ZERO, Vec2::new(6.0, 0.0), 0.1);
        wizard.tick(&in_range, &mut rng);
        assert_eq!(wizard.state, OuterState::UsingSkills);

        let mut basics = 0;
        for _ in 0..20 {
            basics += wizard
                .tick(&in_range, &mut rng)
                .iter()
                .filter(|c| matches!(c, AiCommand::FireProjectiles { count: 1, is_fire: true, .. }))
                .count();
        }
        assert_eq!(basics, 1);
    }

    #[test]
    fn test_survival_skill_fires_once() {
        let mut rng = GameRng::from_seed(3);
        let mut wizard = WizardAi::new(WizardSchool::Shield, &definition(), &mut rng);
        let mut hurt = input(Vec2::ZERO, Vec2::new(6.0, 0.0), 0.1);
        hurt.health_fraction = 0.3;

        let first = wizard.tick(&hurt, &mut rng);
        assert!(first.contains(&self_status(StatusKind::Shield, 100.0 * 0.6, 10.0)));
        assert!(wizard.survival_used());
        let second = wizard.tick(&hurt, &mut rng);
        assert!(!second.contains(&self_status(StatusKind::Shield, 100.0 * 0.6, 10.0)));
    }

    #[test]
    fn test_healing_wizard_flees_after_survival_heal() {
        let mut rng = GameRng::from_seed(3);
        let mut wizard = WizardAi::new(WizardSchool::Healing, &definition(), &mut rng);
        let mut hurt = input(Vec2::ZERO, Vec2::new(6.0, 0.0), 0.1);
        hurt.health_fraction = 0.2;

        let commands = wizard.tick(&hurt, &mut rng);
        assert!(commands.contains(&AiCommand::Heal(100.0 * 0.35)));
        assert!(commands.iter().any(
            |c| matches!(c, AiCommand::MoveDirection { direction, .. } if direction.x < 0.0)
        ));
        assert_eq!(wizard.state_name(), "Fleeing");

        // Flee ends after its duration; no teleport starts during it
        for _ in 0..40 {
            let out = wizard.tick(&hurt, &mut rng);
            if wizard.is_fleeing() {
                assert!(!out.iter().any(|c| matches!(c, AiCommand::TeleportPhase(_))));
            }
        }
        assert!(!wizard.is_fleeing());
    }
}
