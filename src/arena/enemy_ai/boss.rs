//! Boss AI
//!
//! Stage one and the four stage-two bosses share this state machine; what
//! differs is their ability table from `enemies.ron`. While using skills,
//! every ability timer counts down in parallel and every timer that reaches
//! zero in a frame fires that frame, then resets to its own cooldown.
//!
//! Stage one also enrages (cooldowns shrink) and, below a health fraction,
//! channels a transition that replaces it with the stage-two bosses.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::arena::components::GameRng;
use crate::arena::enemy_config::{EnemyDefinition, EnrageDefinition, TransitionDefinition};
use crate::arena::status::{StatusKind, StatusPayload};

use super::teleport::Teleporter;
use super::{
    self_status, AiCommand, AiCommands, AiInput, EnemyBehavior, EngagementBand, OuterState,
};

const METEOR_DELAY: f32 = 1.5;

/// One entry in a boss ability table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BossAbility {
    /// Ring of fireballs in every direction
    FireballBurst { count: u32, damage: f32 },
    /// Tight fan of pellets at the player
    Shotgun {
        pellets: u32,
        spread_deg: f32,
        damage: f32,
    },
    /// Delayed strikes around the player
    MeteorShower { count: u32, damage: f32, radius: f32 },
    /// Heal a fraction of max health
    Heal { fraction: f32 },
    /// Shield worth a fraction of max health
    Shield { fraction: f32, duration: f32 },
    Reflect { intensity: f32, duration: f32 },
    /// Single bolt that freezes on hit
    FrostBolt { damage: f32, freeze_duration: f32 },
}

impl BossAbility {
    pub fn command(&self, input: &AiInput, projectile_speed: f32) -> AiCommand {
        match *self {
            BossAbility::FireballBurst { count, damage } => AiCommand::FireProjectiles {
                count,
                spread_deg: 360.0,
                damage,
                speed: projectile_speed,
                is_fire: true,
                on_hit: None,
            },
            BossAbility::Shotgun {
                pellets,
                spread_deg,
                damage,
            } => AiCommand::FireProjectiles {
                count: pellets,
                spread_deg,
                damage,
                speed: projectile_speed * 1.3,
                is_fire: false,
                on_hit: None,
            },
            BossAbility::MeteorShower {
                count,
                damage,
                radius,
            } => AiCommand::MeteorShower {
                count,
                damage,
                radius,
                delay: METEOR_DELAY,
            },
            BossAbility::Heal { fraction } => AiCommand::Heal(input.max_health * fraction),
            BossAbility::Shield { fraction, duration } => {
                self_status(StatusKind::Shield, input.max_health * fraction, duration)
            }
            BossAbility::Reflect {
                intensity,
                duration,
            } => self_status(StatusKind::Reflect, intensity, duration),
            BossAbility::FrostBolt {
                damage,
                freeze_duration,
            } => AiCommand::FireProjectiles {
                count: 1,
                spread_deg: 0.0,
                damage,
                speed: projectile_speed,
                is_fire: false,
                on_hit: Some(StatusPayload {
                    kind: StatusKind::Freeze,
                    magnitude: 0.0,
                    duration: freeze_duration,
                }),
            },
        }
    }
}

#[derive(Clone, Debug)]
struct AbilityTimer {
    ability: BossAbility,
    cooldown: f32,
    remaining: f32,
}

#[derive(Clone, Debug)]
pub struct BossAi {
    pub state: OuterState,
    band: EngagementBand,
    speed: f32,
    projectile_speed: f32,
    abilities: Vec<AbilityTimer>,
    enrage: Option<EnrageDefinition>,
    enraged: bool,
    transition: Option<TransitionDefinition>,
    /// Seconds spent channeling the transition, once started
    transition_elapsed: Option<f32>,
    transitioned: bool,
    teleporter: Option<Teleporter>,
}

impl BossAi {
    pub fn new(def: &EnemyDefinition, rng: &mut GameRng) -> Self {
        let boss = def.boss.as_ref();
        Self {
            state: OuterState::Moving,
            band: EngagementBand::new(def.closest_radius, def.furthest_radius),
            speed: def.move_speed,
            projectile_speed: def.projectile_speed,
            abilities: boss
                .map(|b| {
                    b.abilities
                        .iter()
                        .map(|entry| AbilityTimer {
                            ability: entry.ability.clone(),
                            cooldown: entry.cooldown,
                            remaining: entry.cooldown,
                        })
                        .collect()
                })
                .unwrap_or_default(),
            enrage: boss.and_then(|b| b.enrage),
            enraged: false,
            transition: boss.and_then(|b| b.transition.clone()),
            transition_elapsed: None,
            transitioned: false,
            teleporter: boss.filter(|b| b.teleports).map(|_| {
                Teleporter::new(8.0, 14.0, def.closest_radius, def.furthest_radius, rng)
            }),
        }
    }

    pub fn is_enraged(&self) -> bool {
        self.enraged
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition_elapsed.is_some()
    }

    /// Current cooldown of each ability, in table order
    pub fn cooldowns(&self) -> Vec<f32> {
        self.abilities.iter().map(|a| a.cooldown).collect()
    }

    /// Channel the stage transition. Returns true while channeling.
    fn update_transition(&mut self, input: &AiInput, out: &mut AiCommands) -> bool {
        let Some(transition) = &self.transition else {
            return false;
        };
        match self.transition_elapsed.as_mut() {
            Some(elapsed) => {
                *elapsed += input.dt;
                out.push(AiCommand::Stop);
                if *elapsed >= transition.duration && !self.transitioned {
                    self.transitioned = true;
                    out.push(AiCommand::SpawnStageTwo(transition.spawns.clone()));
                }
                true
            }
            None if input.health_fraction <= transition.threshold => {
                self.transition_elapsed = Some(0.0);
                out.push(AiCommand::BeginStageTransition);
                out.push(AiCommand::Stop);
                true
            }
            None => false,
        }
    }

    fn update_enrage(&mut self, input: &AiInput, out: &mut AiCommands) {
        let Some(rule) = self.enrage else {
            return;
        };
        if self.enraged || input.health_fraction > rule.threshold {
            return;
        }
        self.enraged = true;
        for timer in &mut self.abilities {
            timer.cooldown *= rule.cooldown_scale;
            timer.remaining = timer.remaining.min(timer.cooldown);
        }
        out.push(AiCommand::Enrage);
    }
}

impl EnemyBehavior for BossAi {
    fn tick(&mut self, input: &AiInput, rng: &mut GameRng) -> AiCommands {
        let mut commands = AiCommands::new();

        if self.update_transition(input, &mut commands) {
            return commands;
        }
        self.update_enrage(input, &mut commands);

        if let Some(teleporter) = &mut self.teleporter {
            teleporter.tick(input, rng, false, &mut commands);
            if teleporter.is_running() {
                commands.push(AiCommand::Stop);
                return commands;
            }
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
                for timer in &mut self.abilities {
                    timer.remaining -= input.dt;
                    if timer.remaining <= 0.0 {
                        timer.remaining = timer.cooldown;
                        commands.push(timer.ability.command(input, self.projectile_speed));
                    }
                }
            }
        }
        commands
    }

    fn state_name(&self) -> &'static str {
        if self.is_transitioning() {
            return "Transitioning";
        }
        if self.teleporter.as_ref().is_some_and(|t| t.is_running()) {
            return "Teleporting";
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
    use crate::arena::components::EnemyKind;
    use crate::arena::enemy_config::{AbilityEntry, BossDefinition};

    fn boss_definition() -> EnemyDefinition {
        EnemyDefinition {
            boss: Some(BossDefinition {
                abilities: vec![
                    AbilityEntry {
                        ability: BossAbility::FireballBurst {
                            count: 8,
                            damage: 5.0,
                        },
                        cooldown: 1.0,
                    },
                    AbilityEntry {
                        ability: BossAbility::Heal { fraction: 0.1 },
                        cooldown: 1.0,
                    },
                    AbilityEntry {
                        ability: BossAbility::Reflect {
                            intensity: 0.5,
                            duration: 3.0,
                        },
                        cooldown: 4.0,
                    },
                ],
                enrage: Some(EnrageDefinition {
                    threshold: 0.5,
                    cooldown_scale: 0.5,
                }),
                transition: Some(TransitionDefinition {
                    threshold: 0.1,
                    duration: 1.0,
                    spawns: vec![
                        EnemyKind::Pyromancer,
                        EnemyKind::Cryomancer,
                        EnemyKind::Cleric,
                        EnemyKind::Warden,
                        EnemyKind::Pyromancer,
                    ],
                }),
                teleports: false,
            }),
            ..definition()
        }
    }

    fn engaged(boss: &mut BossAi, rng: &mut GameRng) -> AiInput {
        let step = input(Vec2::ZERO, Vec2::new(6.0, 0.0), 0.25);
        boss.tick(&step, rng);
        assert_eq!(boss.state, OuterState::UsingSkills);
        step
    }

    #[test]
    fn test_expired_timers_fire_together() {
        let mut rng = GameRng::from_seed(6);
        let mut boss = BossAi::new(&boss_definition(), &mut rng);
        let step = engaged(&mut boss, &mut rng);

        let mut frames_with_two = 0;
        for _ in 0..8 {
            let commands = boss.tick(&step, &mut rng);
            let burst = commands.iter().any(|c| {
                matches!(
                    c,
                    AiCommand::FireProjectiles { count: 8, spread_deg, .. } if *spread_deg == 360.0
                )
            });
            let heal = commands.iter().any(|c| matches!(c, AiCommand::Heal(_)));
            assert_eq!(burst, heal);
            if burst {
                frames_with_two += 1;
            }
        }
        assert_eq!(frames_with_two, 2);
    }

    #[test]
    fn test_enrage_scales_cooldowns_once() {
        let mut rng = GameRng::from_seed(6);
        let mut boss = BossAi::new(&boss_definition(), &mut rng);
        let mut step = engaged(&mut boss, &mut rng);
        step.health_fraction = 0.4;

        assert!(boss.tick(&step, &mut rng).contains(&AiCommand::Enrage));
        assert_eq!(boss.cooldowns(), vec![0.5, 0.5, 2.0]);
        assert!(!boss.tick(&step, &mut rng).contains(&AiCommand::Enrage));
        assert!(boss.is_enraged());
    }

    #[test]
    fn test_stage_transition_spawns_five_once() {
        let mut rng = GameRng::from_seed(6);
        let mut boss = BossAi::new(&boss_definition(), &mut rng);
        let mut step = engaged(&mut boss, &mut rng);
        step.health_fraction = 0.05;

        let start = boss.tick(&step, &mut rng);
        assert!(start.contains(&AiCommand::BeginStageTransition));
        assert_eq!(boss.state_name(), "Transitioning");

        let mut spawned = Vec::new();
        for _ in 0..10 {
            for command in boss.tick(&step, &mut rng) {
                if let AiCommand::SpawnStageTwo(ref kinds) = command {
                    spawned.push(kinds.clone());
                }
                assert!(!matches!(command, AiCommand::FireProjectiles { .. }));
            }
        }
        assert_eq!(spawned.len(), 1);
        assert_eq!(spawned[0].len(), 5);
    }

    #[test]
    fn test_plain_boss_without_table_only_moves() {
        let mut rng = GameRng::from_seed(6);
        let mut boss = BossAi::new(&definition(), &mut rng);
        let step = engaged(&mut boss, &mut rng);
        for _ in 0..20 {
            assert!(boss.tick(&step, &mut rng).is_empty());
        }
    }
}
