//! Enemy Systems
//!
//! ECS side of the enemy AI: spawning enemies from their definitions, and
//! running every brain once per frame and applying the commands it returns.

use bevy::prelude::*;

use crate::combat::events::{
    ApplyStatusEvent, DamageCause, DamageEvent, HealingEvent, SpawnEnemyEvent,
};
use crate::combat::log::{CombatLog, CombatLogEventType};

use super::components::{Combatant, Dead, Enemy, EnemyKind, GameRng, Player, Velocity};
use super::enemy_ai::{AiCommand, AiInput, AiTarget, EnemyBrain};
use super::enemy_config::EnemyDefinitions;
use super::projectiles::{spawn_volley, Faction, MeteorStrike, Volley};
use super::status::StatusEffects;

/// Meteors land within this distance of the player
const METEOR_SCATTER: f32 = 3.0;
/// Seconds between consecutive meteors of one shower
const METEOR_STAGGER: f32 = 0.2;
/// Stage-two bosses appear on a circle of this radius around the old boss
const STAGE_TWO_RING: f32 = 3.0;

/// Spawn one enemy entity. Returns None if the kind has no definition.
pub fn spawn_enemy(
    commands: &mut Commands,
    definitions: &EnemyDefinitions,
    kind: EnemyKind,
    position: Vec2,
    difficulty: f32,
    rng: &mut GameRng,
) -> Option<Entity> {
    let def = definitions.get(kind)?;
    let difficulty = difficulty.max(f32::EPSILON);

    let mut combatant = Combatant::new(kind.name(), def.max_health * difficulty, 0.0);
    combatant.fire_immune = def.fire_immune;
    combatant.freeze_immune = def.freeze_immune;
    // A boss with a stage transition cannot die before it transitions
    combatant.immortal = def
        .boss
        .as_ref()
        .is_some_and(|boss| boss.transition.is_some());

    let entity = commands
        .spawn((
            Transform::from_translation(position.extend(0.0)),
            combatant,
            StatusEffects::with_burn_scale(1.0 / difficulty),
            Enemy {
                kind,
                damage_multiplier: difficulty,
            },
            EnemyBrain::for_kind(kind, def, rng),
            Velocity::default(),
        ))
        .id();
    Some(entity)
}

/// Spawn enemies requested by the wave runner.
pub fn spawn_enemies(
    mut commands: Commands,
    mut events: EventReader<SpawnEnemyEvent>,
    definitions: Res<EnemyDefinitions>,
    mut rng: ResMut<GameRng>,
    mut combat_log: ResMut<CombatLog>,
) {
    for event in events.read() {
        match spawn_enemy(
            &mut commands,
            &definitions,
            event.kind,
            event.position,
            event.difficulty,
            &mut rng,
        ) {
            Some(_) => combat_log.log(
                CombatLogEventType::Spawn,
                format!(
                    "{} appears at ({:.1}, {:.1})",
                    event.kind.name(),
                    event.position.x,
                    event.position.y
                ),
            ),
            None => warn!("No definition for enemy {:?}; spawn skipped", event.kind),
        }
    }
}

/// Tick every enemy brain and apply its commands.
#[allow(clippy::too_many_arguments)]
pub fn run_enemy_ai(
    mut commands: Commands,
    time: Res<Time>,
    mut rng: ResMut<GameRng>,
    mut combat_log: ResMut<CombatLog>,
    definitions: Res<EnemyDefinitions>,
    mut players: Query<
        (Entity, &Transform, &mut Velocity),
        (With<Player>, Without<Enemy>, Without<Dead>),
    >,
    mut enemies: Query<
        (Entity, &mut Transform, &mut Velocity, &mut EnemyBrain, &Combatant, &Enemy),
        (Without<Player>, Without<Dead>),
    >,
    mut damage_events: EventWriter<DamageEvent>,
    mut healing_events: EventWriter<HealingEvent>,
    mut status_events: EventWriter<ApplyStatusEvent>,
) {
    let dt = time.delta_secs();
    let Ok((player, player_transform, mut player_velocity)) = players.get_single_mut() else {
        for (_, _, mut velocity, _, _, _) in enemies.iter_mut() {
            velocity.steering = Vec2::ZERO;
        }
        return;
    };
    let player_position = player_transform.translation.truncate();
    let mut knockback = Vec2::ZERO;

    for (entity, mut transform, mut velocity, mut brain, combatant, enemy) in enemies.iter_mut() {
        if combatant.frozen {
            velocity.steering = Vec2::ZERO;
            continue;
        }
        let position = transform.translation.truncate();
        let input = AiInput {
            dt,
            position,
            player_position,
            health_fraction: combatant.health_fraction(),
            max_health: combatant.max_health,
            frozen: combatant.frozen,
        };

        for command in brain.tick(&input, &mut rng) {
            match command {
                AiCommand::MoveToward { target, speed } => {
                    velocity.steering = (target - position).normalize_or_zero() * speed;
                }
                AiCommand::MoveDirection { direction, speed } => {
                    velocity.steering = direction.normalize_or_zero() * speed;
                }
                AiCommand::Stop => velocity.steering = Vec2::ZERO,
                AiCommand::Impulse(impulse) => velocity.impulse += impulse,
                AiCommand::FireProjectiles {
                    count,
                    spread_deg,
                    damage,
                    speed,
                    is_fire,
                    on_hit,
                } => {
                    spawn_volley(
                        &mut commands,
                        &Volley {
                            owner: Some(entity),
                            faction: Faction::Enemy,
                            origin: position,
                            direction: player_position - position,
                            count,
                            spread_deg,
                            speed,
                            damage: damage * enemy.damage_multiplier,
                            is_fire,
                            on_hit,
                            cause: DamageCause::EnemyAbility(combatant.name.clone()),
                        },
                    );
                }
                AiCommand::MeteorShower {
                    count,
                    damage,
                    radius,
                    delay,
                } => {
                    for i in 0..count {
                        let offset =
                            rng.random_direction() * rng.random_range(0.0, METEOR_SCATTER);
                        commands.spawn(MeteorStrike {
                            owner: Some(entity),
                            position: player_position + offset,
                            delay: delay + i as f32 * METEOR_STAGGER,
                            damage: damage * enemy.damage_multiplier,
                            radius,
                            cause: DamageCause::EnemyAbility(combatant.name.clone()),
                        });
                    }
                    combat_log.log(
                        CombatLogEventType::EnemyAction,
                        format!("{} calls down {} meteors", combatant.name, count),
                    );
                }
                AiCommand::ContactDamage {
                    amount,
                    knockback: push,
                } => {
                    damage_events.send(DamageEvent {
                        source: Some(entity),
                        target: player,
                        amount: amount * enemy.damage_multiplier,
                        is_fire: false,
                        cause: DamageCause::Contact(combatant.name.clone()),
                    });
                    knockback += push;
                }
                AiCommand::Heal(amount) => {
                    healing_events.send(HealingEvent {
                        target: entity,
                        amount,
                        source: combatant.name.clone(),
                    });
                }
                AiCommand::ApplyStatus {
                    target,
                    kind,
                    magnitude,
                    duration,
                } => {
                    status_events.send(ApplyStatusEvent {
                        target: match target {
                            AiTarget::Myself => entity,
                            AiTarget::Player => player,
                        },
                        kind,
                        magnitude,
                        duration,
                        source: combatant.name.clone(),
                    });
                }
                AiCommand::Teleport(destination) => {
                    transform.translation = destination.extend(0.0);
                    velocity.steering = Vec2::ZERO;
                }
                AiCommand::TeleportPhase(phase) => {
                    debug!("{} teleport phase {:?}", combatant.name, phase);
                }
                AiCommand::Enrage => {
                    combat_log.log(
                        CombatLogEventType::EnemyAction,
                        format!("{} becomes enraged!", combatant.name),
                    );
                }
                AiCommand::BeginStageTransition => {
                    combat_log.log(
                        CombatLogEventType::EnemyAction,
                        format!("{} begins to transform", combatant.name),
                    );
                }
                AiCommand::SpawnStageTwo(kinds) => {
                    let count = kinds.len().max(1) as f32;
                    for (i, kind) in kinds.iter().enumerate() {
                        let angle = std::f32::consts::TAU * i as f32 / count;
                        let at = position + Vec2::from_angle(angle) * STAGE_TWO_RING;
                        spawn_enemy(
                            &mut commands,
                            &definitions,
                            *kind,
                            at,
                            enemy.damage_multiplier,
                            &mut rng,
                        );
                    }
                    commands.entity(entity).despawn_recursive();
                    info!("{} splits into {} stage-two bosses", combatant.name, kinds.len());
                    combat_log.log(
                        CombatLogEventType::EnemyAction,
                        format!("{} splits into {} foes", combatant.name, kinds.len()),
                    );
                }
            }
        }
    }

    player_velocity.impulse += knockback;
}
