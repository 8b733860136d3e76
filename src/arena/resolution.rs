//! Combat resolution
//!
//! Consumes the frame's damage and healing events, regenerates mana, moves
//! bodies and handles deaths. Everything that changes a combatant's health
//! from outside passes through here.

use bevy::prelude::*;

use crate::combat::events::{CombatantDeathEvent, DamageCause, DamageEvent, HealingEvent};
use crate::combat::log::{CombatLog, CombatLogEventType};

use super::components::{Combatant, Dead, Player, RunStats, Velocity};
use super::constants::FROZEN_MOVE_MULTIPLIER;
use super::status::StatusEffects;

/// Apply queued damage.
///
/// Damage taken by a reflecting target bounces back to the source as
/// `DamageCause::Reflect`; reflected damage itself is never reflected.
pub fn apply_damage_events(
    mut events: EventReader<DamageEvent>,
    mut combat_log: ResMut<CombatLog>,
    mut combatants: Query<&mut Combatant, Without<Dead>>,
) {
    for event in events.read() {
        let (outcome, target_name) = {
            let Ok(mut target) = combatants.get_mut(event.target) else {
                continue;
            };
            (target.take_damage(event.amount, event.is_fire), target.name.clone())
        };
        let dealt = outcome.health_lost + outcome.absorbed;
        if dealt <= 0.0 {
            continue;
        }

        combat_log.log_amount(
            CombatLogEventType::Damage,
            event.cause.label(),
            outcome.health_lost,
            if outcome.absorbed > 0.0 {
                format!(
                    "{} hits {} for {:.0} ({:.0} absorbed)",
                    event.cause.label(),
                    target_name,
                    outcome.health_lost,
                    outcome.absorbed
                )
            } else {
                format!(
                    "{} hits {} for {:.0}",
                    event.cause.label(),
                    target_name,
                    outcome.health_lost
                )
            },
        );

        let Some(source_entity) = event.source else {
            continue;
        };
        let Ok(mut source) = combatants.get_mut(source_entity) else {
            continue;
        };
        source.damage_dealt += dealt;

        if outcome.reflected > 0.0 && event.cause != DamageCause::Reflect {
            let bounced = source.take_damage(outcome.reflected, false);
            if bounced.health_lost + bounced.absorbed > 0.0 {
                combat_log.log_amount(
                    CombatLogEventType::Damage,
                    DamageCause::Reflect.label(),
                    bounced.health_lost,
                    format!(
                        "{} reflects {:.0} back at {}",
                        target_name, bounced.health_lost, source.name
                    ),
                );
            }
        }
    }
}

/// Apply queued healing.
pub fn apply_healing_events(
    mut events: EventReader<HealingEvent>,
    mut combat_log: ResMut<CombatLog>,
    mut combatants: Query<&mut Combatant, Without<Dead>>,
) {
    for event in events.read() {
        let Ok(mut target) = combatants.get_mut(event.target) else {
            continue;
        };
        let healed = target.add_health(event.amount);
        if healed > 0.0 {
            combat_log.log_amount(
                CombatLogEventType::Healing,
                event.source.clone(),
                healed,
                format!("{} heals {} for {:.0}", event.source, target.name, healed),
            );
        }
    }
}

pub fn regenerate_mana(time: Res<Time>, mut combatants: Query<&mut Combatant, Without<Dead>>) {
    let dt = time.delta_secs();
    for mut combatant in combatants.iter_mut() {
        combatant.regenerate_mana(dt);
    }
}

/// Move bodies by their velocity. Frozen bodies ignore steering but still
/// get pushed by impulses.
pub fn integrate_motion(
    time: Res<Time>,
    mut bodies: Query<(&mut Transform, &mut Velocity, &Combatant), Without<Dead>>,
) {
    let dt = time.delta_secs();
    for (mut transform, mut velocity, combatant) in bodies.iter_mut() {
        let steering = if combatant.frozen {
            velocity.steering * FROZEN_MOVE_MULTIPLIER
        } else {
            velocity.steering
        };
        transform.translation += ((steering + velocity.impulse) * dt).extend(0.0);
        velocity.damp(dt);
    }
}

/// Turn zero-health combatants into deaths: clear their effects, mark the
/// player `Dead`, despawn enemies.
pub fn check_deaths(
    mut commands: Commands,
    mut combat_log: ResMut<CombatLog>,
    mut stats: ResMut<RunStats>,
    mut death_events: EventWriter<CombatantDeathEvent>,
    mut combatants: Query<
        (Entity, &mut Combatant, Option<&mut StatusEffects>, Has<Player>),
        Without<Dead>,
    >,
) {
    for (entity, mut combatant, statuses, is_player) in combatants.iter_mut() {
        if combatant.is_alive() {
            continue;
        }
        if let Some(mut statuses) = statuses {
            statuses.clear(&mut combatant);
        }

        combat_log.log(
            CombatLogEventType::Death,
            format!("{} has been defeated", combatant.name),
        );
        death_events.send(CombatantDeathEvent {
            victim: entity,
            name: combatant.name.clone(),
            was_player: is_player,
        });

        if is_player {
            info!("{} has fallen", combatant.name);
            commands.entity(entity).insert(Dead);
        } else {
            stats.enemies_killed += 1;
            commands.entity(entity).despawn_recursive();
        }
    }
}
