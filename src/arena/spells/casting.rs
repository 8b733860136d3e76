//! Spell casting systems
//!
//! Turns `CastSpellEvent`s into spell effects: projectile volleys, novas,
//! heals and self buffs. Card cooldowns are ticked here too.

use bevy::prelude::*;

use crate::arena::components::{Combatant, Dead, Enemy, GameRng, Player, RunStats};
use crate::arena::projectiles::{spawn_volley, Faction, Volley};
use crate::arena::status::StatusPayload;
use crate::combat::events::{
    ApplyStatusEvent, CastSpellEvent, DamageCause, DamageEvent, HealingEvent, MasteryReachedEvent,
};
use crate::combat::log::{CombatLog, CombatLogEventType};
use crate::settings::Preferences;

use super::book::SpellBook;
use super::card::{CastOutcome, SpellHand};
use super::config::{SpellDefinitions, SpellEffect};

/// Advance card cooldowns and draw into freed slots.
pub fn tick_spell_cards(
    time: Res<Time>,
    mut hand: ResMut<SpellHand>,
    book: Res<SpellBook>,
    definitions: Res<SpellDefinitions>,
    mut rng: ResMut<GameRng>,
) {
    let refilled = hand.tick(time.delta_secs(), &book, &definitions, &mut rng);
    for slot in refilled {
        debug!("Card slot {} refilled", slot);
    }
}

/// Resolve cast and discard requests against the player's hand.
#[allow(clippy::too_many_arguments)]
pub fn resolve_spell_casts(
    mut commands: Commands,
    mut cast_events: EventReader<CastSpellEvent>,
    mut hand: ResMut<SpellHand>,
    mut book: ResMut<SpellBook>,
    definitions: Res<SpellDefinitions>,
    mut prefs: ResMut<Preferences>,
    mut stats: ResMut<RunStats>,
    mut combat_log: ResMut<CombatLog>,
    mut players: Query<(Entity, &Transform, &mut Combatant), (With<Player>, Without<Dead>)>,
    enemies: Query<(Entity, &Transform), (With<Enemy>, Without<Dead>)>,
    mut damage_events: EventWriter<DamageEvent>,
    mut healing_events: EventWriter<HealingEvent>,
    mut status_events: EventWriter<ApplyStatusEvent>,
    mut mastery_events: EventWriter<MasteryReachedEvent>,
) {
    let Ok((player, player_transform, mut caster)) = players.get_single_mut() else {
        cast_events.clear();
        return;
    };
    let origin = player_transform.translation.truncate();

    for request in cast_events.read() {
        if request.discard {
            match hand.discard(request.slot, &book, &definitions) {
                Ok(cooldown) => {
                    stats.cards_discarded += 1;
                    debug!("Discarded card {} ({:.1}s cooldown)", request.slot, cooldown);
                }
                Err(reason) => debug!("Discard of slot {} rejected: {}", request.slot, reason),
            }
            continue;
        }

        let outcome = match hand.cast(request.slot, &mut caster, &mut book, &definitions) {
            Ok(outcome) => outcome,
            Err(reason) => {
                debug!("Cast from slot {} rejected: {}", request.slot, reason);
                continue;
            }
        };
        stats.spells_cast += 1;
        combat_log.log_amount(
            CombatLogEventType::SpellCast,
            &outcome.name,
            outcome.mana_spent,
            format!(
                "{} casts {} ({})",
                caster.name,
                outcome.name,
                outcome.tier.name()
            ),
        );

        let cause = DamageCause::Spell(outcome.name.clone());
        let status_request = |target: Entity, payload: &StatusPayload| ApplyStatusEvent {
            target,
            kind: payload.kind,
            magnitude: payload.magnitude,
            duration: payload.duration,
            source: outcome.name.clone(),
        };

        match &outcome.effect {
            SpellEffect::Projectile {
                damage,
                speed,
                count,
                spread_deg,
                is_fire,
                on_hit,
            } => {
                spawn_volley(
                    &mut commands,
                    &Volley {
                        owner: Some(player),
                        faction: Faction::Player,
                        origin,
                        direction: request.aim - origin,
                        count: *count,
                        spread_deg: *spread_deg,
                        speed: *speed,
                        damage: *damage,
                        is_fire: *is_fire,
                        on_hit: *on_hit,
                        cause,
                    },
                );
            }
            SpellEffect::Nova {
                damage,
                radius,
                is_fire,
                on_hit,
            } => {
                for (enemy, transform) in enemies.iter() {
                    if transform.translation.truncate().distance(origin) > *radius {
                        continue;
                    }
                    damage_events.send(DamageEvent {
                        source: Some(player),
                        target: enemy,
                        amount: *damage,
                        is_fire: *is_fire,
                        cause: cause.clone(),
                    });
                    if let Some(payload) = on_hit {
                        status_events.send(status_request(enemy, payload));
                    }
                }
            }
            SpellEffect::Heal { amount } => {
                healing_events.send(HealingEvent {
                    target: player,
                    amount: *amount,
                    source: outcome.name.clone(),
                });
            }
            SpellEffect::RestoreMana { amount } => {
                let gained = caster.add_mana(*amount);
                combat_log.log(
                    CombatLogEventType::Healing,
                    format!("{} restores {:.0} mana", caster.name, gained),
                );
            }
            SpellEffect::SelfStatus(payload) => {
                status_events.send(status_request(player, payload));
            }
        }

        book.write_preferences(&definitions, &mut prefs);
        announce_mastery(&outcome, &prefs, &mut stats, &mut combat_log, &mut mastery_events);
    }
}

fn announce_mastery(
    outcome: &CastOutcome,
    prefs: &Preferences,
    stats: &mut RunStats,
    combat_log: &mut CombatLog,
    mastery_events: &mut EventWriter<MasteryReachedEvent>,
) {
    let Some(tier) = outcome.mastery_reached else {
        return;
    };
    stats.masteries_reached += 1;
    info!("{} reached {} mastery", outcome.name, tier.name());
    combat_log.log(
        CombatLogEventType::Mastery,
        format!("{} reached {} mastery", outcome.name, tier.name()),
    );
    mastery_events.send(MasteryReachedEvent {
        spell: outcome.name.clone(),
        tier,
    });
    if let Err(e) = prefs.save() {
        warn!("Could not persist spell mastery: {}", e);
    }
}
