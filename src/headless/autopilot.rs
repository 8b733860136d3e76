//! Autopilot player
//!
//! Stands in for player input during headless runs. Every decision interval
//! it picks one card to cast (or discard) and keeps the wizard away from
//! whatever is closest.

use bevy::prelude::*;

use crate::arena::components::{Combatant, Dead, Enemy, Player, Velocity};
use crate::arena::spells::{SpellBook, SpellDefinitions, SpellEffect, SpellHand};
use crate::arena::status::StatusEffects;
use crate::combat::events::CastSpellEvent;

/// Seconds between autopilot decisions
pub const DECISION_INTERVAL: f32 = 0.5;
/// Heal below this health fraction
const HEAL_THRESHOLD: f32 = 0.7;
/// Restore mana below this mana fraction
const MANA_THRESHOLD: f32 = 0.5;
/// Back away from enemies closer than this
const KITE_DISTANCE: f32 = 4.0;
/// Drift back towards the arena centre beyond this
const LEASH_DISTANCE: f32 = 10.0;
const MOVE_SPEED: f32 = 4.0;

#[derive(Resource, Debug, Default)]
pub struct AutopilotState {
    pub cooldown: f32,
}

/// What the autopilot wants to do with its hand this decision
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutopilotAction {
    Cast { slot: usize, aim: Vec2 },
    Discard { slot: usize },
}

/// Everything the autopilot looks at when choosing a card
pub struct AutopilotView<'a> {
    pub player: &'a Combatant,
    pub statuses: &'a StatusEffects,
    pub position: Vec2,
    pub nearest_enemy: Option<Vec2>,
}

/// Pick the first ready card worth casting, or a card to throw away.
///
/// A card is discarded only when mana is full and the card still costs
/// more than the wizard has.
pub fn choose_action(
    view: &AutopilotView,
    hand: &SpellHand,
    book: &SpellBook,
    definitions: &SpellDefinitions,
) -> Option<AutopilotAction> {
    if view.player.frozen {
        return None;
    }
    let mana_full = view.player.current_mana >= view.player.max_mana;
    let mut discard = None;

    for (slot, card) in hand.cards().iter().enumerate() {
        let Some(spell_index) = card.ready_spell() else {
            continue;
        };
        let Some(spell) = definitions.get(spell_index) else {
            continue;
        };
        let tier = spell.tier(book.tier(definitions, spell_index));
        if tier.mana_cost > view.player.current_mana {
            if mana_full && discard.is_none() {
                discard = Some(AutopilotAction::Discard { slot });
            }
            continue;
        }
        if wants(&tier.effect, view) {
            return Some(AutopilotAction::Cast {
                slot,
                aim: view.nearest_enemy.unwrap_or(view.position),
            });
        }
    }
    discard
}

fn wants(effect: &SpellEffect, view: &AutopilotView) -> bool {
    let player = view.player;
    if effect.is_offensive() && view.nearest_enemy.is_none() {
        return false;
    }
    match effect {
        SpellEffect::Projectile { .. } => true,
        SpellEffect::Nova { radius, .. } => view
            .nearest_enemy
            .is_some_and(|enemy| enemy.distance(view.position) <= *radius),
        SpellEffect::Heal { .. } => player.health_fraction() < HEAL_THRESHOLD,
        SpellEffect::RestoreMana { .. } => {
            player.max_mana > 0.0 && player.current_mana / player.max_mana < MANA_THRESHOLD
        }
        SpellEffect::SelfStatus(payload) => {
            view.nearest_enemy.is_some() && !view.statuses.is_active(payload.kind)
        }
    }
}

/// Steering for the autopilot: flee the nearest enemy when it gets close,
/// otherwise stay near the centre.
pub fn steer(position: Vec2, nearest_enemy: Option<Vec2>) -> Vec2 {
    if let Some(enemy) = nearest_enemy {
        let away = position - enemy;
        if away.length() < KITE_DISTANCE {
            return away.normalize_or(Vec2::X) * MOVE_SPEED;
        }
    }
    if position.length() > LEASH_DISTANCE {
        return -position.normalize_or_zero() * MOVE_SPEED;
    }
    Vec2::ZERO
}

/// Drive the player: move every frame, decide on cards every interval.
#[allow(clippy::too_many_arguments)]
pub fn run_autopilot(
    time: Res<Time>,
    mut autopilot: ResMut<AutopilotState>,
    hand: Res<SpellHand>,
    book: Res<SpellBook>,
    definitions: Res<SpellDefinitions>,
    mut players: Query<
        (&Transform, &Combatant, &StatusEffects, &mut Velocity),
        (With<Player>, Without<Dead>),
    >,
    enemies: Query<&Transform, (With<Enemy>, Without<Dead>)>,
    mut casts: EventWriter<CastSpellEvent>,
) {
    let Ok((transform, player, statuses, mut velocity)) = players.get_single_mut() else {
        return;
    };
    let position = transform.translation.truncate();
    let nearest_enemy = enemies
        .iter()
        .map(|t| t.translation.truncate())
        .min_by(|a, b| a.distance_squared(position).total_cmp(&b.distance_squared(position)));

    velocity.steering = steer(position, nearest_enemy);

    autopilot.cooldown -= time.delta_secs();
    if autopilot.cooldown > 0.0 {
        return;
    }

    let view = AutopilotView {
        player,
        statuses,
        position,
        nearest_enemy,
    };
    let Some(action) = choose_action(&view, &hand, &book, &definitions) else {
        return;
    };
    autopilot.cooldown = DECISION_INTERVAL;
    casts.send(match action {
        AutopilotAction::Cast { slot, aim } => CastSpellEvent {
            slot,
            aim,
            discard: false,
        },
        AutopilotAction::Discard { slot } => CastSpellEvent {
            slot,
            aim: position,
            discard: true,
        },
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::components::GameRng;
    use crate::arena::spells::CardDrawMode;

    const BOLT: &str = r#"(
        spells: [(
            name: "Bolt",
            amount_in_deck: 1,
            unlocked_by_default: true,
            flawless_requirement: 5,
            masterful_requirement: 5,
            basic: (mana_cost: 10.0, cooldown: 1.0, effect: Projectile(damage: 10.0, speed: 10.0)),
            flawless: (mana_cost: 10.0, cooldown: 1.0, effect: Projectile(damage: 10.0, speed: 10.0)),
            masterful: (mana_cost: 10.0, cooldown: 1.0, effect: Projectile(damage: 10.0, speed: 10.0)),
        )],
    )"#;

    const METEOR: &str = r#"(
        spells: [(
            name: "Meteor",
            amount_in_deck: 1,
            unlocked_by_default: true,
            flawless_requirement: 5,
            masterful_requirement: 5,
            basic: (mana_cost: 500.0, cooldown: 1.0, effect: Nova(damage: 99.0, radius: 50.0)),
            flawless: (mana_cost: 500.0, cooldown: 1.0, effect: Nova(damage: 99.0, radius: 50.0)),
            masterful: (mana_cost: 500.0, cooldown: 1.0, effect: Nova(damage: 99.0, radius: 50.0)),
        )],
    )"#;

    fn hand_of(spells: &str) -> (SpellHand, SpellBook, SpellDefinitions) {
        let defs = SpellDefinitions::from_ron_str(spells, "inline").unwrap();
        let book = SpellBook::new(&defs);
        let mut rng = GameRng::from_seed(1);
        let hand = SpellHand::new(1, CardDrawMode::Weighted, &book, &defs, &mut rng);
        (hand, book, defs)
    }

    #[test]
    fn test_casts_projectile_at_nearest_enemy() {
        let (hand, book, defs) = hand_of(BOLT);
        let player = Combatant::new("Wizard", 100.0, 100.0);
        let statuses = StatusEffects::default();
        let view = AutopilotView {
            player: &player,
            statuses: &statuses,
            position: Vec2::ZERO,
            nearest_enemy: Some(Vec2::new(5.0, 0.0)),
        };
        assert_eq!(
            choose_action(&view, &hand, &book, &defs),
            Some(AutopilotAction::Cast {
                slot: 0,
                aim: Vec2::new(5.0, 0.0)
            })
        );
    }

    #[test]
    fn test_holds_fire_without_enemies() {
        let (hand, book, defs) = hand_of(BOLT);
        let player = Combatant::new("Wizard", 100.0, 100.0);
        let statuses = StatusEffects::default();
        let view = AutopilotView {
            player: &player,
            statuses: &statuses,
            position: Vec2::ZERO,
            nearest_enemy: None,
        };
        assert_eq!(choose_action(&view, &hand, &book, &defs), None);
    }

    #[test]
    fn test_frozen_player_does_nothing() {
        let (hand, book, defs) = hand_of(BOLT);
        let mut player = Combatant::new("Wizard", 100.0, 100.0);
        player.frozen = true;
        let statuses = StatusEffects::default();
        let view = AutopilotView {
            player: &player,
            statuses: &statuses,
            position: Vec2::ZERO,
            nearest_enemy: Some(Vec2::X),
        };
        assert_eq!(choose_action(&view, &hand, &book, &defs), None);
    }

    #[test]
    fn test_discards_unaffordable_card_only_at_full_mana() {
        let (hand, book, defs) = hand_of(METEOR);
        let statuses = StatusEffects::default();

        let full = Combatant::new("Wizard", 100.0, 100.0);
        let view = AutopilotView {
            player: &full,
            statuses: &statuses,
            position: Vec2::ZERO,
            nearest_enemy: Some(Vec2::X),
        };
        assert_eq!(
            choose_action(&view, &hand, &book, &defs),
            Some(AutopilotAction::Discard { slot: 0 })
        );

        let mut drained = Combatant::new("Wizard", 100.0, 100.0);
        drained.current_mana = 40.0;
        let view = AutopilotView {
            player: &drained,
            ..view
        };
        assert_eq!(choose_action(&view, &hand, &book, &defs), None);
    }

    #[test]
    fn test_steer_kites_and_leashes() {
        let away = steer(Vec2::ZERO, Some(Vec2::new(1.0, 0.0)));
        assert!(away.x < 0.0);

        let home = steer(Vec2::new(20.0, 0.0), None);
        assert!(home.x < 0.0);

        assert_eq!(steer(Vec2::ZERO, Some(Vec2::new(8.0, 0.0))), Vec2::ZERO);
    }
}
