//! Property tests for the combatant damage model and status effects
//!
//! These tests verify that:
//! - Shields absorb damage before health
//! - Health and mana stay within [0, max] after any mutation
//! - Re-applying a restarting status resets its duration and keeps the larger magnitude
//! - Burn deals one scaled tick per second at any frame rate

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use cards_of_wizardry::arena::components::Combatant;
use cards_of_wizardry::arena::status::{StatusEffects, StatusKind};

const EPSILON: f32 = 1e-3;

fn shielded(max_health: f32, shield: f32) -> Combatant {
    let mut combatant = Combatant::new("Dummy", max_health, 50.0);
    combatant.shield = shield;
    combatant
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    /// Damage no deeper than the shield never touches health.
    #[test]
    fn prop_shield_absorbs_shallow_damage(
        shield in 1.0f32..500.0,
        fraction in 0.0f32..=1.0,
    ) {
        let amount = shield * fraction;
        let mut combatant = shielded(100.0, shield);
        combatant.take_damage(amount, false);

        prop_assert_eq!(combatant.current_health, 100.0);
        prop_assert!((combatant.shield - (shield - amount)).abs() < EPSILON);
    }

    /// Damage deeper than the shield empties it and the rest hits health.
    #[test]
    fn prop_overflow_reaches_health(
        shield in 0.0f32..50.0,
        overflow in 0.01f32..50.0,
    ) {
        let mut combatant = shielded(100.0, shield);
        combatant.take_damage(shield + overflow, false);

        prop_assert_eq!(combatant.shield, 0.0);
        prop_assert!((combatant.current_health - (100.0 - overflow)).abs() < EPSILON);
    }

    /// Any sequence of damage, healing and mana changes stays in bounds.
    #[test]
    fn prop_health_and_mana_clamped(
        ops in prop::collection::vec((0u8..4, 0.0f32..300.0), 1..40),
    ) {
        let mut combatant = Combatant::new("Dummy", 120.0, 80.0).with_regen(5.0);
        for (op, amount) in ops {
            match op {
                0 => { combatant.take_damage(amount, false); }
                1 => { combatant.add_health(amount); }
                2 => { combatant.add_mana(amount); }
                _ => { combatant.spend_mana(amount); }
            }
            prop_assert!(combatant.current_health >= 0.0);
            prop_assert!(combatant.current_health <= combatant.max_health);
            prop_assert!(combatant.current_mana >= 0.0);
            prop_assert!(combatant.current_mana <= combatant.max_mana);
            prop_assert!(combatant.shield >= 0.0);
        }
    }

    /// Strength never increases damage and never turns it negative.
    #[test]
    fn prop_mitigation_bounded(strength in 0.0f32..1000.0, amount in 0.0f32..1000.0) {
        let mut combatant = Combatant::new("Dummy", 100.0, 0.0);
        combatant.strength = strength;
        let mitigated = combatant.mitigate(amount);
        prop_assert!(mitigated >= 0.0);
        prop_assert!(mitigated <= amount + EPSILON);
    }

    /// Burn, Freeze, Shield and Reflect restart on re-application.
    #[test]
    fn prop_restarting_status_resets_duration(
        kind_index in 0usize..4,
        first in (1.0f32..100.0, 0.5f32..20.0),
        second in (1.0f32..100.0, 0.5f32..20.0),
        elapsed in 0.0f32..0.4,
    ) {
        let kinds = [
            StatusKind::Burn,
            StatusKind::Freeze,
            StatusKind::Shield,
            StatusKind::Reflect,
        ];
        let kind = kinds[kind_index];
        let mut combatant = Combatant::new("Dummy", 1000.0, 0.0);
        let mut statuses = StatusEffects::default();

        statuses.apply(kind, first.0, first.1, &mut combatant);
        statuses.tick(elapsed, &mut combatant);
        statuses.apply(kind, second.0, second.1, &mut combatant);

        prop_assert_eq!(statuses.remaining(kind), Some(second.1));
        prop_assert_eq!(statuses.magnitude(kind), Some(first.0.max(second.0)));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Stepping at the runner's timestep never drops or adds a burn tick.
    #[test]
    fn prop_burn_total_matches_duration(
        tick_rate in 20u32..=240,
        duration in 1u32..=15,
        burn_scale in 0.2f32..=1.0,
    ) {
        let mut combatant = Combatant::new("Dummy", 1000.0, 0.0);
        let mut statuses = StatusEffects::with_burn_scale(burn_scale);
        statuses.apply(StatusKind::Burn, 0.0, duration as f32, &mut combatant);

        let dt = 1.0 / tick_rate as f32;
        let max_frames = (duration + 1) * tick_rate;
        let mut frames = 0;
        while statuses.is_active(StatusKind::Burn) && frames < max_frames {
            statuses.tick(dt, &mut combatant);
            frames += 1;
        }

        prop_assert!(!statuses.is_active(StatusKind::Burn));
        let dealt = 1000.0 - combatant.current_health;
        let expected = 10.0 * duration as f32 * burn_scale;
        prop_assert!((dealt - expected).abs() < 0.01, "dealt {} expected {}", dealt, expected);
    }
}

#[test]
fn test_worked_example_shield_then_overflow() {
    let mut combatant = Combatant::new("Dummy", 100.0, 0.0);
    combatant.take_damage(30.0, false);
    assert_eq!(combatant.current_health, 70.0);
    assert_eq!(combatant.shield, 0.0);

    let mut statuses = StatusEffects::default();
    statuses.apply(StatusKind::Shield, 50.0, 10.0, &mut combatant);
    combatant.take_damage(80.0, false);
    assert_eq!(combatant.shield, 0.0);
    assert_eq!(combatant.current_health, 40.0);
}

#[test]
fn test_temp_max_mana_extends_while_temp_max_health_restarts() {
    let mut combatant = Combatant::new("Dummy", 100.0, 100.0);
    let mut statuses = StatusEffects::default();

    statuses.apply(StatusKind::TempMaxMana, 20.0, 10.0, &mut combatant);
    statuses.apply(StatusKind::TempMaxMana, 20.0, 10.0, &mut combatant);
    assert_eq!(statuses.remaining(StatusKind::TempMaxMana), Some(20.0));
    assert_eq!(combatant.max_mana, 120.0);

    statuses.apply(StatusKind::TempMaxHealth, 20.0, 10.0, &mut combatant);
    statuses.apply(StatusKind::TempMaxHealth, 20.0, 10.0, &mut combatant);
    assert_eq!(statuses.remaining(StatusKind::TempMaxHealth), Some(10.0));
    assert_eq!(combatant.max_health, 120.0);
}

#[test]
fn test_death_is_idempotent() {
    let mut combatant = Combatant::new("Dummy", 10.0, 0.0);
    let first = combatant.take_damage(50.0, false);
    assert!(first.killed);
    let second = combatant.take_damage(50.0, false);
    assert!(!second.killed);
    assert_eq!(second.health_lost, 0.0);
    assert_eq!(combatant.current_health, 0.0);
}

#[test]
fn test_immortal_floors_at_one() {
    let mut combatant = Combatant::new("Boss", 100.0, 0.0);
    combatant.immortal = true;
    let outcome = combatant.take_damage(500.0, false);
    assert!(!outcome.killed);
    assert_eq!(combatant.current_health, 1.0);
    assert!(combatant.is_alive());
}
