//! Status Effect Systems
//!
//! Timed numeric modifiers on a combatant: burn, freeze, shield, reflect and
//! temporary max health/mana. Each effect is a timer entry advanced by the
//! frame delta; cancelling an effect means removing its entry.
//!
//! Effects write their modifier onto the `Combatant` when applied and unwind
//! it when they expire, so the damage pipeline only ever reads combatant fields.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::combat::events::ApplyStatusEvent;
use crate::combat::log::{CombatLog, CombatLogEventType};

use super::components::{Combatant, DamageOutcome, Dead};
use super::constants::{BURN_TICK_DAMAGE, BURN_TICK_INTERVAL, STATUS_TIMER_EPSILON};

/// Kinds of status effect. At most one of each is active per combatant.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum StatusKind {
    /// Fire damage once per second (magnitude unused)
    Burn,
    /// Cannot cast or move (magnitude unused)
    Freeze,
    /// Shield depth (magnitude = shield amount)
    Shield,
    /// Reflects health damage back to attackers (magnitude = intensity)
    Reflect,
    /// Flat max health bonus
    TempMaxHealth,
    /// Flat max mana bonus
    TempMaxMana,
}

/// A status effect carried by a spell, projectile or enemy ability.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct StatusPayload {
    pub kind: StatusKind,
    #[serde(default)]
    pub magnitude: f32,
    pub duration: f32,
}

/// How a re-application of an active effect treats its remaining duration.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ReapplyPolicy {
    /// Remaining duration becomes the new duration
    Restart,
    /// New duration is added to what remains
    Extend,
}

impl StatusKind {
    pub fn name(&self) -> &'static str {
        match self {
            StatusKind::Burn => "Burn",
            StatusKind::Freeze => "Freeze",
            StatusKind::Shield => "Shield",
            StatusKind::Reflect => "Reflect",
            StatusKind::TempMaxHealth => "Vitality",
            StatusKind::TempMaxMana => "Clarity",
        }
    }

    pub fn reapply_policy(&self) -> ReapplyPolicy {
        match self {
            StatusKind::TempMaxMana => ReapplyPolicy::Extend,
            _ => ReapplyPolicy::Restart,
        }
    }
}

/// One active effect on a combatant.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusEffect {
    pub kind: StatusKind,
    pub magnitude: f32,
    /// Seconds until the effect expires
    pub remaining: f32,
    /// Seconds until the next periodic tick (burn only)
    pub time_until_tick: f32,
}

/// What happened when an effect was applied.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StatusApplication {
    Applied,
    /// Was active; duration restarted
    Refreshed,
    /// Was active; duration extended
    Extended,
    /// Target is immune or dead
    Resisted,
}

/// Something the status tick did to the combatant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StatusTick {
    /// A burn tick went through the damage pipeline
    BurnDamage(DamageOutcome),
    /// Effect ran out (or its shield was depleted) and was unwound
    Expired(StatusKind),
}

/// All active effects on one combatant.
#[derive(Component, Clone, Debug)]
pub struct StatusEffects {
    effects: SmallVec<[StatusEffect; 6]>,
    /// Multiplier on burn damage received (inverse of survival difficulty)
    pub burn_scale: f32,
}

impl Default for StatusEffects {
    fn default() -> Self {
        Self {
            effects: SmallVec::new(),
            burn_scale: 1.0,
        }
    }
}

impl StatusEffects {
    pub fn with_burn_scale(burn_scale: f32) -> Self {
        Self {
            burn_scale,
            ..Self::default()
        }
    }

    pub fn get(&self, kind: StatusKind) -> Option<&StatusEffect> {
        self.effects.iter().find(|e| e.kind == kind)
    }

    pub fn is_active(&self, kind: StatusKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn remaining(&self, kind: StatusKind) -> Option<f32> {
        self.get(kind).map(|e| e.remaining)
    }

    pub fn magnitude(&self, kind: StatusKind) -> Option<f32> {
        self.get(kind).map(|e| e.magnitude)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Apply or re-apply an effect.
    ///
    /// Re-application keeps the larger magnitude. Temp max stats only add the
    /// increase over the previous bonus.
    pub fn apply(
        &mut self,
        kind: StatusKind,
        magnitude: f32,
        duration: f32,
        combatant: &mut Combatant,
    ) -> StatusApplication {
        if combatant.is_dead()
            || (kind == StatusKind::Burn && combatant.fire_immune)
            || (kind == StatusKind::Freeze && combatant.freeze_immune)
        {
            return StatusApplication::Resisted;
        }

        if let Some(existing) = self.effects.iter_mut().find(|e| e.kind == kind) {
            let old_magnitude = existing.magnitude;
            existing.magnitude = old_magnitude.max(magnitude);
            let gained = existing.magnitude - old_magnitude;

            let result = match kind.reapply_policy() {
                ReapplyPolicy::Restart => {
                    existing.remaining = duration;
                    StatusApplication::Refreshed
                }
                ReapplyPolicy::Extend => {
                    existing.remaining += duration;
                    StatusApplication::Extended
                }
            };

            match kind {
                StatusKind::Shield => combatant.shield = combatant.shield.max(magnitude),
                StatusKind::Reflect => combatant.reflect_intensity = existing.magnitude,
                StatusKind::TempMaxHealth => combatant.raise_max_health(gained),
                StatusKind::TempMaxMana => combatant.raise_max_mana(gained),
                StatusKind::Burn | StatusKind::Freeze => {}
            }
            return result;
        }

        match kind {
            StatusKind::Burn => combatant.burning = true,
            StatusKind::Freeze => combatant.frozen = true,
            StatusKind::Shield => combatant.shield = combatant.shield.max(magnitude),
            StatusKind::Reflect => combatant.reflect_intensity = magnitude,
            StatusKind::TempMaxHealth => combatant.raise_max_health(magnitude),
            StatusKind::TempMaxMana => combatant.raise_max_mana(magnitude),
        }

        self.effects.push(StatusEffect {
            kind,
            magnitude,
            remaining: duration,
            time_until_tick: BURN_TICK_INTERVAL,
        });
        StatusApplication::Applied
    }

    /// Advance every timer by `dt`.
    ///
    /// Burn ticks fire before expiry so the last tick lands on the final second.
    /// Both timers allow `STATUS_TIMER_EPSILON` of drift from summed deltas.
    pub fn tick(&mut self, dt: f32, combatant: &mut Combatant) -> SmallVec<[StatusTick; 4]> {
        let mut ticks = SmallVec::new();
        if combatant.is_dead() {
            self.clear(combatant);
            return ticks;
        }

        let burn_damage = BURN_TICK_DAMAGE * self.burn_scale;
        let mut expired: SmallVec<[usize; 6]> = SmallVec::new();

        for (index, effect) in self.effects.iter_mut().enumerate() {
            if effect.kind == StatusKind::Burn {
                effect.time_until_tick -= dt;
                while effect.time_until_tick <= STATUS_TIMER_EPSILON && combatant.is_alive() {
                    let outcome = combatant.take_damage(burn_damage, true);
                    ticks.push(StatusTick::BurnDamage(outcome));
                    effect.time_until_tick += BURN_TICK_INTERVAL;
                }
            }

            effect.remaining -= dt;
            let shield_broken = effect.kind == StatusKind::Shield && combatant.shield <= 0.0;
            if effect.remaining <= STATUS_TIMER_EPSILON || shield_broken {
                expired.push(index);
            }
        }

        if combatant.is_dead() {
            self.clear(combatant);
            return ticks;
        }

        for &index in expired.iter().rev() {
            let effect = self.effects.remove(index);
            unwind(&effect, combatant);
            ticks.push(StatusTick::Expired(effect.kind));
        }

        ticks
    }

    /// Drop every effect without touching max stats (used on death).
    pub fn clear(&mut self, combatant: &mut Combatant) {
        self.effects.clear();
        combatant.burning = false;
        combatant.frozen = false;
        combatant.shield = 0.0;
        combatant.reflect_intensity = 0.0;
    }
}

fn unwind(effect: &StatusEffect, combatant: &mut Combatant) {
    match effect.kind {
        StatusKind::Burn => combatant.burning = false,
        StatusKind::Freeze => combatant.frozen = false,
        StatusKind::Shield => combatant.shield = 0.0,
        StatusKind::Reflect => combatant.reflect_intensity = 0.0,
        StatusKind::TempMaxHealth => combatant.lower_max_health(effect.magnitude),
        StatusKind::TempMaxMana => combatant.lower_max_mana(effect.magnitude),
    }
}

/// Apply queued status requests from spells and enemy abilities.
pub fn apply_status_events(
    mut events: EventReader<ApplyStatusEvent>,
    mut combat_log: ResMut<CombatLog>,
    mut combatants: Query<(&mut Combatant, &mut StatusEffects), Without<Dead>>,
) {
    for event in events.read() {
        let Ok((mut combatant, mut statuses)) = combatants.get_mut(event.target) else {
            continue;
        };
        let result = statuses.apply(event.kind, event.magnitude, event.duration, &mut combatant);
        let verb = match result {
            StatusApplication::Applied => "gains",
            StatusApplication::Refreshed => "refreshes",
            StatusApplication::Extended => "extends",
            StatusApplication::Resisted => "resists",
        };
        combat_log.log(
            CombatLogEventType::StatusApplied,
            format!(
                "{} {} {} ({:.0}, {:.1}s) from {}",
                combatant.name,
                verb,
                event.kind.name(),
                event.magnitude,
                event.duration,
                event.source
            ),
        );
    }
}

/// Tick all status timers. Runs before anything that reads `frozen` this frame.
pub fn tick_status_effects(
    time: Res<Time>,
    mut combat_log: ResMut<CombatLog>,
    mut combatants: Query<(&mut Combatant, &mut StatusEffects), Without<Dead>>,
) {
    let dt = time.delta_secs();

    for (mut combatant, mut statuses) in combatants.iter_mut() {
        if statuses.is_empty() {
            continue;
        }
        for tick in statuses.tick(dt, &mut combatant) {
            match tick {
                StatusTick::BurnDamage(outcome) => {
                    combat_log.log_amount(
                        CombatLogEventType::Damage,
                        "Burn",
                        outcome.health_lost,
                        format!(
                            "{} burns for {:.0} ({:.0} absorbed)",
                            combatant.name, outcome.health_lost, outcome.absorbed
                        ),
                    );
                }
                StatusTick::Expired(kind) => {
                    combat_log.log(
                        CombatLogEventType::StatusRemoved,
                        format!("{}'s {} fades", combatant.name, kind.name()),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy() -> Combatant {
        Combatant::new("Dummy", 100.0, 100.0)
    }

    #[test]
    fn test_reapply_restarts_and_keeps_max_magnitude() {
        let mut c = dummy();
        let mut s = StatusEffects::default();
        s.apply(StatusKind::Reflect, 0.8, 5.0, &mut c);
        s.tick(3.0, &mut c);
        assert_eq!(s.apply(StatusKind::Reflect, 0.5, 4.0, &mut c), StatusApplication::Refreshed);
        assert_eq!(s.remaining(StatusKind::Reflect), Some(4.0));
        assert_eq!(s.magnitude(StatusKind::Reflect), Some(0.8));
        assert_eq!(c.reflect_intensity, 0.8);
    }

    #[test]
    fn test_temp_max_mana_extends() {
        let mut c = dummy();
        let mut s = StatusEffects::default();
        s.apply(StatusKind::TempMaxMana, 50.0, 10.0, &mut c);
        assert_eq!(c.max_mana, 150.0);
        s.tick(4.0, &mut c);
        assert_eq!(
            s.apply(StatusKind::TempMaxMana, 50.0, 10.0, &mut c),
            StatusApplication::Extended
        );
        assert_eq!(s.remaining(StatusKind::TempMaxMana), Some(16.0));
        assert_eq!(c.max_mana, 150.0);
    }

    #[test]
    fn test_temp_max_health_unwinds_on_expiry() {
        let mut c = dummy();
        let mut s = StatusEffects::default();
        s.apply(StatusKind::TempMaxHealth, 40.0, 2.0, &mut c);
        s.apply(StatusKind::TempMaxHealth, 60.0, 2.0, &mut c);
        assert_eq!(c.max_health, 160.0);
        let ticks = s.tick(2.5, &mut c);
        assert!(ticks.contains(&StatusTick::Expired(StatusKind::TempMaxHealth)));
        assert_eq!(c.max_health, 100.0);
        assert_eq!(c.current_health, 100.0);
    }

    #[test]
    fn test_burn_ticks_once_per_second() {
        let mut c = dummy();
        let mut s = StatusEffects::default();
        s.apply(StatusKind::Burn, 0.0, 3.0, &mut c);
        assert!(c.burning);
        for _ in 0..14 {
            s.tick(0.25, &mut c);
        }
        assert_eq!(c.current_health, 70.0);
        assert!(!c.burning);
        assert!(!s.is_active(StatusKind::Burn));
    }

    #[test]
    fn test_burn_at_sixty_hz_deals_every_tick() {
        for duration in 1..=10 {
            let mut c = Combatant::new("Dummy", 1000.0, 0.0);
            let mut s = StatusEffects::default();
            s.apply(StatusKind::Burn, 0.0, duration as f32, &mut c);
            let mut frames = 0;
            while s.is_active(StatusKind::Burn) && frames < 10_000 {
                s.tick(1.0 / 60.0, &mut c);
                frames += 1;
            }
            assert_eq!(c.current_health, 1000.0 - 10.0 * duration as f32, "{}s burn", duration);
        }
    }

    #[test]
    fn test_burn_scale_reduces_tick_damage() {
        let mut c = dummy();
        let mut s = StatusEffects::with_burn_scale(0.5);
        s.apply(StatusKind::Burn, 0.0, 1.0, &mut c);
        s.tick(1.0, &mut c);
        assert_eq!(c.current_health, 95.0);
    }

    #[test]
    fn test_immunities_resist() {
        let mut c = dummy();
        c.fire_immune = true;
        c.freeze_immune = true;
        let mut s = StatusEffects::default();
        assert_eq!(s.apply(StatusKind::Burn, 0.0, 3.0, &mut c), StatusApplication::Resisted);
        assert_eq!(s.apply(StatusKind::Freeze, 0.0, 3.0, &mut c), StatusApplication::Resisted);
        assert!(s.is_empty());
    }

    #[test]
    fn test_depleted_shield_is_removed() {
        let mut c = dummy();
        let mut s = StatusEffects::default();
        s.apply(StatusKind::Shield, 20.0, 10.0, &mut c);
        c.take_damage(25.0, false);
        let ticks = s.tick(0.1, &mut c);
        assert!(ticks.contains(&StatusTick::Expired(StatusKind::Shield)));
        assert_eq!(c.current_health, 95.0);
    }

    #[test]
    fn test_freeze_expires() {
        let mut c = dummy();
        let mut s = StatusEffects::default();
        s.apply(StatusKind::Freeze, 0.0, 1.0, &mut c);
        assert!(c.frozen);
        s.tick(0.5, &mut c);
        assert!(c.frozen);
        s.tick(0.6, &mut c);
        assert!(!c.frozen);
    }

    #[test]
    fn test_death_clears_effects() {
        let mut c = Combatant::new("Dummy", 15.0, 0.0);
        let mut s = StatusEffects::default();
        s.apply(StatusKind::Burn, 0.0, 5.0, &mut c);
        s.apply(StatusKind::Reflect, 0.5, 5.0, &mut c);
        s.tick(2.0, &mut c);
        assert!(c.is_dead());
        assert!(s.is_empty());
        assert_eq!(c.reflect_intensity, 0.0);
    }
}
