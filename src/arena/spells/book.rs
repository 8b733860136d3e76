//! Spell unlocks and usage counts
//!
//! The book tracks, per spell, whether it is unlocked and how many times it
//! has been cast. Both persist through the preference store:
//! `Unlocked_<name>` and `Usage_<name>`, plus one flag per mastery tier
//! reached (`BasicMastery_<name>` and so on).

use bevy::prelude::*;

use crate::arena::components::GameRng;
use crate::error::ConfigError;
use crate::settings::Preferences;

use super::config::SpellDefinitions;
use super::mastery::{threshold_crossed, MasteryTier};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpellProgress {
    pub unlocked: bool,
    pub usage: u32,
}

/// Per-spell progress, indexed like `SpellDefinitions`.
#[derive(Resource, Debug, Clone)]
pub struct SpellBook {
    progress: Vec<SpellProgress>,
}

pub fn unlocked_key(spell_name: &str) -> String {
    format!("Unlocked_{}", spell_name)
}

pub fn usage_key(spell_name: &str) -> String {
    format!("Usage_{}", spell_name)
}

impl SpellBook {
    /// Fresh book: only default spells unlocked, no usage.
    pub fn new(definitions: &SpellDefinitions) -> Self {
        Self {
            progress: definitions
                .iter()
                .map(|spell| SpellProgress {
                    unlocked: spell.unlocked_by_default,
                    usage: 0,
                })
                .collect(),
        }
    }

    pub fn from_preferences(definitions: &SpellDefinitions, prefs: &Preferences) -> Self {
        Self {
            progress: definitions
                .iter()
                .map(|spell| SpellProgress {
                    unlocked: spell.unlocked_by_default
                        || prefs.get_flag(&unlocked_key(&spell.name)),
                    usage: prefs.get_int(&usage_key(&spell.name), 0).max(0) as u32,
                })
                .collect(),
        }
    }

    /// Write unlocks, usage and reached mastery tiers into `prefs`.
    pub fn write_preferences(&self, definitions: &SpellDefinitions, prefs: &mut Preferences) {
        for (spell, progress) in definitions.iter().zip(&self.progress) {
            prefs.set_flag(unlocked_key(&spell.name), progress.unlocked);
            prefs.set_int(
                usage_key(&spell.name),
                progress.usage.min(i32::MAX as u32) as i32,
            );
            let tier = spell.tier_for_usage(progress.usage);
            for reached in [MasteryTier::Basic, MasteryTier::Flawless, MasteryTier::Masterful] {
                if reached <= tier && progress.usage > 0 {
                    prefs.set_flag(reached.pref_key(&spell.name), true);
                }
            }
        }
    }

    pub fn progress(&self, index: usize) -> Option<SpellProgress> {
        self.progress.get(index).copied()
    }

    pub fn is_unlocked(&self, index: usize) -> bool {
        self.progress.get(index).is_some_and(|p| p.unlocked)
    }

    pub fn usage(&self, index: usize) -> u32 {
        self.progress.get(index).map_or(0, |p| p.usage)
    }

    pub fn unlock(&mut self, index: usize) {
        if let Some(progress) = self.progress.get_mut(index) {
            progress.unlocked = true;
        }
    }

    pub fn unlock_by_name(
        &mut self,
        definitions: &SpellDefinitions,
        name: &str,
    ) -> Result<(), ConfigError> {
        let index = definitions.index_of(name).ok_or_else(|| ConfigError::UnknownName {
            kind: "spell",
            name: name.to_string(),
        })?;
        self.unlock(index);
        Ok(())
    }

    pub fn unlocked_count(&self) -> usize {
        self.progress.iter().filter(|p| p.unlocked).count()
    }

    /// Current tier of a spell, derived from usage.
    pub fn tier(&self, definitions: &SpellDefinitions, index: usize) -> MasteryTier {
        definitions
            .get(index)
            .map_or(MasteryTier::Basic, |spell| spell.tier_for_usage(self.usage(index)))
    }

    /// Count one cast. Returns the tier reached if this cast crossed a
    /// threshold; the very first cast reaches Basic.
    pub fn record_cast(
        &mut self,
        definitions: &SpellDefinitions,
        index: usize,
    ) -> Option<MasteryTier> {
        let spell = definitions.get(index)?;
        let progress = self.progress.get_mut(index)?;
        let before = progress.usage;
        progress.usage = before.saturating_add(1);
        let crossed = threshold_crossed(
            before,
            progress.usage,
            spell.flawless_requirement,
            spell.masterful_requirement,
        );
        if before == 0 && crossed.is_none() {
            return Some(MasteryTier::Basic);
        }
        crossed
    }

    /// `(spell index, copies)` for every unlocked spell
    pub fn deck_weights(&self, definitions: &SpellDefinitions) -> Vec<(usize, u32)> {
        definitions
            .iter()
            .enumerate()
            .filter(|(index, _)| self.is_unlocked(*index))
            .map(|(index, spell)| (index, spell.amount_in_deck))
            .collect()
    }

    /// Pick a spell with probability proportional to its deck weight.
    pub fn weighted_pick(
        &self,
        definitions: &SpellDefinitions,
        rng: &mut GameRng,
    ) -> Option<usize> {
        let weights = self.deck_weights(definitions);
        let total: u32 = weights.iter().map(|(_, copies)| copies).sum();
        if total == 0 {
            return None;
        }
        let mut roll = rng.random_index(total as usize) as u32;
        for (index, copies) in weights {
            if roll < copies {
                return Some(index);
            }
            roll -= copies;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definitions() -> SpellDefinitions {
        SpellDefinitions::from_ron_str(
            r#"(spells: [
                (name: "Spark", amount_in_deck: 3, unlocked_by_default: true,
                 flawless_requirement: 2, masterful_requirement: 2,
                 basic: (effect: Heal(amount: 1.0)),
                 flawless: (effect: Heal(amount: 2.0)),
                 masterful: (effect: Heal(amount: 3.0))),
                (name: "Frost", amount_in_deck: 1,
                 flawless_requirement: 2, masterful_requirement: 2,
                 basic: (effect: Heal(amount: 1.0)),
                 flawless: (effect: Heal(amount: 2.0)),
                 masterful: (effect: Heal(amount: 3.0))),
            ])"#,
            "inline",
        )
        .unwrap()
    }

    #[test]
    fn test_defaults_and_unlock() {
        let defs = definitions();
        let mut book = SpellBook::new(&defs);
        assert!(book.is_unlocked(0));
        assert!(!book.is_unlocked(1));
        assert_eq!(book.deck_weights(&defs), vec![(0, 3)]);

        book.unlock_by_name(&defs, "Frost").unwrap();
        assert_eq!(book.deck_weights(&defs), vec![(0, 3), (1, 1)]);
        assert!(book.unlock_by_name(&defs, "Nope").is_err());
    }

    #[test]
    fn test_record_cast_reports_each_tier_once() {
        let defs = definitions();
        let mut book = SpellBook::new(&defs);
        let reached: Vec<_> = (0..6).map(|_| book.record_cast(&defs, 0)).collect();
        assert_eq!(
            reached,
            vec![
                Some(MasteryTier::Basic),
                Some(MasteryTier::Flawless),
                None,
                Some(MasteryTier::Masterful),
                None,
                None
            ]
        );
        assert_eq!(book.tier(&defs, 0), MasteryTier::Masterful);
    }

    #[test]
    fn test_preferences_round_trip() {
        let defs = definitions();
        let mut book = SpellBook::new(&defs);
        book.unlock(1);
        book.record_cast(&defs, 1);
        book.record_cast(&defs, 1);

        let mut prefs = Preferences::in_memory();
        book.write_preferences(&defs, &mut prefs);
        assert_eq!(prefs.get_int("Usage_Frost", 0), 2);
        assert!(prefs.get_flag("Unlocked_Frost"));
        assert!(prefs.get_flag("FlawlessMastery_Frost"));
        assert!(!prefs.get_flag("MasterfulMastery_Frost"));
        assert!(!prefs.get_flag("BasicMastery_Spark"));

        let restored = SpellBook::from_preferences(&defs, &prefs);
        assert_eq!(restored.usage(1), 2);
        assert!(restored.is_unlocked(1));
    }

    #[test]
    fn test_weighted_pick_only_unlocked() {
        let defs = definitions();
        let book = SpellBook::new(&defs);
        let mut rng = GameRng::from_seed(5);
        for _ in 0..50 {
            assert_eq!(book.weighted_pick(&defs, &mut rng), Some(0));
        }
    }
}
