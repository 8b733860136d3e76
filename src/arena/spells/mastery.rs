//! Spell mastery tiers
//!
//! A spell's tier is never stored; it is derived from how many times the
//! spell has been cast, compared against two thresholds.

use serde::{Deserialize, Serialize};

/// Mastery tier of a spell. Ordered: Basic < Flawless < Masterful.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum MasteryTier {
    Basic,
    Flawless,
    Masterful,
}

impl MasteryTier {
    /// Tier for a usage count.
    ///
    /// Masterful needs `masterful_requirement` casts *past* the flawless threshold.
    pub fn for_usage(usage: u32, flawless_requirement: u32, masterful_requirement: u32) -> Self {
        if usage >= flawless_requirement {
            if usage - flawless_requirement >= masterful_requirement {
                MasteryTier::Masterful
            } else {
                MasteryTier::Flawless
            }
        } else {
            MasteryTier::Basic
        }
    }

    /// 1, 2 or 3
    pub fn level(&self) -> u8 {
        match self {
            MasteryTier::Basic => 1,
            MasteryTier::Flawless => 2,
            MasteryTier::Masterful => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MasteryTier::Basic => "Basic",
            MasteryTier::Flawless => "Flawless",
            MasteryTier::Masterful => "Masterful",
        }
    }

    /// Preference key recording that a spell reached this tier
    pub fn pref_key(&self, spell_name: &str) -> String {
        format!("{}Mastery_{}", self.name(), spell_name)
    }
}

/// The tier reached by going from `previous_usage` to `new_usage`, if a
/// threshold was crossed.
pub fn threshold_crossed(
    previous_usage: u32,
    new_usage: u32,
    flawless_requirement: u32,
    masterful_requirement: u32,
) -> Option<MasteryTier> {
    let before =
        MasteryTier::for_usage(previous_usage, flawless_requirement, masterful_requirement);
    let after = MasteryTier::for_usage(new_usage, flawless_requirement, masterful_requirement);
    (after > before).then_some(after)
}
