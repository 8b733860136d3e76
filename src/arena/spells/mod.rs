//! Spells, cards and mastery
//!
//! - `config`: spell definitions loaded from RON
//! - `mastery`: usage-derived tiers
//! - `book`: unlocks and usage, persisted in preferences
//! - `deck` / `card`: the player's hand and how it is refilled
//! - `casting`: Bevy systems that resolve casts

pub mod book;
pub mod card;
pub mod casting;
pub mod config;
pub mod deck;
pub mod mastery;

pub use book::SpellBook;
pub use card::{CardDrawMode, CardState, CastOutcome, CastRejected, SpellCard, SpellHand};
pub use config::{load_spell_definitions, SpellDefinition, SpellDefinitions, SpellEffect, SpellTier};
pub use deck::Deck;
pub use mastery::MasteryTier;
