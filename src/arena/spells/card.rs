//! Spell cards and the player's hand
//!
//! A hand is a fixed row of card slots. A slot holds a ready spell or is
//! cooling down after a cast or discard; when the cooldown ends a new card
//! is drawn into it.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::arena::components::{Combatant, GameRng};

use super::book::SpellBook;
use super::config::{SpellDefinitions, SpellEffect};
use super::deck::Deck;
use super::mastery::MasteryTier;

/// How empty slots get refilled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardDrawMode {
    /// Independent weighted pick per draw
    #[default]
    Weighted,
    /// Draw without replacement from a shuffled deck
    Deck,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CardState {
    /// No unlocked spells to draw from
    Empty,
    Ready { spell: usize },
    Cooldown { remaining: f32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpellCard {
    pub state: CardState,
}

impl SpellCard {
    pub fn ready_spell(&self) -> Option<usize> {
        match self.state {
            CardState::Ready { spell } => Some(spell),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CastRejected {
    #[error("no card slot {0}")]
    NoSuchSlot(usize),
    #[error("card is not ready")]
    NotReady,
    #[error("caster is frozen")]
    Frozen,
    #[error("not enough mana ({available:.0}/{needed:.0})")]
    NotEnoughMana { needed: f32, available: f32 },
}

/// A successful cast, with everything the resolver needs.
#[derive(Debug, Clone)]
pub struct CastOutcome {
    pub spell: usize,
    pub name: String,
    /// Tier the spell was cast at (before this cast was counted)
    pub tier: MasteryTier,
    pub effect: SpellEffect,
    pub mana_spent: f32,
    /// Set when this cast crossed a mastery threshold
    pub mastery_reached: Option<MasteryTier>,
}

#[derive(Resource, Debug, Clone)]
pub struct SpellHand {
    cards: Vec<SpellCard>,
    deck: Deck,
    pub draw_mode: CardDrawMode,
}

impl SpellHand {
    /// Deal a full hand.
    pub fn new(
        hand_size: usize,
        draw_mode: CardDrawMode,
        book: &SpellBook,
        definitions: &SpellDefinitions,
        rng: &mut GameRng,
    ) -> Self {
        let mut hand = Self {
            cards: Vec::with_capacity(hand_size),
            deck: Deck::new(book.deck_weights(definitions)),
            draw_mode,
        };
        for _ in 0..hand_size {
            let state = hand.draw_state(book, definitions, rng);
            hand.cards.push(SpellCard { state });
        }
        hand
    }

    pub fn cards(&self) -> &[SpellCard] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    /// The next card off the deck. In weighted mode slots still pick on
    /// their own, but every draw advances the deck so the preview moves on.
    pub fn next_card(&mut self, rng: &mut GameRng) -> Option<usize> {
        self.deck.peek(rng)
    }

    /// Rebuild the deck from the book's current unlocks.
    pub fn refresh_deck(&mut self, book: &SpellBook, definitions: &SpellDefinitions) {
        self.deck.set_weights(book.deck_weights(definitions));
    }

    fn draw_state(
        &mut self,
        book: &SpellBook,
        definitions: &SpellDefinitions,
        rng: &mut GameRng,
    ) -> CardState {
        let drawn = match self.draw_mode {
            CardDrawMode::Weighted => {
                self.deck.draw(rng);
                book.weighted_pick(definitions, rng)
            }
            CardDrawMode::Deck => self.deck.draw(rng),
        };
        drawn.map_or(CardState::Empty, |spell| CardState::Ready { spell })
    }

    /// Cast the card in `slot`.
    ///
    /// Checks readiness, freeze and mana in that order; spends mana, counts the
    /// use and puts the slot on the cooldown of the tier it was cast at.
    pub fn cast(
        &mut self,
        slot: usize,
        caster: &mut Combatant,
        book: &mut SpellBook,
        definitions: &SpellDefinitions,
    ) -> Result<CastOutcome, CastRejected> {
        let card = self.cards.get(slot).ok_or(CastRejected::NoSuchSlot(slot))?;
        let spell_index = card.ready_spell().ok_or(CastRejected::NotReady)?;
        if caster.frozen {
            return Err(CastRejected::Frozen);
        }
        let spell = definitions.get(spell_index).ok_or(CastRejected::NotReady)?;
        let tier = book.tier(definitions, spell_index);
        let tier_data = spell.tier(tier);
        if !caster.spend_mana(tier_data.mana_cost) {
            return Err(CastRejected::NotEnoughMana {
                needed: tier_data.mana_cost,
                available: caster.current_mana,
            });
        }

        let outcome = CastOutcome {
            spell: spell_index,
            name: spell.name.clone(),
            tier,
            effect: tier_data.effect.clone(),
            mana_spent: tier_data.mana_cost,
            mastery_reached: book.record_cast(definitions, spell_index),
        };
        self.cards[slot].state = CardState::Cooldown {
            remaining: tier_data.cooldown,
        };
        Ok(outcome)
    }

    /// Throw away a ready card. The slot takes the spell's cooldown but no
    /// mana is spent and usage is not counted. Returns the cooldown.
    pub fn discard(
        &mut self,
        slot: usize,
        book: &SpellBook,
        definitions: &SpellDefinitions,
    ) -> Result<f32, CastRejected> {
        let card = self.cards.get(slot).ok_or(CastRejected::NoSuchSlot(slot))?;
        let spell_index = card.ready_spell().ok_or(CastRejected::NotReady)?;
        let cooldown = definitions
            .get(spell_index)
            .map_or(0.0, |spell| spell.tier(book.tier(definitions, spell_index)).cooldown);
        self.cards[slot].state = CardState::Cooldown { remaining: cooldown };
        Ok(cooldown)
    }

    /// Advance cooldowns and refill finished or empty slots.
    /// Returns the slots that received a new card.
    pub fn tick(
        &mut self,
        dt: f32,
        book: &SpellBook,
        definitions: &SpellDefinitions,
        rng: &mut GameRng,
    ) -> SmallVec<[usize; 4]> {
        let mut refilled = SmallVec::new();
        for slot in 0..self.cards.len() {
            let needs_card = match &mut self.cards[slot].state {
                CardState::Cooldown { remaining } => {
                    *remaining -= dt;
                    *remaining <= 0.0
                }
                CardState::Empty => true,
                CardState::Ready { .. } => false,
            };
            if needs_card {
                let state = self.draw_state(book, definitions, rng);
                if matches!(state, CardState::Ready { .. }) {
                    refilled.push(slot);
                }
                self.cards[slot].state = state;
            }
        }
        refilled
    }
}
