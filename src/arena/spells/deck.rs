//! Shuffled spell deck
//!
//! Every unlocked spell contributes `amount_in_deck` copies. Cards are drawn
//! without replacement; when the pile runs out it is rebuilt from the
//! template and reshuffled.

use crate::arena::components::GameRng;

#[derive(Debug, Clone, Default)]
pub struct Deck {
    /// Unshuffled list of spell indices, one entry per copy
    template: Vec<usize>,
    /// Remaining cards; the next draw is the last element
    pile: Vec<usize>,
    /// How many times the pile has been rebuilt
    pub reshuffles: u32,
}

impl Deck {
    /// Build a deck from `(spell index, copies)` pairs. The pile is filled
    /// on first draw.
    pub fn new(weights: impl IntoIterator<Item = (usize, u32)>) -> Self {
        let mut deck = Self::default();
        deck.set_weights(weights);
        deck
    }

    /// Replace the template (after an unlock). The current pile is dropped
    /// so the new spell shows up on the next reshuffle.
    pub fn set_weights(&mut self, weights: impl IntoIterator<Item = (usize, u32)>) {
        self.template = weights
            .into_iter()
            .flat_map(|(spell, copies)| std::iter::repeat(spell).take(copies as usize))
            .collect();
        self.pile.clear();
    }

    /// Total cards in a full deck
    pub fn size(&self) -> usize {
        self.template.len()
    }

    /// Cards left before the next reshuffle
    pub fn remaining(&self) -> usize {
        self.pile.len()
    }

    /// Draw the next card, reshuffling first if the pile is empty.
    pub fn draw(&mut self, rng: &mut GameRng) -> Option<usize> {
        self.refill_if_empty(rng);
        self.pile.pop()
    }

    /// The card the next draw will return.
    pub fn peek(&mut self, rng: &mut GameRng) -> Option<usize> {
        self.refill_if_empty(rng);
        self.pile.last().copied()
    }

    fn refill_if_empty(&mut self, rng: &mut GameRng) {
        if !self.pile.is_empty() || self.template.is_empty() {
            return;
        }
        self.pile.clone_from(&self.template);
        fisher_yates(&mut self.pile, rng);
        self.reshuffles += 1;
    }
}

/// In-place Fisher-Yates shuffle driven by the run's seeded RNG.
pub fn fisher_yates<T>(items: &mut [T], rng: &mut GameRng) {
    for i in (1..items.len()).rev() {
        let j = rng.random_index(i + 1);
        items.swap(i, j);
    }
}
