use crate::model::card::{CardId, CardSides};
use serde::{Deserialize, Serialize};

pub const DECK_SIZE: usize = 5;

/// One slot of a five-card deck. Opponent slots stay `Hidden` until the
/// card is revealed by being played.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DeckSlot {
    Known { card: CardId, sides: CardSides },
    Hidden,
}

impl DeckSlot {
    pub const fn known(card: CardId, sides: CardSides) -> Self {
        DeckSlot::Known { card, sides }
    }

    pub const fn is_hidden(self) -> bool {
        matches!(self, DeckSlot::Hidden)
    }
}

/// Five card slots plus an availability bitmask (bit `i` set means slot `i`
/// is still in hand).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckInstance {
    slots: [DeckSlot; DECK_SIZE],
    available: u8,
}

pub const FULL_DECK_MASK: u8 = (1 << DECK_SIZE) - 1;

impl DeckInstance {
    pub fn new(slots: [DeckSlot; DECK_SIZE]) -> Self {
        Self::with_mask(slots, FULL_DECK_MASK)
    }

    pub fn with_mask(slots: [DeckSlot; DECK_SIZE], available: u8) -> Self {
        Self {
            slots,
            available: available & FULL_DECK_MASK,
        }
    }

    pub fn slot(&self, idx: usize) -> Option<DeckSlot> {
        self.slots.get(idx).copied()
    }

    pub fn known_card(&self, idx: usize) -> Option<(CardId, CardSides)> {
        match self.slots.get(idx)? {
            DeckSlot::Known { card, sides } => Some((*card, *sides)),
            DeckSlot::Hidden => None,
        }
    }

    pub fn is_available(&self, idx: usize) -> bool {
        idx < DECK_SIZE && (self.available & (1 << idx)) != 0
    }

    pub fn available_mask(&self) -> u8 {
        self.available
    }

    pub fn available_count(&self) -> usize {
        self.available.count_ones() as usize
    }

    pub fn available_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..DECK_SIZE).filter(|&idx| self.is_available(idx))
    }

    pub fn mark_played(&mut self, idx: usize) {
        if idx < DECK_SIZE {
            self.available &= !(1 << idx);
        }
    }

    /// Reveal a previously hidden slot.
    pub fn reveal(&mut self, idx: usize, card: CardId, sides: CardSides) {
        if idx < DECK_SIZE {
            self.slots[idx] = DeckSlot::known(card, sides);
        }
    }

    /// Partition of the still-available slots into known card ids and a
    /// count of hidden slots.
    pub fn known_and_hidden(&self) -> (Vec<CardId>, usize) {
        let mut known = Vec::new();
        let mut hidden = 0;
        for idx in self.available_indices() {
            match self.slots[idx] {
                DeckSlot::Known { card, .. } => known.push(card),
                DeckSlot::Hidden => hidden += 1,
            }
        }
        (known, hidden)
    }
}
