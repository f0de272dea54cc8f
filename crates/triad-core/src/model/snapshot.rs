use crate::model::board::Board;
use crate::model::deck::DeckInstance;
use crate::model::owner::Owner;
use serde::{Deserialize, Serialize};

/// An (available card slot, empty board cell) pair under consideration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveCandidate {
    pub card_idx: usize,
    pub board_pos: usize,
}

/// Immutable per-turn view of the whole game: rebuilt from each observation,
/// never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub board: Board,
    pub blue_deck: DeckInstance,
    pub red_deck: DeckInstance,
    pub turn: Owner,
    /// Slot index the active ruleset mandates be played next, if any.
    pub forced_card: Option<usize>,
}

impl GameSnapshot {
    pub fn deck(&self, owner: Owner) -> &DeckInstance {
        match owner {
            Owner::Blue => &self.blue_deck,
            Owner::Red => &self.red_deck,
        }
    }

    /// Every legal move for `owner`: the cross product of available known
    /// card slots and empty board cells, in ascending (card, position)
    /// order. That ordering is load-bearing: the evaluator breaks score
    /// ties by taking the first candidate reaching the maximum.
    pub fn candidates(&self, owner: Owner) -> Vec<MoveCandidate> {
        let deck = self.deck(owner);
        let mut out = Vec::new();
        for card_idx in deck.available_indices() {
            if deck.known_card(card_idx).is_none() {
                continue;
            }
            for board_pos in self.board.empty_positions() {
                out.push(MoveCandidate {
                    card_idx,
                    board_pos,
                });
            }
        }
        out
    }

    /// Compact fingerprint used to decide whether a move was actually made
    /// since the last evaluation.
    pub fn signature(&self) -> StateSignature {
        StateSignature {
            board: self.board.signature(),
            blue_mask: self.blue_deck.available_mask(),
            red_mask: self.red_deck.available_mask(),
            turn: self.turn,
            forced_card: self.forced_card,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSignature {
    board: String,
    blue_mask: u8,
    red_mask: u8,
    turn: Owner,
    forced_card: Option<usize>,
}
