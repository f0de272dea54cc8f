use triad_core::model::card::{CardId, CardSides};
use triad_stats::CardScoreReader;

/// Amplifier applied to the learned per-card score.
const LEARNED_AMPLIFIER: f32 = 2.0;
/// Empty-cell threshold below which the late-game bonus kicks in.
const LATE_GAME_EMPTY_CELLS: usize = 3;
/// Fraction of base strength added in the late game.
const LATE_GAME_BONUS: f32 = 0.2;

/// Adaptive card strength: static base value blended with the learned
/// performance score and a late-game context bonus.
#[derive(Debug, Clone)]
pub struct CardStrengthModel {
    scores: CardScoreReader,
}

impl CardStrengthModel {
    pub fn new(scores: CardScoreReader) -> Self {
        Self { scores }
    }

    /// Mean of three terms: the card's base strength, twice its learned
    /// score (zero when unlearned), and 20% of base strength once three or
    /// fewer cells remain empty.
    pub fn strength(&self, card: CardId, sides: CardSides, empty_cells: usize) -> f32 {
        let base = sides.base_strength();
        let learned = self.scores.score(card).unwrap_or(0.0) * LEARNED_AMPLIFIER;
        let contextual = if empty_cells <= LATE_GAME_EMPTY_CELLS {
            base * LATE_GAME_BONUS
        } else {
            0.0
        };
        (base + learned + contextual) / 3.0
    }
}
