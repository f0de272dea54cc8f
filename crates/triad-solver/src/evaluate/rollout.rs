use crate::evaluate::weights::RolloutBudget;
use rand::Rng;
use rand::rngs::SmallRng;
use triad_core::model::board::{Board, PlacedCard};
use triad_core::model::card::{CardId, CardSides};
use triad_core::model::owner::Owner;

/// Bounded Monte Carlo estimate of a move's future potential: apply the
/// candidate, then average the terminal board value over random
/// continuations of synthetic cards.
#[derive(Debug, Clone, Copy)]
pub struct RolloutEstimator {
    budget: RolloutBudget,
}

impl RolloutEstimator {
    pub const fn new(budget: RolloutBudget) -> Self {
        Self { budget }
    }

    pub const fn budget(&self) -> RolloutBudget {
        self.budget
    }

    pub fn estimate(
        &self,
        board: &Board,
        placed: PlacedCard,
        pos: usize,
        rng: &mut SmallRng,
    ) -> f32 {
        let outer = self.budget.outer();
        let mut total = 0.0;
        for _ in 0..outer {
            let mut sim = board.clone();
            if sim.place(placed, pos).is_err() {
                return board.value(placed.owner);
            }
            total += self.continuation_value(&sim, placed.owner, rng);
        }
        total / outer as f32
    }

    /// Average board value over `inner_samples` random continuations of
    /// `depth` plies. Owners alternate starting with the opponent, since
    /// the candidate move just ended our turn.
    fn continuation_value(&self, board: &Board, perspective: Owner, rng: &mut SmallRng) -> f32 {
        if self.budget.depth == 0 {
            return board.value(perspective);
        }
        let samples = self.budget.inner_samples.max(1);
        let mut total = 0.0;
        for _ in 0..samples {
            let mut sim = board.clone();
            for ply in 0..self.budget.depth {
                let empty: Vec<usize> = sim.empty_positions().collect();
                if empty.is_empty() {
                    break;
                }
                let pos = empty[rng.gen_range(0..empty.len())];
                let owner = if ply % 2 == 0 {
                    perspective.opponent()
                } else {
                    perspective
                };
                let synthetic = PlacedCard {
                    card: CardId::SYNTHETIC,
                    sides: CardSides::random(rng),
                    owner,
                };
                if sim.place(synthetic, pos).is_err() {
                    break;
                }
            }
            total += sim.value(perspective);
        }
        total / samples as f32
    }
}
