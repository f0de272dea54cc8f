mod patterns;
mod rollout;
mod strength;
mod weights;

pub use patterns::PatternTable;
pub use rollout::RolloutEstimator;
pub use strength::CardStrengthModel;
pub use weights::{EvalWeights, PATTERN_POSITION_SCALE, POSITION_VALUES, RolloutBudget};

use rand::rngs::SmallRng;
use tracing::debug;
use triad_core::model::board::{Board, Cell, PlacedCard};
use triad_core::model::owner::Owner;
use triad_core::model::snapshot::{GameSnapshot, MoveCandidate};

/// Score above which a move is considered winning when mapped to the
/// categorical expected result.
const WIN_SCORE_THRESHOLD: f32 = 50.0;
/// Divisor turning a raw move score into a win-chance estimate.
const WIN_CHANCE_SCALE: f32 = 100.0;
/// Capture bonus per point of strength margin.
const CAPTURE_MARGIN_BONUS: f32 = 0.1;
/// Fraction of a side's strength credited for guarding an empty neighbor.
const DEFENSE_SIDE_SCALE: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedResult {
    EngineWins,
    OpponentWins,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveChoice {
    pub card_idx: usize,
    pub board_pos: usize,
    pub win_chance: f32,
    pub expected: ExpectedResult,
    pub score: f32,
}

/// Everything a single evaluation reads. All references: the evaluator
/// itself holds no game state.
pub struct EvalContext<'a> {
    pub snapshot: &'a GameSnapshot,
    pub perspective: Owner,
    pub patterns: &'a PatternTable,
    pub strength: &'a CardStrengthModel,
}

/// Exhaustive weighted evaluation over every (available card, empty cell)
/// pair, with Monte Carlo look-ahead for the future-potential term.
#[derive(Debug, Clone, Copy)]
pub struct MoveEvaluator {
    weights: EvalWeights,
    rollouts: RolloutEstimator,
}

impl MoveEvaluator {
    pub const fn new(weights: EvalWeights, budget: RolloutBudget) -> Self {
        Self {
            weights,
            rollouts: RolloutEstimator::new(budget),
        }
    }

    pub const fn budget(&self) -> RolloutBudget {
        self.rollouts.budget()
    }

    /// Best move for the context's side, or `None` when no candidate
    /// exists. Candidates are scored in ascending (card, position) order
    /// and ties go to the first maximum, so results are deterministic for
    /// a fixed RNG.
    pub fn choose(&self, ctx: &EvalContext<'_>, rng: &mut SmallRng) -> Option<MoveChoice> {
        let candidates = ctx.snapshot.candidates(ctx.perspective);
        let choice = self.best_of(ctx, &candidates, rng);
        if let Some(choice) = &choice {
            debug!(
                card_idx = choice.card_idx,
                board_pos = choice.board_pos,
                score = choice.score,
                win_chance = choice.win_chance,
                "evaluated move"
            );
        }
        choice
    }

    /// Best position for one specific card slot, used when the game forces
    /// which card must be played next.
    pub fn choose_for_card(
        &self,
        ctx: &EvalContext<'_>,
        card_idx: usize,
        rng: &mut SmallRng,
    ) -> Option<MoveChoice> {
        let deck = ctx.snapshot.deck(ctx.perspective);
        if !deck.is_available(card_idx) || deck.known_card(card_idx).is_none() {
            return None;
        }
        let candidates: Vec<MoveCandidate> = ctx
            .snapshot
            .board
            .empty_positions()
            .map(|board_pos| MoveCandidate {
                card_idx,
                board_pos,
            })
            .collect();
        self.best_of(ctx, &candidates, rng)
    }

    fn best_of(
        &self,
        ctx: &EvalContext<'_>,
        candidates: &[MoveCandidate],
        rng: &mut SmallRng,
    ) -> Option<MoveChoice> {
        let mut best: Option<MoveChoice> = None;
        for candidate in candidates {
            let Some(score) = self.score_candidate(ctx, candidate, rng) else {
                continue;
            };
            let better = best.map_or(true, |current| score > current.score);
            if better {
                best = Some(MoveChoice {
                    card_idx: candidate.card_idx,
                    board_pos: candidate.board_pos,
                    win_chance: (score / WIN_CHANCE_SCALE).clamp(0.0, 1.0),
                    expected: if score > WIN_SCORE_THRESHOLD {
                        ExpectedResult::EngineWins
                    } else {
                        ExpectedResult::OpponentWins
                    },
                    score,
                });
            }
        }
        best
    }

    fn score_candidate(
        &self,
        ctx: &EvalContext<'_>,
        candidate: &MoveCandidate,
        rng: &mut SmallRng,
    ) -> Option<f32> {
        let board = &ctx.snapshot.board;
        if !board.is_empty(candidate.board_pos) {
            return None;
        }
        let deck = ctx.snapshot.deck(ctx.perspective);
        let (card, sides) = deck.known_card(candidate.card_idx)?;
        let placed = PlacedCard {
            card,
            sides,
            owner: ctx.perspective,
        };

        let weights = &self.weights;
        let mut score = 0.0;
        score += capture_value(board, &placed, candidate.board_pos) * weights.capture;
        score += POSITION_VALUES[candidate.board_pos] * weights.position;
        score += defense_value(board, &placed, candidate.board_pos) * weights.defense;
        score += ctx.strength.strength(card, sides, board.empty_count()) * weights.card_strength;
        score += self
            .rollouts
            .estimate(board, placed, candidate.board_pos, rng)
            * weights.future;
        score += pattern_value(ctx, candidate.board_pos) * weights.pattern;

        Some(score * weights.aggression)
    }
}

impl Default for MoveEvaluator {
    fn default() -> Self {
        Self::new(EvalWeights::default(), RolloutBudget::default())
    }
}

/// Immediate captures: 1 per flipped neighbor plus a margin bonus.
fn capture_value(board: &Board, placed: &PlacedCard, pos: usize) -> f32 {
    let mut value = 0.0;
    for (adj, side) in Board::neighbors(pos) {
        if let Cell::Occupied(neighbor) = board.cell(adj) {
            if neighbor.owner == placed.owner {
                continue;
            }
            let ours = placed.sides.value(side);
            let theirs = neighbor.sides.value(side.opposite());
            if ours > theirs {
                value += 1.0 + (ours - theirs) as f32 * CAPTURE_MARGIN_BONUS;
            }
        }
    }
    value
}

/// Strength shown toward still-empty neighbors, guarding against future
/// hostile placements there.
fn defense_value(board: &Board, placed: &PlacedCard, pos: usize) -> f32 {
    let mut value = 0.0;
    for (adj, side) in Board::neighbors(pos) {
        if board.is_empty(adj) {
            value += placed.sides.value(side) as f32 * DEFENSE_SIDE_SCALE;
        }
    }
    value
}

/// Learned adjustment for the exact current board signature, scaled by the
/// strategic value of the target cell. Zero when the signature is unknown.
fn pattern_value(ctx: &EvalContext<'_>, pos: usize) -> f32 {
    ctx.patterns
        .adjustment(&ctx.snapshot.board.signature())
        .map_or(0.0, |adjustment| {
            adjustment * PATTERN_POSITION_SCALE[pos]
        })
}
