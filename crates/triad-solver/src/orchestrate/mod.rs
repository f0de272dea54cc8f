mod gate;
mod mailbox;

pub use gate::OptimizerGate;
pub use mailbox::Mailbox;

use crate::evaluate::{
    CardStrengthModel, EvalContext, EvalWeights, ExpectedResult, MoveChoice, MoveEvaluator,
    PatternTable, RolloutBudget,
};
use parking_lot::RwLock;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tracing::{debug, info, warn};
use triad_core::catalog::CardCatalog;
use triad_core::model::observation::{GameObservation, ParseFailureKind};
use triad_core::model::owner::Owner;
use triad_core::model::snapshot::{GameSnapshot, StateSignature};
use triad_stats::CardScoreReader;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SolverErrorKind {
    #[error("could not parse {0} from the screen state")]
    Parse(ParseFailureKind),
    #[error("no legal move available")]
    NoLegalMove,
    #[error("evaluation budget exceeded before a move was found")]
    Timeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverState {
    #[default]
    Idle,
    WaitingForTurn,
    Evaluating,
    MoveReady,
    Error(SolverErrorKind),
}

/// Notifications pushed to whoever renders the overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolverEvent {
    MoveReady {
        card_idx: usize,
        board_pos: usize,
        win_chance: f32,
        expected: ExpectedResult,
    },
    MoveCleared,
    Error(SolverErrorKind),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    pub weights: EvalWeights,
    pub budget: RolloutBudget,
    /// Upper bound on playouts for one full evaluation, across all
    /// candidates. Evaluations that would exceed it fail fast instead of
    /// stalling the turn.
    pub max_total_playouts: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            weights: EvalWeights::default(),
            budget: RolloutBudget::default(),
            max_total_playouts: 1_000_000,
        }
    }
}

/// Owns the solver worker thread. Observations go in through a depth-one
/// mailbox, so a burst of screen redraws collapses to the newest state;
/// an evaluation already in flight always runs to completion.
pub struct SolverOrchestrator {
    mailbox: Arc<Mailbox<GameObservation>>,
    state: Arc<RwLock<SolverState>>,
    gate: OptimizerGate,
    worker: Option<JoinHandle<()>>,
}

impl SolverOrchestrator {
    /// Start the worker thread. Returned alongside the receiver that
    /// delivers `SolverEvent`s in the order the worker produced them.
    pub fn spawn(
        config: SolverConfig,
        catalog: Arc<dyn CardCatalog>,
        patterns: PatternTable,
        scores: CardScoreReader,
    ) -> (Self, Receiver<SolverEvent>) {
        let mailbox = Arc::new(Mailbox::new());
        let state = Arc::new(RwLock::new(SolverState::Idle));
        let gate = OptimizerGate::new();
        let (events, receiver) = mpsc::channel();

        let mut worker = Worker::new(
            config,
            catalog,
            patterns,
            scores,
            Arc::clone(&state),
            gate.clone(),
            events,
        );
        let worker_mailbox = Arc::clone(&mailbox);
        let handle = thread::spawn(move || {
            while let Some(observation) = worker_mailbox.take() {
                worker.step(observation);
            }
        });

        (
            Self {
                mailbox,
                state,
                gate,
                worker: Some(handle),
            },
            receiver,
        )
    }

    /// Hand the newest screen state to the worker. Replaces any observation
    /// it has not picked up yet.
    pub fn observe(&self, observation: GameObservation) {
        self.mailbox.post(observation);
    }

    pub fn state(&self) -> SolverState {
        *self.state.read()
    }

    /// Pause flag background optimizers should poll.
    pub fn optimizer_gate(&self) -> OptimizerGate {
        self.gate.clone()
    }
}

impl Drop for SolverOrchestrator {
    fn drop(&mut self) {
        self.mailbox.close();
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

struct Worker {
    evaluator: MoveEvaluator,
    max_total_playouts: usize,
    catalog: Arc<dyn CardCatalog>,
    patterns: PatternTable,
    strength: CardStrengthModel,
    rng: SmallRng,
    state: Arc<RwLock<SolverState>>,
    gate: OptimizerGate,
    events: Sender<SolverEvent>,
    last_signature: Option<StateSignature>,
    has_move: bool,
}

impl Worker {
    fn new(
        config: SolverConfig,
        catalog: Arc<dyn CardCatalog>,
        patterns: PatternTable,
        scores: CardScoreReader,
        state: Arc<RwLock<SolverState>>,
        gate: OptimizerGate,
        events: Sender<SolverEvent>,
    ) -> Self {
        let rng = match config.budget.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self {
            evaluator: MoveEvaluator::new(config.weights, config.budget),
            max_total_playouts: config.max_total_playouts,
            catalog,
            patterns,
            strength: CardStrengthModel::new(scores),
            rng,
            state,
            gate,
            events,
            last_signature: None,
            has_move: false,
        }
    }

    fn step(&mut self, observation: GameObservation) {
        if !observation.match_active {
            self.enter_inactive(SolverState::Idle);
            return;
        }

        let resolved = match observation.resolve(self.catalog.as_ref()) {
            Ok(resolved) => resolved,
            Err(kind) => {
                warn!(%kind, "observation did not parse");
                self.fail(SolverErrorKind::Parse(kind));
                return;
            }
        };

        if resolved.snapshot.turn != Owner::Blue {
            self.enter_inactive(SolverState::WaitingForTurn);
            return;
        }

        let signature = resolved.snapshot.signature();
        if self.last_signature.as_ref() == Some(&signature) {
            debug!("state unchanged since last evaluation");
            return;
        }

        self.set_state(SolverState::Evaluating);
        self.gate.pause();
        let outcome = self.evaluate(&resolved.snapshot);
        self.gate.resume();
        self.last_signature = Some(signature);

        match outcome {
            Ok(choice) => {
                info!(
                    card_idx = choice.card_idx,
                    board_pos = choice.board_pos,
                    win_chance = choice.win_chance,
                    "move ready"
                );
                self.set_state(SolverState::MoveReady);
                self.has_move = true;
                let _ = self.events.send(SolverEvent::MoveReady {
                    card_idx: choice.card_idx,
                    board_pos: choice.board_pos,
                    win_chance: choice.win_chance,
                    expected: choice.expected,
                });
            }
            Err(kind) => self.fail(kind),
        }
    }

    fn evaluate(&mut self, snapshot: &GameSnapshot) -> Result<MoveChoice, SolverErrorKind> {
        let candidates = snapshot.candidates(Owner::Blue);
        if candidates.is_empty() {
            return Err(SolverErrorKind::NoLegalMove);
        }
        let projected = candidates.len() * self.evaluator.budget().playouts_per_candidate();
        if projected > self.max_total_playouts {
            warn!(projected, limit = self.max_total_playouts, "evaluation over budget");
            return Err(SolverErrorKind::Timeout);
        }

        let ctx = EvalContext {
            snapshot,
            perspective: Owner::Blue,
            patterns: &self.patterns,
            strength: &self.strength,
        };
        let choice = match snapshot.forced_card {
            Some(card_idx) => {
                let forced = self.evaluator.choose_for_card(&ctx, card_idx, &mut self.rng);
                if forced.is_none() {
                    warn!(card_idx, "forced card is not playable, searching the full hand");
                }
                forced.or_else(|| self.evaluator.choose(&ctx, &mut self.rng))
            }
            None => self.evaluator.choose(&ctx, &mut self.rng),
        };
        choice.ok_or(SolverErrorKind::NoLegalMove)
    }

    fn fail(&mut self, kind: SolverErrorKind) {
        self.set_state(SolverState::Error(kind));
        self.clear_move();
        let _ = self.events.send(SolverEvent::Error(kind));
    }

    fn enter_inactive(&mut self, state: SolverState) {
        self.set_state(state);
        self.last_signature = None;
        self.clear_move();
    }

    fn clear_move(&mut self) {
        if self.has_move {
            self.has_move = false;
            let _ = self.events.send(SolverEvent::MoveCleared);
        }
    }

    fn set_state(&self, state: SolverState) {
        let mut current = self.state.write();
        if *current != state {
            debug!(?state, "solver state change");
            *current = state;
        }
    }
}
