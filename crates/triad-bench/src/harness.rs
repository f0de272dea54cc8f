use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow, bail};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use triad_core::catalog::{CardCatalog, StaticCatalog};
use triad_core::model::board::{BOARD_CELLS, Board, PlacedCard};
use triad_core::model::card::{Card, CardId, CardSides};
use triad_core::model::deck::{DECK_SIZE, DeckInstance, DeckSlot};
use triad_core::model::observation::{GameObservation, ObservedCell, ObservedSlot};
use triad_core::model::owner::Owner;
use triad_core::model::rules::RuleSet;
use triad_solver::{PatternTable, SolverConfig, SolverEvent, SolverOrchestrator};
use triad_stats::{
    MatchOutcome, MatchRecord, MatchRecorder, MoveEvent, OpponentProfile, OpponentProfileStore,
    card_score_store,
};

use crate::config::{HarnessConfig, OpponentConfig};
use crate::opponents::choose_move;

const SAMPLE_CATALOG_SIZE: u16 = 30;
const MOVE_WAIT: Duration = Duration::from_secs(30);

/// Self-play driver: pits the solver against scripted opponents, feeding
/// every finished match back through the recorder so later matches run on
/// learned state.
pub struct Harness {
    config: HarnessConfig,
    catalog: Arc<StaticCatalog>,
}

/// Per-opponent outcome block.
pub struct OpponentReport {
    pub name: String,
    pub matches: usize,
    pub wins: usize,
    pub realized_rate: f32,
    /// Win prediction for a fresh deck after the whole block was folded in.
    pub predicted_next: f32,
    pub profile: Option<OpponentProfile>,
}

pub struct RunReport {
    pub opponents: Vec<OpponentReport>,
    /// Best-performing cards by learned score, strongest first.
    pub top_cards: Vec<(CardId, f32)>,
    pub matches_recorded: usize,
    pub export_path: Option<PathBuf>,
}

impl Harness {
    pub fn new(config: HarnessConfig) -> Result<Self> {
        let catalog = match &config.catalog {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("reading card list at {}", path.display()))?;
                StaticCatalog::from_json_str(&raw)
                    .with_context(|| format!("parsing card list at {}", path.display()))?
            }
            None => sample_catalog(),
        };
        if catalog.len() < 2 * DECK_SIZE {
            bail!(
                "card list holds {} cards, need at least {} to deal two decks",
                catalog.len(),
                2 * DECK_SIZE
            );
        }
        Ok(Self {
            config,
            catalog: Arc::new(catalog),
        })
    }

    pub fn run(&self) -> Result<RunReport> {
        let seed = self.config.matches.seed.unwrap_or(0);
        let (score_writer, score_reader) = card_score_store();
        let profiles = Arc::new(OpponentProfileStore::new());
        let mut recorder = MatchRecorder::new(Arc::clone(&profiles), score_writer);

        let solver_config = SolverConfig {
            budget: self.config.solver.budget(Some(seed)),
            ..SolverConfig::default()
        };
        let (orchestrator, events) = SolverOrchestrator::spawn(
            solver_config,
            Arc::clone(&self.catalog) as Arc<dyn CardCatalog>,
            PatternTable::new(),
            score_reader.clone(),
        );

        let rules = RuleSet::from_names(["Open"]);
        let mut reports = Vec::with_capacity(self.config.opponents.len());
        let mut tick: u64 = 1;

        for (block, opponent) in self.config.opponents.iter().enumerate() {
            let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(block as u64));
            let mut wins = 0usize;

            for match_index in 0..self.config.matches.per_opponent {
                let record = self.play_match(
                    &orchestrator,
                    &events,
                    opponent,
                    &rules,
                    match_index,
                    tick,
                    &mut rng,
                )?;
                tick += 60_000;
                if record.won() {
                    wins += 1;
                }
                recorder.record(record);
                // Park the solver so the next match starts from a clean
                // signature.
                orchestrator.observe(match_over_observation(tick));
            }

            let matches = self.config.matches.per_opponent;
            let next_deck = draw_ids(&self.catalog, &mut rng);
            let predicted_next =
                recorder.predict_win(&next_deck, &rules, &opponent.name, self.catalog.as_ref());
            let realized_rate = wins as f32 / matches as f32;
            info!(
                opponent = %opponent.name,
                wins,
                matches,
                predicted_next,
                "opponent block finished"
            );
            reports.push(OpponentReport {
                name: opponent.name.clone(),
                matches,
                wins,
                realized_rate,
                predicted_next,
                profile: profiles.profile(&opponent.name),
            });
        }

        let export_path = match &self.config.export_json {
            Some(path) => {
                let raw = recorder.export_json().context("serializing history export")?;
                fs::write(path, raw)
                    .with_context(|| format!("writing export to {}", path.display()))?;
                Some(path.clone())
            }
            None => None,
        };

        let mut top_cards = score_reader.ranked();
        top_cards.truncate(5);

        Ok(RunReport {
            opponents: reports,
            top_cards,
            matches_recorded: recorder.len(),
            export_path,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn play_match(
        &self,
        orchestrator: &SolverOrchestrator,
        events: &Receiver<SolverEvent>,
        opponent: &OpponentConfig,
        rules: &RuleSet,
        match_index: usize,
        timestamp_ms: u64,
        rng: &mut SmallRng,
    ) -> Result<MatchRecord> {
        let blue_ids = draw_ids(&self.catalog, rng);
        let red_ids = draw_ids(&self.catalog, rng);
        let mut blue = deck_from_ids(&self.catalog, &blue_ids)?;
        let mut red = deck_from_ids(&self.catalog, &red_ids)?;

        let mut board = Board::new();
        let mut moves = Vec::with_capacity(BOARD_CELLS);
        let mut turn = if match_index % 2 == 0 {
            Owner::Blue
        } else {
            Owner::Red
        };
        let mut tick = timestamp_ms;

        while board.empty_count() > 0 {
            match turn {
                Owner::Blue => {
                    if blue.available_count() == 0 {
                        break;
                    }
                    orchestrator.observe(self.blue_turn_observation(
                        &board,
                        &blue,
                        &red,
                        &opponent.name,
                        tick,
                    ));
                    let started = Instant::now();
                    let (card_idx, board_pos) = wait_for_move(events)?;
                    let (card, sides) = blue
                        .known_card(card_idx)
                        .context("solver chose a card slot outside the hand")?;
                    let captured = board
                        .place(
                            PlacedCard {
                                card,
                                sides,
                                owner: Owner::Blue,
                            },
                            board_pos,
                        )
                        .map_err(|err| anyhow!("solver suggested an illegal move: {err:?}"))?;
                    blue.mark_played(card_idx);
                    moves.push(MoveEvent {
                        card,
                        position: board_pos,
                        mover: Owner::Blue,
                        think_time_ms: started.elapsed().as_millis() as u32,
                        captured: captured as u8,
                    });
                }
                Owner::Red => {
                    if red.available_count() == 0 {
                        break;
                    }
                    let Some(candidate) =
                        choose_move(opponent.policy, &board, &red, Owner::Red, rng)
                    else {
                        break;
                    };
                    let (card, sides) = red
                        .known_card(candidate.card_idx)
                        .context("scripted opponent chose an unknown card")?;
                    let captured = board
                        .place(
                            PlacedCard {
                                card,
                                sides,
                                owner: Owner::Red,
                            },
                            candidate.board_pos,
                        )
                        .map_err(|err| anyhow!("scripted opponent move was illegal: {err:?}"))?;
                    red.mark_played(candidate.card_idx);
                    moves.push(MoveEvent {
                        card,
                        position: candidate.board_pos,
                        mover: Owner::Red,
                        think_time_ms: rng.gen_range(300..1_500),
                        captured: captured as u8,
                    });
                }
            }
            turn = turn.opponent();
            tick += 1_000;
        }

        let outcome = if board.owned_count(Owner::Blue) > board.owned_count(Owner::Red) {
            MatchOutcome::Won
        } else {
            MatchOutcome::Lost
        };
        let duration_ms = moves
            .iter()
            .map(|event| event.think_time_ms as u64)
            .sum();

        Ok(MatchRecord {
            timestamp_ms,
            opponent: opponent.name.clone(),
            player_cards: blue_ids,
            opponent_cards: red_ids,
            rules: rules.clone(),
            outcome,
            moves,
            duration_ms,
        })
    }

    /// Screen-state stand-in for the solver: the red hand is reported
    /// hidden, exactly as a live capture would see it.
    fn blue_turn_observation(
        &self,
        board: &Board,
        blue: &DeckInstance,
        red: &DeckInstance,
        opponent: &str,
        timestamp_ms: u64,
    ) -> GameObservation {
        let cells = core::array::from_fn(|pos| match board.cell(pos).placed() {
            None => ObservedCell::Empty,
            Some(placed) => ObservedCell::Occupied {
                card: Some(placed.card),
                owner: placed.owner,
            },
        });
        let blue_slots = core::array::from_fn(|idx| match blue.known_card(idx) {
            Some((card, _)) => ObservedSlot::Card(card),
            None => ObservedSlot::Unreadable,
        });
        GameObservation {
            match_active: true,
            board: cells,
            blue_deck: blue_slots,
            blue_mask: blue.available_mask(),
            red_deck: [ObservedSlot::Hidden; DECK_SIZE],
            red_mask: red.available_mask(),
            turn: Owner::Blue,
            forced_card: None,
            opponent: Some(opponent.to_string()),
            rules: vec![Some("Open".to_string())],
            timestamp_ms,
        }
    }
}

fn wait_for_move(events: &Receiver<SolverEvent>) -> Result<(usize, usize)> {
    loop {
        match events
            .recv_timeout(MOVE_WAIT)
            .context("solver produced no move in time")?
        {
            SolverEvent::MoveReady {
                card_idx,
                board_pos,
                ..
            } => return Ok((card_idx, board_pos)),
            SolverEvent::MoveCleared => continue,
            SolverEvent::Error(kind) => bail!("solver reported an error: {kind}"),
        }
    }
}

fn match_over_observation(timestamp_ms: u64) -> GameObservation {
    GameObservation {
        match_active: false,
        board: [ObservedCell::Empty; BOARD_CELLS],
        blue_deck: [ObservedSlot::Hidden; DECK_SIZE],
        blue_mask: 0,
        red_deck: [ObservedSlot::Hidden; DECK_SIZE],
        red_mask: 0,
        turn: Owner::Blue,
        forced_card: None,
        opponent: None,
        rules: Vec::new(),
        timestamp_ms,
    }
}

/// Five distinct card ids sampled from the catalog.
fn draw_ids(catalog: &StaticCatalog, rng: &mut SmallRng) -> Vec<CardId> {
    let ids = catalog.ids();
    rand::seq::index::sample(rng, ids.len(), DECK_SIZE)
        .into_iter()
        .map(|idx| ids[idx])
        .collect()
}

fn deck_from_ids(catalog: &StaticCatalog, ids: &[CardId]) -> Result<DeckInstance> {
    let mut slots = [DeckSlot::Hidden; DECK_SIZE];
    for (slot, &id) in slots.iter_mut().zip(ids) {
        let card = catalog
            .card(id)
            .ok_or_else(|| anyhow!("card {id} is missing from the catalog"))?;
        *slot = DeckSlot::known(id, card.sides);
    }
    Ok(DeckInstance::new(slots))
}

/// Built-in card list used when no catalog file is configured. Fixed seed,
/// so decks and results are reproducible run to run.
fn sample_catalog() -> StaticCatalog {
    let mut rng = SmallRng::seed_from_u64(0x5EED);
    let mut catalog = StaticCatalog::new();
    for id in 1..=SAMPLE_CATALOG_SIZE {
        let card = Card::new(
            CardId(id),
            format!("sample-{id:02}"),
            CardSides::random(&mut rng),
        );
        let counter = CardId(id % SAMPLE_CATALOG_SIZE + 1);
        catalog.insert_with_counters(card, vec![counter]);
    }
    catalog
}

#[cfg(test)]
mod tests {
    use super::{draw_ids, sample_catalog};
    use rand::SeedableRng;
    use triad_core::catalog::CardCatalog;
    use rand::rngs::SmallRng;
    use std::collections::HashSet;

    #[test]
    fn sample_catalog_is_deterministic() {
        let a = sample_catalog();
        let b = sample_catalog();
        assert_eq!(a.len(), 30);
        assert_eq!(a.ids(), b.ids());
        for id in a.ids() {
            assert_eq!(a.card(id).map(|c| c.sides), b.card(id).map(|c| c.sides));
        }
    }

    #[test]
    fn drawn_decks_hold_five_distinct_cards() {
        let catalog = sample_catalog();
        let mut rng = SmallRng::seed_from_u64(3);
        let ids = draw_ids(&catalog, &mut rng);
        assert_eq!(ids.len(), 5);
        assert_eq!(ids.iter().collect::<HashSet<_>>().len(), 5);
    }
}
