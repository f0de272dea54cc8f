use std::sync::Arc;
use std::time::{Duration, Instant};

use triad_core::catalog::{CardCatalog, StaticCatalog};
use triad_core::model::card::{Card, CardId, CardSides};
use triad_core::model::deck::FULL_DECK_MASK;
use triad_core::model::observation::{
    GameObservation, ObservedCell, ObservedSlot, ParseFailureKind,
};
use triad_core::model::owner::Owner;
use triad_solver::{
    PatternTable, RolloutBudget, SolverConfig, SolverErrorKind, SolverEvent, SolverOrchestrator,
    SolverState,
};
use triad_stats::card_score_store;

const EVENT_WAIT: Duration = Duration::from_secs(5);

/// Hand with one standout card in slot 2.
fn catalog() -> Arc<dyn CardCatalog> {
    let mut catalog = StaticCatalog::new();
    for id in 1..=5u16 {
        let sides = if id == 3 {
            CardSides::uniform(9)
        } else {
            CardSides::uniform(1)
        };
        catalog.insert(Card::new(CardId(id), format!("card-{id}"), sides));
    }
    Arc::new(catalog)
}

fn config() -> SolverConfig {
    SolverConfig {
        budget: RolloutBudget {
            target_simulations: 500,
            max_outer: 50,
            inner_samples: 5,
            depth: 3,
            seed: Some(17),
        },
        ..SolverConfig::default()
    }
}

fn spawn() -> (SolverOrchestrator, std::sync::mpsc::Receiver<SolverEvent>) {
    let (_writer, scores) = card_score_store();
    SolverOrchestrator::spawn(config(), catalog(), PatternTable::new(), scores)
}

fn observation() -> GameObservation {
    GameObservation {
        match_active: true,
        board: [ObservedCell::Empty; 9],
        blue_deck: [
            ObservedSlot::Card(CardId(1)),
            ObservedSlot::Card(CardId(2)),
            ObservedSlot::Card(CardId(3)),
            ObservedSlot::Card(CardId(4)),
            ObservedSlot::Card(CardId(5)),
        ],
        blue_mask: FULL_DECK_MASK,
        red_deck: [ObservedSlot::Hidden; 5],
        red_mask: FULL_DECK_MASK,
        turn: Owner::Blue,
        forced_card: None,
        opponent: Some("Rival".into()),
        rules: vec![Some("Plus".into())],
        timestamp_ms: 1,
    }
}

fn wait_for_state(orchestrator: &SolverOrchestrator, wanted: SolverState) {
    let deadline = Instant::now() + EVENT_WAIT;
    loop {
        if orchestrator.state() == wanted {
            return;
        }
        if Instant::now() > deadline {
            panic!(
                "solver never reached {wanted:?}, still {:?}",
                orchestrator.state()
            );
        }
        std::thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn inactive_match_parks_the_solver_idle() {
    let (orchestrator, _events) = spawn();
    let mut obs = observation();
    obs.match_active = false;
    orchestrator.observe(obs);
    wait_for_state(&orchestrator, SolverState::Idle);
}

#[test]
fn opponent_turn_waits_without_evaluating() {
    let (orchestrator, events) = spawn();
    let mut obs = observation();
    obs.turn = Owner::Red;
    orchestrator.observe(obs);
    wait_for_state(&orchestrator, SolverState::WaitingForTurn);
    assert!(events.try_recv().is_err());
}

#[test]
fn standout_card_is_suggested_at_the_center() {
    let (orchestrator, events) = spawn();
    orchestrator.observe(observation());
    match events.recv_timeout(EVENT_WAIT).unwrap() {
        SolverEvent::MoveReady {
            card_idx,
            board_pos,
            win_chance,
            ..
        } => {
            assert_eq!(card_idx, 2);
            assert_eq!(board_pos, 4);
            assert!((0.0..=1.0).contains(&win_chance));
        }
        other => panic!("expected a move, got {other:?}"),
    }
    wait_for_state(&orchestrator, SolverState::MoveReady);
    assert!(!orchestrator.optimizer_gate().is_paused());
}

#[test]
fn forced_card_overrides_the_hand_search() {
    let (orchestrator, events) = spawn();
    let mut obs = observation();
    obs.forced_card = Some(0);
    orchestrator.observe(obs);
    match events.recv_timeout(EVENT_WAIT).unwrap() {
        SolverEvent::MoveReady { card_idx, .. } => assert_eq!(card_idx, 0),
        other => panic!("expected a move, got {other:?}"),
    }
}

#[test]
fn unchanged_state_is_not_reevaluated() {
    let (orchestrator, events) = spawn();
    orchestrator.observe(observation());
    assert!(matches!(
        events.recv_timeout(EVENT_WAIT).unwrap(),
        SolverEvent::MoveReady { .. }
    ));
    // Same screen state again: the worker must swallow it silently.
    orchestrator.observe(observation());
    assert!(events.recv_timeout(Duration::from_millis(300)).is_err());
}

#[test]
fn full_board_reports_no_legal_move() {
    let (orchestrator, events) = spawn();
    let mut obs = observation();
    obs.board = core::array::from_fn(|pos| ObservedCell::Occupied {
        card: Some(CardId((pos % 5 + 1) as u16)),
        owner: Owner::Red,
    });
    orchestrator.observe(obs);
    assert_eq!(
        events.recv_timeout(EVENT_WAIT).unwrap(),
        SolverEvent::Error(SolverErrorKind::NoLegalMove)
    );
    wait_for_state(
        &orchestrator,
        SolverState::Error(SolverErrorKind::NoLegalMove),
    );
}

#[test]
fn unreadable_cards_surface_as_a_parse_error() {
    let (orchestrator, events) = spawn();
    let mut obs = observation();
    obs.blue_deck[1] = ObservedSlot::Unreadable;
    orchestrator.observe(obs);
    assert_eq!(
        events.recv_timeout(EVENT_WAIT).unwrap(),
        SolverEvent::Error(SolverErrorKind::Parse(ParseFailureKind::Cards))
    );
}

#[test]
fn match_end_clears_an_announced_move() {
    let (orchestrator, events) = spawn();
    orchestrator.observe(observation());
    assert!(matches!(
        events.recv_timeout(EVENT_WAIT).unwrap(),
        SolverEvent::MoveReady { .. }
    ));

    let mut over = observation();
    over.match_active = false;
    orchestrator.observe(over);
    assert_eq!(
        events.recv_timeout(EVENT_WAIT).unwrap(),
        SolverEvent::MoveCleared
    );
    wait_for_state(&orchestrator, SolverState::Idle);
}

#[test]
fn oversized_budget_fails_fast_instead_of_stalling() {
    let (_writer, scores) = card_score_store();
    let config = SolverConfig {
        max_total_playouts: 10,
        ..config()
    };
    let (orchestrator, events) =
        SolverOrchestrator::spawn(config, catalog(), PatternTable::new(), scores);
    orchestrator.observe(observation());
    assert_eq!(
        events.recv_timeout(EVENT_WAIT).unwrap(),
        SolverEvent::Error(SolverErrorKind::Timeout)
    );
}
