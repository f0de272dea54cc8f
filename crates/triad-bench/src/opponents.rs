use rand::Rng;
use rand::rngs::SmallRng;
use serde::Deserialize;
use triad_core::model::board::{Board, PlacedCard};
use triad_core::model::deck::DeckInstance;
use triad_core::model::owner::Owner;
use triad_core::model::snapshot::MoveCandidate;

/// Cell preference for the center-biased policy: center, then edges, then
/// corners, row-major within each tier.
const CENTER_ORDER: [usize; 9] = [4, 1, 3, 5, 7, 0, 2, 6, 8];

/// Scripted opponent behaviors for self-play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Uniformly random legal move.
    #[default]
    Random,
    /// Maximizes immediate captures; first candidate wins ties.
    GreedyCapture,
    /// Strongest remaining card on the most central empty cell.
    CenterBiased,
}

/// Pick a move for `owner` from its own (fully known) deck. `None` only
/// when no legal move exists.
pub fn choose_move(
    kind: PolicyKind,
    board: &Board,
    deck: &DeckInstance,
    owner: Owner,
    rng: &mut SmallRng,
) -> Option<MoveCandidate> {
    match kind {
        PolicyKind::Random => random_move(board, deck, rng),
        PolicyKind::GreedyCapture => greedy_move(board, deck, owner),
        PolicyKind::CenterBiased => center_move(board, deck),
    }
}

fn random_move(board: &Board, deck: &DeckInstance, rng: &mut SmallRng) -> Option<MoveCandidate> {
    let cards: Vec<usize> = deck
        .available_indices()
        .filter(|&idx| deck.known_card(idx).is_some())
        .collect();
    let cells: Vec<usize> = board.empty_positions().collect();
    if cards.is_empty() || cells.is_empty() {
        return None;
    }
    Some(MoveCandidate {
        card_idx: cards[rng.gen_range(0..cards.len())],
        board_pos: cells[rng.gen_range(0..cells.len())],
    })
}

fn greedy_move(board: &Board, deck: &DeckInstance, owner: Owner) -> Option<MoveCandidate> {
    let mut best: Option<(MoveCandidate, usize)> = None;
    for card_idx in deck.available_indices() {
        let Some((card, sides)) = deck.known_card(card_idx) else {
            continue;
        };
        for board_pos in board.empty_positions() {
            let mut sim = board.clone();
            let Ok(captured) = sim.place(PlacedCard { card, sides, owner }, board_pos) else {
                continue;
            };
            let better = best.map_or(true, |(_, current)| captured > current);
            if better {
                best = Some((
                    MoveCandidate {
                        card_idx,
                        board_pos,
                    },
                    captured,
                ));
            }
        }
    }
    best.map(|(candidate, _)| candidate)
}

fn center_move(board: &Board, deck: &DeckInstance) -> Option<MoveCandidate> {
    let board_pos = CENTER_ORDER
        .into_iter()
        .find(|&pos| board.is_empty(pos))?;
    let card_idx = deck
        .available_indices()
        .filter(|&idx| deck.known_card(idx).is_some())
        .max_by(|&a, &b| {
            let strength = |idx: usize| {
                deck.known_card(idx)
                    .map_or(0.0, |(_, sides)| sides.base_strength())
            };
            strength(a)
                .partial_cmp(&strength(b))
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.cmp(&a))
        })?;
    Some(MoveCandidate {
        card_idx,
        board_pos,
    })
}

#[cfg(test)]
mod tests {
    use super::{PolicyKind, choose_move};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use triad_core::model::board::{Board, PlacedCard};
    use triad_core::model::card::{CardId, CardSides};
    use triad_core::model::deck::{DECK_SIZE, DeckInstance, DeckSlot};
    use triad_core::model::owner::Owner;

    fn deck() -> DeckInstance {
        let slots = core::array::from_fn(|idx| {
            DeckSlot::known(CardId(idx as u16 + 1), CardSides::uniform(idx as u8 + 3))
        });
        DeckInstance::new(slots)
    }

    #[test]
    fn random_moves_are_always_legal() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut board = Board::new();
        board
            .place(
                PlacedCard {
                    card: CardId(9),
                    sides: CardSides::uniform(5),
                    owner: Owner::Blue,
                },
                4,
            )
            .unwrap();
        for _ in 0..50 {
            let candidate = choose_move(
                PolicyKind::Random,
                &board,
                &deck(),
                Owner::Red,
                &mut rng,
            )
            .unwrap();
            assert!(board.is_empty(candidate.board_pos));
            assert!(candidate.card_idx < DECK_SIZE);
        }
    }

    #[test]
    fn greedy_takes_the_capture() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut board = Board::new();
        board
            .place(
                PlacedCard {
                    card: CardId(9),
                    sides: CardSides::uniform(4),
                    owner: Owner::Blue,
                },
                0,
            )
            .unwrap();
        let candidate = choose_move(
            PolicyKind::GreedyCapture,
            &board,
            &deck(),
            Owner::Red,
            &mut rng,
        )
        .unwrap();
        // Slot 2 (strength 5) is the first card strong enough to flip the
        // blue corner from an adjacent cell.
        assert_eq!(candidate.card_idx, 2);
        assert!(candidate.board_pos == 1 || candidate.board_pos == 3);
    }

    #[test]
    fn center_biased_opens_on_the_center_with_its_best_card() {
        let mut rng = SmallRng::seed_from_u64(5);
        let candidate = choose_move(
            PolicyKind::CenterBiased,
            &Board::new(),
            &deck(),
            Owner::Red,
            &mut rng,
        )
        .unwrap();
        assert_eq!(candidate.board_pos, 4);
        assert_eq!(candidate.card_idx, 4);
    }

    #[test]
    fn full_board_yields_no_move() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut board = Board::new();
        for pos in 0..9 {
            board
                .place(
                    PlacedCard {
                        card: CardId(9),
                        sides: CardSides::uniform(5),
                        owner: Owner::Blue,
                    },
                    pos,
                )
                .unwrap();
        }
        for kind in [
            PolicyKind::Random,
            PolicyKind::GreedyCapture,
            PolicyKind::CenterBiased,
        ] {
            assert!(choose_move(kind, &board, &deck(), Owner::Red, &mut rng).is_none());
        }
    }
}
