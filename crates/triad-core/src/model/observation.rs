use crate::catalog::CardCatalog;
use crate::model::board::{BOARD_CELLS, Board, Cell, PlacedCard};
use crate::model::deck::{DECK_SIZE, DeckInstance, DeckSlot};
use crate::model::owner::Owner;
use crate::model::rules::RuleSet;
use crate::model::snapshot::GameSnapshot;
use core::fmt;
use serde::{Deserialize, Serialize};

/// What the external screen scraper reports for one board cell.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ObservedCell {
    #[default]
    Empty,
    Occupied {
        /// `None` when the scraper could not identify the card.
        card: Option<crate::model::card::CardId>,
        owner: Owner,
    },
}

/// What the scraper reports for one deck slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObservedSlot {
    /// Identified card.
    Card(crate::model::card::CardId),
    /// A card is there but its identity has not been revealed yet.
    Hidden,
    /// The scraper saw a card but could not read it.
    Unreadable,
}

/// Raw state delivered by the external scraper on every redraw. The solver
/// never trusts it directly; `resolve` turns it into a `GameSnapshot` or a
/// parse failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameObservation {
    pub match_active: bool,
    pub board: [ObservedCell; BOARD_CELLS],
    pub blue_deck: [ObservedSlot; DECK_SIZE],
    pub blue_mask: u8,
    pub red_deck: [ObservedSlot; DECK_SIZE],
    pub red_mask: u8,
    pub turn: Owner,
    pub forced_card: Option<usize>,
    /// `None` when the opponent's name could not be read.
    pub opponent: Option<String>,
    /// One entry per active rule; `None` when a rule token was unreadable.
    pub rules: Vec<Option<String>>,
    pub timestamp_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParseFailureKind {
    Cards,
    Rules,
    Opponent,
}

impl fmt::Display for ParseFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseFailureKind::Cards => write!(f, "cards"),
            ParseFailureKind::Rules => write!(f, "rules"),
            ParseFailureKind::Opponent => write!(f, "opponent"),
        }
    }
}

/// Fully decoded observation: game snapshot plus match identity.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedObservation {
    pub snapshot: GameSnapshot,
    pub opponent: String,
    pub rules: RuleSet,
    pub timestamp_ms: u64,
}

impl GameObservation {
    /// Decode into a snapshot, validating every card against the catalog.
    /// Failure kinds are prioritized cards, then rules, then opponent, so a
    /// screen with several problems reports the most fundamental one.
    pub fn resolve(
        &self,
        catalog: &dyn CardCatalog,
    ) -> Result<ResolvedObservation, ParseFailureKind> {
        let mut failed_cards = false;
        let mut failed_rules = false;

        let mut cells = [Cell::Empty; BOARD_CELLS];
        for (pos, observed) in self.board.iter().enumerate() {
            match observed {
                ObservedCell::Empty => {}
                ObservedCell::Occupied {
                    card: Some(id),
                    owner,
                } => match catalog.card(*id) {
                    Some(card) => {
                        cells[pos] = Cell::Occupied(PlacedCard {
                            card: *id,
                            sides: card.sides,
                            owner: *owner,
                        });
                    }
                    None => failed_cards = true,
                },
                ObservedCell::Occupied { card: None, .. } => failed_cards = true,
            }
        }

        let blue_deck = resolve_deck(&self.blue_deck, self.blue_mask, catalog, &mut failed_cards);
        // A hidden own card is unreadable; the solver cannot weigh it.
        if self
            .blue_deck
            .iter()
            .any(|slot| matches!(slot, ObservedSlot::Hidden))
        {
            failed_cards = true;
        }
        let red_deck = resolve_deck(&self.red_deck, self.red_mask, catalog, &mut failed_cards);

        let mut rules = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            match rule {
                Some(name) => rules.push(name.clone()),
                None => failed_rules = true,
            }
        }

        let opponent = self
            .opponent
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty());

        if failed_cards {
            return Err(ParseFailureKind::Cards);
        }
        if failed_rules {
            return Err(ParseFailureKind::Rules);
        }
        let Some(opponent) = opponent else {
            return Err(ParseFailureKind::Opponent);
        };

        Ok(ResolvedObservation {
            snapshot: GameSnapshot {
                board: Board::from_cells(cells),
                blue_deck,
                red_deck,
                turn: self.turn,
                forced_card: self.forced_card,
            },
            opponent: opponent.to_string(),
            rules: RuleSet::from_names(rules),
            timestamp_ms: self.timestamp_ms,
        })
    }
}

fn resolve_deck(
    observed: &[ObservedSlot; DECK_SIZE],
    mask: u8,
    catalog: &dyn CardCatalog,
    failed_cards: &mut bool,
) -> DeckInstance {
    let mut slots = [DeckSlot::Hidden; DECK_SIZE];
    for (idx, slot) in observed.iter().enumerate() {
        match slot {
            ObservedSlot::Card(id) => match catalog.card(*id) {
                Some(card) => slots[idx] = DeckSlot::known(*id, card.sides),
                None => *failed_cards = true,
            },
            ObservedSlot::Hidden => {}
            ObservedSlot::Unreadable => *failed_cards = true,
        }
    }
    DeckInstance::with_mask(slots, mask)
}

#[cfg(test)]
mod tests {
    use super::{GameObservation, ObservedCell, ObservedSlot, ParseFailureKind};
    use crate::catalog::StaticCatalog;
    use crate::model::card::{Card, CardId, CardSides};
    use crate::model::deck::FULL_DECK_MASK;
    use crate::model::owner::Owner;

    fn catalog() -> StaticCatalog {
        let mut catalog = StaticCatalog::new();
        for id in 1..=10u16 {
            catalog.insert(Card::new(
                CardId(id),
                format!("card-{id}"),
                CardSides::uniform((id % 10) as u8),
            ));
        }
        catalog
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

    #[test]
    fn clean_observation_resolves() {
        let resolved = observation().resolve(&catalog()).unwrap();
        assert_eq!(resolved.opponent, "Rival");
        assert!(resolved.rules.contains("Plus"));
        assert_eq!(resolved.snapshot.blue_deck.available_count(), 5);
        assert_eq!(resolved.snapshot.board.empty_count(), 9);
    }

    #[test]
    fn unknown_board_card_fails_as_cards() {
        let mut obs = observation();
        obs.board[4] = ObservedCell::Occupied {
            card: Some(CardId(999)),
            owner: Owner::Red,
        };
        assert_eq!(obs.resolve(&catalog()), Err(ParseFailureKind::Cards));
    }

    #[test]
    fn unreadable_rule_fails_as_rules() {
        let mut obs = observation();
        obs.rules.push(None);
        assert_eq!(obs.resolve(&catalog()), Err(ParseFailureKind::Rules));
    }

    #[test]
    fn missing_opponent_fails_as_opponent() {
        let mut obs = observation();
        obs.opponent = Some("   ".into());
        assert_eq!(obs.resolve(&catalog()), Err(ParseFailureKind::Opponent));
    }

    #[test]
    fn cards_failure_outranks_rules_and_opponent() {
        let mut obs = observation();
        obs.blue_deck[0] = ObservedSlot::Unreadable;
        obs.rules.push(None);
        obs.opponent = None;
        assert_eq!(obs.resolve(&catalog()), Err(ParseFailureKind::Cards));
    }

    #[test]
    fn hidden_own_card_is_a_cards_failure() {
        let mut obs = observation();
        obs.blue_deck[2] = ObservedSlot::Hidden;
        assert_eq!(obs.resolve(&catalog()), Err(ParseFailureKind::Cards));
    }

    #[test]
    fn hidden_red_cards_are_fine() {
        let mut obs = observation();
        obs.red_deck = [
            ObservedSlot::Card(CardId(6)),
            ObservedSlot::Hidden,
            ObservedSlot::Hidden,
            ObservedSlot::Hidden,
            ObservedSlot::Hidden,
        ];
        let resolved = obs.resolve(&catalog()).unwrap();
        let (known, hidden) = resolved.snapshot.red_deck.known_and_hidden();
        assert_eq!(known, vec![CardId(6)]);
        assert_eq!(hidden, 4);
    }
}
