use serde::{Deserialize, Serialize};
use triad_core::model::card::CardId;
use triad_core::model::owner::Owner;
use triad_core::model::rules::RuleSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    Won,
    Lost,
}

/// One placement during a match, as seen from the engine's side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveEvent {
    pub card: CardId,
    pub position: usize,
    pub mover: Owner,
    pub think_time_ms: u32,
    pub captured: u8,
}

/// Completed match. Immutable once built; the recorder owns it until it has
/// been folded into the aggregate stores, after which it is kept read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub timestamp_ms: u64,
    pub opponent: String,
    pub player_cards: Vec<CardId>,
    pub opponent_cards: Vec<CardId>,
    pub rules: RuleSet,
    pub outcome: MatchOutcome,
    pub moves: Vec<MoveEvent>,
    pub duration_ms: u64,
}

impl MatchRecord {
    pub fn won(&self) -> bool {
        self.outcome == MatchOutcome::Won
    }

    pub fn opponent_moves(&self) -> impl Iterator<Item = &MoveEvent> {
        self.moves.iter().filter(|event| event.mover == Owner::Red)
    }

    pub fn player_moves(&self) -> impl Iterator<Item = &MoveEvent> {
        self.moves.iter().filter(|event| event.mover == Owner::Blue)
    }
}

#[cfg(test)]
mod tests {
    use super::{MatchOutcome, MatchRecord, MoveEvent};
    use triad_core::model::card::CardId;
    use triad_core::model::owner::Owner;
    use triad_core::model::rules::RuleSet;

    fn record() -> MatchRecord {
        MatchRecord {
            timestamp_ms: 10,
            opponent: "Rival".into(),
            player_cards: vec![CardId(1)],
            opponent_cards: vec![CardId(2)],
            rules: RuleSet::new(),
            outcome: MatchOutcome::Won,
            moves: vec![
                MoveEvent {
                    card: CardId(1),
                    position: 4,
                    mover: Owner::Blue,
                    think_time_ms: 900,
                    captured: 1,
                },
                MoveEvent {
                    card: CardId(2),
                    position: 0,
                    mover: Owner::Red,
                    think_time_ms: 2100,
                    captured: 0,
                },
            ],
            duration_ms: 60_000,
        }
    }

    #[test]
    fn splits_moves_by_mover() {
        let record = record();
        assert!(record.won());
        assert_eq!(record.player_moves().count(), 1);
        assert_eq!(record.opponent_moves().next().unwrap().card, CardId(2));
    }

    #[test]
    fn serializes_to_json() {
        let raw = serde_json::to_string(&record()).unwrap();
        let back: MatchRecord = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, record());
    }
}
