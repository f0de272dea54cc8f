use crate::history::MatchRecord;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use triad_core::catalog::CardCatalog;
use triad_core::model::board::BOARD_CELLS;
use triad_core::model::card::CardId;
use triad_core::model::rules::RuleSet;

/// Base win prediction for an opponent with no recorded history.
pub const UNSEEN_WIN_RATE: f32 = 0.5;
/// Prediction bonus per counter card present in the player's deck.
pub const COUNTER_CARD_BONUS: f32 = 0.1;

/// Aggregated statistics for one opponent, derived entirely from the
/// retained match records and rebuilt whenever a new one arrives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpponentProfile {
    pub name: String,
    pub win_rate_against: f32,
    /// Every card the opponent has been seen playing with, de-duplicated,
    /// in order of first appearance.
    pub preferred_cards: Vec<CardId>,
    position_counts: [u32; BOARD_CELLS],
    pub average_think_time_ms: f32,
    pub last_encounter_ms: u64,
}

impl OpponentProfile {
    /// Rebuild the profile from every retained record against this
    /// opponent. `records` must be non-empty and filtered to the opponent.
    fn from_records<'a, I>(name: &str, records: I) -> Self
    where
        I: IntoIterator<Item = &'a MatchRecord>,
    {
        let mut matches = 0u32;
        let mut wins = 0u32;
        let mut preferred = Vec::new();
        let mut counts = [0u32; BOARD_CELLS];
        let mut think_total_ms = 0u64;
        let mut think_moves = 0u64;
        let mut last_encounter = 0u64;

        for record in records {
            matches += 1;
            if record.won() {
                wins += 1;
            }
            for &card in &record.opponent_cards {
                if !preferred.contains(&card) {
                    preferred.push(card);
                }
            }
            for event in record.opponent_moves() {
                if event.position < BOARD_CELLS {
                    counts[event.position] += 1;
                }
                think_total_ms += event.think_time_ms as u64;
                think_moves += 1;
            }
            last_encounter = last_encounter.max(record.timestamp_ms);
        }

        let win_rate_against = if matches > 0 {
            wins as f32 / matches as f32
        } else {
            0.0
        };
        let average_think_time_ms = if think_moves > 0 {
            think_total_ms as f32 / think_moves as f32
        } else {
            0.0
        };

        Self {
            name: name.to_string(),
            win_rate_against,
            preferred_cards: preferred,
            position_counts: counts,
            average_think_time_ms,
            last_encounter_ms: last_encounter,
        }
    }

    /// Normalized distribution over the nine cells, summing to 1. `None`
    /// until at least one opponent move has been observed.
    pub fn position_distribution(&self) -> Option<[f32; BOARD_CELLS]> {
        let total: u32 = self.position_counts.iter().sum();
        if total == 0 {
            return None;
        }
        let mut out = [0.0; BOARD_CELLS];
        for (slot, count) in out.iter_mut().zip(self.position_counts.iter()) {
            *slot = *count as f32 / total as f32;
        }
        Some(out)
    }
}

/// One profile per opponent name. Rebuilt by the match recorder (the only
/// writer, enforced by the crate-private fold); everything else gets
/// cloned snapshots, so readers never see a half-updated profile.
#[derive(Debug, Default)]
pub struct OpponentProfileStore {
    profiles: RwLock<HashMap<String, OpponentProfile>>,
}

impl OpponentProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fold_record<'a, I>(&self, record: &MatchRecord, retained: I)
    where
        I: IntoIterator<Item = &'a MatchRecord>,
    {
        let profile = OpponentProfile::from_records(
            &record.opponent,
            retained
                .into_iter()
                .filter(|other| other.opponent == record.opponent),
        );
        self.profiles
            .write()
            .insert(record.opponent.clone(), profile);
    }

    pub fn profile(&self, opponent: &str) -> Option<OpponentProfile> {
        self.profiles.read().get(opponent).cloned()
    }

    pub fn profiles(&self) -> Vec<OpponentProfile> {
        let mut out: Vec<_> = self.profiles.read().values().cloned().collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    pub fn len(&self) -> usize {
        self.profiles.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.read().is_empty()
    }

    /// Union of the known counters of every card this opponent prefers,
    /// de-duplicated, in first-appearance order.
    pub fn counter_cards(&self, opponent: &str, catalog: &dyn CardCatalog) -> Vec<CardId> {
        let Some(profile) = self.profile(opponent) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for &card in &profile.preferred_cards {
            for &counter in catalog.counters(card) {
                if !out.contains(&counter) {
                    out.push(counter);
                }
            }
        }
        out
    }

    /// Expected win chance in [0, 1] for playing `player_cards` under
    /// `rules` against `opponent`. `retained` is the full retained match
    /// history, used for the rule-specific blend.
    pub fn predict_win<'a, I>(
        &self,
        player_cards: &[CardId],
        rules: &RuleSet,
        opponent: &str,
        catalog: &dyn CardCatalog,
        retained: I,
    ) -> f32
    where
        I: IntoIterator<Item = &'a MatchRecord>,
    {
        let mut prediction = self
            .profile(opponent)
            .map_or(UNSEEN_WIN_RATE, |profile| profile.win_rate_against);

        let counters = self.counter_cards(opponent, catalog);
        let mut seen = Vec::new();
        for &card in player_cards {
            if counters.contains(&card) && !seen.contains(&card) {
                seen.push(card);
            }
        }
        prediction += seen.len() as f32 * COUNTER_CARD_BONUS;

        let mut rule_matches = 0u32;
        let mut rule_wins = 0u32;
        for record in retained {
            if record.opponent == opponent && record.rules == *rules {
                rule_matches += 1;
                if record.won() {
                    rule_wins += 1;
                }
            }
        }
        if rule_matches > 0 {
            let rule_win_rate = rule_wins as f32 / rule_matches as f32;
            prediction = (prediction + rule_win_rate) / 2.0;
        }

        prediction.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{OpponentProfile, OpponentProfileStore};
    use crate::history::{MatchOutcome, MatchRecord, MoveEvent};
    use triad_core::catalog::StaticCatalog;
    use triad_core::model::card::{Card, CardId, CardSides};
    use triad_core::model::owner::Owner;
    use triad_core::model::rules::RuleSet;

    fn record(opponent: &str, won: bool, positions: &[usize]) -> MatchRecord {
        let moves = positions
            .iter()
            .map(|&position| MoveEvent {
                card: CardId(20),
                position,
                mover: Owner::Red,
                think_time_ms: 1000,
                captured: 0,
            })
            .collect();
        MatchRecord {
            timestamp_ms: 5,
            opponent: opponent.into(),
            player_cards: vec![CardId(1)],
            opponent_cards: vec![CardId(20), CardId(21)],
            rules: RuleSet::new(),
            outcome: if won {
                MatchOutcome::Won
            } else {
                MatchOutcome::Lost
            },
            moves,
            duration_ms: 30_000,
        }
    }

    #[test]
    fn distribution_sums_to_one_after_first_move() {
        let store = OpponentProfileStore::new();
        let history = vec![record("Rival", true, &[4, 4, 0])];
        store.fold_record(&history[0], &history);

        let profile = store.profile("Rival").unwrap();
        let dist = profile.position_distribution().unwrap();
        let total: f32 = dist.iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
        assert!((dist[4] - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn distribution_is_empty_without_opponent_moves() {
        let store = OpponentProfileStore::new();
        let history = vec![record("Rival", true, &[])];
        store.fold_record(&history[0], &history);
        let profile = store.profile("Rival").unwrap();
        assert!(profile.position_distribution().is_none());
    }

    #[test]
    fn preferred_cards_keep_first_appearance_order() {
        let store = OpponentProfileStore::new();
        let mut history = vec![record("Rival", true, &[0])];
        let mut second = record("Rival", false, &[1]);
        second.opponent_cards = vec![CardId(21), CardId(30)];
        history.push(second);
        store.fold_record(&history[1], &history);

        let profile = store.profile("Rival").unwrap();
        assert_eq!(profile.preferred_cards, vec![
            CardId(20),
            CardId(21),
            CardId(30)
        ]);
    }

    #[test]
    fn win_rate_is_recomputed_over_history() {
        let store = OpponentProfileStore::new();
        let history = vec![
            record("Rival", true, &[0]),
            record("Rival", true, &[1]),
            record("Rival", false, &[2]),
            record("Other", false, &[3]),
        ];
        store.fold_record(&history[2], &history);

        let profile = store.profile("Rival").unwrap();
        assert!((profile.win_rate_against - 2.0 / 3.0).abs() < 1e-6);
        assert!((profile.average_think_time_ms - 1000.0).abs() < f32::EPSILON);
        assert!(store.profile("Other").is_none());
    }

    #[test]
    fn prediction_is_clamped_to_one() {
        let mut catalog = StaticCatalog::new();
        catalog.insert_with_counters(
            Card::new(CardId(20), "a", CardSides::uniform(5)),
            vec![CardId(1), CardId(2), CardId(3), CardId(4), CardId(5)],
        );
        catalog.insert(Card::new(CardId(21), "b", CardSides::uniform(5)));

        let store = OpponentProfileStore::new();
        let history = vec![record("Rival", true, &[0])];
        store.fold_record(&history[0], &history);

        let hand = [CardId(1), CardId(2), CardId(3), CardId(4), CardId(5)];
        let prediction =
            store.predict_win(&hand, &RuleSet::new(), "Rival", &catalog, &history);
        assert!(prediction <= 1.0);
        assert!(prediction >= 0.0);
    }

    #[test]
    fn unseen_opponent_predicts_half() {
        let catalog = StaticCatalog::new();
        let store = OpponentProfileStore::new();
        let prediction =
            store.predict_win(&[CardId(1)], &RuleSet::new(), "Nobody", &catalog, &[]);
        assert!((prediction - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn matching_rules_blend_fifty_fifty() {
        let catalog = StaticCatalog::new();
        let store = OpponentProfileStore::new();
        let plus = RuleSet::from_names(["Plus"]);
        let mut history = vec![
            record("Rival", false, &[0]),
            record("Rival", false, &[1]),
            record("Rival", true, &[2]),
            record("Rival", true, &[3]),
        ];
        history[2].rules = plus.clone();
        history[3].rules = plus.clone();
        store.fold_record(&history[3], &history);

        // Overall win rate 0.5, rule-restricted win rate 1.0, blended 0.75.
        let prediction = store.predict_win(&[CardId(1)], &plus, "Rival", &catalog, &history);
        assert!((prediction - 0.75).abs() < 1e-6);

        // Rule sets compare as whole sets: a superset does not match.
        let both = RuleSet::from_names(["Plus", "Same"]);
        let prediction = store.predict_win(&[CardId(1)], &both, "Rival", &catalog, &history);
        assert!((prediction - 0.5).abs() < 1e-6);
    }

    #[test]
    fn counter_cards_union_is_deduplicated() {
        let mut catalog = StaticCatalog::new();
        catalog.insert_with_counters(
            Card::new(CardId(20), "a", CardSides::uniform(5)),
            vec![CardId(7), CardId(8)],
        );
        catalog.insert_with_counters(
            Card::new(CardId(21), "b", CardSides::uniform(5)),
            vec![CardId(8), CardId(9)],
        );

        let store = OpponentProfileStore::new();
        let history = vec![record("Rival", true, &[0])];
        store.fold_record(&history[0], &history);

        assert_eq!(store.counter_cards("Rival", &catalog), vec![
            CardId(7),
            CardId(8),
            CardId(9)
        ]);
    }

    #[test]
    fn profile_type_is_cheap_to_clone() {
        let history = [record("Rival", true, &[4])];
        let profile = OpponentProfile::from_records("Rival", history.iter());
        let copy = profile.clone();
        assert_eq!(profile, copy);
    }
}
