use crate::history::MatchRecord;
use crate::learning::CardScoreWriter;
use crate::profile::OpponentProfileStore;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use triad_core::catalog::CardCatalog;
use triad_core::model::card::CardId;
use triad_core::model::rules::RuleSet;

/// Retained-history cap; the oldest record is evicted first once exceeded.
pub const MAX_RETAINED_MATCHES: usize = 1000;

/// Captures-per-move divisor when deriving a card's observed performance.
const PERFORMANCE_CAPTURE_SCALE: f32 = 3.0;
/// Flat performance bonus for cards that were part of a winning match.
const PERFORMANCE_WIN_BONUS: f32 = 0.2;

/// Sole ingestion path for completed matches. Owns the bounded history and
/// is the only component allowed to push updates into the profile store and
/// the card-score writer.
pub struct MatchRecorder {
    history: VecDeque<MatchRecord>,
    profiles: Arc<OpponentProfileStore>,
    card_scores: CardScoreWriter,
}

impl MatchRecorder {
    pub fn new(profiles: Arc<OpponentProfileStore>, card_scores: CardScoreWriter) -> Self {
        Self {
            history: VecDeque::new(),
            profiles,
            card_scores,
        }
    }

    /// Append a completed match, fold it into the aggregate stores, and
    /// enforce the retention cap.
    pub fn record(&mut self, record: MatchRecord) {
        self.history.push_back(record.clone());
        if self.history.len() > MAX_RETAINED_MATCHES {
            self.history.pop_front();
        }

        self.profiles.fold_record(&record, self.history.iter());
        self.fold_card_performance(&record);
    }

    /// Per-card performance for the match just recorded: mean captures per
    /// move scaled into [0, 1], plus a flat bonus when the match was won.
    fn fold_card_performance(&self, record: &MatchRecord) {
        for &card in &record.player_cards {
            let mut moves = 0u32;
            let mut captured = 0u32;
            for event in record.player_moves().filter(|event| event.card == card) {
                moves += 1;
                captured += event.captured as u32;
            }
            if moves == 0 {
                continue;
            }
            let mut performance =
                captured as f32 / moves as f32 / PERFORMANCE_CAPTURE_SCALE;
            if record.won() {
                performance += PERFORMANCE_WIN_BONUS;
            }
            self.card_scores.update(card, performance);
        }
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn history(&self) -> impl Iterator<Item = &MatchRecord> {
        self.history.iter()
    }

    pub fn profiles(&self) -> &OpponentProfileStore {
        &self.profiles
    }

    /// Expected win chance for `player_cards` under `rules` against
    /// `opponent`, blending profile and rule-restricted history.
    pub fn predict_win(
        &self,
        player_cards: &[CardId],
        rules: &RuleSet,
        opponent: &str,
        catalog: &dyn CardCatalog,
    ) -> f32 {
        self.profiles
            .predict_win(player_cards, rules, opponent, catalog, self.history.iter())
    }

    /// JSON dump of the retained history and every profile, for external
    /// analysis tooling.
    pub fn export_json(&self) -> serde_json::Result<String> {
        #[derive(Serialize)]
        struct Export<'a> {
            matches: Vec<&'a MatchRecord>,
            opponents: Vec<crate::profile::OpponentProfile>,
        }
        serde_json::to_string_pretty(&Export {
            matches: self.history.iter().collect(),
            opponents: self.profiles.profiles(),
        })
    }
}
