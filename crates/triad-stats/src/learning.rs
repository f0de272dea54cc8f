use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use triad_core::model::card::CardId;

/// Weight kept for the existing score on each smoothing step.
pub const SMOOTHING_OLD: f32 = 0.8;
/// Weight given to a new observation on each smoothing step.
pub const SMOOTHING_NEW: f32 = 0.2;

#[derive(Debug, Default)]
struct ScoreMap {
    scores: HashMap<CardId, f32>,
}

/// Learned per-card performance, split into a single writer handle and
/// cloneable read-only views so only the match recorder can fold in new
/// observations while evaluators read concurrently.
pub fn card_score_store() -> (CardScoreWriter, CardScoreReader) {
    let inner = Arc::new(RwLock::new(ScoreMap::default()));
    (
        CardScoreWriter {
            inner: Arc::clone(&inner),
        },
        CardScoreReader { inner },
    )
}

#[derive(Debug)]
pub struct CardScoreWriter {
    inner: Arc<RwLock<ScoreMap>>,
}

impl CardScoreWriter {
    /// Fold one observed performance value into the card's score. The first
    /// observation is stored verbatim; later ones are smoothed 0.8/0.2.
    pub fn update(&self, card: CardId, observed: f32) {
        let mut map = self.inner.write();
        match map.scores.get_mut(&card) {
            Some(score) => *score = *score * SMOOTHING_OLD + observed * SMOOTHING_NEW,
            None => {
                map.scores.insert(card, observed);
            }
        }
    }

    pub fn reader(&self) -> CardScoreReader {
        CardScoreReader {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CardScoreReader {
    inner: Arc<RwLock<ScoreMap>>,
}

impl CardScoreReader {
    pub fn score(&self, card: CardId) -> Option<f32> {
        self.inner.read().scores.get(&card).copied()
    }

    pub fn len(&self) -> usize {
        self.inner.read().scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().scores.is_empty()
    }

    /// Snapshot of every learned score, highest first.
    pub fn ranked(&self) -> Vec<(CardId, f32)> {
        let mut out: Vec<_> = self
            .inner
            .read()
            .scores
            .iter()
            .map(|(card, score)| (*card, *score))
            .collect();
        out.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        out
    }
}
