use crate::model::card::{Card, CardId, CardRarity, CardSides, CardType};
use serde::Deserialize;
use std::collections::HashMap;

/// Lookup surface for card identities and their enhanced metadata. The
/// actual database (on disk or remote) lives outside this crate; the solver
/// only ever sees this trait.
pub trait CardCatalog: Send + Sync {
    fn card(&self, id: CardId) -> Option<&Card>;

    /// Cards known to counter `id`. Empty when no metadata exists.
    fn counters(&self, id: CardId) -> &[CardId] {
        let _ = id;
        &[]
    }
}

/// In-memory catalog, loadable from the JSON card-list format.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    cards: HashMap<CardId, Card>,
    counters: HashMap<CardId, Vec<CardId>>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    id: u16,
    name: String,
    sides: [u8; 4],
    #[serde(default)]
    card_type: CardType,
    #[serde(default)]
    rarity: CardRarity,
    #[serde(default)]
    counters: Vec<u16>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, card: Card) {
        self.cards.insert(card.id, card);
    }

    pub fn insert_with_counters(&mut self, card: Card, counters: Vec<CardId>) {
        self.counters.insert(card.id, counters);
        self.insert(card);
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// All card ids, ascending. Stable across runs so callers can draw
    /// reproducible samples.
    pub fn ids(&self) -> Vec<CardId> {
        let mut ids: Vec<CardId> = self.cards.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn from_json_str(raw: &str) -> serde_json::Result<Self> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(raw)?;
        let mut catalog = Self::new();
        for entry in entries {
            let [north, east, south, west] = entry.sides;
            let mut card = Card::new(
                CardId(entry.id),
                entry.name,
                CardSides::new(north, east, south, west),
            );
            card.card_type = entry.card_type;
            card.rarity = entry.rarity;
            let counters = entry.counters.into_iter().map(CardId).collect();
            catalog.insert_with_counters(card, counters);
        }
        Ok(catalog)
    }
}

impl CardCatalog for StaticCatalog {
    fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.get(&id)
    }

    fn counters(&self, id: CardId) -> &[CardId] {
        self.counters.get(&id).map_or(&[], Vec::as_slice)
    }
}
