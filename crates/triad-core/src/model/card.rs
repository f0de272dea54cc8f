use core::fmt;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Highest printable side value. Side values are always in `0..=MAX_SIDE`.
pub const MAX_SIDE: u8 = 10;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct CardId(pub u16);

impl CardId {
    /// Placeholder identity for cards synthesized during random playouts.
    pub const SYNTHETIC: CardId = CardId(0);
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Side {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::North, Side::East, Side::South, Side::West];

    pub const fn opposite(self) -> Side {
        match self {
            Side::North => Side::South,
            Side::East => Side::West,
            Side::South => Side::North,
            Side::West => Side::East,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardSides {
    pub north: u8,
    pub east: u8,
    pub south: u8,
    pub west: u8,
}

impl CardSides {
    pub const fn new(north: u8, east: u8, south: u8, west: u8) -> Self {
        Self {
            north,
            east,
            south,
            west,
        }
    }

    pub const fn uniform(value: u8) -> Self {
        Self::new(value, value, value, value)
    }

    pub const fn value(self, side: Side) -> u8 {
        match side {
            Side::North => self.north,
            Side::East => self.east,
            Side::South => self.south,
            Side::West => self.west,
        }
    }

    /// Mean of the four side values.
    pub fn base_strength(self) -> f32 {
        (self.north as f32 + self.east as f32 + self.south as f32 + self.west as f32) / 4.0
    }

    /// Random sides in `1..=MAX_SIDE`, used for synthetic playout cards.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::new(
            rng.gen_range(1..=MAX_SIDE),
            rng.gen_range(1..=MAX_SIDE),
            rng.gen_range(1..=MAX_SIDE),
            rng.gen_range(1..=MAX_SIDE),
        )
    }
}

impl fmt::Display for CardSides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{},{},{},{}]",
            self.north, self.east, self.south, self.west
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum CardType {
    #[default]
    None,
    Primal,
    Scion,
    Beastman,
    Garland,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum CardRarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub name: String,
    pub sides: CardSides,
    #[serde(default)]
    pub card_type: CardType,
    #[serde(default)]
    pub rarity: CardRarity,
}

impl Card {
    pub fn new(id: CardId, name: impl Into<String>, sides: CardSides) -> Self {
        Self {
            id,
            name: name.into(),
            sides,
            card_type: CardType::None,
            rarity: CardRarity::Common,
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.sides)
    }
}

#[cfg(test)]
mod tests {
    use super::{Card, CardId, CardSides, Side};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn sides_oppose_pairwise() {
        assert_eq!(Side::North.opposite(), Side::South);
        assert_eq!(Side::East.opposite(), Side::West);
        for side in Side::ALL {
            assert_eq!(side.opposite().opposite(), side);
        }
    }

    #[test]
    fn base_strength_is_mean_of_sides() {
        let sides = CardSides::new(9, 7, 5, 3);
        assert!((sides.base_strength() - 6.0).abs() < f32::EPSILON);
    }

    #[test]
    fn side_lookup_matches_fields() {
        let sides = CardSides::new(1, 2, 3, 4);
        assert_eq!(sides.value(Side::North), 1);
        assert_eq!(sides.value(Side::East), 2);
        assert_eq!(sides.value(Side::South), 3);
        assert_eq!(sides.value(Side::West), 4);
    }

    #[test]
    fn random_sides_stay_in_range() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..100 {
            let sides = CardSides::random(&mut rng);
            for side in Side::ALL {
                let value = sides.value(side);
                assert!((1..=10).contains(&value));
            }
        }
    }

    #[test]
    fn card_display_includes_name_and_sides() {
        let card = Card::new(CardId(12), "Dodo", CardSides::uniform(4));
        assert_eq!(card.to_string(), "Dodo [4,4,4,4]");
    }
}
