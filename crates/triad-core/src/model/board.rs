use crate::model::card::{CardId, CardSides, Side};
use crate::model::owner::Owner;
use serde::{Deserialize, Serialize};

pub const BOARD_CELLS: usize = 9;

/// A card sitting on the board. Sides are copied in so simulation clones
/// never need a catalog lookup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacedCard {
    pub card: CardId,
    pub sides: CardSides,
    pub owner: Owner,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Occupied(PlacedCard),
}

impl Cell {
    pub const fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn placed(self) -> Option<PlacedCard> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(placed) => Some(placed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceError {
    CellOccupied(usize),
    PositionOutOfRange(usize),
}

/// 3x3 board, cells indexed 0..9 in row-major order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Board {
    cells: [Cell; BOARD_CELLS],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cells(cells: [Cell; BOARD_CELLS]) -> Self {
        Self { cells }
    }

    pub fn cell(&self, pos: usize) -> Cell {
        self.cells[pos]
    }

    pub fn is_empty(&self, pos: usize) -> bool {
        self.cells[pos].is_empty()
    }

    pub fn empty_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_empty())
            .map(|(pos, _)| pos)
    }

    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_empty()).count()
    }

    pub fn owned_count(&self, owner: Owner) -> usize {
        self.cells
            .iter()
            .filter_map(|cell| cell.placed())
            .filter(|placed| placed.owner == owner)
            .count()
    }

    /// Orthogonal neighbors of `pos`, paired with the side of the placed
    /// card that faces each neighbor.
    pub fn neighbors(pos: usize) -> impl Iterator<Item = (usize, Side)> {
        let up = (pos >= 3).then(|| (pos - 3, Side::North));
        let down = (pos < 6).then(|| (pos + 3, Side::South));
        let left = (pos % 3 != 0).then(|| (pos - 1, Side::West));
        let right = (pos % 3 != 2).then(|| (pos + 1, Side::East));
        [up, down, left, right].into_iter().flatten()
    }

    /// Place a card and resolve captures against occupied orthogonal
    /// neighbors: a strictly greater facing side flips the neighbor's
    /// ownership, equal values never do. Returns the number of cards flipped.
    pub fn place(&mut self, placed: PlacedCard, pos: usize) -> Result<usize, PlaceError> {
        if pos >= BOARD_CELLS {
            return Err(PlaceError::PositionOutOfRange(pos));
        }
        if !self.cells[pos].is_empty() {
            return Err(PlaceError::CellOccupied(pos));
        }

        self.cells[pos] = Cell::Occupied(placed);

        let mut captured = 0;
        for (adj, side) in Self::neighbors(pos) {
            if let Cell::Occupied(neighbor) = &mut self.cells[adj] {
                if neighbor.owner != placed.owner
                    && placed.sides.value(side) > neighbor.sides.value(side.opposite())
                {
                    neighbor.owner = placed.owner;
                    captured += 1;
                }
            }
        }
        Ok(captured)
    }

    /// Terminal board metric from one side's perspective.
    pub fn value(&self, perspective: Owner) -> f32 {
        let own = self.owned_count(perspective) as f32;
        let theirs = self.owned_count(perspective.opponent()) as f32;
        (own - theirs) * 10.0 + own
    }

    /// Ternary signature of the board: one character per cell, `0` empty,
    /// `B` blue-owned, `R` red-owned.
    pub fn signature(&self) -> String {
        self.cells
            .iter()
            .map(|cell| match cell.placed() {
                None => '0',
                Some(placed) if placed.owner == Owner::Blue => 'B',
                Some(_) => 'R',
            })
            .collect()
    }
}
