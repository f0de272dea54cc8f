use core::fmt;
use serde::{Deserialize, Serialize};

/// Side of the table a card belongs to. Blue is the engine's own side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Owner {
    Blue = 0,
    Red = 1,
}

impl Owner {
    pub const fn opponent(self) -> Owner {
        match self {
            Owner::Blue => Owner::Red,
            Owner::Red => Owner::Blue,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::Blue => write!(f, "Blue"),
            Owner::Red => write!(f, "Red"),
        }
    }
}
