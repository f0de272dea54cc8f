pub mod board;
pub mod card;
pub mod deck;
pub mod observation;
pub mod owner;
pub mod rules;
pub mod snapshot;
