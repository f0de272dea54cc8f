use std::collections::HashMap;

/// Learned adjustments keyed by exact board signature (the ternary string
/// from `Board::signature`). Injectable and empty by default; nothing in the
/// solver populates it automatically.
#[derive(Debug, Clone, Default)]
pub struct PatternTable {
    entries: HashMap<String, f32>,
}

impl PatternTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn learn(&mut self, signature: impl Into<String>, adjustment: f32) {
        self.entries.insert(signature.into(), adjustment);
    }

    pub fn adjustment(&self, signature: &str) -> Option<f32> {
        self.entries.get(signature).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
