use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared pause flag for background optimizers. The solver raises it for
/// the duration of an evaluation so CPU-heavy housekeeping yields to the
/// latency-sensitive move search.
#[derive(Debug, Clone, Default)]
pub struct OptimizerGate {
    paused: Arc<AtomicBool>,
}

impl OptimizerGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }
}
