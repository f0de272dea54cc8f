/// Per-cell positional value: center strongest, edges next, corners least.
pub const POSITION_VALUES: [f32; 9] = [2.0, 3.0, 2.0, 3.0, 5.0, 3.0, 2.0, 3.0, 2.0];

/// Per-cell scale applied to learned pattern adjustments.
pub const PATTERN_POSITION_SCALE: [f32; 9] = [1.0, 1.2, 1.0, 1.2, 1.5, 1.2, 1.0, 1.2, 1.0];

/// Weights over the six move subscores plus the final aggression multiplier
/// that biases the whole evaluation toward offense.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalWeights {
    pub capture: f32,
    pub position: f32,
    pub defense: f32,
    pub card_strength: f32,
    pub future: f32,
    pub pattern: f32,
    pub aggression: f32,
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            capture: 25.0,
            position: 15.0,
            defense: 20.0,
            card_strength: 10.0,
            future: 20.0,
            pattern: 10.0,
            aggression: 1.2,
        }
    }
}

/// Monte Carlo budget for the future-potential subscore. The outer count is
/// derived from the configured target but hard-capped so a single candidate
/// can never exceed `max_outer * inner_samples` playouts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RolloutBudget {
    pub target_simulations: usize,
    pub max_outer: usize,
    pub inner_samples: usize,
    pub depth: usize,
    /// Fixed seed for reproducible rollouts; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl RolloutBudget {
    /// Outer iteration count actually used: a tenth of the target, capped.
    pub fn outer(&self) -> usize {
        (self.target_simulations / 10).clamp(1, self.max_outer.max(1))
    }

    /// Total playouts charged to one candidate.
    pub fn playouts_per_candidate(&self) -> usize {
        self.outer() * self.inner_samples.max(1)
    }
}

impl Default for RolloutBudget {
    fn default() -> Self {
        Self {
            target_simulations: 10_000,
            max_outer: 1000,
            inner_samples: 10,
            depth: 3,
            seed: None,
        }
    }
}
