use crate::opponents::PolicyKind;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use triad_solver::RolloutBudget;

const DEFAULT_MATCHES_PER_OPPONENT: usize = 25;
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root harness configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HarnessConfig {
    pub run_id: String,
    pub matches: MatchPlanConfig,
    #[serde(default)]
    pub solver: SolverTuning,
    pub opponents: Vec<OpponentConfig>,
    /// JSON card list to load; a built-in sample catalog is used when absent.
    #[serde(default)]
    pub catalog: Option<PathBuf>,
    /// When set, the retained history and profiles are dumped here as JSON.
    #[serde(default)]
    pub export_json: Option<PathBuf>,
}

impl HarnessConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let mut cfg: HarnessConfig =
            serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.matches.validate()?;
        self.solver.validate()?;
        validate_opponents(&self.opponents)?;
        Ok(())
    }
}

/// Self-play schedule block.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MatchPlanConfig {
    pub seed: Option<u64>,
    #[serde(default = "default_per_opponent")]
    pub per_opponent: usize,
}

impl MatchPlanConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.per_opponent == 0 {
            return Err(ValidationError::InvalidField {
                field: "matches.per_opponent".to_string(),
                message: "matches per opponent must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

fn default_per_opponent() -> usize {
    DEFAULT_MATCHES_PER_OPPONENT
}

/// Rollout knobs forwarded to the solver.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(default)]
pub struct SolverTuning {
    pub target_simulations: usize,
    pub max_outer: usize,
    pub inner_samples: usize,
    pub depth: usize,
}

impl SolverTuning {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.inner_samples == 0 {
            return Err(ValidationError::InvalidField {
                field: "solver.inner_samples".to_string(),
                message: "inner samples must be at least 1".to_string(),
            });
        }
        if self.max_outer == 0 {
            return Err(ValidationError::InvalidField {
                field: "solver.max_outer".to_string(),
                message: "outer cap must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn budget(&self, seed: Option<u64>) -> RolloutBudget {
        RolloutBudget {
            target_simulations: self.target_simulations,
            max_outer: self.max_outer,
            inner_samples: self.inner_samples,
            depth: self.depth,
            seed,
        }
    }
}

impl Default for SolverTuning {
    fn default() -> Self {
        // Smaller than the live defaults: the harness plays whole matches,
        // not single turns.
        Self {
            target_simulations: 1_000,
            max_outer: 100,
            inner_samples: 5,
            depth: 3,
        }
    }
}

/// One scripted opponent to play a block of matches against.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OpponentConfig {
    pub name: String,
    #[serde(default)]
    pub policy: PolicyKind,
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run identifier must not be empty".to_string(),
        });
    }
    if let Some(bad) = run_id.chars().find(|c| !RUN_ID_ALLOWED.contains(*c)) {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: format!("character '{bad}' is not allowed in a run identifier"),
        });
    }
    Ok(())
}

fn validate_opponents(opponents: &[OpponentConfig]) -> Result<(), ValidationError> {
    if opponents.is_empty() {
        return Err(ValidationError::InvalidField {
            field: "opponents".to_string(),
            message: "at least one opponent is required".to_string(),
        });
    }
    let mut seen = HashSet::new();
    for opponent in opponents {
        if opponent.name.trim().is_empty() {
            return Err(ValidationError::InvalidField {
                field: "opponents.name".to_string(),
                message: "opponent names must not be empty".to_string(),
            });
        }
        if !seen.insert(opponent.name.as_str()) {
            return Err(ValidationError::InvalidField {
                field: "opponents.name".to_string(),
                message: format!("duplicate opponent name '{}'", opponent.name),
            });
        }
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration from {path}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse configuration at {path}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("configuration at {path} is invalid")]
    Invalid {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}
