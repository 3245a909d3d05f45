//! Gatekeeper and loop configuration.

use crate::error::{GatekeepError, GatekeepResult};
use serde::{Deserialize, Serialize};

/// Threshold a certificate's worst degree must reach to be accepted.
pub const DEFAULT_ACCEPTANCE_THRESHOLD: f64 = 1.0 - 1e-6;

/// Per-step sampling configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatekeeperConfig {
    /// Rollouts sampled per candidate action
    pub num_trajectories: usize,

    /// Maximum steps per rollout
    pub horizon: usize,

    /// Minimum robustness for an action to count as accepted
    pub acceptance_threshold: f64,
}

impl Default for GatekeeperConfig {
    fn default() -> Self {
        Self {
            num_trajectories: 10,
            horizon: 10,
            acceptance_threshold: DEFAULT_ACCEPTANCE_THRESHOLD,
        }
    }
}

impl GatekeeperConfig {
    pub fn with_trajectories(mut self, num_trajectories: usize) -> Self {
        self.num_trajectories = num_trajectories;
        self
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.acceptance_threshold = threshold;
        self
    }

    /// Rejects settings that would make certification impossible.
    ///
    /// Zero rollouts would force a zero-operand reduction.
    pub fn validate(&self) -> GatekeepResult<()> {
        if self.num_trajectories == 0 {
            return Err(GatekeepError::config("num_trajectories must be at least 1"));
        }
        if !self.acceptance_threshold.is_finite() {
            return Err(GatekeepError::config("acceptance_threshold must be finite"));
        }
        Ok(())
    }
}

/// Outer loop and fan-out configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopConfig {
    /// `run_step` calls per repetition (upper bound; the World may end sooner)
    pub iterations: usize,

    /// Independent repetitions fanned out across the pool
    pub repetitions: usize,

    /// Worker threads
    pub workers: usize,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            iterations: 10,
            repetitions: 10,
            workers: 5,
        }
    }
}

impl LoopConfig {
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_repetitions(mut self, repetitions: usize) -> Self {
        self.repetitions = repetitions;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn validate(&self) -> GatekeepResult<()> {
        if self.workers == 0 {
            return Err(GatekeepError::config("workers must be at least 1"));
        }
        Ok(())
    }
}
