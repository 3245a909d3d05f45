//! Error types for the gatekeeper harness.

use gatekeep_core::EvalError;
use gatekeep_env::SimulationFault;
use thiserror::Error;

/// Errors surfaced by `run_step`, the loops and the CLI.
///
/// Evaluation errors and collaborator faults pass through unchanged; a
/// failed run yields no certificate.
#[derive(Debug, Error)]
pub enum GatekeepError {
    /// Specification could not be evaluated
    #[error(transparent)]
    Eval(#[from] EvalError),

    /// Simulation, World or Controller failed
    #[error(transparent)]
    Simulation(#[from] SimulationFault),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A worker panicked or was cancelled
    #[error("Worker failed: {0}")]
    Worker(String),

    /// Export file could not be written
    #[error("Export failed: {0}")]
    Export(#[from] std::io::Error),
}

impl GatekeepError {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a worker error.
    pub fn worker(msg: impl std::fmt::Display) -> Self {
        Self::Worker(msg.to_string())
    }
}

/// Result alias for the harness.
pub type GatekeepResult<T> = Result<T, GatekeepError>;
