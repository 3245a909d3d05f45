//! Error types for specification evaluation.

use thiserror::Error;

/// Errors raised while evaluating a specification against a trajectory.
///
/// None of these are recoverable locally: they abort the evaluation and no
/// certificate is produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// The evaluator has no semantics for this node (e.g. `Until`).
    #[error("Unsupported specification: {0}")]
    UnsupportedSpecification(String),

    /// The atomic-evaluation function does not know this proposition.
    #[error("Atomic proposition '{0}' not found in observation")]
    UnknownAtomic(String),

    /// Trajectories carry at least the seed observation.
    #[error("Cannot evaluate over an empty trajectory")]
    EmptyTrajectory,

    /// `And()` / `Or()` with no children has no identity value here.
    #[error("'{0}' applied to zero operands")]
    EmptyOperands(&'static str),

    /// Min/max reduction over a sequence with no elements.
    #[error("'{0}' reduction over an empty degree sequence")]
    EmptySequence(&'static str),
}

impl EvalError {
    /// Creates an unknown-atomic error.
    pub fn unknown_atomic(name: impl Into<String>) -> Self {
        Self::UnknownAtomic(name.into())
    }

    /// Creates an unsupported-specification error.
    pub fn unsupported(spec: impl std::fmt::Display) -> Self {
        Self::UnsupportedSpecification(spec.to_string())
    }
}

/// Result alias used throughout the core.
pub type EvalResult<T> = Result<T, EvalError>;
