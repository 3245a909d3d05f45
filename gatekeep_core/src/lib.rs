//! Gatekeep Core - Quantitative Temporal Specifications
//!
//! This library scores rollouts of a controller's action against a temporal
//! safety/liveness specification and packages the score as a certificate:
//! 1. **Formula**: closed AST over named atomic propositions
//! 2. **Semantics**: min/max aggregation over real-valued degrees
//! 3. **Evaluator**: recursive interpreter producing a [`Degree`]
//! 4. **Certificate**: `{proof_abides, action}` built from sampled trajectories

pub mod certificate;
pub mod degree;
pub mod error;
pub mod evaluator;
pub mod formula;
pub mod semantics;
pub mod trajectory;

// Re-export key types for convenience
pub use certificate::{CompiledSpec, ProofCertificate};
pub use degree::Degree;
pub use error::{EvalError, EvalResult};
pub use evaluator::{evaluate, AtomicEval};
pub use formula::Formula;
pub use trajectory::Trajectory;
