//! Proof certificates and compiled specifications.

use crate::degree::Degree;
use crate::error::EvalResult;
use crate::evaluator::{evaluate, AtomicEval};
use crate::formula::Formula;
use crate::semantics;
use crate::trajectory::Trajectory;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The robustness of a specification over sampled rollouts of one action.
///
/// Built only from `(spec, trajectories)`; it holds no handle to the
/// simulation that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofCertificate<A> {
    /// Worst-case degree across all rollouts.
    pub proof_abides: Degree,

    /// The action the rollouts were sampled under.
    pub action: A,

    /// Degree of each rollout, in sampling order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub per_trajectory: Vec<Degree>,
}

impl<A> ProofCertificate<A> {
    /// The certificate's robustness degree.
    pub fn robustness(&self) -> &Degree {
        &self.proof_abides
    }

    /// True if the worst value of the robustness reaches `threshold`.
    ///
    /// A failed reduction (empty sequence) never abides.
    pub fn abides(&self, threshold: f64) -> bool {
        self.proof_abides
            .reduce_min()
            .map(|worst| worst >= threshold)
            .unwrap_or(false)
    }
}

/// A formula bound to an atomic-evaluation function.
///
/// Cloning shares the evaluation function; certificates are produced with
/// [`CompiledSpec::certify`] for one rollout or [`CompiledSpec::certify_all`]
/// for a sampled batch.
pub struct CompiledSpec<O> {
    formula: Formula,
    atomic_eval: Arc<dyn AtomicEval<O>>,
}

impl<O> Clone for CompiledSpec<O> {
    fn clone(&self) -> Self {
        Self {
            formula: self.formula.clone(),
            atomic_eval: Arc::clone(&self.atomic_eval),
        }
    }
}

impl<O> CompiledSpec<O> {
    /// Binds `formula` to `atomic_eval`.
    pub fn compile(formula: Formula, atomic_eval: Arc<dyn AtomicEval<O>>) -> Self {
        Self {
            formula,
            atomic_eval,
        }
    }

    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    /// Robustness of the formula over one trajectory.
    pub fn evaluate(&self, trajectory: &Trajectory<O>) -> EvalResult<Degree> {
        evaluate(&self.formula, trajectory.as_slice(), self.atomic_eval.as_ref())
    }

    /// Certificate for a single rollout.
    pub fn certify<A>(&self, trajectory: &Trajectory<O>, action: A) -> EvalResult<ProofCertificate<A>> {
        let degree = self.evaluate(trajectory)?;
        Ok(ProofCertificate {
            proof_abides: degree,
            action,
            per_trajectory: Vec::new(),
        })
    }

    /// Certificate for a batch of rollouts of the same action.
    ///
    /// Each rollout is evaluated independently; the certificate's degree is
    /// the `and` of those degrees, so one violating rollout drives it to its
    /// own minimum. An empty batch is a zero-operand `and` and fails.
    pub fn certify_all<A>(
        &self,
        trajectories: &[Trajectory<O>],
        action: A,
    ) -> EvalResult<ProofCertificate<A>> {
        let per_trajectory = trajectories
            .iter()
            .map(|t| self.evaluate(t))
            .collect::<EvalResult<Vec<_>>>()?;
        let worst = semantics::and(&per_trajectory)?;
        Ok(ProofCertificate {
            proof_abides: Degree::Scalar(worst),
            action,
            per_trajectory,
        })
    }
}

impl<O> std::fmt::Debug for CompiledSpec<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledSpec")
            .field("formula", &self.formula.to_string())
            .finish_non_exhaustive()
    }
}
