//! Quantitative semantics (Gödel-style min/max over degrees).
//!
//! All functions are pure. Reductions over nothing fail instead of picking an
//! identity value.

use crate::degree::Degree;
use crate::error::{EvalError, EvalResult};

/// `1 - x`, pointwise over sequences.
pub fn not(x: Degree) -> Degree {
    x.map(|v| 1.0 - v)
}

/// Min-of-mins: each operand is collapsed to its own minimum first, then
/// the minimum is taken across operands.
pub fn and(operands: &[Degree]) -> EvalResult<f64> {
    if operands.is_empty() {
        return Err(EvalError::EmptyOperands("and"));
    }
    let mins = operands
        .iter()
        .map(Degree::reduce_min)
        .collect::<EvalResult<Vec<f64>>>()?;
    Ok(mins.into_iter().fold(f64::INFINITY, f64::min))
}

/// Max-of-maxes, the dual of [`and`].
pub fn or(operands: &[Degree]) -> EvalResult<f64> {
    if operands.is_empty() {
        return Err(EvalError::EmptyOperands("or"));
    }
    let maxes = operands
        .iter()
        .map(Degree::reduce_max)
        .collect::<EvalResult<Vec<f64>>>()?;
    Ok(maxes.into_iter().fold(f64::NEG_INFINITY, f64::max))
}

/// Minimum over every element.
pub fn always(seq: &Degree) -> EvalResult<f64> {
    seq.reduce_min()
}

/// Maximum over every element.
pub fn eventually(seq: &Degree) -> EvalResult<f64> {
    seq.reduce_max()
}
