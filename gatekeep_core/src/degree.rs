//! Robustness degrees.

use crate::error::{EvalError, EvalResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The value a formula evaluates to.
///
/// Leaves and negations keep one value per observation (`Sequence`);
/// temporal and boolean combinators collapse to a single value (`Scalar`).
/// Both shapes are legal evaluator output and callers must handle either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Degree {
    Scalar(f64),
    Sequence(Vec<f64>),
}

impl Degree {
    /// Returns the value if this is a scalar.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Degree::Scalar(x) => Some(*x),
            Degree::Sequence(_) => None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Degree::Scalar(_))
    }

    /// Views the degree as a slice; a scalar is a one-element slice.
    pub fn values(&self) -> &[f64] {
        match self {
            Degree::Scalar(x) => std::slice::from_ref(x),
            Degree::Sequence(xs) => xs,
        }
    }

    /// Smallest value. Fails on an empty sequence.
    pub fn reduce_min(&self) -> EvalResult<f64> {
        self.values()
            .iter()
            .copied()
            .reduce(f64::min)
            .ok_or(EvalError::EmptySequence("min"))
    }

    /// Largest value. Fails on an empty sequence.
    pub fn reduce_max(&self) -> EvalResult<f64> {
        self.values()
            .iter()
            .copied()
            .reduce(f64::max)
            .ok_or(EvalError::EmptySequence("max"))
    }

    /// Maps every value, keeping the shape.
    pub fn map(self, f: impl Fn(f64) -> f64) -> Degree {
        match self {
            Degree::Scalar(x) => Degree::Scalar(f(x)),
            Degree::Sequence(xs) => Degree::Sequence(xs.into_iter().map(f).collect()),
        }
    }
}

impl From<f64> for Degree {
    fn from(x: f64) -> Self {
        Degree::Scalar(x)
    }
}

impl From<Vec<f64>> for Degree {
    fn from(xs: Vec<f64>) -> Self {
        Degree::Sequence(xs)
    }
}

impl fmt::Display for Degree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degree::Scalar(x) => write!(f, "{:.4}", x),
            Degree::Sequence(xs) => {
                write!(f, "[")?;
                for (i, x) in xs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:.4}", x)?;
                }
                write!(f, "]")
            }
        }
    }
}
