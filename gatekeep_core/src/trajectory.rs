//! Observation sequences recorded from one rollout.

use crate::error::EvalError;
use serde::{Deserialize, Serialize, Serializer};
use std::ops::Index;

/// A finite, non-empty, ordered sequence of observations.
///
/// Index 0 is the seed observation taken before any step; index `k` is the
/// observation after step `k`. Every constructor, deserialization included,
/// rejects an empty sequence.
///
/// Serialized as a plain list of observations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<O>", bound(deserialize = "O: Deserialize<'de>"))]
pub struct Trajectory<O> {
    observations: Vec<O>,
}

impl<O> Trajectory<O> {
    /// Starts a trajectory from the pre-step observation.
    pub fn seeded(seed: O) -> Self {
        Self {
            observations: vec![seed],
        }
    }

    /// Builds a trajectory from a vector, returning `None` if it is empty.
    pub fn from_vec(observations: Vec<O>) -> Option<Self> {
        if observations.is_empty() {
            None
        } else {
            Some(Self { observations })
        }
    }

    /// Appends the observation taken after the next step.
    pub fn push(&mut self, observation: O) {
        self.observations.push(observation);
    }

    /// Number of observations (steps taken + 1).
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Number of simulation steps recorded after the seed.
    pub fn steps(&self) -> usize {
        self.observations.len() - 1
    }

    pub fn first(&self) -> &O {
        &self.observations[0]
    }

    pub fn last(&self) -> &O {
        &self.observations[self.observations.len() - 1]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, O> {
        self.observations.iter()
    }

    pub fn as_slice(&self) -> &[O] {
        &self.observations
    }

    pub fn into_vec(self) -> Vec<O> {
        self.observations
    }
}

impl<O> TryFrom<Vec<O>> for Trajectory<O> {
    type Error = EvalError;

    fn try_from(observations: Vec<O>) -> Result<Self, EvalError> {
        Self::from_vec(observations).ok_or(EvalError::EmptyTrajectory)
    }
}

impl<O> From<Trajectory<O>> for Vec<O> {
    fn from(trajectory: Trajectory<O>) -> Self {
        trajectory.into_vec()
    }
}

impl<O: Serialize> Serialize for Trajectory<O> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.observations.serialize(serializer)
    }
}

impl<O> Index<usize> for Trajectory<O> {
    type Output = O;

    fn index(&self, index: usize) -> &O {
        &self.observations[index]
    }
}

impl<'a, O> IntoIterator for &'a Trajectory<O> {
    type Item = &'a O;
    type IntoIter = std::slice::Iter<'a, O>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}
