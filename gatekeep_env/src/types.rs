//! Common types exchanged with collaborators.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Free-form diagnostics returned alongside a step.
pub type StepInfo = BTreeMap<String, f64>;

/// Outcome of one `step(action)` on a Simulation or World.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition<S> {
    /// State after the step
    pub state: S,

    /// Reward accumulated during the step
    pub reward: f64,

    /// The episode has terminated
    pub done: bool,

    /// Diagnostics; never consulted for correctness
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub info: StepInfo,
}

impl<S> Transition<S> {
    /// Creates a transition with empty info.
    pub fn new(state: S, reward: f64, done: bool) -> Self {
        Self {
            state,
            reward,
            done,
            info: StepInfo::new(),
        }
    }

    /// Attaches a diagnostic value.
    pub fn with_info(mut self, key: impl Into<String>, value: f64) -> Self {
        self.info.insert(key.into(), value);
        self
    }
}

/// An entity tracked by a simulation that has a planar position.
pub trait Positioned {
    /// Position `[x, y]` in simulation units.
    fn position(&self) -> Vector2<f64>;
}

impl Positioned for Vector2<f64> {
    fn position(&self) -> Vector2<f64> {
        *self
    }
}
