//! Observation hooks: turn a simulation snapshot into a discrete label.

use crate::traffic::{Phase, TrafficLights};
use gatekeep_core::{EvalError, EvalResult};
use gatekeep_env::{Positioned, Simulation};
use nalgebra::{DMatrix, Vector2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default separation below which two entities count as collided.
pub const DEFAULT_CRASH_EPSILON: f64 = 1e-5;

/// Produces one observation per simulation step.
///
/// The set of labels an observer can emit is the set of atomic names the
/// paired atomic-evaluation function must accept.
pub trait Observer<S>: Send + Sync {
    type Observation: Clone + Send + 'static;

    fn observe(&self, sim: &S) -> Self::Observation;
}

/// Three-valued traffic label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficState {
    TrafficFlow,
    NoTraffic,
    Crash,
}

impl TrafficState {
    pub fn all() -> [TrafficState; 3] {
        [TrafficState::TrafficFlow, TrafficState::NoTraffic, TrafficState::Crash]
    }

    /// Atomic proposition name for this label.
    pub fn name(&self) -> &'static str {
        match self {
            TrafficState::TrafficFlow => "traffic_flow",
            TrafficState::NoTraffic => "no_traffic",
            TrafficState::Crash => "crash",
        }
    }
}

impl fmt::Display for TrafficState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for TrafficState {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TrafficState::all()
            .into_iter()
            .find(|state| state.name() == s)
            .ok_or_else(|| EvalError::unknown_atomic(s))
    }
}

/// Degree to which proposition `name` holds at a traffic observation:
/// `1.0` if the observation carries that label, `0.0` otherwise.
pub fn traffic_degree(name: &str, observation: &TrafficState) -> EvalResult<f64> {
    let prop: TrafficState = name.parse()?;
    Ok(if prop == *observation { 1.0 } else { 0.0 })
}

/// Classifies entity positions.
///
/// Builds the full pairwise distance matrix with the diagonal masked to
/// `+inf`; O(V²) in the number of entities.
pub fn classify(positions: &[Vector2<f64>], epsilon: f64) -> TrafficState {
    if positions.is_empty() {
        return TrafficState::NoTraffic;
    }

    let n = positions.len();
    let distances = DMatrix::from_fn(n, n, |i, j| {
        if i == j {
            f64::INFINITY
        } else {
            (positions[i] - positions[j]).norm()
        }
    });

    if distances.iter().any(|d| *d < epsilon) {
        TrafficState::Crash
    } else {
        TrafficState::TrafficFlow
    }
}

/// Reference traffic observer over any simulation's tracked entities.
#[derive(Debug, Clone, Copy)]
pub struct TrafficObserver {
    pub epsilon: f64,
}

impl TrafficObserver {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }
}

impl Default for TrafficObserver {
    fn default() -> Self {
        Self::new(DEFAULT_CRASH_EPSILON)
    }
}

impl<S: Simulation> Observer<S> for TrafficObserver {
    type Observation = TrafficState;

    fn observe(&self, sim: &S) -> TrafficState {
        let positions: Vec<Vector2<f64>> = sim.vehicles().into_iter().map(|v| v.position()).collect();
        classify(&positions, self.epsilon)
    }
}

/// Observes the light phase of simulations driven by [`TrafficLights`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LightObserver;

impl<S> Observer<S> for LightObserver
where
    S: Simulation<World = TrafficLights>,
{
    type Observation = Phase;

    fn observe(&self, sim: &S) -> Phase {
        sim.world().phase()
    }
}
