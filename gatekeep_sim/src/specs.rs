//! Canned traffic specifications.

use crate::observe::{traffic_degree, TrafficState};
use crate::traffic::{Direction, Phase};
use gatekeep_core::{AtomicEval, EvalError, EvalResult, Formula};
use std::sync::Arc;

/// Specification identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecId {
    /// Never observe a crash
    Safety,

    /// Never show green to two crossing lanes
    Shield,
}

impl SpecId {
    /// Returns a list of all specifications.
    pub fn all() -> Vec<SpecId> {
        vec![SpecId::Safety, SpecId::Shield]
    }

    /// Returns the specification name.
    pub fn name(&self) -> &'static str {
        match self {
            SpecId::Safety => "safety",
            SpecId::Shield => "shield",
        }
    }

    /// Returns a description of the specification.
    pub fn description(&self) -> &'static str {
        match self {
            SpecId::Safety => "G !crash over the traffic observer",
            SpecId::Shield => "G !(N&E | N&W | S&E | S&W) over the light phase",
        }
    }

    /// Builds the formula.
    pub fn formula(&self) -> Formula {
        match self {
            SpecId::Safety => safety(),
            SpecId::Shield => safety_shield(),
        }
    }
}

impl std::fmt::Display for SpecId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for SpecId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "safety" | "no_crash" => Ok(SpecId::Safety),
            "shield" | "safety_shield" => Ok(SpecId::Shield),
            _ => Err(format!("Unknown specification: {}", s)),
        }
    }
}

/// `G !crash`
pub fn safety() -> Formula {
    Formula::atomic("crash").not().always()
}

/// Mutual exclusion of crossing lights: `G !(N&E | N&W | S&E | S&W)`.
pub fn safety_shield() -> Formula {
    let conflicts = [Direction::North, Direction::South]
        .into_iter()
        .flat_map(|d| {
            d.perpendicular()
                .into_iter()
                .map(move |p| Formula::atomic(d.name()) & Formula::atomic(p.name()))
        });
    Formula::any(conflicts).not().always()
}

/// Degree of a light proposition (`N`, `E`, `S`, `W`): `1.0` if green.
pub fn light_degree(name: &str, phase: &Phase) -> EvalResult<f64> {
    let direction: Direction = name.parse().map_err(|_| EvalError::unknown_atomic(name))?;
    if direction.name() != name {
        // Only the single-letter names are propositions.
        return Err(EvalError::unknown_atomic(name));
    }
    Ok(if phase.is_green(direction) { 1.0 } else { 0.0 })
}

/// Atomic evaluation paired with [`safety`].
pub fn traffic_eval() -> Arc<dyn AtomicEval<TrafficState>> {
    Arc::new(traffic_degree)
}

/// Atomic evaluation paired with [`safety_shield`].
pub fn light_eval() -> Arc<dyn AtomicEval<Phase>> {
    Arc::new(light_degree)
}
