//! Reference traffic collaborators.
//!
//! A four-way intersection implementing the `Simulation` contract, driven by
//! a traffic-light `World`. It backs the CLI and the tests; any other
//! implementation of the contracts can replace it.

mod intersection;
mod lights;

pub use intersection::{
    Intersection, IntersectionConfig, IntersectionState, Vehicle, CRASH_PENALTY, FLOW_REWARD,
};
pub use lights::{Direction, Phase, TrafficLights};
