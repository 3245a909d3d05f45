//! Simulation and World contracts.

use crate::error::SimulationFault;
use crate::types::{Positioned, Transition};

/// The environment the controller ultimately acts on.
///
/// A World is the coarse layer (e.g. the traffic-light phase). A Simulation
/// owns one and refines it with its own dynamics.
pub trait World: Send {
    type Action;
    type State;

    /// Applies `action` and returns the resulting transition.
    fn step(&mut self, action: &Self::Action) -> Result<Transition<Self::State>, SimulationFault>;

    /// Restores the initial state.
    fn reset(&mut self) -> Result<Self::State, SimulationFault>;
}

/// A steppable model used to sample rollouts of a candidate action.
///
/// # Ownership
///
/// Sampling mutates the simulation in place, so a handle is owned by exactly
/// one gatekeeper at a time. Anything that runs concurrently must first take
/// an independent instance through [`Simulation::copy`].
///
/// # Implementations
///
/// Concrete dynamics (grid automata, continuous kinematics, density models,
/// external simulator backends) are interchangeable implementations of this
/// trait.
pub trait Simulation: Send {
    type Action: Clone + Send;
    type State;
    type Entity: Positioned;
    type World: World<Action = Self::Action>;

    /// Advances the simulation under `action`.
    ///
    /// # Returns
    /// * `Ok(transition)` - `transition.done` ends the current rollout
    /// * `Err(fault)` - propagated unchanged to the caller
    fn step(&mut self, action: &Self::Action) -> Result<Transition<Self::State>, SimulationFault>;

    /// Restores the initial state.
    fn reset(&mut self) -> Result<Self::State, SimulationFault>;

    /// Returns a fully independent deep copy.
    ///
    /// The copy must share no mutable state with `self`; this is what makes
    /// parallel fan-out safe.
    fn copy(&self) -> Self
    where
        Self: Sized;

    /// Entities currently tracked (e.g. moving vehicles).
    fn vehicles(&self) -> Vec<&Self::Entity>;

    /// The world this simulation refines.
    fn world(&self) -> &Self::World;

    /// Mutable access to the world, used by the gatekeeper loop.
    fn world_mut(&mut self) -> &mut Self::World;

    /// Side-effecting visual hook; irrelevant to correctness.
    fn render(&mut self) {}

    /// Releases rendering resources; irrelevant to correctness.
    fn close(&mut self) {}
}
