//! Gatekeep Environment Contracts
//!
//! This crate defines the collaborators the gatekeeper drives but does not
//! implement: the **Simulation** it samples rollouts from, the **World** the
//! chosen action finally lands in, and the **Controller** that proposes
//! actions.
//!
//! Concrete dynamics live elsewhere. Anything satisfying these traits can be
//! certified, and every failure they raise is a [`SimulationFault`] that the
//! gatekeeper propagates without interpretation.
//!
//! # Example
//!
//! ```ignore
//! use gatekeep_env::{Controller, Simulation};
//!
//! fn rollout<S: Simulation, C: Controller<Action = S::Action>>(
//!     sim: &mut S,
//!     controller: &mut C,
//! ) -> Result<(), SimulationFault> {
//!     let action = controller.select_action(None)?;
//!     while !sim.step(&action)?.done {}
//!     Ok(())
//! }
//! ```

mod controller;
mod error;
mod simulation;
mod types;

pub use controller::Controller;
pub use error::SimulationFault;
pub use simulation::{Simulation, World};
pub use types::{Positioned, StepInfo, Transition};
