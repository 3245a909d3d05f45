//! Error types for collaborator failures.

use thiserror::Error;

/// A failure raised by a Simulation, World or Controller.
///
/// The gatekeeper never interprets, retries or recovers from these; they
/// are carried to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationFault {
    /// Simulation step failed
    #[error("Simulation step failed: {0}")]
    Step(String),

    /// Simulation or world reset failed
    #[error("Reset failed: {0}")]
    Reset(String),

    /// World step failed
    #[error("World step failed: {0}")]
    World(String),

    /// Controller could not select an action
    #[error("Controller error: {0}")]
    Controller(String),
}

impl SimulationFault {
    /// Creates a step fault.
    pub fn step(msg: impl Into<String>) -> Self {
        Self::Step(msg.into())
    }

    /// Creates a controller fault.
    pub fn controller(msg: impl Into<String>) -> Self {
        Self::Controller(msg.into())
    }
}
