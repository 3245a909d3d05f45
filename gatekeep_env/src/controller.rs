//! Controller contract.

use crate::error::SimulationFault;

/// Chooses the action the gatekeeper will certify.
///
/// Selection may be deterministic or stochastic. The gatekeeper currently
/// passes `None` as the state, so implementations must not require one.
pub trait Controller: Send {
    type Action;
    type State;

    /// Selects an action given the visible state, if any.
    fn select_action(&mut self, state: Option<&Self::State>) -> Result<Self::Action, SimulationFault>;

    /// Derives an independent controller for a parallel repetition.
    ///
    /// Stochastic controllers should derive a distinct random stream from
    /// `stream` so that repetitions do not replay identical actions.
    fn fork(&self, stream: u64) -> Self
    where
        Self: Sized;
}
