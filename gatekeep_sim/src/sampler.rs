//! Trajectory sampling.

use crate::observe::Observer;
use gatekeep_core::Trajectory;
use gatekeep_env::{Simulation, SimulationFault};
use tracing::debug;

/// Samples `num_trajectories` rollouts of `action`.
///
/// Each rollout is seeded with the current observation, then steps the
/// simulation with the same action up to `horizon` times, observing after
/// every step and stopping as soon as a step reports `done`. Every
/// trajectory therefore holds between `1` and `horizon + 1` observations.
///
/// The simulation is mutated in place and not restored between rollouts:
/// later rollouts continue from wherever the previous one left off. Faults
/// are returned unchanged and discard the rollouts sampled so far.
pub fn simulate_trajectories<S, P>(
    sim: &mut S,
    action: &S::Action,
    observer: &P,
    num_trajectories: usize,
    horizon: usize,
) -> Result<Vec<Trajectory<P::Observation>>, SimulationFault>
where
    S: Simulation,
    P: Observer<S> + ?Sized,
{
    let mut trajectories = Vec::with_capacity(num_trajectories);

    for rollout in 0..num_trajectories {
        let mut trajectory = Trajectory::seeded(observer.observe(sim));
        let mut done = false;

        for _ in 0..horizon {
            let transition = sim.step(action)?;
            trajectory.push(observer.observe(sim));
            if transition.done {
                done = true;
                break;
            }
        }

        debug!(rollout, steps = trajectory.steps(), done, "Sampled rollout");
        trajectories.push(trajectory);
    }

    Ok(trajectories)
}
