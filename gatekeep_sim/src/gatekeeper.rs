//! The gatekeeper: certify an action on sampled rollouts, then take it.

use crate::config::{GatekeeperConfig, LoopConfig};
use crate::error::GatekeepResult;
use crate::observe::Observer;
use crate::pool::WorkerPool;
use crate::sampler::simulate_trajectories;
use gatekeep_core::{AtomicEval, CompiledSpec, Formula, ProofCertificate, Trajectory};
use gatekeep_env::{Controller, Simulation, StepInfo, World};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of one [`Gatekeeper::run_step`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepReport<St, A, O> {
    /// Simulation state after the certified action was applied
    pub next_state: St,

    /// Reward of that final step
    pub reward: f64,

    /// The final step ended the episode
    pub done: bool,

    /// Diagnostics from the final step
    #[serde(default, skip_serializing_if = "std::collections::BTreeMap::is_empty")]
    pub info: StepInfo,

    /// Certificate for the selected action
    pub certificate: ProofCertificate<A>,

    /// Rollouts the certificate was computed from, in sampling order
    pub trajectories: Vec<Trajectory<O>>,
}

/// Certificates and rollouts collected by one or more loops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopReport<A, O> {
    pub certificates: Vec<ProofCertificate<A>>,
    pub trajectories: Vec<Trajectory<O>>,

    /// Certificates reaching the acceptance threshold
    pub accepted: usize,

    /// Sum of the rewards of every certified step
    pub total_reward: f64,
}

impl<A, O> Default for LoopReport<A, O> {
    fn default() -> Self {
        Self {
            certificates: Vec::new(),
            trajectories: Vec::new(),
            accepted: 0,
            total_reward: 0.0,
        }
    }
}

impl<A, O> LoopReport<A, O> {
    pub fn rejected(&self) -> usize {
        self.certificates.len() - self.accepted
    }

    /// Appends another report's certificates and rollouts.
    pub fn merge(&mut self, other: LoopReport<A, O>) {
        self.certificates.extend(other.certificates);
        self.trajectories.extend(other.trajectories);
        self.accepted += other.accepted;
        self.total_reward += other.total_reward;
    }
}

/// Drives one simulation: select, sample, certify, advance.
///
/// The gatekeeper owns its simulation. Parallel repetitions never touch it;
/// each works on a [`Simulation::copy`] taken by [`Gatekeeper::fork`].
pub struct Gatekeeper<S, C, P>
where
    S: Simulation,
    P: Observer<S>,
{
    sim: S,
    controller: C,
    observer: P,
    spec: CompiledSpec<P::Observation>,
    config: GatekeeperConfig,
}

impl<S, C, P> Gatekeeper<S, C, P>
where
    S: Simulation,
    C: Controller<Action = S::Action>,
    P: Observer<S>,
{
    /// Creates a gatekeeper, binding `spec` to `atomic_eval`.
    ///
    /// The atomic evaluation must accept every proposition name in `spec`
    /// for every observation `observer` can emit; a mismatch surfaces as
    /// an `UnknownAtomic` error on the first step.
    pub fn new(
        sim: S,
        controller: C,
        observer: P,
        spec: Formula,
        atomic_eval: Arc<dyn AtomicEval<P::Observation>>,
        config: GatekeeperConfig,
    ) -> GatekeepResult<Self> {
        config.validate()?;
        debug!(
            formula = %spec,
            atoms = ?spec.atoms(),
            size = spec.size(),
            "Compiling specification"
        );
        Ok(Self {
            sim,
            controller,
            observer,
            spec: CompiledSpec::compile(spec, atomic_eval),
            config,
        })
    }

    pub fn sim(&self) -> &S {
        &self.sim
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn spec(&self) -> &Formula {
        self.spec.formula()
    }

    pub fn config(&self) -> &GatekeeperConfig {
        &self.config
    }

    /// Certifies one action and applies it.
    ///
    /// 1. Take the compiled specification.
    /// 2. Ask the controller for an action (no state is passed).
    /// 3. Sample `num_trajectories` rollouts of it on the live simulation.
    /// 4. Build the certificate from those rollouts.
    /// 5. Step the live simulation with the action once more.
    ///
    /// Any failure aborts the step and no certificate is produced.
    pub fn run_step(&mut self) -> GatekeepResult<StepReport<S::State, S::Action, P::Observation>> {
        let spec = self.spec.clone();

        let action = self.controller.select_action(None)?;

        let trajectories = simulate_trajectories(
            &mut self.sim,
            &action,
            &self.observer,
            self.config.num_trajectories,
            self.config.horizon,
        )?;

        let certificate = spec.certify_all(&trajectories, action.clone())?;
        debug!(
            robustness = %certificate.proof_abides,
            rollouts = trajectories.len(),
            "Certified action"
        );

        let transition = self.sim.step(&action)?;

        Ok(StepReport {
            next_state: transition.state,
            reward: transition.reward,
            done: transition.done,
            info: transition.info,
            certificate,
            trajectories,
        })
    }

    /// Runs up to `iterations` gatekept steps.
    ///
    /// Each iteration first steps the World with a freshly selected action,
    /// then runs [`Gatekeeper::run_step`] and renders. The loop stops after
    /// the iteration in which the World reports `done`.
    pub fn run_loop(&mut self, iterations: usize) -> GatekeepResult<LoopReport<S::Action, P::Observation>> {
        let threshold = self.config.acceptance_threshold;
        let mut report = LoopReport::default();

        for iteration in 0..iterations {
            let world_action = self.controller.select_action(None)?;
            let world = self.sim.world_mut().step(&world_action)?;

            let step = self.run_step()?;
            self.sim.render();

            if step.certificate.abides(threshold) {
                report.accepted += 1;
            } else {
                warn!(
                    iteration,
                    robustness = %step.certificate.proof_abides,
                    threshold,
                    "Action below acceptance threshold"
                );
            }
            report.total_reward += step.reward;
            report.certificates.push(step.certificate);
            report.trajectories.extend(step.trajectories);

            if world.done {
                debug!(iteration, "World done");
                break;
            }
        }

        info!(
            certificates = report.certificates.len(),
            accepted = report.accepted,
            "Loop finished"
        );
        Ok(report)
    }

    /// Releases the simulation's rendering resources.
    pub fn close(&mut self) {
        self.sim.close();
    }
}

impl<S, C, P> Gatekeeper<S, C, P>
where
    S: Simulation + 'static,
    S::Action: Send + 'static,
    C: Controller<Action = S::Action> + 'static,
    P: Observer<S> + Clone + 'static,
{
    /// Independent gatekeeper over a copy of the simulation.
    ///
    /// The controller is forked on `stream` so that stochastic controllers
    /// draw different actions per repetition.
    pub fn fork(&self, stream: u64) -> Self {
        Self {
            sim: self.sim.copy(),
            controller: self.controller.fork(stream),
            observer: self.observer.clone(),
            spec: self.spec.clone(),
            config: self.config.clone(),
        }
    }

    /// Fans `loops.repetitions` independent loops out across `pool`.
    ///
    /// Every repetition runs `loops.iterations` on its own fork; the live
    /// simulation is left untouched. Reports are merged in completion
    /// order, so certificate order across repetitions is unspecified.
    pub fn run_parallel(
        &self,
        pool: &WorkerPool,
        loops: &LoopConfig,
    ) -> GatekeepResult<LoopReport<S::Action, P::Observation>> {
        loops.validate()?;
        info!(
            repetitions = loops.repetitions,
            iterations = loops.iterations,
            workers = pool.workers(),
            "Fanning out gatekeeper loops"
        );

        let iterations = loops.iterations;
        let jobs: Vec<_> = (0..loops.repetitions)
            .map(|rep| {
                let mut gatekeeper = self.fork(rep as u64);
                move || gatekeeper.run_loop(iterations)
            })
            .collect();

        let mut merged = LoopReport::default();
        for report in pool.run_all(jobs)? {
            merged.merge(report);
        }

        info!(
            certificates = merged.certificates.len(),
            accepted = merged.accepted,
            "Parallel loops finished"
        );
        Ok(merged)
    }
}

impl<S, C, P> std::fmt::Debug for Gatekeeper<S, C, P>
where
    S: Simulation,
    P: Observer<S>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gatekeeper")
            .field("spec", &self.spec)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::RandomController;
    use crate::error::GatekeepError;
    use crate::mock::{CountdownSim, FixedController};
    use crate::observe::{LightObserver, TrafficObserver, TrafficState};
    use crate::specs::{light_eval, safety, safety_shield, traffic_eval};
    use crate::traffic::{Intersection, IntersectionConfig};
    use gatekeep_core::{Degree, EvalError};
    use gatekeep_env::SimulationFault;

    fn config(n: usize, h: usize) -> GatekeeperConfig {
        GatekeeperConfig::default().with_trajectories(n).with_horizon(h)
    }

    fn countdown(
        sim: CountdownSim,
        controller: FixedController,
        n: usize,
        h: usize,
    ) -> Gatekeeper<CountdownSim, FixedController, TrafficObserver> {
        Gatekeeper::new(
            sim,
            controller,
            TrafficObserver::default(),
            safety(),
            traffic_eval(),
            config(n, h),
        )
        .unwrap()
    }

    #[test]
    fn test_run_step_certifies_selected_action() {
        let mut gk = countdown(CountdownSim::new(1000), FixedController::new(3), 4, 5);
        let step = gk.run_step().unwrap();

        assert_eq!(step.trajectories.len(), 4);
        assert!(step.trajectories.iter().all(|t| t.len() == 6));
        assert_eq!(step.certificate.action, 3);
        assert_eq!(step.certificate.proof_abides, Degree::Scalar(1.0));
        assert_eq!(step.certificate.per_trajectory.len(), 4);

        // Sampling plus the final advance.
        assert_eq!(gk.sim().taken, 4 * 5 + 1);
        assert_eq!(step.next_state, 21);
        assert_eq!(step.reward, 3.0);
        assert!(!step.done);
    }

    #[test]
    fn test_crashing_action_rejected() {
        let sim = CountdownSim::new(1000).crashing_on(9);
        let mut gk = countdown(sim, FixedController::new(9), 2, 3);
        let step = gk.run_step().unwrap();

        assert_eq!(step.certificate.proof_abides, Degree::Scalar(0.0));
        assert!(!step.certificate.abides(gk.config().acceptance_threshold));
        assert_eq!(step.trajectories[0][1], TrafficState::Crash);
    }

    #[test]
    fn test_done_reported_from_final_step() {
        // Exhausted during sampling; the advance reports done.
        let mut gk = countdown(CountdownSim::new(3), FixedController::new(0), 1, 10);
        let step = gk.run_step().unwrap();
        assert!(step.done);
        assert_eq!(step.trajectories[0].len(), 4);
    }

    #[test]
    fn test_controller_fault_propagates() {
        let mut gk = countdown(CountdownSim::new(10), FixedController::failing(), 1, 1);
        let err = gk.run_step().unwrap_err();
        assert!(matches!(err, GatekeepError::Simulation(SimulationFault::Controller(_))));
        assert_eq!(gk.sim().taken, 0);
    }

    #[test]
    fn test_sampling_fault_propagates() {
        let sim = CountdownSim::new(100).failing_at(2);
        let mut gk = countdown(sim, FixedController::new(0), 3, 3);
        let err = gk.run_step().unwrap_err();
        assert!(matches!(err, GatekeepError::Simulation(SimulationFault::Step(_))));
    }

    #[test]
    fn test_unsupported_spec_fails_step() {
        let spec = Formula::atomic("crash").until(Formula::atomic("no_traffic"));
        let mut gk = Gatekeeper::new(
            CountdownSim::new(100),
            FixedController::new(0),
            TrafficObserver::default(),
            spec,
            traffic_eval(),
            config(1, 1),
        )
        .unwrap();

        let err = gk.run_step().unwrap_err();
        assert!(matches!(err, GatekeepError::Eval(EvalError::UnsupportedSpecification(_))));
    }

    #[test]
    fn test_unknown_atomic_fails_step() {
        let mut gk = Gatekeeper::new(
            CountdownSim::new(100),
            FixedController::new(0),
            TrafficObserver::default(),
            Formula::atomic("gridlock").always(),
            traffic_eval(),
            config(1, 1),
        )
        .unwrap();

        assert!(matches!(
            gk.run_step().unwrap_err(),
            GatekeepError::Eval(EvalError::UnknownAtomic(_))
        ));
    }

    #[test]
    fn test_zero_trajectories_rejected_up_front() {
        let result = Gatekeeper::new(
            CountdownSim::new(1),
            FixedController::new(0),
            TrafficObserver::default(),
            safety(),
            traffic_eval(),
            config(0, 1),
        );
        assert!(matches!(result, Err(GatekeepError::Config(_))));
    }

    #[test]
    fn test_loop_stops_on_world_done() {
        let sim = CountdownSim::new(10_000).with_world_budget(3);
        let mut gk = countdown(sim, FixedController::new(1), 2, 2);

        let report = gk.run_loop(10).unwrap();

        assert_eq!(report.certificates.len(), 3);
        assert_eq!(report.trajectories.len(), 6);
        assert_eq!(report.accepted, 3);
        assert_eq!(report.rejected(), 0);
        assert_eq!(gk.sim().renders, 3);
        assert_eq!(gk.sim().world().steps, 3);
    }

    #[test]
    fn test_loop_counts_rejections() {
        let sim = CountdownSim::new(10_000).crashing_on(5);
        let mut gk = countdown(sim, FixedController::new(5), 1, 1);

        let report = gk.run_loop(4).unwrap();
        assert_eq!(report.certificates.len(), 4);
        assert_eq!(report.accepted, 0);
        assert_eq!(report.rejected(), 4);
    }

    #[test]
    fn test_loop_zero_iterations() {
        let mut gk = countdown(CountdownSim::new(10), FixedController::new(0), 1, 1);
        let report = gk.run_loop(0).unwrap();
        assert!(report.certificates.is_empty());
        assert_eq!(gk.controller().calls, 0);
    }

    #[test]
    fn test_parallel_flattens_repetitions() {
        let gk = countdown(CountdownSim::new(10_000), FixedController::new(2), 3, 2);
        let pool = WorkerPool::new(2).unwrap();
        let loops = LoopConfig::default().with_iterations(2).with_repetitions(5);

        let report = gk.run_parallel(&pool, &loops).unwrap();

        assert_eq!(report.certificates.len(), 10);
        assert_eq!(report.trajectories.len(), 30);
        assert!(report.certificates.iter().all(|c| c.action == 2));
        // Repetitions work on copies.
        assert_eq!(gk.sim().taken, 0);
    }

    #[test]
    fn test_parallel_surfaces_worker_fault() {
        let sim = CountdownSim::new(10_000).failing_at(1);
        let gk = countdown(sim, FixedController::new(0), 1, 1);
        let pool = WorkerPool::new(2).unwrap();
        let loops = LoopConfig::default().with_iterations(1).with_repetitions(3);

        let err = gk.run_parallel(&pool, &loops).unwrap_err();
        assert!(matches!(err, GatekeepError::Simulation(SimulationFault::Step(_))));
    }

    #[test]
    fn test_parallel_surfaces_controller_fault() {
        let gk = countdown(CountdownSim::new(10_000), FixedController::failing(), 1, 1);
        let pool = WorkerPool::new(2).unwrap();
        let loops = LoopConfig::default().with_iterations(2).with_repetitions(3);

        let err = gk.run_parallel(&pool, &loops).unwrap_err();
        assert!(matches!(err, GatekeepError::Simulation(SimulationFault::Controller(_))));
        assert_eq!(gk.controller().calls, 0);
    }

    #[test]
    fn test_intersection_safety_end_to_end() {
        let sim = Intersection::new(IntersectionConfig::default());
        let mut gk = Gatekeeper::new(
            sim,
            RandomController::new(7),
            TrafficObserver::default(),
            safety(),
            traffic_eval(),
            config(3, 4),
        )
        .unwrap();

        let report = gk.run_loop(20).unwrap();

        // The light World ends the loop within its step budget.
        assert!(!report.certificates.is_empty());
        assert!(report.certificates.len() <= 10);
        assert_eq!(report.trajectories.len(), report.certificates.len() * 3);
        for cert in &report.certificates {
            let worst = cert.proof_abides.as_scalar().unwrap();
            assert!(worst == 0.0 || worst == 1.0);
        }
    }

    #[test]
    fn test_intersection_shield_over_lights() {
        let sim = Intersection::new(IntersectionConfig::default());
        let gk = Gatekeeper::new(
            sim,
            RandomController::new(11),
            LightObserver,
            safety_shield(),
            light_eval(),
            config(2, 3),
        )
        .unwrap();
        let pool = WorkerPool::new(2).unwrap();
        let loops = LoopConfig::default().with_iterations(3).with_repetitions(4);

        let report = gk.run_parallel(&pool, &loops).unwrap();

        assert_eq!(report.certificates.len(), 12);
        for cert in &report.certificates {
            // The second rollout starts from the held phase, so a
            // conflicting action is seen at every observation.
            if cert.action.has_conflict() {
                assert!(!cert.abides(gk.config().acceptance_threshold));
            }
        }
    }
}
