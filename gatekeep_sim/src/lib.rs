//! Gatekeep Harness
//!
//! Runs a controller behind a gatekeeper: before an action reaches the
//! world it is rolled out on a simulation, the rollouts are scored against
//! a temporal specification, and the score is issued as a certificate.
//!
//! # Pipeline
//!
//! ```text
//! Controller ──action──► Gatekeeper ──► simulate_trajectories (N rollouts)
//!                             │                 │
//!                             │          Observer per step
//!                             ▼                 ▼
//!                      Simulation.step   Trajectory<O> ×N ──► CompiledSpec
//!                             │                                    │
//!                             ▼                                    ▼
//!                       next state                         ProofCertificate
//! ```
//!
//! Independent repetitions of the whole loop can be fanned out across a
//! [`WorkerPool`]; each repetition works on its own `Simulation::copy()`.
//!
//! # Usage
//!
//! ```ignore
//! use gatekeep_sim::{Gatekeeper, GatekeeperConfig, Intersection, RandomController, TrafficObserver};
//! use gatekeep_sim::specs::{safety, traffic_eval};
//!
//! let mut gatekeeper = Gatekeeper::new(
//!     Intersection::new(Default::default()),
//!     RandomController::new(42),
//!     TrafficObserver::default(),
//!     safety(),
//!     traffic_eval(),
//!     GatekeeperConfig::default(),
//! )?;
//! let step = gatekeeper.run_step()?;
//! println!("{}", step.certificate.proof_abides);
//! ```

mod config;
mod controller;
mod error;
mod exporter;
mod gatekeeper;
#[cfg(test)]
mod mock;
mod observe;
mod pool;
mod sampler;
pub mod specs;
pub mod traffic;

pub use config::{GatekeeperConfig, LoopConfig, DEFAULT_ACCEPTANCE_THRESHOLD};
pub use controller::RandomController;
pub use error::{GatekeepError, GatekeepResult};
pub use exporter::{CertificateRecord, RunExport};
pub use gatekeeper::{Gatekeeper, LoopReport, StepReport};
pub use observe::{
    classify, traffic_degree, LightObserver, Observer, TrafficObserver, TrafficState,
    DEFAULT_CRASH_EPSILON,
};
pub use pool::WorkerPool;
pub use sampler::simulate_trajectories;
pub use traffic::{Direction, Intersection, IntersectionConfig, IntersectionState, Phase, TrafficLights};
