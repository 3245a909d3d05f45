//! A four-way lattice intersection.
//!
//! Vehicles enter on one of four lanes, advance one cell per tick while
//! their light is green and hold while it is red. Lanes cross at four
//! conflict cells; two vehicles landing on the same cell crash and stay
//! wrecked (stationary, coincident) until the next `step`. Vehicles leaving
//! the road count as throughput.

use super::lights::{Direction, Phase, TrafficLights};
use crate::error::{GatekeepError, GatekeepResult};
use gatekeep_env::{Positioned, Simulation, SimulationFault, Transition, World};
use nalgebra::Vector2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Reward for every vehicle that clears the intersection.
pub const FLOW_REWARD: f64 = 1.0;

/// Reward for every crash (per vehicle pair).
pub const CRASH_PENALTY: f64 = -1e3;

/// Configuration for the intersection.
#[derive(Debug, Clone)]
pub struct IntersectionConfig {
    /// Seed for spawning and the light World
    pub seed: u64,

    /// Light World step budget (episode length)
    pub max_steps: u32,

    /// Probability of a spawn attempt succeeding per tick
    pub spawn_rate: f64,

    /// Maximum simultaneous vehicles
    pub max_vehicles: usize,

    /// Vehicle ticks per light action
    pub vehicle_steps_per_action: u32,

    /// Cells from the centre to the road edge
    pub road_half_length: i32,
}

impl Default for IntersectionConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            max_steps: 10,
            spawn_rate: 0.175,
            max_vehicles: 10,
            vehicle_steps_per_action: 4,
            road_half_length: 6,
        }
    }
}

impl IntersectionConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> GatekeepResult<()> {
        if !(0.0..=1.0).contains(&self.spawn_rate) {
            return Err(GatekeepError::config("spawn_rate must be a probability in [0, 1]"));
        }
        if self.road_half_length < 1 {
            return Err(GatekeepError::config("road_half_length must be at least 1"));
        }
        Ok(())
    }
}

/// A vehicle on the lattice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: u64,
    pub lane: Direction,
    pub position: Vector2<f64>,
    pub crashed: bool,
}

impl Positioned for Vehicle {
    fn position(&self) -> Vector2<f64> {
        self.position
    }
}

/// Visible state of the intersection after a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntersectionState {
    pub phase: Phase,
    pub positions: Vec<[f64; 2]>,
    pub crashes: u64,
    pub throughput: u64,
}

/// The intersection simulation. Owns its light World.
#[derive(Debug, Clone)]
pub struct Intersection {
    config: IntersectionConfig,
    world: TrafficLights,
    vehicles: Vec<Vehicle>,
    rng: ChaCha8Rng,
    next_id: u64,
    ticks: u64,
    crashes: u64,
    throughput: u64,
}

impl Intersection {
    /// Creates an empty intersection.
    ///
    /// Spawning and the light World draw from separate seeds so that changing
    /// the episode length does not perturb traffic.
    pub fn new(config: IntersectionConfig) -> Self {
        let spawn_seed = config.seed;
        let light_seed = config.seed.wrapping_mul(0x9e3779b97f4a7c15);

        Self {
            world: TrafficLights::new(config.max_steps, light_seed),
            rng: ChaCha8Rng::seed_from_u64(spawn_seed),
            config,
            vehicles: Vec::new(),
            next_id: 0,
            ticks: 0,
            crashes: 0,
            throughput: 0,
        }
    }

    /// Places a vehicle at the entry of `lane` if the cell is free.
    pub fn spawn_vehicle(&mut self, lane: Direction) -> Option<u64> {
        if self.vehicles.len() >= self.config.max_vehicles {
            return None;
        }
        let entry = lane.entry(self.config.road_half_length);
        if self.vehicles.iter().any(|v| v.position == entry) {
            return None;
        }

        let id = self.next_id;
        self.next_id += 1;
        self.vehicles.push(Vehicle {
            id,
            lane,
            position: entry,
            crashed: false,
        });
        Some(id)
    }

    pub fn crashes(&self) -> u64 {
        self.crashes
    }

    pub fn throughput(&self) -> u64 {
        self.throughput
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    fn state(&self) -> IntersectionState {
        IntersectionState {
            phase: self.world.phase(),
            positions: self.vehicles.iter().map(|v| [v.position.x, v.position.y]).collect(),
            crashes: self.crashes,
            throughput: self.throughput,
        }
    }

    /// One vehicle tick: spawn, advance, clear, collide. Returns the reward.
    fn tick(&mut self) -> f64 {
        self.ticks += 1;

        if self.rng.gen_bool(self.config.spawn_rate) {
            let lane = Direction::all()[self.rng.gen_range(0..4)];
            self.spawn_vehicle(lane);
        }

        let phase = self.world.phase();
        for vehicle in self.vehicles.iter_mut().filter(|v| !v.crashed) {
            if phase.is_green(vehicle.lane) {
                vehicle.position += vehicle.lane.heading();
            }
        }

        let mut reward = 0.0;
        let before = self.vehicles.len();
        let half_length = self.config.road_half_length as f64;
        self.vehicles
            .retain(|v| v.position.x.abs() <= half_length && v.position.y.abs() <= half_length);
        let cleared = (before - self.vehicles.len()) as u64;
        self.throughput += cleared;
        reward += cleared as f64 * FLOW_REWARD;

        for i in 0..self.vehicles.len() {
            for j in (i + 1)..self.vehicles.len() {
                if self.vehicles[i].crashed && self.vehicles[j].crashed {
                    continue;
                }
                if self.vehicles[i].position == self.vehicles[j].position {
                    self.vehicles[i].crashed = true;
                    self.vehicles[j].crashed = true;
                    self.crashes += 1;
                    reward += CRASH_PENALTY;
                }
            }
        }
        reward
    }
}

impl Simulation for Intersection {
    type Action = Phase;
    type State = IntersectionState;
    type Entity = Vehicle;
    type World = TrafficLights;

    fn step(&mut self, action: &Phase) -> Result<Transition<IntersectionState>, SimulationFault> {
        // Wrecks are towed at the start of the next light action.
        self.vehicles.retain(|v| !v.crashed);

        let light = self.world.step(action)?;

        let mut reward = 0.0;
        for _ in 0..self.config.vehicle_steps_per_action {
            reward += self.tick();
        }

        Ok(Transition::new(self.state(), reward, light.done)
            .with_info("crashes", self.crashes as f64)
            .with_info("throughput", self.throughput as f64))
    }

    fn reset(&mut self) -> Result<IntersectionState, SimulationFault> {
        self.world.reset()?;
        self.vehicles.clear();
        self.ticks = 0;
        self.crashes = 0;
        self.throughput = 0;
        Ok(self.state())
    }

    fn copy(&self) -> Self {
        self.clone()
    }

    fn vehicles(&self) -> Vec<&Vehicle> {
        self.vehicles.iter().collect()
    }

    fn world(&self) -> &TrafficLights {
        &self.world
    }

    fn world_mut(&mut self) -> &mut TrafficLights {
        &mut self.world
    }
}
