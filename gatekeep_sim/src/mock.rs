//! Test doubles shared by the harness tests.

use gatekeep_env::{Controller, Simulation, SimulationFault, Transition, World};
use nalgebra::Vector2;

/// World that ends after a fixed number of steps.
#[derive(Debug, Clone)]
pub struct CountdownWorld {
    pub steps: u32,
    pub budget: u32,
}

impl World for CountdownWorld {
    type Action = i32;
    type State = u32;

    fn step(&mut self, _action: &i32) -> Result<Transition<u32>, SimulationFault> {
        self.steps += 1;
        Ok(Transition::new(self.steps, 0.0, self.steps >= self.budget))
    }

    fn reset(&mut self) -> Result<u32, SimulationFault> {
        self.steps = 0;
        Ok(0)
    }
}

/// Simulation that reports `done` once `remaining` steps have been taken,
/// counted across every rollout since it is mutated in place.
///
/// Two vehicles are tracked; the action `crash_on` puts them on the same
/// cell. `fail_at` makes the n-th step (1-based) fault.
#[derive(Debug, Clone)]
pub struct CountdownSim {
    pub remaining: u32,
    pub taken: u32,
    pub fail_at: Option<u32>,
    pub crash_on: Option<i32>,
    pub renders: u32,
    vehicles: Vec<Vector2<f64>>,
    world: CountdownWorld,
}

impl CountdownSim {
    pub fn new(remaining: u32) -> Self {
        Self {
            remaining,
            taken: 0,
            fail_at: None,
            crash_on: None,
            renders: 0,
            vehicles: vec![Vector2::new(0.0, 0.0), Vector2::new(10.0, 0.0)],
            world: CountdownWorld {
                steps: 0,
                budget: u32::MAX,
            },
        }
    }

    pub fn failing_at(mut self, step: u32) -> Self {
        self.fail_at = Some(step);
        self
    }

    pub fn crashing_on(mut self, action: i32) -> Self {
        self.crash_on = Some(action);
        self
    }

    pub fn with_world_budget(mut self, budget: u32) -> Self {
        self.world.budget = budget;
        self
    }
}

impl Simulation for CountdownSim {
    type Action = i32;
    type State = u32;
    type Entity = Vector2<f64>;
    type World = CountdownWorld;

    fn step(&mut self, action: &i32) -> Result<Transition<u32>, SimulationFault> {
        self.taken += 1;
        if self.fail_at == Some(self.taken) {
            return Err(SimulationFault::step(format!("injected at step {}", self.taken)));
        }
        self.remaining = self.remaining.saturating_sub(1);

        let gap = if self.crash_on == Some(*action) { 0.0 } else { 10.0 };
        self.vehicles[1] = Vector2::new(gap, 0.0);

        Ok(Transition::new(self.taken, *action as f64, self.remaining == 0))
    }

    fn reset(&mut self) -> Result<u32, SimulationFault> {
        self.taken = 0;
        Ok(0)
    }

    fn copy(&self) -> Self {
        self.clone()
    }

    fn vehicles(&self) -> Vec<&Vector2<f64>> {
        self.vehicles.iter().collect()
    }

    fn world(&self) -> &CountdownWorld {
        &self.world
    }

    fn world_mut(&mut self) -> &mut CountdownWorld {
        &mut self.world
    }

    fn render(&mut self) {
        self.renders += 1;
    }
}

/// Controller that always proposes the same action.
#[derive(Debug, Clone)]
pub struct FixedController {
    pub action: i32,
    pub fail: bool,
    pub calls: u32,
}

impl FixedController {
    pub fn new(action: i32) -> Self {
        Self {
            action,
            fail: false,
            calls: 0,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(0)
        }
    }
}

impl Controller for FixedController {
    type Action = i32;
    type State = u32;

    fn select_action(&mut self, _state: Option<&u32>) -> Result<i32, SimulationFault> {
        self.calls += 1;
        if self.fail {
            return Err(SimulationFault::controller("no action available"));
        }
        Ok(self.action)
    }

    fn fork(&self, _stream: u64) -> Self {
        Self {
            fail: self.fail,
            ..Self::new(self.action)
        }
    }
}
