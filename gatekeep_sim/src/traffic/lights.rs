//! Traffic-light phases and the light World.

use gatekeep_env::{SimulationFault, Transition, World};
use nalgebra::Vector2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Approach direction of a lane, clockwise from North.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All directions in clockwise order (the phase bit order).
    pub fn all() -> [Direction; 4] {
        [Direction::North, Direction::East, Direction::South, Direction::West]
    }

    /// Bit index in a [`Phase`].
    pub fn index(&self) -> usize {
        match self {
            Direction::North => 0,
            Direction::East => 1,
            Direction::South => 2,
            Direction::West => 3,
        }
    }

    /// Single-letter proposition name for this light.
    pub fn name(&self) -> &'static str {
        match self {
            Direction::North => "N",
            Direction::East => "E",
            Direction::South => "S",
            Direction::West => "W",
        }
    }

    /// The two directions whose lanes cross this one.
    pub fn perpendicular(&self) -> [Direction; 2] {
        match self {
            Direction::North | Direction::South => [Direction::East, Direction::West],
            Direction::East | Direction::West => [Direction::North, Direction::South],
        }
    }

    /// Lattice cell where vehicles of this lane enter, for a road of the
    /// given half-length.
    ///
    /// Lanes are offset one cell to the right of the centre line so that
    /// opposing traffic never shares a cell; only perpendicular lanes cross.
    pub fn entry(&self, half_length: i32) -> Vector2<f64> {
        let l = half_length as f64;
        match self {
            Direction::North => Vector2::new(-1.0, l),
            Direction::East => Vector2::new(l, 1.0),
            Direction::South => Vector2::new(1.0, -l),
            Direction::West => Vector2::new(-l, -1.0),
        }
    }

    /// Unit displacement per tick while the light is green.
    pub fn heading(&self) -> Vector2<f64> {
        match self {
            Direction::North => Vector2::new(0.0, -1.0),
            Direction::East => Vector2::new(-1.0, 0.0),
            Direction::South => Vector2::new(0.0, 1.0),
            Direction::West => Vector2::new(1.0, 0.0),
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "N" | "NORTH" => Ok(Direction::North),
            "E" | "EAST" => Ok(Direction::East),
            "S" | "SOUTH" => Ok(Direction::South),
            "W" | "WEST" => Ok(Direction::West),
            _ => Err(format!("Unknown direction: {}", s)),
        }
    }
}

/// Which of the four lights are green. This is both the controller's action
/// and the light World's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Phase {
    green: [bool; 4],
}

impl Phase {
    pub fn new(green: [bool; 4]) -> Self {
        Self { green }
    }

    /// All lights red.
    pub fn all_red() -> Self {
        Self::default()
    }

    /// Builds a phase from the low four bits, bit 0 = North, clockwise.
    pub fn from_bits(bits: u8) -> Self {
        let mut green = [false; 4];
        for (i, g) in green.iter_mut().enumerate() {
            *g = bits & (1 << i) != 0;
        }
        Self { green }
    }

    pub fn bits(&self) -> u8 {
        self.green
            .iter()
            .enumerate()
            .fold(0, |acc, (i, g)| if *g { acc | (1 << i) } else { acc })
    }

    /// Only the given directions green.
    pub fn green(directions: &[Direction]) -> Self {
        let mut phase = Self::all_red();
        for d in directions {
            phase.green[d.index()] = true;
        }
        phase
    }

    pub fn is_green(&self, direction: Direction) -> bool {
        self.green[direction.index()]
    }

    /// True if two crossing lanes are green at once.
    pub fn has_conflict(&self) -> bool {
        [Direction::North, Direction::South]
            .iter()
            .any(|d| self.is_green(*d) && d.perpendicular().iter().any(|p| self.is_green(*p)))
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for d in Direction::all() {
            if self.is_green(d) {
                write!(f, "{}", d.name())?;
            } else {
                write!(f, "-")?;
            }
        }
        Ok(())
    }
}

/// The light World: holds the current phase and a step budget.
#[derive(Debug, Clone)]
pub struct TrafficLights {
    phase: Phase,
    steps: u32,
    max_steps: u32,
    rng: ChaCha8Rng,
}

impl TrafficLights {
    /// Creates a world with a random initial phase.
    pub fn new(max_steps: u32, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let phase = Phase::from_bits(rng.gen_range(0..16));
        Self {
            phase,
            steps: 0,
            max_steps,
            rng,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn is_done(&self) -> bool {
        self.steps >= self.max_steps
    }
}

impl World for TrafficLights {
    type Action = Phase;
    type State = Phase;

    fn step(&mut self, action: &Phase) -> Result<Transition<Phase>, SimulationFault> {
        self.phase = *action;
        self.steps += 1;
        Ok(Transition::new(self.phase, 0.0, self.is_done()))
    }

    fn reset(&mut self) -> Result<Phase, SimulationFault> {
        self.phase = Phase::from_bits(self.rng.gen_range(0..16));
        self.steps = 0;
        Ok(self.phase)
    }
}
