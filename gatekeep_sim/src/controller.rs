//! Random baseline controller.

use crate::traffic::{IntersectionState, Phase};
use gatekeep_env::{Controller, SimulationFault};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Picks a uniformly random light phase, ignoring state.
#[derive(Debug, Clone)]
pub struct RandomController {
    seed: u64,
    rng: ChaCha8Rng,
}

impl RandomController {
    /// Creates a controller with a deterministic action stream.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Controller for RandomController {
    type Action = Phase;
    type State = IntersectionState;

    fn select_action(&mut self, _state: Option<&IntersectionState>) -> Result<Phase, SimulationFault> {
        Ok(Phase::from_bits(self.rng.gen_range(0..16)))
    }

    /// Derives the stream seed from `seed * φ + stream * prime`.
    fn fork(&self, stream: u64) -> Self {
        let forked_seed = self
            .seed
            .wrapping_mul(0x9e3779b97f4a7c15)
            .wrapping_add(stream.wrapping_mul(0x517cc1b727220a95));
        Self::new(forked_seed)
    }
}
