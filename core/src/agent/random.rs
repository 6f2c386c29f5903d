use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;

use super::*;

/// Reveals a uniformly random hidden cell. Learns nothing.
#[derive(Clone, Debug)]
pub struct RandomAgent {
    rng: SmallRng,
}

impl RandomAgent {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str {
        "random"
    }

    fn choose_move(&mut self, revealed: &RevealState) -> Option<Move> {
        let hidden: Vec<_> = revealed.iter_hidden().collect();
        hidden.choose(&mut self.rng).copied()
    }

    fn update(&mut self, _transition: &Transition) -> AgentResult<()> {
        Ok(())
    }
}
