use rand::rngs::StdRng;
use rand::SeedableRng;

use super::agent::Agent;
use crate::game::{heuristic_take, GameState};

/// The environment's scripted opponent, usable from either seat.
pub struct HeuristicAgent {
    rng: StdRng,
}

impl HeuristicAgent {
    pub fn seeded(seed: u64) -> Self {
        HeuristicAgent {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Agent for HeuristicAgent {
    fn select_action(&mut self, state: &GameState) -> Option<usize> {
        if state.is_terminal() {
            return None;
        }
        heuristic_take(state.stones_remaining(), &mut self.rng).map(|take| take as usize - 1)
    }

    fn name(&self) -> &str {
        "Heuristic"
    }
}
