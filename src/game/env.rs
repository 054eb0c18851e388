use rand::rngs::StdRng;
use rand::SeedableRng;

use super::opponent::heuristic_take;
use super::state::{is_legal_action, stones_for_action, GameState, NUM_ACTIONS};
use super::Player;
use crate::error::StepError;

/// Reward for taking the last stone.
pub const WIN_REWARD: f64 = 1.0;
/// Reward when the opponent takes the last stone.
pub const LOSS_REWARD: f64 = -1.0;
/// Reward for trying to take more stones than remain. Ends the episode.
pub const ILLEGAL_MOVE_PENALTY: f64 = -10.0;

/// Result of one environment transition, seen from the agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    /// Stones remaining after the transition.
    pub observation: u32,
    pub reward: f64,
    pub terminated: bool,
    /// Stones the opponent removed during this transition, if it moved.
    pub opponent_take: Option<u32>,
}

/// Single-agent environment: the agent moves, then the scripted opponent replies.
///
/// Owns the only random generator used by the opponent so that an episode is
/// reproducible from a seed.
pub struct StoneGameEnv {
    state: GameState,
    initial_stones: u32,
    rng: StdRng,
}

impl StoneGameEnv {
    pub fn new(initial_stones: u32, seed: u64) -> Self {
        StoneGameEnv {
            state: GameState::with_stones(initial_stones),
            initial_stones,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn stones_remaining(&self) -> u32 {
        self.state.stones_remaining()
    }

    pub fn initial_stones(&self) -> u32 {
        self.initial_stones
    }

    /// Start a new episode. Safe to call at any point, including mid-episode.
    pub fn reset(&mut self) -> u32 {
        self.state = GameState::with_stones(self.initial_stones);
        self.state.stones_remaining()
    }

    /// Re-seed the opponent's generator, then start a new episode.
    pub fn reset_with_seed(&mut self, seed: u64) -> u32 {
        self.rng = StdRng::seed_from_u64(seed);
        self.reset()
    }

    /// Play the agent's half of a turn.
    ///
    /// On a non-terminal result the turn passes to the opponent and
    /// [`opponent_move`](Self::opponent_move) must be called before the agent
    /// may move again.
    pub fn agent_move(&mut self, action: usize) -> Result<Transition, StepError> {
        self.check_turn(Player::Agent)?;
        if action >= NUM_ACTIONS {
            return Err(StepError::UnknownAction(action));
        }

        if !is_legal_action(action, self.state.stones_remaining()) {
            log::trace!(
                "illegal action {} with {} stones remaining",
                action,
                self.state.stones_remaining()
            );
            self.state.forfeit(Player::Agent);
            return Ok(Transition {
                observation: 0,
                reward: ILLEGAL_MOVE_PENALTY,
                terminated: true,
                opponent_take: None,
            });
        }

        self.state.take(Player::Agent, stones_for_action(action))?;
        let terminated = self.state.is_terminal();
        Ok(Transition {
            observation: self.state.stones_remaining(),
            reward: if terminated { WIN_REWARD } else { 0.0 },
            terminated,
            opponent_take: None,
        })
    }

    /// Play the scripted opponent's half of a turn.
    pub fn opponent_move(&mut self) -> Result<Transition, StepError> {
        self.check_turn(Player::Opponent)?;
        let take = heuristic_take(self.state.stones_remaining(), &mut self.rng)
            .ok_or(StepError::EpisodeOver)?;
        self.state.take(Player::Opponent, take)?;

        let terminated = self.state.is_terminal();
        Ok(Transition {
            observation: self.state.stones_remaining(),
            reward: if terminated { LOSS_REWARD } else { 0.0 },
            terminated,
            opponent_take: Some(take),
        })
    }

    /// Apply the agent's action and, unless the episode ended, the opponent's reply.
    pub fn step(&mut self, action: usize) -> Result<Transition, StepError> {
        let agent = self.agent_move(action)?;
        if agent.terminated {
            return Ok(agent);
        }
        self.opponent_move()
    }

    fn check_turn(&self, player: Player) -> Result<(), StepError> {
        if self.state.is_terminal() {
            return Err(StepError::EpisodeOver);
        }
        let current = self.state.current_player();
        if current != player {
            return Err(StepError::OutOfTurn {
                expected: current,
                attempted: player,
            });
        }
        Ok(())
    }
}
