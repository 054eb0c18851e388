//! Core stone game logic: player seats, the game state machine, the scripted
//! opponent and the training environment built on top of them.

mod env;
mod opponent;
mod player;
mod state;

pub use env::{StoneGameEnv, Transition, ILLEGAL_MOVE_PENALTY, LOSS_REWARD, WIN_REWARD};
pub use opponent::heuristic_take;
pub use player::Player;
pub use state::{
    is_legal_action, legal_actions_for, stones_for_action, GameOutcome, GameState, MoveError,
    DEFAULT_STONES, MAX_TAKE, NUM_ACTIONS,
};
