use super::Player;

/// Default size of the pile at the start of a game.
pub const DEFAULT_STONES: u32 = 21;
/// Most stones a single move may remove.
pub const MAX_TAKE: u32 = 3;
/// Size of the action space: action `a` takes `a + 1` stones.
pub const NUM_ACTIONS: usize = MAX_TAKE as usize;

/// Number of stones removed by `action`.
pub fn stones_for_action(action: usize) -> u32 {
    action as u32 + 1
}

/// Whether `action` is a real action that removes no more than `stones_remaining`.
pub fn is_legal_action(action: usize, stones_remaining: u32) -> bool {
    action < NUM_ACTIONS && stones_for_action(action) <= stones_remaining
}

/// Actions that are legal with `stones_remaining` on the pile, ascending.
pub fn legal_actions_for(stones_remaining: u32) -> Vec<usize> {
    (0..NUM_ACTIONS)
        .filter(|&a| is_legal_action(a, stones_remaining))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    /// The player took the last stone.
    Winner(Player),
    /// The player tried to take more stones than remained.
    Forfeit(Player),
}

impl GameOutcome {
    /// The player who won the game, whichever way it ended.
    pub fn winner(self) -> Player {
        match self {
            GameOutcome::Winner(p) => p,
            GameOutcome::Forfeit(p) => p.other(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("it is {expected:?}'s turn, not {attempted:?}'s")]
    OutOfTurn { expected: Player, attempted: Player },

    #[error("cannot take {take} stones with {remaining} remaining")]
    InvalidTake { take: u32, remaining: u32 },

    #[error("the game is already over")]
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameState {
    stones_remaining: u32,
    current_player: Player,
    outcome: Option<GameOutcome>,
}

impl GameState {
    /// Create initial game state with the default pile
    pub fn initial() -> Self {
        Self::with_stones(DEFAULT_STONES)
    }

    /// Create initial game state with `stones` on the pile
    pub fn with_stones(stones: u32) -> Self {
        GameState {
            stones_remaining: stones,
            current_player: Player::Agent, // Agent starts
            outcome: None,
        }
    }

    pub fn stones_remaining(&self) -> u32 {
        self.stones_remaining
    }

    /// Get current player
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// Get game outcome if game is over
    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    /// Check if game is over
    pub fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }

    /// Actions the current player may take
    pub fn legal_actions(&self) -> Vec<usize> {
        if self.is_terminal() {
            return Vec::new();
        }
        legal_actions_for(self.stones_remaining)
    }

    /// Remove `stones` from the pile on behalf of `player`.
    ///
    /// The state is left untouched on error.
    pub fn take(&mut self, player: Player, stones: u32) -> Result<(), MoveError> {
        if self.is_terminal() {
            return Err(MoveError::GameOver);
        }
        if player != self.current_player {
            return Err(MoveError::OutOfTurn {
                expected: self.current_player,
                attempted: player,
            });
        }
        if stones == 0 || stones > MAX_TAKE || stones > self.stones_remaining {
            return Err(MoveError::InvalidTake {
                take: stones,
                remaining: self.stones_remaining,
            });
        }

        self.stones_remaining -= stones;
        if self.stones_remaining == 0 {
            self.outcome = Some(GameOutcome::Winner(player));
        } else {
            self.current_player = player.other();
        }
        Ok(())
    }

    /// End the game because `player` attempted an illegal take. Empties the pile.
    pub(crate) fn forfeit(&mut self, player: Player) {
        self.stones_remaining = 0;
        self.outcome = Some(GameOutcome::Forfeit(player));
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = GameState::initial();
        assert_eq!(state.stones_remaining(), 21);
        assert_eq!(state.current_player(), Player::Agent);
        assert!(!state.is_terminal());
        assert_eq!(state.legal_actions(), vec![0, 1, 2]);
    }

    #[test]
    fn test_take_passes_turn() {
        let mut state = GameState::initial();
        state.take(Player::Agent, 3).unwrap();
        assert_eq!(state.stones_remaining(), 18);
        assert_eq!(state.current_player(), Player::Opponent);
    }

    #[test]
    fn test_take_out_of_turn_is_rejected() {
        let mut state = GameState::initial();
        let err = state.take(Player::Opponent, 1).unwrap_err();
        assert_eq!(
            err,
            MoveError::OutOfTurn {
                expected: Player::Agent,
                attempted: Player::Opponent
            }
        );
        assert_eq!(state, GameState::initial());
    }

    #[test]
    fn test_take_too_many_is_rejected() {
        let mut state = GameState::with_stones(2);
        assert_eq!(
            state.take(Player::Agent, 3),
            Err(MoveError::InvalidTake { take: 3, remaining: 2 })
        );
        assert_eq!(
            state.take(Player::Agent, 0),
            Err(MoveError::InvalidTake { take: 0, remaining: 2 })
        );
        assert_eq!(state.stones_remaining(), 2);
    }

    #[test]
    fn test_last_stone_wins() {
        let mut state = GameState::with_stones(5);
        state.take(Player::Agent, 1).unwrap();
        state.take(Player::Opponent, 3).unwrap();
        state.take(Player::Agent, 1).unwrap();
        assert!(state.is_terminal());
        assert_eq!(state.outcome(), Some(GameOutcome::Winner(Player::Agent)));
        assert!(state.legal_actions().is_empty());
        assert_eq!(state.take(Player::Opponent, 1), Err(MoveError::GameOver));
    }

    #[test]
    fn test_forfeit_empties_pile() {
        let mut state = GameState::with_stones(2);
        state.forfeit(Player::Agent);
        assert_eq!(state.stones_remaining(), 0);
        assert_eq!(state.outcome(), Some(GameOutcome::Forfeit(Player::Agent)));
        assert_eq!(state.outcome().unwrap().winner(), Player::Opponent);
    }

    #[test]
    fn test_legal_actions_shrink_near_empty_pile() {
        assert_eq!(legal_actions_for(3), vec![0, 1, 2]);
        assert_eq!(legal_actions_for(2), vec![0, 1]);
        assert_eq!(legal_actions_for(1), vec![0]);
        assert!(legal_actions_for(0).is_empty());
        assert!(!is_legal_action(3, 21));
    }
}
