use crate::game::GameState;

/// Universal interface for anything that picks moves in the stone game.
pub trait Agent {
    /// Select an action (take `action + 1` stones) for the current player.
    ///
    /// Returns `None` when the state has no legal move. Implementations never
    /// return an action that removes more stones than remain.
    fn select_action(&mut self, state: &GameState) -> Option<usize>;

    /// Return the agent's display name.
    fn name(&self) -> &str;
}
