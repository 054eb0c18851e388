/// The two seats at the table. The agent always moves first after a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    Agent,
    Opponent,
}

impl Player {
    /// Get the other player
    pub fn other(self) -> Player {
        match self {
            Player::Agent => Player::Opponent,
            Player::Opponent => Player::Agent,
        }
    }

    /// Get player name for display
    pub fn name(self) -> &'static str {
        match self {
            Player::Agent => "Agent",
            Player::Opponent => "Opponent",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_other_player() {
        assert_eq!(Player::Agent.other(), Player::Opponent);
        assert_eq!(Player::Opponent.other(), Player::Agent);
    }

    #[test]
    fn test_player_name() {
        assert_eq!(Player::Agent.name(), "Agent");
        assert_eq!(Player::Opponent.name(), "Opponent");
    }
}
