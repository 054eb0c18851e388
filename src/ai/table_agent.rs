use rand::rngs::StdRng;
use rand::SeedableRng;

use super::agent::Agent;
use super::q_table::QTable;
use crate::game::{heuristic_take, GameState};

/// Where a [`TableAgent`] decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionSource {
    Table,
    Heuristic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub action: usize,
    pub source: DecisionSource,
}

impl Decision {
    pub fn stones(&self) -> u32 {
        self.action as u32 + 1
    }
}

/// Plays greedily from a trained table, restricted to legal actions.
///
/// Without a table, or for a pile the table has no row for, it plays the
/// scripted opponent's strategy instead.
pub struct TableAgent {
    table: Option<QTable>,
    rng: StdRng,
}

impl TableAgent {
    pub fn new(table: Option<QTable>) -> Self {
        TableAgent {
            table,
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn seeded(table: Option<QTable>, seed: u64) -> Self {
        TableAgent {
            table,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn table(&self) -> Option<&QTable> {
        self.table.as_ref()
    }

    /// Pick a move for a pile of `stones_remaining`, or `None` if there is none.
    pub fn decide(&mut self, stones_remaining: u32) -> Option<Decision> {
        if stones_remaining == 0 {
            return None;
        }
        if let Some(action) = self
            .table
            .as_ref()
            .and_then(|t| t.best_legal_action(stones_remaining))
        {
            return Some(Decision {
                action,
                source: DecisionSource::Table,
            });
        }
        heuristic_take(stones_remaining, &mut self.rng).map(|take| Decision {
            action: take as usize - 1,
            source: DecisionSource::Heuristic,
        })
    }
}

impl Agent for TableAgent {
    fn select_action(&mut self, state: &GameState) -> Option<usize> {
        if state.is_terminal() {
            return None;
        }
        self.decide(state.stones_remaining()).map(|d| d.action)
    }

    fn name(&self) -> &str {
        if self.table.is_some() {
            "Q-table"
        } else {
            "Heuristic fallback"
        }
    }
}
