mod agent;
mod heuristic;
pub mod q_table;
mod random;
mod table_agent;

pub use agent::Agent;
pub use heuristic::HeuristicAgent;
pub use q_table::{QTable, QTableBuilder, Row};
pub use random::RandomAgent;
pub use table_agent::{Decision, DecisionSource, TableAgent};
