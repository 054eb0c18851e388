//! Terminal UI: play the stone game against the trained table.

mod app;
mod game_view;

pub use app::{AiMove, App, MoveRecord, Score, AI, HUMAN};
