//! # ML Stone Game
//!
//! The 21-stones take-away game as a reinforcement learning environment, a
//! tabular Q-learning trainer for it, and a terminal UI for playing against
//! the trained table.
//!
//! ## Modules
//!
//! - [`game`]: Core game logic: pile state, turn order, scripted opponent, environment
//! - [`ai`]: Agent trait, Q-table builder and frozen table, table/heuristic/random agents
//! - [`training`]: Epsilon schedule, Q-learning episode loop, trainer, metrics
//! - [`checkpoint`]: Run directories, `.npy` table codec, run metadata
//! - [`ui`]: Terminal UI: human vs. AI play screen
//! - [`config`]: TOML configuration loading and validation
//! - [`error`]: Structured error types

pub mod ai;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod game;
pub mod training;
pub mod ui;
