//! Training infrastructure: the epsilon schedule, the Q-learning episode
//! loop, the trainer that drives it, and rolling metrics.

pub mod episode;
pub mod metrics;
pub mod schedule;
pub mod trainer;

pub use episode::{
    baseline_win_rates, derive_seed, evaluate, evaluate_agent, play_episode,
    run_q_learning_episode, LearningParams,
};
pub use metrics::{EpisodeEnd, EpisodeResult, TrainingMetrics};
pub use schedule::linear_schedule;
pub use trainer::{EpisodeSummary, Trainer, TrainerConfig, TrainingOutcome};
