use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::training::{TrainerConfig, TrainingOutcome};

/// Metrics snapshot at the end of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetrics {
    pub episodes: usize,
    /// Rolling-window rates over the final `window` training episodes.
    pub window: usize,
    pub win_rate: f32,
    pub loss_rate: f32,
    pub illegal_rate: f32,
    pub average_return: f64,
    pub final_epsilon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eval_win_rate: Option<f32>,
    /// Baseline agents' win rates, keyed by agent name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub baselines: BTreeMap<String, f32>,
}

impl RunMetrics {
    pub fn from_outcome(outcome: &TrainingOutcome, window: usize) -> Self {
        let m = &outcome.metrics;
        RunMetrics {
            episodes: m.total_episodes(),
            window,
            win_rate: m.win_rate(window),
            loss_rate: m.loss_rate(window),
            illegal_rate: m.illegal_rate(window),
            average_return: m.average_return(window),
            final_epsilon: outcome.final_epsilon,
            eval_win_rate: outcome.eval_win_rate,
            baselines: outcome.baseline_win_rates.iter().cloned().collect(),
        }
    }
}

/// Hyperparameters recorded in run metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunHyperparameters {
    pub initial_stones: u32,
    pub total_episodes: usize,
    pub learning_rate: f64,
    pub gamma: f64,
    pub start_epsilon: f64,
    pub end_epsilon: f64,
    pub exploration_fraction: f64,
}

impl RunHyperparameters {
    pub fn from_config(config: &TrainerConfig, initial_stones: u32) -> Self {
        RunHyperparameters {
            initial_stones,
            total_episodes: config.total_episodes,
            learning_rate: config.learning_rate,
            gamma: config.gamma,
            start_epsilon: config.start_epsilon,
            end_epsilon: config.end_epsilon,
            exploration_fraction: config.exploration_fraction,
        }
    }
}

/// Top-level run metadata written to metadata.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    pub run_name: String,
    pub env_id: String,
    pub exp_name: String,
    pub seed: u64,
    pub timestamp: u64,
    pub hyperparameters: RunHyperparameters,
    pub metrics: RunMetrics,
}
