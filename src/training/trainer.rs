use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::ai::{QTable, QTableBuilder};
use crate::error::{ConfigError, TrainingError};
use crate::game::StoneGameEnv;
use crate::training::episode::{
    baseline_win_rates, derive_seed, evaluate, run_q_learning_episode, LearningParams,
};
use crate::training::metrics::{EpisodeResult, TrainingMetrics};
use crate::training::schedule::linear_schedule;

/// Trainer configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub seed: u64,
    pub total_episodes: usize,
    pub learning_rate: f64,
    pub gamma: f64,
    pub start_epsilon: f64,
    pub end_epsilon: f64,
    /// Fraction of `total_episodes` over which epsilon decays to `end_epsilon`.
    pub exploration_fraction: f64,
    pub log_interval: usize,
    /// Greedy games played against the opponent after training.
    pub eval_episodes: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            seed: 1,
            total_episodes: 10_000,
            learning_rate: 0.5,
            gamma: 0.9,
            start_epsilon: 1.0,
            end_epsilon: 0.05,
            exploration_fraction: 0.8,
            log_interval: 100,
            eval_episodes: 1000,
        }
    }
}

impl TrainerConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_episodes == 0 {
            return Err(ConfigError::Validation(
                "training.total_episodes must be > 0".into(),
            ));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(ConfigError::Validation(
                "training.learning_rate must be in (0, 1]".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(ConfigError::Validation(
                "training.gamma must be in [0, 1]".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.start_epsilon) {
            return Err(ConfigError::Validation(
                "training.start_epsilon must be in [0, 1]".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.end_epsilon) {
            return Err(ConfigError::Validation(
                "training.end_epsilon must be in [0, 1]".into(),
            ));
        }
        if self.end_epsilon > self.start_epsilon {
            return Err(ConfigError::Validation(
                "training.end_epsilon must be <= training.start_epsilon".into(),
            ));
        }
        if !(self.exploration_fraction > 0.0 && self.exploration_fraction <= 1.0) {
            return Err(ConfigError::Validation(
                "training.exploration_fraction must be in (0, 1]".into(),
            ));
        }
        if self.log_interval == 0 {
            return Err(ConfigError::Validation(
                "training.log_interval must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Number of episodes over which epsilon decays.
    pub fn decay_duration(&self) -> f64 {
        self.exploration_fraction * self.total_episodes as f64
    }
}

/// Per-episode report handed to an observer during training.
#[derive(Debug, Clone, Copy)]
pub struct EpisodeSummary {
    pub episode: usize,
    pub epsilon: f64,
    pub result: EpisodeResult,
}

/// Everything a finished training run produces.
pub struct TrainingOutcome {
    pub table: QTable,
    pub metrics: TrainingMetrics,
    pub final_epsilon: f64,
    /// Greedy win rate against the scripted opponent, if evaluation ran.
    pub eval_win_rate: Option<f32>,
    /// Random and scripted agents' win rates under the same evaluation.
    pub baseline_win_rates: Vec<(String, f32)>,
}

/// Tabular Q-learning trainer against the scripted opponent.
pub struct Trainer {
    config: TrainerConfig,
    initial_stones: u32,
}

impl Trainer {
    /// Fails before any episode runs if the configuration is invalid.
    pub fn new(config: TrainerConfig, initial_stones: u32) -> Result<Self, ConfigError> {
        config.validate()?;
        if initial_stones == 0 {
            return Err(ConfigError::Validation(
                "game.initial_stones must be >= 1".into(),
            ));
        }
        Ok(Trainer {
            config,
            initial_stones,
        })
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn initial_stones(&self) -> u32 {
        self.initial_stones
    }

    /// Run the full training loop.
    pub fn train(&self) -> Result<TrainingOutcome, TrainingError> {
        self.train_with_observer(|_| {})
    }

    /// Run the full training loop, reporting every episode to `observer`.
    pub fn train_with_observer<F>(&self, mut observer: F) -> Result<TrainingOutcome, TrainingError>
    where
        F: FnMut(&EpisodeSummary),
    {
        let cfg = &self.config;
        let mut env = StoneGameEnv::new(self.initial_stones, derive_seed(cfg.seed, 0));
        let mut rng = StdRng::seed_from_u64(derive_seed(cfg.seed, 1));
        let mut table = QTableBuilder::zeros(self.initial_stones);
        let mut metrics = TrainingMetrics::with_capacity(cfg.log_interval);
        let params = LearningParams {
            learning_rate: cfg.learning_rate,
            gamma: cfg.gamma,
        };
        let duration = cfg.decay_duration();
        let mut epsilon = cfg.start_epsilon;

        log::info!(
            "starting Q-learning for {} episodes (N={}, lr={}, gamma={}, seed={})",
            cfg.total_episodes,
            self.initial_stones,
            cfg.learning_rate,
            cfg.gamma,
            cfg.seed
        );

        for episode in 0..cfg.total_episodes {
            epsilon = linear_schedule(cfg.start_epsilon, cfg.end_epsilon, duration, episode);
            let result = run_q_learning_episode(&mut env, &mut table, params, epsilon, &mut rng)?;
            metrics.record_episode(result);
            observer(&EpisodeSummary {
                episode,
                epsilon,
                result,
            });

            if episode % cfg.log_interval == 0 {
                let window = cfg.log_interval;
                log::info!(
                    "episode {}/{} | return {:+.1} | eps {:.3} | win_rate({}) {:.1}% | illegal {:.1}% | avg_len {:.1}",
                    episode,
                    cfg.total_episodes,
                    result.total_reward,
                    epsilon,
                    window,
                    metrics.win_rate(window) * 100.0,
                    metrics.illegal_rate(window) * 100.0,
                    metrics.average_length(window),
                );
            }
        }

        let table = table.finalize();
        let mut baselines = Vec::new();
        let eval_win_rate = if cfg.eval_episodes > 0 {
            let eval_seed = derive_seed(cfg.seed, 2);
            let wr = evaluate(&table, self.initial_stones, cfg.eval_episodes, eval_seed)?;
            log::info!(
                "greedy eval vs heuristic ({} games): {:.1}% win rate",
                cfg.eval_episodes,
                wr * 100.0
            );
            baselines = baseline_win_rates(self.initial_stones, cfg.eval_episodes, eval_seed)?;
            for (name, baseline) in &baselines {
                log::info!("baseline {}: {:.1}% win rate", name, baseline * 100.0);
            }
            Some(wr)
        } else {
            None
        };

        log::info!("training complete, {} episodes", metrics.total_episodes());

        Ok(TrainingOutcome {
            table,
            metrics,
            final_epsilon: epsilon,
            eval_win_rate,
            baseline_win_rates: baselines,
        })
    }
}
