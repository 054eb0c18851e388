use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use ml_stone_game::checkpoint::{unix_timestamp, RunHyperparameters, RunMetadata, RunMetrics, RunStore};
use ml_stone_game::config::AppConfig;
use ml_stone_game::training::trainer::Trainer;

/// Train a tabular Q-learning agent for the stone game.
#[derive(Parser)]
#[command(name = "train", about = "Train a Q-table against the scripted opponent")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Override number of training episodes
    #[arg(long)]
    episodes: Option<usize>,

    /// Override the run seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override learning rate
    #[arg(long)]
    lr: Option<f64>,

    /// Override the experiment name used in the run directory
    #[arg(long)]
    exp_name: Option<String>,

    /// Override the directory runs are written to
    #[arg(long)]
    runs_dir: Option<PathBuf>,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    if cli.print_default_config {
        print!("{}", AppConfig::default_toml());
        return Ok(());
    }

    // Load configuration
    let mut app_config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Apply CLI overrides
    if let Some(episodes) = cli.episodes {
        app_config.training.total_episodes = episodes;
    }
    if let Some(seed) = cli.seed {
        app_config.training.seed = seed;
    }
    if let Some(lr) = cli.lr {
        app_config.training.learning_rate = lr;
    }
    if let Some(exp_name) = cli.exp_name {
        app_config.run.exp_name = exp_name;
    }
    if let Some(runs_dir) = cli.runs_dir {
        app_config.run.runs_dir = runs_dir;
    }
    app_config.validate().context("validating configuration")?;

    let initial_stones = app_config.game.initial_stones;
    let trainer = Trainer::new(app_config.training.clone(), initial_stones)
        .context("creating trainer")?;
    let outcome = trainer.train().context("training")?;

    let store = RunStore::new(app_config.run.clone());
    let seed = trainer.config().seed;
    let timestamp = unix_timestamp();
    let metadata = RunMetadata {
        run_name: store.run_name(seed, timestamp),
        env_id: app_config.run.env_id.clone(),
        exp_name: app_config.run.exp_name.clone(),
        seed,
        timestamp,
        hyperparameters: RunHyperparameters::from_config(trainer.config(), initial_stones),
        metrics: RunMetrics::from_outcome(&outcome, trainer.config().log_interval),
    };

    let path = store
        .save_run(&outcome.table, &metadata)
        .context("saving run")?;

    println!("Saved Q-table to {}", path.display());
    if let Some(wr) = outcome.eval_win_rate {
        println!("Greedy win rate vs heuristic: {:.1}%", wr * 100.0);
    }
    Ok(())
}
