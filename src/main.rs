use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use ml_stone_game::ai::TableAgent;
use ml_stone_game::checkpoint::load_play_table;
use ml_stone_game::config::AppConfig;
use ml_stone_game::ui::App;

/// Play the stone game against a trained Q-table.
#[derive(Parser)]
#[command(name = "ml_stone_game", about = "Play 21 stones against a trained Q-table")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Load this q_table.npy instead of the latest run
    #[arg(long)]
    table: Option<PathBuf>,

    /// Directory searched for the latest run
    #[arg(long)]
    runs_dir: Option<PathBuf>,

    /// Delay before the AI answers, in milliseconds
    #[arg(long, default_value_t = 600)]
    delay_ms: u64,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut app_config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    if let Some(runs_dir) = cli.runs_dir {
        app_config.run.runs_dir = runs_dir;
    }

    let table = load_play_table(
        cli.table.as_deref(),
        &app_config.run,
        app_config.game.initial_stones,
    );
    let agent = TableAgent::new(table);
    let mut app = App::new(
        agent,
        app_config.game.initial_stones,
        Duration::from_millis(cli.delay_ms),
    );

    // Setup terminal
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("creating terminal")?;

    let res = app.run(&mut terminal);

    // Restore terminal, even on error
    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let _ = terminal.show_cursor();

    res.context("running play screen")
}
