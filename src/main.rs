//! tictactoe_oracle - terminal tic-tac-toe with an LLM opponent.

#![warn(missing_docs)]

mod cli;
mod tui;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use tictactoe_oracle::{
    Board, GameConfig, GameMode, Mark, SelectionSource, rules, selector_from_config,
};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = GameConfig::load(&cli.config)?;

    match cli.command {
        Command::Play {
            mode,
            player1,
            player2,
        } => run_play(config, mode.map(GameMode::from), player1, player2).await,
        Command::Suggest { board, mark } => run_suggest(config, &board, mark.into()).await,
    }
}

/// Run the terminal UI, logging to a file
async fn run_play(
    config: GameConfig,
    mode: Option<GameMode>,
    player1: String,
    player2: String,
) -> Result<()> {
    let log_file = std::fs::File::create(config.log_file())
        .with_context(|| format!("Failed to create log file {}", config.log_file()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .init();

    info!("Starting tic-tac-toe TUI");
    tui::run(&config, mode, &player1, &player2).await
}

/// Ask for a single move and print where it came from
#[instrument(skip(config))]
async fn run_suggest(config: GameConfig, board: &str, mark: Mark) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let board = Board::parse_cells(board)
        .with_context(|| format!("Invalid board {:?}: expected nine cells of X, O or .", board))?;
    if let Some(outcome) = rules::evaluate(&board) {
        anyhow::bail!("Board is already decided: {}", outcome);
    }

    let selector = selector_from_config(&config);
    let selection = selector.select(&board, mark).await;

    println!("{}", board.display());
    match &selection.source {
        SelectionSource::Oracle => println!(
            "{} plays {} ({}), suggested by {}",
            mark,
            selection.position.to_index(),
            selection.position,
            selector.oracle_name()
        ),
        SelectionSource::Fallback(reason) => println!(
            "{} plays {} ({}), chosen at random: {}",
            mark,
            selection.position.to_index(),
            selection.position,
            reason
        ),
    }
    Ok(())
}
