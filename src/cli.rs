//! Command-line interface for tictactoe_oracle.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tictactoe_oracle::{GameMode, Mark};

/// Tic-tac-toe against an LLM, or against a friend
#[derive(Parser, Debug)]
#[command(name = "tictactoe_oracle")]
#[command(about = "Tic-tac-toe with an LLM move oracle", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML config (defaults are used if it doesn't exist)
    #[arg(short, long, global = true, default_value = "tictactoe.toml")]
    pub config: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play in the terminal UI
    Play {
        /// Skip the setup screen and start in this mode
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,

        /// Name for X
        #[arg(long, default_value = "")]
        player1: String,

        /// Name for O (the AI's name in single-player mode)
        #[arg(long, default_value = "")]
        player2: String,
    },

    /// Ask the oracle for one move and print it
    Suggest {
        /// Board as nine cells in row-major order: X, O, and . for empty
        #[arg(long)]
        board: String,

        /// Mark to move
        #[arg(long, value_enum, default_value = "o")]
        mark: MarkArg,
    },
}

/// Game mode on the command line
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ModeArg {
    /// Human (X) against the AI (O)
    Single,
    /// Two humans
    Two,
}

impl From<ModeArg> for GameMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Single => GameMode::SinglePlayer,
            ModeArg::Two => GameMode::TwoPlayer,
        }
    }
}

/// Mark on the command line
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum MarkArg {
    /// X
    X,
    /// O
    O,
}

impl From<MarkArg> for Mark {
    fn from(mark: MarkArg) -> Self {
        match mark {
            MarkArg::X => Mark::X,
            MarkArg::O => Mark::O,
        }
    }
}
