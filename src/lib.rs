//! Tic-tac-toe against an LLM move oracle.
//!
//! # Architecture
//!
//! - **Rules** (`tictactoe_rules`): board, marks, win/draw evaluation
//! - **Session**: players, scores and the round state machine
//! - **Oracle**: external move suggestions (Gemini, OpenAI, Anthropic)
//! - **Selector**: validates oracle answers, falls back to a random empty square
//! - **Controller**: runs the asynchronous AI turn and drops stale replies
//!
//! # Example
//!
//! ```no_run
//! use tictactoe_oracle::{GameConfig, GameController, GameMode};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = GameConfig::load("tictactoe.toml")?;
//! let mut controller = GameController::from_config(&config);
//! controller.start(GameMode::SinglePlayer, "Ada", "")?;
//! controller.human_move(4)?;
//! controller.play_ai_turn().await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod controller;
pub mod llm_client;
mod move_selector;
pub mod oracle;
mod session;

pub use config::{ConfigError, GameConfig};
pub use controller::{AiReply, AiTurn, GameController, selector_from_config};
pub use llm_client::{LlmClient, LlmConfig, LlmError, LlmProvider};
pub use move_selector::{
    FallbackReason, MoveSelector, Selection, SelectionSource, random_empty_position,
};
pub use oracle::{LlmOracle, MoveOracle, OfflineOracle, OracleError};
pub use session::{
    DEFAULT_AI_NAME, DEFAULT_PLAYER_ONE, DEFAULT_PLAYER_TWO, GameMode, GameSession, Phase, Player,
    SessionError, TurnTicket,
};

pub use tictactoe_rules::{
    Board, Mark, Move, MoveError, Outcome, Position, Square, WinningLine, rules,
};
