//! First-class move types for tic-tac-toe.

use super::{Mark, Position};
use serde::{Deserialize, Serialize};

/// A move in tic-tac-toe: a mark placed at a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// The mark being placed.
    pub mark: Mark,
    /// Where the mark is placed.
    pub position: Position,
}

impl Move {
    /// Creates a new move.
    pub fn new(mark: Mark, position: Position) -> Self {
        Self { mark, position }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.mark, self.position.label())
    }
}

/// Reason a move was rejected. A rejected move never changes any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// The index does not name a square.
    #[display("Position {_0} is off the board")]
    OutOfRange(usize),

    /// The square at the position is already occupied.
    #[display("{_0} is already occupied")]
    SquareOccupied(Position),

    /// It's not this mark's turn.
    #[display("It's not {_0}'s turn")]
    WrongTurn(Mark),

    /// The round already has a result.
    #[display("The round is over")]
    RoundOver,

    /// No round has been started.
    #[display("No round in progress")]
    NoRound,

    /// The AI opponent is still choosing its move.
    #[display("Waiting for the AI to move")]
    AiThinking,
}

impl std::error::Error for MoveError {}
