//! Pure tic-tac-toe game logic.
//!
//! Board storage, positions, moves and the win/draw rules. Nothing in this
//! crate performs I/O or suspends; session bookkeeping and move selection
//! live in `tictactoe_oracle`.

#![warn(missing_docs)]

mod action;
mod position;
pub mod rules;
mod types;

pub use action::{Move, MoveError};
pub use position::Position;
pub use rules::{Outcome, WinningLine};
pub use types::{Board, Mark, Square};
