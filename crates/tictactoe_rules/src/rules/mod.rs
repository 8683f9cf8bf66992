//! Game rules for tic-tac-toe.
//!
//! This module contains pure functions for evaluating a board. Rules are
//! separated from board storage so the session layer decides what to do with
//! a result.

pub mod draw;
mod outcome;
pub mod win;

pub use draw::{is_draw, is_full};
pub use outcome::Outcome;
pub use win::{LINES, WinningLine, check_winner};

use super::Board;

/// Evaluates a board: a win takes precedence over a full board.
///
/// Returns `None` while the round can still continue.
pub fn evaluate(board: &Board) -> Option<Outcome> {
    if let Some(line) = check_winner(board) {
        return Some(Outcome::Winner(line));
    }
    if is_full(board) {
        return Some(Outcome::Draw);
    }
    None
}
