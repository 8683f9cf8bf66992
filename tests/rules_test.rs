//! Tests for positions, win detection and draws through the public API.

use tictactoe_oracle::rules::{LINES, check_winner, evaluate, is_draw, is_full};
use tictactoe_oracle::{Board, Mark, Outcome, Position, Square};

#[test]
fn test_position_to_index() {
    assert_eq!(Position::TopLeft.to_index(), 0);
    assert_eq!(Position::Center.to_index(), 4);
    assert_eq!(Position::BottomRight.to_index(), 8);
}

#[test]
fn test_position_from_index() {
    assert_eq!(Position::from_index(0), Some(Position::TopLeft));
    assert_eq!(Position::from_index(4), Some(Position::Center));
    assert_eq!(Position::from_index(8), Some(Position::BottomRight));
    assert_eq!(Position::from_index(9), None);
    assert_eq!(Position::from_signed(-1), None);
}

#[test]
fn test_valid_moves_filters_occupied() {
    let mut board = Board::new();
    assert_eq!(Position::valid_moves(&board).len(), 9);

    board.set(Position::TopLeft, Square::Occupied(Mark::X));
    board.set(Position::Center, Square::Occupied(Mark::O));

    let valid = Position::valid_moves(&board);
    assert_eq!(valid.len(), 7);
    assert!(!valid.contains(&Position::TopLeft));
    assert!(!valid.contains(&Position::Center));
    assert!(valid.contains(&Position::BottomRight));
}

#[test]
fn test_completing_top_row_wins() {
    let mut board = Board::parse_cells("XX.O.....").unwrap();
    assert!(check_winner(&board).is_none());

    board.set(Position::TopRight, Square::Occupied(Mark::X));
    let line = check_winner(&board).expect("top row complete");
    assert_eq!(line.mark, Mark::X);
    assert_eq!(line.indices(), [0, 1, 2]);
    assert_eq!(evaluate(&board), Some(Outcome::Winner(line)));
}

#[test]
fn test_every_line_wins_for_both_marks() {
    for line in LINES {
        for mark in [Mark::X, Mark::O] {
            let mut board = Board::new();
            for pos in line {
                board.set(pos, Square::Occupied(mark));
            }
            let found = check_winner(&board).unwrap();
            assert_eq!(found.mark, mark);
            assert_eq!(found.positions, line);
        }
    }
}

#[test]
fn test_full_board_without_line_is_draw() {
    let board = Board::parse_cells("XOXXOOOXX").unwrap();
    assert!(is_full(&board));
    assert!(check_winner(&board).is_none());
    assert!(is_draw(&board));
    assert_eq!(evaluate(&board), Some(Outcome::Draw));
}

#[test]
fn test_full_board_with_line_is_not_draw() {
    let board = Board::parse_cells("XXXOOXXOO").unwrap();
    assert!(is_full(&board));
    assert!(!is_draw(&board));
    assert_eq!(evaluate(&board).and_then(|o| o.winner()), Some(Mark::X));
}

#[test]
fn test_empty_board_is_undecided() {
    let board = Board::new();
    assert!(!is_full(&board));
    assert!(!is_draw(&board));
    assert!(evaluate(&board).is_none());
}
