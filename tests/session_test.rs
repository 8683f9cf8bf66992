//! Tests for the game session state machine.

use tictactoe_oracle::{
    GameMode, GameSession, Mark, MoveError, Outcome, Phase, Position, SessionError, Square,
};

fn started(mode: GameMode) -> GameSession {
    let mut session = GameSession::new();
    session.start(mode, "Ada", "Grace").expect("fresh session starts");
    session
}

/// Plays `indices`, alternating from X.
fn play(session: &mut GameSession, indices: &[usize]) -> Option<Outcome> {
    let mut outcome = None;
    for &index in indices {
        let mark = session.to_move();
        outcome = session.apply_move(mark, index).expect("legal move");
    }
    outcome
}

#[test]
fn test_start_enters_round_with_x_to_move() {
    let session = started(GameMode::TwoPlayer);
    assert_eq!(session.phase(), Phase::InRound);
    assert_eq!(session.to_move(), Mark::X);
    assert_eq!(session.board().occupied_count(), 0);
    let players = session.players().unwrap();
    assert_eq!(players[0].name(), "Ada");
    assert_eq!(players[1].name(), "Grace");
    assert_eq!(players[0].score(), 0);
}

#[test]
fn test_start_fills_default_names() {
    let mut session = GameSession::new();
    session.start(GameMode::SinglePlayer, "  ", "").unwrap();
    assert_eq!(session.player(Mark::X).unwrap().name(), "Player 1");
    assert_eq!(session.player(Mark::O).unwrap().name(), "Gemini AI");

    let mut session = GameSession::new();
    session.start(GameMode::TwoPlayer, "", "").unwrap();
    assert_eq!(session.player(Mark::O).unwrap().name(), "Player 2");
}

#[test]
fn test_start_twice_is_rejected() {
    let mut session = started(GameMode::TwoPlayer);
    play(&mut session, &[4]);
    let before = session.clone();

    assert_eq!(
        session.start(GameMode::SinglePlayer, "X", "Y"),
        Err(SessionError::AlreadyStarted)
    );
    assert_eq!(session.board(), before.board());
    assert_eq!(session.mode(), Some(GameMode::TwoPlayer));
}

#[test]
fn test_turn_alternates_on_every_accepted_move() {
    let mut session = started(GameMode::TwoPlayer);
    let mut expected = Mark::X;
    for index in [4, 0, 8, 2, 6] {
        assert_eq!(session.to_move(), expected);
        session.apply_move(expected, index).unwrap();
        expected = expected.opponent();
    }
    assert_eq!(session.history().len(), 5);
}

#[test]
fn test_rejected_moves_do_not_mutate() {
    let mut session = started(GameMode::TwoPlayer);
    play(&mut session, &[4]);
    let board = *session.board();
    let to_move = session.to_move();
    let ticket = session.ticket();

    assert_eq!(
        session.apply_move(Mark::O, 4),
        Err(MoveError::SquareOccupied(Position::Center))
    );
    assert_eq!(session.apply_move(Mark::X, 0), Err(MoveError::WrongTurn(Mark::X)));
    assert_eq!(session.apply_move(Mark::O, 9), Err(MoveError::OutOfRange(9)));

    assert_eq!(session.board(), &board);
    assert_eq!(session.to_move(), to_move);
    assert_eq!(session.ticket(), ticket);
    assert_eq!(session.history().len(), 1);
}

#[test]
fn test_move_before_start_is_rejected() {
    let mut session = GameSession::new();
    assert_eq!(session.apply_move(Mark::X, 0), Err(MoveError::NoRound));
    assert_eq!(session.board().occupied_count(), 0);
}

#[test]
fn test_top_row_win_scenario() {
    // X holds 0 and 1, O holds 3 and 8; X completes the top row at 2.
    let mut session = started(GameMode::TwoPlayer);
    play(&mut session, &[0, 3, 1, 8]);
    assert_eq!(session.board().get(Position::MiddleLeft), Square::Occupied(Mark::O));

    let outcome = session.apply_move(Mark::X, 2).unwrap().expect("X wins");
    let line = outcome.winning_line().unwrap();
    assert_eq!(line.mark, Mark::X);
    assert_eq!(line.indices(), [0, 1, 2]);
    assert_eq!(session.phase(), Phase::RoundOver(outcome));
    assert_eq!(session.outcome(), Some(outcome));
}

#[test]
fn test_winner_score_increments_once() {
    let mut session = started(GameMode::TwoPlayer);
    // X: 0, 1, 2  O: 3, 4
    let outcome = play(&mut session, &[0, 3, 1, 4, 2]).unwrap();
    assert_eq!(outcome.winner(), Some(Mark::X));
    assert_eq!(session.player(Mark::X).unwrap().score(), 1);
    assert_eq!(session.player(Mark::O).unwrap().score(), 0);
}

#[test]
fn test_no_moves_after_round_over() {
    let mut session = started(GameMode::TwoPlayer);
    play(&mut session, &[0, 3, 1, 4, 2]);
    let board = *session.board();

    assert_eq!(session.apply_move(session.to_move(), 8), Err(MoveError::RoundOver));
    assert_eq!(session.board(), &board);
    assert_eq!(session.player(Mark::X).unwrap().score(), 1);
}

#[test]
fn test_draw_scores_nobody() {
    let mut session = started(GameMode::TwoPlayer);
    // X O X / X O O / O X X
    let outcome = play(&mut session, &[0, 1, 2, 4, 3, 5, 7, 6, 8]).unwrap();
    assert_eq!(outcome, Outcome::Draw);
    assert!(tictactoe_oracle::rules::is_draw(session.board()));
    assert_eq!(session.player(Mark::X).unwrap().score(), 0);
    assert_eq!(session.player(Mark::O).unwrap().score(), 0);
}

#[test]
fn test_play_again_keeps_scores_and_resets_board() {
    let mut session = started(GameMode::TwoPlayer);
    assert_eq!(session.play_again(), Err(SessionError::RoundNotOver));

    play(&mut session, &[0, 3, 1, 4, 2]);
    session.play_again().unwrap();

    assert_eq!(session.phase(), Phase::InRound);
    assert_eq!(session.to_move(), Mark::X);
    assert_eq!(session.board().occupied_count(), 0);
    assert!(session.history().is_empty());
    assert_eq!(session.player(Mark::X).unwrap().score(), 1);

    // O wins the second round: O holds 3, 4, 5.
    play(&mut session, &[0, 3, 1, 4, 8, 5]);
    assert_eq!(session.player(Mark::X).unwrap().score(), 1);
    assert_eq!(session.player(Mark::O).unwrap().score(), 1);
}

#[test]
fn test_new_game_discards_players_and_scores() {
    let mut session = started(GameMode::SinglePlayer);
    play(&mut session, &[0, 3, 1, 4, 2]);
    session.new_game();

    assert_eq!(session.phase(), Phase::AwaitingSetup);
    assert!(session.players().is_none());
    assert!(session.mode().is_none());
    assert_eq!(session.board().occupied_count(), 0);
    assert_eq!(session.play_again(), Err(SessionError::NotStarted));

    session.start(GameMode::TwoPlayer, "", "").unwrap();
    assert_eq!(session.player(Mark::X).unwrap().score(), 0);
}

#[test]
fn test_ai_turn_only_in_single_player_for_o() {
    let mut session = started(GameMode::SinglePlayer);
    assert!(!session.is_ai_turn());
    session.apply_move(Mark::X, 4).unwrap();
    assert!(session.is_ai_turn());

    let mut session = started(GameMode::TwoPlayer);
    session.apply_move(Mark::X, 4).unwrap();
    assert!(!session.is_ai_turn());
}

#[test]
fn test_tickets_are_invalidated_by_any_change() {
    let mut session = started(GameMode::SinglePlayer);
    session.apply_move(Mark::X, 4).unwrap();
    let ticket = session.ticket().unwrap();
    assert!(session.is_current(&ticket));

    let mut moved = session.clone();
    moved.apply_move(Mark::O, 0).unwrap();
    assert!(!moved.is_current(&ticket));

    let mut reset = session.clone();
    reset.new_game();
    assert!(!reset.is_current(&ticket));
    reset.start(GameMode::SinglePlayer, "", "").unwrap();
    reset.apply_move(Mark::X, 4).unwrap();
    assert!(!reset.is_current(&ticket));
}
