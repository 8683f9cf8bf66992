//! Game session: players, scores and the round state machine.
//!
//! A [`GameSession`] moves through [`Phase::AwaitingSetup`] →
//! [`Phase::InRound`] → [`Phase::RoundOver`] and back into a round until
//! [`GameSession::new_game`] discards the players.

use serde::{Deserialize, Serialize};
use tictactoe_rules::{Board, Mark, Move, MoveError, Outcome, Position, Square, rules};
use tracing::{debug, info, instrument, warn};

/// Name used for X when none is entered.
pub const DEFAULT_PLAYER_ONE: &str = "Player 1";
/// Name used for O in two-player mode when none is entered.
pub const DEFAULT_PLAYER_TWO: &str = "Player 2";
/// Name used for the AI opponent when none is entered.
pub const DEFAULT_AI_NAME: &str = "Gemini AI";

/// How the two marks are controlled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// Human plays X, the AI oracle plays O.
    #[display("Single player")]
    SinglePlayer,
    /// Two humans share the board.
    #[display("Two players")]
    TwoPlayer,
}

/// A named player and the number of rounds they have won.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct Player {
    name: String,
    #[new(default)]
    score: u32,
}

impl Player {
    /// Player's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rounds won this session.
    pub fn score(&self) -> u32 {
        self.score
    }
}

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// No players yet.
    AwaitingSetup,
    /// A round is being played.
    InRound,
    /// The round ended; the board is kept until the next round.
    RoundOver(Outcome),
}

/// Identifies one specific turn of one specific round.
///
/// Every accepted move, new round and new game invalidates outstanding
/// tickets, which is how late oracle replies are recognised as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TurnTicket {
    generation: u64,
    round: u64,
    ply: usize,
}

/// Lifecycle errors for session-level operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum SessionError {
    /// `start` was called while a game is already set up.
    #[display("A game is already in progress; start a new game first")]
    AlreadyStarted,
    /// The operation needs players but none are set up.
    #[display("No game has been started")]
    NotStarted,
    /// `play_again` was called before the round finished.
    #[display("The current round is still being played")]
    RoundNotOver,
}

impl std::error::Error for SessionError {}

/// The explicitly owned state of one game: mode, players, board and scores.
#[derive(Debug, Clone)]
pub struct GameSession {
    mode: Option<GameMode>,
    players: Option<[Player; 2]>,
    board: Board,
    to_move: Mark,
    phase: Phase,
    history: Vec<Move>,
    generation: u64,
    round: u64,
}

impl GameSession {
    /// Creates a session awaiting setup.
    #[instrument]
    pub fn new() -> Self {
        debug!("Creating game session");
        Self {
            mode: None,
            players: None,
            board: Board::new(),
            to_move: Mark::X,
            phase: Phase::AwaitingSetup,
            history: Vec::new(),
            generation: 0,
            round: 0,
        }
    }

    /// Starts a game: registers both players with zero scores and opens the first round.
    ///
    /// Empty names fall back to the defaults for the mode.
    #[instrument(skip(self))]
    pub fn start(&mut self, mode: GameMode, name_x: &str, name_o: &str) -> Result<(), SessionError> {
        if self.phase != Phase::AwaitingSetup {
            warn!(phase = ?self.phase, "Start requested while a game is set up");
            return Err(SessionError::AlreadyStarted);
        }

        let name_x = non_empty_or(name_x, DEFAULT_PLAYER_ONE);
        let name_o = non_empty_or(
            name_o,
            match mode {
                GameMode::SinglePlayer => DEFAULT_AI_NAME,
                GameMode::TwoPlayer => DEFAULT_PLAYER_TWO,
            },
        );

        info!(%mode, player_x = %name_x, player_o = %name_o, "Starting game");
        self.mode = Some(mode);
        self.players = Some([Player::new(name_x), Player::new(name_o)]);
        self.generation += 1;
        self.reset_round();
        Ok(())
    }

    /// Places `actor`'s mark at board index `index`.
    ///
    /// On success returns the round outcome if the move ended the round. The
    /// winner's score is incremented by one; a draw changes no score. A
    /// rejected move leaves the session untouched.
    #[instrument(skip(self), fields(phase = ?self.phase, to_move = %self.to_move))]
    pub fn apply_move(&mut self, actor: Mark, index: usize) -> Result<Option<Outcome>, MoveError> {
        match self.phase {
            Phase::AwaitingSetup => return Err(MoveError::NoRound),
            Phase::RoundOver(_) => return Err(MoveError::RoundOver),
            Phase::InRound => {}
        }
        let position = Position::from_index(index).ok_or(MoveError::OutOfRange(index))?;
        if actor != self.to_move {
            debug!("Move out of turn rejected");
            return Err(MoveError::WrongTurn(actor));
        }
        if !self.board.is_empty(position) {
            debug!(%position, "Move onto occupied square rejected");
            return Err(MoveError::SquareOccupied(position));
        }

        self.board.set(position, Square::Occupied(actor));
        self.history.push(Move::new(actor, position));
        self.to_move = actor.opponent();

        let outcome = rules::evaluate(&self.board);
        if let Some(outcome) = outcome {
            if let Some(winner) = outcome.winner() {
                if let Some(player) = self.player_mut(winner) {
                    player.score += 1;
                }
            }
            info!(%outcome, "Round over");
            self.phase = Phase::RoundOver(outcome);
        } else {
            debug!(%position, mark = %actor, "Move applied");
        }
        Ok(outcome)
    }

    /// Clears the board for another round, keeping players and scores.
    #[instrument(skip(self))]
    pub fn play_again(&mut self) -> Result<(), SessionError> {
        match self.phase {
            Phase::RoundOver(_) => {
                info!(round = self.round + 1, "Starting next round");
                self.reset_round();
                Ok(())
            }
            Phase::InRound => Err(SessionError::RoundNotOver),
            Phase::AwaitingSetup => Err(SessionError::NotStarted),
        }
    }

    /// Discards players and scores and returns to setup. Valid in any phase.
    #[instrument(skip(self))]
    pub fn new_game(&mut self) {
        info!("New game requested, discarding players and scores");
        self.mode = None;
        self.players = None;
        self.board = Board::new();
        self.to_move = Mark::X;
        self.history.clear();
        self.phase = Phase::AwaitingSetup;
        self.generation += 1;
    }

    fn reset_round(&mut self) {
        self.board = Board::new();
        self.to_move = Mark::X;
        self.history.clear();
        self.phase = Phase::InRound;
        self.round += 1;
    }

    fn player_mut(&mut self, mark: Mark) -> Option<&mut Player> {
        self.players.as_mut().map(|players| &mut players[mark_slot(mark)])
    }

    /// Current game mode, if a game is set up.
    pub fn mode(&self) -> Option<GameMode> {
        self.mode
    }

    /// Both players (X first), if a game is set up.
    pub fn players(&self) -> Option<&[Player; 2]> {
        self.players.as_ref()
    }

    /// The player controlling `mark`.
    pub fn player(&self, mark: Mark) -> Option<&Player> {
        self.players.as_ref().map(|players| &players[mark_slot(mark)])
    }

    /// The current board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Mark whose turn it is.
    pub fn to_move(&self) -> Mark {
        self.to_move
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Moves of the current round in order.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Result of the finished round, if any.
    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            Phase::RoundOver(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Mark played by the AI, in single-player mode.
    pub fn ai_mark(&self) -> Option<Mark> {
        match self.mode {
            Some(GameMode::SinglePlayer) => Some(Mark::O),
            _ => None,
        }
    }

    /// True when the AI should move next.
    pub fn is_ai_turn(&self) -> bool {
        self.phase == Phase::InRound && self.ai_mark() == Some(self.to_move)
    }

    /// Snapshot of the current turn, or `None` outside a round.
    pub fn ticket(&self) -> Option<TurnTicket> {
        (self.phase == Phase::InRound).then(|| TurnTicket {
            generation: self.generation,
            round: self.round,
            ply: self.history.len(),
        })
    }

    /// Checks that `ticket` still names the current turn.
    pub fn is_current(&self, ticket: &TurnTicket) -> bool {
        self.ticket().as_ref() == Some(ticket)
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

fn mark_slot(mark: Mark) -> usize {
    match mark {
        Mark::X => 0,
        Mark::O => 1,
    }
}

fn non_empty_or(name: &str, default: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}
