//! Coordinates human intents, the session and the asynchronous AI turn.
//!
//! The controller is owned by a single loop (the terminal UI, or a test). The
//! only suspending work, the oracle request, runs on a spawned task and comes
//! back through a channel tagged with the [`TurnTicket`] it was issued for.
//! A reply whose ticket no longer matches the session is dropped.

use crate::config::GameConfig;
use crate::llm_client::LlmClient;
use crate::move_selector::{MoveSelector, Selection};
use crate::oracle::{LlmOracle, MoveOracle, OfflineOracle};
use crate::session::{GameMode, GameSession, SessionError, TurnTicket};
use std::sync::Arc;
use std::time::Duration;
use tictactoe_rules::{Mark, MoveError, Outcome};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// A finished oracle request, delivered back to the controller.
#[derive(Debug, Clone)]
pub struct AiReply {
    ticket: TurnTicket,
    mark: Mark,
    selection: Selection,
}

impl AiReply {
    /// The move the selector chose.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }
}

/// What happened to an AI reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiTurn {
    /// The move was placed on the board.
    Applied {
        /// The chosen move and its source.
        selection: Selection,
        /// Set if the move ended the round.
        outcome: Option<Outcome>,
    },
    /// The reply belonged to a turn that no longer exists.
    Discarded,
}

/// Builds the selector described by `config`.
///
/// Without an API key the AI still plays, through the random fallback.
#[instrument(skip(config))]
pub fn selector_from_config(config: &GameConfig) -> MoveSelector {
    let oracle: Arc<dyn MoveOracle> = match config.create_llm_config() {
        Some(llm_config) => Arc::new(LlmOracle::new(LlmClient::new(llm_config))),
        None => Arc::new(OfflineOracle::new(format!(
            "no API key for {}",
            config.llm_provider()
        ))),
    };
    info!(oracle = oracle.name(), "Move oracle ready");
    MoveSelector::new(oracle, config.oracle_timeout())
}

/// Owns the game session and runs AI turns.
#[derive(Debug)]
pub struct GameController {
    session: GameSession,
    selector: MoveSelector,
    think_delay: Duration,
    ai_name: String,
    pending: Option<TurnTicket>,
    reply_tx: mpsc::UnboundedSender<AiReply>,
    reply_rx: mpsc::UnboundedReceiver<AiReply>,
}

impl GameController {
    /// Creates a controller awaiting game setup.
    pub fn new(selector: MoveSelector, think_delay: Duration, ai_name: impl Into<String>) -> Self {
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        Self {
            session: GameSession::new(),
            selector,
            think_delay,
            ai_name: ai_name.into(),
            pending: None,
            reply_tx,
            reply_rx,
        }
    }

    /// Creates a controller from configuration.
    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(
            selector_from_config(config),
            config.think_delay(),
            config.ai_name().as_str(),
        )
    }

    /// The current session.
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Name given to the AI when the O name is left empty.
    pub fn ai_name(&self) -> &str {
        &self.ai_name
    }

    /// True while an oracle request is outstanding.
    pub fn is_thinking(&self) -> bool {
        self.pending.is_some()
    }

    /// Starts a game. In single-player mode an empty O name becomes the AI's name.
    #[instrument(skip(self))]
    pub fn start(&mut self, mode: GameMode, name_x: &str, name_o: &str) -> Result<(), SessionError> {
        let name_o = match mode {
            GameMode::SinglePlayer if name_o.trim().is_empty() => self.ai_name.as_str(),
            _ => name_o,
        };
        self.session.start(mode, name_x, name_o)?;
        self.pending = None;
        Ok(())
    }

    /// Applies a move chosen by a human.
    ///
    /// In single-player mode the human always plays X; during O's turn the
    /// move is rejected as out of turn, and while the oracle is consulted it
    /// is rejected with [`MoveError::AiThinking`].
    #[instrument(skip(self))]
    pub fn human_move(&mut self, index: usize) -> Result<Option<Outcome>, MoveError> {
        if self.is_thinking() {
            debug!("Human move rejected while AI is thinking");
            return Err(MoveError::AiThinking);
        }
        let actor = match self.session.mode() {
            Some(GameMode::SinglePlayer) => Mark::X,
            Some(GameMode::TwoPlayer) => self.session.to_move(),
            None => return Err(MoveError::NoRound),
        };
        self.session.apply_move(actor, index)
    }

    /// Starts the next round, keeping scores.
    #[instrument(skip(self))]
    pub fn play_again(&mut self) -> Result<(), SessionError> {
        self.session.play_again()?;
        self.pending = None;
        Ok(())
    }

    /// Returns to setup, discarding players, scores and any outstanding AI request.
    #[instrument(skip(self))]
    pub fn new_game(&mut self) {
        if self.pending.take().is_some() {
            info!("Abandoning outstanding AI request");
        }
        self.session.new_game();
    }

    /// Issues the oracle request for the AI's turn, if one is due.
    ///
    /// Returns `false` when it is not the AI's turn or a request is already
    /// outstanding. Must be called from within a tokio runtime.
    #[instrument(skip(self))]
    pub fn request_ai_move(&mut self) -> bool {
        if self.pending.is_some() || !self.session.is_ai_turn() {
            return false;
        }
        let Some(ticket) = self.session.ticket() else {
            return false;
        };

        let mark = self.session.to_move();
        let board = *self.session.board();
        let selector = self.selector.clone();
        let reply_tx = self.reply_tx.clone();
        let think_delay = self.think_delay;

        info!(%mark, oracle = selector.oracle_name(), "Requesting AI move");
        tokio::spawn(async move {
            tokio::time::sleep(think_delay).await;
            let selection = selector.select(&board, mark).await;
            if reply_tx
                .send(AiReply {
                    ticket,
                    mark,
                    selection,
                })
                .is_err()
            {
                debug!("Controller gone, dropping AI reply");
            }
        });

        self.pending = Some(ticket);
        true
    }

    /// Applies an AI reply if its turn is still current, otherwise discards it.
    #[instrument(skip(self, reply), fields(position = %reply.selection.position))]
    pub fn handle_ai_reply(&mut self, reply: AiReply) -> AiTurn {
        if self.pending == Some(reply.ticket) {
            self.pending = None;
        }

        if !self.session.is_current(&reply.ticket) {
            info!("Discarding stale AI reply");
            return AiTurn::Discarded;
        }

        match self
            .session
            .apply_move(reply.mark, reply.selection.position.to_index())
        {
            Ok(outcome) => AiTurn::Applied {
                selection: reply.selection,
                outcome,
            },
            Err(error) => {
                warn!(%error, "Current-turn AI reply rejected by session");
                AiTurn::Discarded
            }
        }
    }

    /// Returns a delivered AI reply without waiting.
    pub fn try_recv_ai_reply(&mut self) -> Option<AiReply> {
        self.reply_rx.try_recv().ok()
    }

    /// Waits for the next AI reply.
    pub async fn next_ai_reply(&mut self) -> Option<AiReply> {
        self.reply_rx.recv().await
    }

    /// Requests the AI move if due and waits until it is applied.
    ///
    /// Stale replies received meanwhile are discarded. Returns `None` if no
    /// AI move was outstanding.
    pub async fn play_ai_turn(&mut self) -> Option<AiTurn> {
        self.request_ai_move();
        while self.pending.is_some() {
            let reply = self.reply_rx.recv().await?;
            let turn = self.handle_ai_reply(reply);
            if turn != AiTurn::Discarded {
                return Some(turn);
            }
        }
        None
    }
}
