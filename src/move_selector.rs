//! AI turn handler: consult the oracle, validate, fall back to a random square.

use crate::oracle::{MoveOracle, OracleError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tictactoe_rules::{Board, Mark, Position};
use tracing::{info, instrument, warn};

/// Why the oracle's answer was not used.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum FallbackReason {
    /// The oracle failed to answer or answered in the wrong shape.
    #[display("{_0}")]
    Oracle(OracleError),
    /// The oracle did not answer in time.
    #[display("Oracle timed out after {}ms", _0.as_millis())]
    TimedOut(Duration),
    /// The suggested index is not a square.
    #[display("Suggested move {_0} is off the board")]
    OutOfRange(i64),
    /// The suggested square is taken.
    #[display("Suggested square {_0} is occupied")]
    Occupied(Position),
}

/// Where a selected move came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionSource {
    /// The oracle's suggestion was valid.
    Oracle,
    /// A uniformly random empty square replaced the oracle's answer.
    Fallback(FallbackReason),
}

/// A move chosen for the AI, always on a square that was empty at call time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// The chosen square.
    pub position: Position,
    /// How it was chosen.
    pub source: SelectionSource,
}

impl Selection {
    /// True if the fallback chose the square.
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, SelectionSource::Fallback(_))
    }
}

/// Chooses the AI's move from an oracle, with a random fallback.
///
/// Cheap to clone; clones share the oracle and the random generator.
#[derive(Clone)]
pub struct MoveSelector {
    oracle: Arc<dyn MoveOracle>,
    timeout: Duration,
    rng: Arc<Mutex<StdRng>>,
}

impl std::fmt::Debug for MoveSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoveSelector")
            .field("oracle", &self.oracle.name())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl MoveSelector {
    /// Creates a selector with an entropy-seeded generator.
    pub fn new(oracle: Arc<dyn MoveOracle>, timeout: Duration) -> Self {
        Self::with_rng(oracle, timeout, StdRng::from_rng(&mut rand::rng()))
    }

    /// Creates a selector with a seeded generator, for reproducible fallbacks.
    pub fn with_seed(oracle: Arc<dyn MoveOracle>, timeout: Duration, seed: u64) -> Self {
        Self::with_rng(oracle, timeout, StdRng::seed_from_u64(seed))
    }

    fn with_rng(oracle: Arc<dyn MoveOracle>, timeout: Duration, rng: StdRng) -> Self {
        Self {
            oracle,
            timeout,
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    /// Name of the underlying oracle.
    pub fn oracle_name(&self) -> &str {
        self.oracle.name()
    }

    /// Makes one oracle request for `mark` and returns a square that is empty on `board`.
    ///
    /// # Panics
    ///
    /// Panics if the oracle's answer is unusable and `board` has no empty
    /// square. Callers only invoke this during an undecided round, where an
    /// empty square always exists.
    #[instrument(skip(self, board), fields(oracle = %self.oracle.name()))]
    pub async fn select(&self, board: &Board, mark: Mark) -> Selection {
        let reply = tokio::time::timeout(self.timeout, self.oracle.suggest_move(board, mark)).await;

        let reason = match reply {
            Ok(Ok(index)) => match Position::from_signed(index) {
                Some(position) if board.is_empty(position) => {
                    info!(%position, "Oracle move accepted");
                    return Selection {
                        position,
                        source: SelectionSource::Oracle,
                    };
                }
                Some(position) => FallbackReason::Occupied(position),
                None => FallbackReason::OutOfRange(index),
            },
            Ok(Err(error)) => FallbackReason::Oracle(error),
            Err(_) => FallbackReason::TimedOut(self.timeout),
        };

        let position = self.random_empty(board);
        warn!(%reason, %position, "Oracle answer unusable, using random fallback");
        Selection {
            position,
            source: SelectionSource::Fallback(reason),
        }
    }

    fn random_empty(&self, board: &Board) -> Position {
        // A poisoned lock only means another fallback panicked mid-draw; the
        // generator state is still valid.
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        random_empty_position(board, &mut *rng)
    }
}

/// Picks a uniformly random empty square.
///
/// # Panics
///
/// Panics if the board is full: the round would already be over.
pub fn random_empty_position<R: Rng>(board: &Board, rng: &mut R) -> Position {
    let available = board.empty_positions();
    assert!(
        !available.is_empty(),
        "random fallback invoked on a full board"
    );
    available[rng.random_range(0..available.len())]
}
