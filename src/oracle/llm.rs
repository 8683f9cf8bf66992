//! Oracle backed by a generative-language API.

use super::{MoveOracle, OracleError, parse_move_reply};
use crate::llm_client::LlmClient;
use tictactoe_rules::{Board, Mark};
use tracing::{debug, instrument, warn};

/// Description of the `move` field sent with every request.
pub const MOVE_REPLY_DESCRIPTION: &str = "The index (0-8) of the chosen empty square.";

const SYSTEM_PROMPT: &str = "You are an expert Tic-Tac-Toe player. \
Reply only with a JSON object of the form {\"move\": <integer>}.";

/// Asks an LLM for the next move.
#[derive(Debug, Clone)]
pub struct LlmOracle {
    client: LlmClient,
    name: String,
}

impl LlmOracle {
    /// Creates an oracle over an LLM client.
    pub fn new(client: LlmClient) -> Self {
        let name = format!(
            "{}/{}",
            client.config().provider(),
            client.config().model()
        );
        Self { client, name }
    }

    /// Schema of the expected reply: an object with a required integer `move`.
    pub fn response_schema() -> serde_json::Value {
        serde_json::json!({
            "type": "OBJECT",
            "properties": {
                "move": {
                    "type": "INTEGER",
                    "description": MOVE_REPLY_DESCRIPTION,
                }
            },
            "required": ["move"],
        })
    }

    /// Builds the user message describing the board and the reply format.
    pub fn prompt(board: &Board, mark: Mark) -> String {
        let cells = serde_json::to_string(board).unwrap_or_else(|_| "[]".to_string());
        format!(
            "You are playing as '{mark}'. The opponent is '{opponent}'.\n\
             The board is a 9-element array. Indices 0-8 map to the board positions like this:\n\
             0 | 1 | 2\n\
             -----------\n\
             3 | 4 | 5\n\
             -----------\n\
             6 | 7 | 8\n\n\
             The current board state is: {cells}.\n\
             'null' represents an empty square.\n\n\
             It is your turn. Your goal is to win, or if you cannot win, block the opponent or draw.\n\
             Your response must be a JSON object with a single key 'move', which is a number \
             from 0 to 8 representing the index of your chosen square. Only choose an empty square.",
            opponent = mark.opponent(),
        )
    }
}

#[async_trait::async_trait]
impl MoveOracle for LlmOracle {
    #[instrument(skip(self, board), fields(oracle = %self.name))]
    async fn suggest_move(&self, board: &Board, mark: Mark) -> Result<i64, OracleError> {
        let schema = Self::response_schema();
        let reply = self
            .client
            .generate(SYSTEM_PROMPT, &Self::prompt(board, mark), Some(&schema))
            .await
            .map_err(|e| {
                warn!(error = %e, "LLM request failed");
                OracleError::Transport(e.message)
            })?;

        debug!(reply = %reply, "LLM replied");
        parse_move_reply(&reply)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
