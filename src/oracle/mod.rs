//! Move oracles: external services that suggest the AI's next move.
//!
//! An oracle only reports what the service said. Range and vacancy checks,
//! timeouts and the random fallback are the [`MoveSelector`](crate::MoveSelector)'s job.

mod llm;

pub use llm::{LlmOracle, MOVE_REPLY_DESCRIPTION};

use tictactoe_rules::{Board, Mark};
use tracing::{debug, instrument};

/// Source of suggested moves for the AI-controlled mark.
#[async_trait::async_trait]
pub trait MoveOracle: Send + Sync {
    /// Asks for a move for `mark` on `board`.
    ///
    /// Returns the raw `move` integer from the reply, which may be out of
    /// range or point at an occupied square.
    async fn suggest_move(&self, board: &Board, mark: Mark) -> Result<i64, OracleError>;

    /// Returns the oracle's display name.
    fn name(&self) -> &str;
}

/// Why an oracle produced no move.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum OracleError {
    /// The request could not be completed.
    #[display("Oracle transport error: {_0}")]
    Transport(String),
    /// The reply was not `{"move": <integer>}`.
    #[display("Malformed oracle reply: {_0}")]
    Malformed(String),
    /// No oracle is configured.
    #[display("Oracle unavailable: {_0}")]
    Unavailable(String),
}

impl std::error::Error for OracleError {}

/// Oracle used when no API key is configured.
///
/// Every request fails, so each AI turn is decided by the random fallback.
#[derive(Debug, Clone)]
pub struct OfflineOracle {
    reason: String,
}

impl OfflineOracle {
    /// Creates an offline oracle that reports `reason` on every request.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait::async_trait]
impl MoveOracle for OfflineOracle {
    async fn suggest_move(&self, _board: &Board, _mark: Mark) -> Result<i64, OracleError> {
        Err(OracleError::Unavailable(self.reason.clone()))
    }

    fn name(&self) -> &str {
        "offline"
    }
}

/// Extracts the `move` integer from a reply such as `{"move": 4}`.
///
/// Surrounding whitespace and a Markdown code fence are tolerated. Integral
/// floats (`4.0`) are accepted; anything else is [`OracleError::Malformed`].
#[instrument(level = "debug")]
pub fn parse_move_reply(text: &str) -> Result<i64, OracleError> {
    let body = strip_code_fence(text.trim());
    if body.is_empty() {
        return Err(OracleError::Malformed("empty reply".to_string()));
    }

    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| OracleError::Malformed(format!("not JSON: {}", e)))?;
    let field = value
        .get("move")
        .ok_or_else(|| OracleError::Malformed(format!("no `move` field in {}", value)))?;

    let index = field
        .as_i64()
        .or_else(|| {
            field
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < 1e15)
                .map(|f| f as i64)
        })
        .ok_or_else(|| OracleError::Malformed(format!("`move` is not an integer: {}", field)))?;

    debug!(index, "Parsed oracle reply");
    Ok(index)
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_plain_reply() {
        assert_eq!(parse_move_reply(r#"{"move": 4}"#), Ok(4));
        assert_eq!(parse_move_reply("  {\"move\":0}\n"), Ok(0));
    }

    #[test]
    fn test_parses_fenced_reply() {
        assert_eq!(parse_move_reply("```json\n{\"move\": 7}\n```"), Ok(7));
        assert_eq!(parse_move_reply("```\n{\"move\": 2}\n```"), Ok(2));
    }

    #[test]
    fn test_out_of_range_is_reported_not_rejected() {
        assert_eq!(parse_move_reply(r#"{"move": 99}"#), Ok(99));
        assert_eq!(parse_move_reply(r#"{"move": -1}"#), Ok(-1));
    }

    #[test]
    fn test_integral_float_accepted() {
        assert_eq!(parse_move_reply(r#"{"move": 3.0}"#), Ok(3));
        assert!(parse_move_reply(r#"{"move": 3.5}"#).is_err());
    }

    #[test]
    fn test_malformed_replies() {
        for reply in [
            "",
            "   ",
            "move 4",
            r#"{"move": "x"}"#,
            r#"{"move": null}"#,
            r#"{"position": 4}"#,
            "[4]",
        ] {
            assert!(
                matches!(parse_move_reply(reply), Err(OracleError::Malformed(_))),
                "accepted {reply:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_offline_oracle_always_fails() {
        let oracle = OfflineOracle::new("no key");
        let result = oracle.suggest_move(&Board::new(), Mark::O).await;
        assert!(matches!(result, Err(OracleError::Unavailable(_))));
    }
}
