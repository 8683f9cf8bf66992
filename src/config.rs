//! Game configuration loaded from TOML.

use crate::llm_client::{LlmConfig, LlmProvider};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Runtime configuration: oracle provider, timing and UI defaults.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct GameConfig {
    /// LLM provider (gemini, openai or anthropic).
    #[serde(default = "default_provider")]
    llm_provider: LlmProvider,

    /// LLM model name (e.g., "gemini-2.5-flash", "gpt-4o-mini").
    /// The provider's default model when unset.
    #[serde(default)]
    llm_model: Option<String>,

    /// Maximum tokens for LLM responses.
    #[serde(default = "default_max_tokens")]
    llm_max_tokens: u32,

    /// Endpoint root override; the provider default when unset.
    #[serde(default)]
    llm_base_url: Option<String>,

    /// Seconds to wait for the oracle before falling back.
    #[serde(default = "default_oracle_timeout_secs")]
    oracle_timeout_secs: u64,

    /// Pause before the AI's request so its move doesn't land instantly.
    #[serde(default = "default_think_delay_ms")]
    think_delay_ms: u64,

    /// Name shown for the AI opponent.
    #[serde(default = "default_ai_name")]
    ai_name: String,

    /// Log file used while the terminal UI owns the screen.
    #[serde(default = "default_log_file")]
    log_file: String,
}

fn default_provider() -> LlmProvider {
    LlmProvider::Gemini
}

fn default_max_tokens() -> u32 {
    64
}

fn default_oracle_timeout_secs() -> u64 {
    10
}

fn default_think_delay_ms() -> u64 {
    500
}

fn default_ai_name() -> String {
    crate::session::DEFAULT_AI_NAME.to_string()
}

fn default_log_file() -> String {
    "tictactoe_oracle.log".to_string()
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            llm_provider: default_provider(),
            llm_model: None,
            llm_max_tokens: default_max_tokens(),
            llm_base_url: None,
            oracle_timeout_secs: default_oracle_timeout_secs(),
            think_delay_ms: default_think_delay_ms(),
            ai_name: default_ai_name(),
            log_file: default_log_file(),
        }
    }
}

impl GameConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(provider = %config.llm_provider, model = config.model(), "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))
    }

    /// Loads `path` if it exists, otherwise returns the defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            debug!("No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Model to request: `llm_model`, or the provider's default.
    pub fn model(&self) -> &str {
        self.llm_model
            .as_deref()
            .unwrap_or_else(|| self.llm_provider.default_model())
    }

    /// Oracle timeout as a duration.
    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_secs(self.oracle_timeout_secs)
    }

    /// Think delay as a duration.
    pub fn think_delay(&self) -> Duration {
        Duration::from_millis(self.think_delay_ms)
    }

    /// Creates LLM configuration from the environment.
    ///
    /// Returns `None` when none of the provider's API key variables is set.
    #[instrument(skip(self), fields(provider = %self.llm_provider, model = self.model()))]
    pub fn create_llm_config(&self) -> Option<LlmConfig> {
        let api_key = self
            .llm_provider
            .api_key_vars()
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|key| !key.trim().is_empty()));

        let Some(api_key) = api_key else {
            warn!(
                vars = ?self.llm_provider.api_key_vars(),
                "No API key set, the AI will play random moves"
            );
            return None;
        };

        let config = LlmConfig::new(
            self.llm_provider,
            api_key,
            self.model().to_string(),
            self.llm_max_tokens,
        );
        Some(match &self.llm_base_url {
            Some(base_url) => config.with_base_url(base_url.as_str()),
            None => config,
        })
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
