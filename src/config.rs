//! Server configuration.
//!
//! Loaded from an optional TOML file; every field has a default. API keys never
//! live in the file: they come from the environment (a `.env` file is loaded
//! at startup).

use crate::games::bytenames::CluePolicy;
use crate::llm_client::{LlmConfig, LlmProvider};
use crate::words::Difficulty;
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Environment variable overriding the listen port.
pub const PORT_VAR: &str = "PORT";

/// Top-level server configuration.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    host: String,

    /// Port to bind.
    port: u16,

    /// Static word list for new boards.
    difficulty: Difficulty,

    /// Whether clue tokens may repeat within a game.
    clue_policy: CluePolicy,

    /// Seed for board and clue randomness; drawn from entropy when absent.
    seed: Option<u64>,

    /// Alternative classifier tables.
    lexicon_path: Option<PathBuf>,

    /// Generative spymaster and word source settings.
    llm: Option<LlmSettings>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            difficulty: Difficulty::default(),
            clue_policy: CluePolicy::default(),
            seed: None,
            lexicon_path: None,
            llm: None,
        }
    }
}

/// The `[llm]` table.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Provider (openai or anthropic).
    #[serde(default)]
    provider: LlmProvider,

    /// Model name; the provider's default when absent.
    #[serde(default)]
    model: Option<String>,

    /// Sampling temperature for clues.
    #[serde(default = "default_temperature")]
    temperature: f32,

    /// Completion token cap for clues.
    #[serde(default = "default_max_tokens")]
    max_tokens: u32,

    /// Seconds to wait for a clue before using the rules.
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,

    /// Whether boards use generated words.
    #[serde(default)]
    generate_words: bool,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    100
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            model: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            generate_words: false,
        }
    }
}

impl LlmSettings {
    /// Model to request, falling back to the provider default.
    pub fn model_name(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| self.provider.default_model().to_string())
    }

    /// Supplier timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Client configuration with the API key taken from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the provider's key variable is not set.
    #[instrument(skip(self), fields(provider = %self.provider))]
    pub fn create_llm_config(&self) -> Result<LlmConfig, ConfigError> {
        LlmConfig::from_env(
            self.provider,
            self.model_name(),
            self.temperature,
            self.max_tokens,
        )
        .map_err(|e| ConfigError::new(e.message))
    }
}

impl ServerConfig {
    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on malformed TOML.
    #[instrument(skip(content), fields(len = content.len()))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(host = %config.host, port = config.port, llm = config.llm.is_some(), "Config loaded");
        Ok(config)
    }

    /// Loads from `path` when given, defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a given file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                debug!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Applies a `PORT`-style override.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the value is not a port number.
    pub fn with_port_override(mut self, value: Option<&str>) -> Result<Self, ConfigError> {
        if let Some(value) = value {
            self.port = value
                .trim()
                .parse()
                .map_err(|e| ConfigError::new(format!("Invalid {} {:?}: {}", PORT_VAR, value, e)))?;
            debug!(port = self.port, "Port overridden");
        }
        Ok(self)
    }

    /// Replaces the bind address.
    pub fn with_host(mut self, host: String) -> Self {
        self.host = host;
        self
    }

    /// Replaces the bind port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Replaces the difficulty.
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Replaces the seed.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Replaces the clue policy.
    pub fn with_clue_policy(mut self, clue_policy: CluePolicy) -> Self {
        self.clue_policy = clue_policy;
        self
    }

    /// Replaces the LLM settings.
    pub fn with_llm(mut self, llm: Option<LlmSettings>) -> Self {
        self.llm = llm;
        self
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
