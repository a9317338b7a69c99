//! Configuration management for sqlgate.
//!
//! Handles loading configuration from TOML files and environment variables.
//! The loaded `Config` is built once at startup and passed by reference to
//! the components that need it.

use crate::error::{Result, SqlGateError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides `[database].path`.
pub const DATABASE_PATH_ENV: &str = "DATABASE_PATH";

/// Verbs that write to the database and can never be allow-listed.
const WRITE_VERBS: &[&str] = &[
    "INSERT", "UPDATE", "DELETE", "REPLACE", "UPSERT", "MERGE", "DROP", "ALTER", "CREATE",
    "TRUNCATE", "ATTACH", "DETACH", "VACUUM", "REINDEX", "GRANT", "REVOKE",
];

/// Main configuration structure for sqlgate.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Target database settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Statement policy settings.
    #[serde(default)]
    pub safety: SafetyConfig,

    /// LLM provider configuration.
    #[serde(default)]
    pub llm: LlmConfig,
}

/// Target database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    /// How long a connection waits on a locked database.
    #[serde(default = "default_busy_timeout_secs")]
    pub busy_timeout_secs: u64,

    /// Upper bound on a single statement's execution.
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("ecommerce.db")
}

fn default_busy_timeout_secs() -> u64 {
    20
}

fn default_query_timeout_secs() -> u64 {
    30
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            busy_timeout_secs: default_busy_timeout_secs(),
            query_timeout_secs: default_query_timeout_secs(),
        }
    }
}

/// Statement policy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyConfig {
    /// Leading SQL verbs permitted to reach execution.
    #[serde(default = "default_allowed_operations")]
    pub allowed_operations: Vec<String>,

    /// Maximum accepted length of a natural-language question, in characters.
    #[serde(default = "default_max_question_length")]
    pub max_question_length: usize,
}

fn default_allowed_operations() -> Vec<String> {
    vec!["SELECT".to_string(), "PRAGMA".to_string()]
}

fn default_max_question_length() -> usize {
    500
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            allowed_operations: default_allowed_operations(),
            max_question_length: default_max_question_length(),
        }
    }
}

/// LLM provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// LLM provider: "groq", "openai" or "mock".
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model name (e.g., "llama3-70b-8192", "gpt-4o").
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature. Low values keep generated SQL stable.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds.
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider() -> String {
    "groq".to_string()
}

fn default_model() -> String {
    "llama3-70b-8192".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_llm_timeout_secs() -> u64 {
    30
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sqlgate")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    ///
    /// A missing file is not an error; defaults are used instead.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| SqlGateError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| {
            SqlGateError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Applies environment variables on top of file values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var(DATABASE_PATH_ENV) {
            if !path.trim().is_empty() {
                self.database.path = PathBuf::from(path);
            }
        }
    }

    /// Checks settings that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.safety.allowed_operations.is_empty() {
            return Err(SqlGateError::config(
                "safety.allowed_operations must not be empty",
            ));
        }

        for op in &self.safety.allowed_operations {
            let verb = op.trim().to_uppercase();
            if verb.is_empty() || verb.contains(char::is_whitespace) {
                return Err(SqlGateError::config(format!(
                    "safety.allowed_operations contains an invalid verb: '{op}'"
                )));
            }
            if WRITE_VERBS.contains(&verb.as_str()) {
                return Err(SqlGateError::config(format!(
                    "safety.allowed_operations must only contain read-only verbs, found '{op}'"
                )));
            }
        }

        if self.safety.max_question_length == 0 {
            return Err(SqlGateError::config(
                "safety.max_question_length must be greater than zero",
            ));
        }

        if self.database.query_timeout_secs == 0 {
            return Err(SqlGateError::config(
                "database.query_timeout_secs must be greater than zero",
            ));
        }

        Ok(())
    }
}
