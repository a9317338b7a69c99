//! Command-line argument parsing for sqlgate.

use crate::config::Config;
use crate::error::Result;
use crate::llm::LlmProvider;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Ask questions of a SQLite database in plain language.
#[derive(Parser, Debug)]
#[command(name = "sqlgate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the SQLite database file (overrides config and DATABASE_PATH)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Path to config file (default: ~/.config/sqlgate/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// LLM provider: groq, openai or mock (overrides config)
    #[arg(long, global = true, value_name = "PROVIDER")]
    pub llm: Option<LlmProvider>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Print only the rendered table markup instead of the JSON response
    #[arg(long, global = true)]
    pub html: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Translate a question to SQL, run it and render the result
    Ask {
        /// The question, in plain language
        question: String,
    },
    /// Validate, run and render a hand-written statement
    Sql {
        /// The statement to run
        statement: String,
    },
    /// Print the database schema
    Schema {
        /// Print the schema as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create the demo e-commerce database
    Seed {
        /// Replace the database file if it already exists
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path, using the default if not specified.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Loads configuration with precedence: CLI > environment > file > defaults.
    pub fn resolve_config(&self) -> Result<Config> {
        let mut config = Config::load_from_file(&self.config_path())?;
        config.apply_env_overrides();
        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut Config) {
        if let Some(db) = &self.db {
            config.database.path = db.clone();
        }
        if let Some(provider) = self.llm {
            config.llm.provider = provider.as_str().to_string();
        }
    }
}
