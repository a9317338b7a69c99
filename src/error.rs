//! Error types for sqlgate.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Generic message shown to callers when an internal fault occurs.
const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred while processing the query.";

/// Main error type for sqlgate operations.
#[derive(Error, Debug)]
pub enum SqlGateError {
    /// Candidate statement starts with a verb outside the allow-list,
    /// or otherwise attempts something other than a single read.
    #[error("Policy violation: {0}")]
    PolicyViolation(String),

    /// Candidate statement is structurally invalid (missing FROM, empty, etc.)
    #[error("Malformed statement: {0}")]
    MalformedStatement(String),

    /// A validated statement failed inside the store (unknown column, timeout, etc.)
    #[error("Execution error: {0}")]
    Execution(String),

    /// The store returned rows without a projection, or some other result shape
    /// that cannot be rendered.
    #[error("Data format mismatch: {0}")]
    DataFormat(String),

    /// The natural-language input was rejected before reaching the pipeline.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Database connection errors (missing file, locked database, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// LLM API errors (rate limits, auth, timeouts, etc.)
    #[error("LLM error: {0}")]
    Llm(String),

    /// Configuration errors (invalid config file, bad allow-list, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SqlGateError {
    /// Creates a policy violation error with the given message.
    pub fn policy(msg: impl Into<String>) -> Self {
        Self::PolicyViolation(msg.into())
    }

    /// Creates a malformed statement error with the given message.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedStatement(msg.into())
    }

    /// Creates an execution error with the given message.
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Creates a data format mismatch error with the given message.
    pub fn data_format(msg: impl Into<String>) -> Self {
        Self::DataFormat(msg.into())
    }

    /// Creates an invalid input error with the given message.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates an LLM error with the given message.
    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::PolicyViolation(_) => "Policy Violation",
            Self::MalformedStatement(_) => "Malformed Statement",
            Self::Execution(_) => "Execution Error",
            Self::DataFormat(_) => "Internal Error",
            Self::InvalidInput(_) => "Invalid Input",
            Self::Connection(_) => "Connection Error",
            Self::Llm(_) => "LLM Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Returns true if the error was caused by the request itself
    /// (bad question, disallowed or broken SQL) rather than by a fault
    /// in the gateway or its collaborators.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::PolicyViolation(_)
                | Self::MalformedStatement(_)
                | Self::Execution(_)
                | Self::InvalidInput(_)
        )
    }

    /// Returns the message that is safe to hand back to a caller.
    ///
    /// Internal faults are collapsed into a generic message so that result
    /// shapes and invariants are not leaked.
    pub fn public_message(&self) -> String {
        match self {
            Self::DataFormat(_) | Self::Internal(_) => INTERNAL_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

/// Result type alias using SqlGateError.
pub type Result<T> = std::result::Result<T, SqlGateError>;
