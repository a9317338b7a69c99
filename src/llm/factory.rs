//! LLM client factory.
//!
//! Centralizes provider-specific logic for creating LLM clients.

use crate::config::LlmConfig;
use crate::error::{Result, SqlGateError};
use crate::llm::{LlmClient, LlmProvider, MockLlmClient, OpenAiClient, OpenAiConfig};

/// Environment variable holding the Groq API key.
pub const GROQ_API_KEY_ENV: &str = "GROQ_API_KEY";

/// Environment variable holding the OpenAI API key.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Creates an LLM client for the given provider.
///
/// Model, temperature and timeout come from `config`. API keys are read from
/// `GROQ_API_KEY` or `OPENAI_API_KEY` and never from the config file.
pub fn create_client(provider: LlmProvider, config: &LlmConfig) -> Result<Box<dyn LlmClient>> {
    match provider {
        LlmProvider::Groq => {
            let key = api_key_from_env(GROQ_API_KEY_ENV)?;
            let config = OpenAiConfig::groq(key, &config.model)
                .with_temperature(config.temperature)
                .with_timeout(config.timeout_secs);
            Ok(Box::new(OpenAiClient::new(config)?))
        }
        LlmProvider::OpenAi => {
            let key = api_key_from_env(OPENAI_API_KEY_ENV)?;
            let config = OpenAiConfig::new(key, &config.model)
                .with_temperature(config.temperature)
                .with_timeout(config.timeout_secs);
            Ok(Box::new(OpenAiClient::new(config)?))
        }
        LlmProvider::Mock => Ok(Box::new(MockLlmClient::new())),
    }
}

fn api_key_from_env(var: &str) -> Result<String> {
    std::env::var(var)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| SqlGateError::config(format!("No API key configured. Set {}.", var)))
}
