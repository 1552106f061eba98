//! Error types for the relationship agent

use thiserror::Error;

/// Errors that can occur inside the agent
///
/// Only `Config` ever escapes the public API, and only from construction.
/// Everything else is recorded per call and replaced by the documented
/// fallback values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AgentError {
    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Oracle call exceeded its deadline
    #[error("Oracle call timed out after {0}s")]
    Timeout(u64),

    /// Response was not the expected JSON shape
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for AgentError {
    fn from(e: toml::de::Error) -> Self {
        AgentError::Config(format!("Failed to parse TOML: {}", e))
    }
}
