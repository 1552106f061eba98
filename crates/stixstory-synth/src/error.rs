//! Error types for synthetic object generation

use thiserror::Error;

/// Errors that can occur while generating objects
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SynthError {
    /// Requested type tag has no registered generator
    #[error("Unknown object kind: {0}")]
    UnknownKind(String),

    /// Requested more objects than one request may ask for
    #[error("Requested {requested} {kind} objects, limit is {limit}")]
    LimitExceeded {
        /// Type tag
        kind: String,
        /// Requested count
        requested: usize,
        /// Configured limit
        limit: usize,
    },

    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Generator output was not a usable list of records
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    /// Generation task exceeded its deadline
    #[error("Generation timed out after {0}s")]
    Timeout(u64),

    /// Worker task panicked or was cancelled
    #[error("Worker error: {0}")]
    Worker(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for SynthError {
    fn from(e: toml::de::Error) -> Self {
        SynthError::Config(format!("Failed to parse TOML: {}", e))
    }
}
