//! Stixstory LLM Provider Layer
//!
//! Implementations of the `LlmProvider` trait from `stixstory-domain`: the
//! reasoning oracle consulted for relationship labels, narratives and scores,
//! and for synthetic object generation.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic scripted responses for testing
//! - `OllamaProvider`: Local Ollama API integration
//! - `OpenAiProvider`: OpenAI-compatible chat-completions API
//! - `ConfiguredProvider`: One of the above, selected from configuration
//!
//! # Examples
//!
//! ```
//! use stixstory_llm::MockProvider;
//! use stixstory_domain::traits::LlmProvider;
//!
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.generate("test prompt").unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! ```

#![warn(missing_docs)]

mod http;
pub mod mock;
pub mod ollama;
pub mod openai;
pub mod provider;

use thiserror::Error;

pub use mock::MockProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;
pub use provider::{ConfiguredProvider, LlmSettings, ProviderKind};

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Provider misconfigured (missing key, bad endpoint)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}
