//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

/// Trait for the external reasoning service (the "oracle")
///
/// Implemented by the infrastructure layer (stixstory-llm). Calls are
/// blocking; async callers move them onto a blocking thread.
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Generate free-text completion
    fn generate(&self, prompt: &str) -> Result<String, Self::Error>;

    /// Generate a completion that is expected to be a JSON document
    ///
    /// `schema` is a short description of the expected shape. Backends that
    /// support a JSON output mode should enable it; the caller still
    /// validates the response.
    fn generate_structured(&self, prompt: &str, schema: &str) -> Result<String, Self::Error>;

    /// Name of the model behind this provider
    fn model_name(&self) -> &str {
        "llm"
    }
}
