//! Scripted provider for deterministic tests

use crate::LlmError;
use stixstory_domain::traits::LlmProvider;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// What the mock answers when a rule matches
#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Error,
}

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured responses without making any network calls.
/// Rules match when the prompt contains the rule's pattern; the first
/// matching rule (in insertion order) wins, otherwise the default response
/// is returned. Every prompt is recorded so tests can assert which calls
/// were made.
///
/// # Examples
///
/// ```
/// use stixstory_llm::MockProvider;
/// use stixstory_domain::traits::LlmProvider;
///
/// // Simple fixed response
/// let provider = MockProvider::new("Fixed response");
/// assert_eq!(provider.generate("any prompt").unwrap(), "Fixed response");
///
/// // Pattern-matched responses
/// let mut provider = MockProvider::default();
/// provider.add_response("alpha", "response1");
/// provider.add_response("beta", "response2");
/// assert_eq!(provider.generate("... alpha ...").unwrap(), "response1");
/// assert_eq!(provider.generate("... beta ...").unwrap(), "response2");
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    rules: Arc<Mutex<Vec<(String, Reply)>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    model: String,
}

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            rules: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            model: "mock".to_string(),
        }
    }

    /// Override the reported model name
    pub fn with_model_name(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Answer `response` to any prompt containing `pattern`
    pub fn add_response(&mut self, pattern: impl Into<String>, response: impl Into<String>) {
        guard(&self.rules).push((pattern.into(), Reply::Text(response.into())));
    }

    /// Fail any prompt containing `pattern`
    pub fn add_error(&mut self, pattern: impl Into<String>) {
        guard(&self.rules).push((pattern.into(), Reply::Error));
    }

    /// Get the number of times the provider was called
    pub fn call_count(&self) -> usize {
        guard(&self.prompts).len()
    }

    /// Every prompt received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        guard(&self.prompts).clone()
    }

    /// Forget recorded prompts
    pub fn reset_call_count(&self) {
        guard(&self.prompts).clear();
    }

    fn reply(&self, prompt: &str) -> Result<String, LlmError> {
        guard(&self.prompts).push(prompt.to_string());

        let rules = guard(&self.rules);
        match rules.iter().find(|(pattern, _)| prompt.contains(pattern.as_str())) {
            Some((_, Reply::Text(response))) => Ok(response.clone()),
            Some((pattern, Reply::Error)) => {
                Err(LlmError::Other(format!("Mock error for '{}'", pattern)))
            }
            None => Ok(self.default_response.clone()),
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProvider for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        self.reply(prompt)
    }

    fn generate_structured(&self, prompt: &str, _schema: &str) -> Result<String, Self::Error> {
        self.reply(prompt)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.generate("any prompt");
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), "Test response");
    }

    #[test]
    fn test_mock_provider_pattern_responses() {
        let mut provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.add_response("foo", "bar");

        assert_eq!(provider.generate("say hello").unwrap(), "world");
        assert_eq!(provider.generate("foo!").unwrap(), "bar");
        assert_eq!(provider.generate("unknown").unwrap(), "Default mock response");
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let mut provider = MockProvider::default();
        provider.add_response("a", "first");
        provider.add_response("ab", "second");
        assert_eq!(provider.generate("ab").unwrap(), "first");
    }

    #[test]
    fn test_mock_provider_call_count() {
        let provider = MockProvider::new("test");

        assert_eq!(provider.call_count(), 0);

        provider.generate("prompt1").unwrap();
        assert_eq!(provider.call_count(), 1);

        provider.generate_structured("prompt2", "{}").unwrap();
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.prompts(), vec!["prompt1", "prompt2"]);

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[test]
    fn test_mock_provider_error() {
        let mut provider = MockProvider::default();
        provider.add_error("bad prompt");

        let result = provider.generate("a bad prompt");
        assert!(matches!(result, Err(LlmError::Other(_))));
        // Errors are still recorded as calls
        assert_eq!(provider.call_count(), 1);
    }

    #[test]
    fn test_mock_provider_clone_shares_state() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.generate("test").unwrap();

        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }

    #[test]
    fn test_model_name() {
        assert_eq!(MockProvider::default().model_name(), "mock");
        assert_eq!(MockProvider::default().with_model_name("gpt-test").model_name(), "gpt-test");
    }
}
