//! Provider selection from configuration

use crate::{LlmError, MockProvider, OllamaProvider, OpenAiProvider};
use serde::{Deserialize, Serialize};
use stixstory_domain::traits::LlmProvider;
use std::time::Duration;

/// Which backend to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Offline scripted provider
    Mock,
    /// Local Ollama server
    Ollama,
    /// OpenAI-compatible chat-completions endpoint
    OpenAi,
}

impl Default for ProviderKind {
    fn default() -> Self {
        ProviderKind::OpenAi
    }
}

/// LLM backend settings as they appear in configuration files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Backend to use
    #[serde(default)]
    pub provider: ProviderKind,

    /// Base URL; the backend's default when absent
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable holding the API key (OpenAI only)
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts per HTTP request, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed answer for the mock backend
    #[serde(default)]
    pub mock_response: Option<String>,
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_attempts() -> u32 {
    1
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            endpoint: None,
            model: default_model(),
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            mock_response: None,
        }
    }
}

impl LlmSettings {
    /// Settings for the offline mock backend
    pub fn mock() -> Self {
        Self {
            provider: ProviderKind::Mock,
            model: "mock".to_string(),
            ..Self::default()
        }
    }

    /// Build the configured provider
    ///
    /// Reads the API key from `api_key_env` for the OpenAI backend.
    pub fn build(&self) -> Result<ConfiguredProvider, LlmError> {
        let timeout = Duration::from_secs(self.timeout_secs);
        match self.provider {
            ProviderKind::Mock => {
                let response = self.mock_response.clone().unwrap_or_else(|| {
                    r#"{"relationship_type": "NO_RELATIONSHIP", "justification": "mock backend"}"#
                        .to_string()
                });
                Ok(ConfiguredProvider::Mock(
                    MockProvider::new(response).with_model_name(self.model.clone()),
                ))
            }
            ProviderKind::Ollama => {
                let endpoint = self
                    .endpoint
                    .clone()
                    .unwrap_or_else(|| crate::ollama::DEFAULT_ENDPOINT.to_string());
                let provider = OllamaProvider::with_timeout(endpoint, self.model.clone(), timeout)?
                    .with_max_retries(self.max_attempts)
                    .with_temperature(self.temperature);
                Ok(ConfiguredProvider::Ollama(provider))
            }
            ProviderKind::OpenAi => {
                let api_key = std::env::var(&self.api_key_env).map_err(|_| {
                    LlmError::Config(format!("environment variable {} is not set", self.api_key_env))
                })?;
                let endpoint = self
                    .endpoint
                    .clone()
                    .unwrap_or_else(|| crate::openai::DEFAULT_ENDPOINT.to_string());
                let provider =
                    OpenAiProvider::with_timeout(endpoint, self.model.clone(), api_key, timeout)?
                        .with_max_retries(self.max_attempts)
                        .with_temperature(self.temperature);
                Ok(ConfiguredProvider::OpenAi(provider))
            }
        }
    }
}

/// A provider chosen at startup from [`LlmSettings`]
pub enum ConfiguredProvider {
    /// Offline scripted provider
    Mock(MockProvider),
    /// Local Ollama server
    Ollama(OllamaProvider),
    /// OpenAI-compatible endpoint
    OpenAi(OpenAiProvider),
}

impl LlmProvider for ConfiguredProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        match self {
            ConfiguredProvider::Mock(p) => p.generate(prompt),
            ConfiguredProvider::Ollama(p) => p.generate(prompt),
            ConfiguredProvider::OpenAi(p) => p.generate(prompt),
        }
    }

    fn generate_structured(&self, prompt: &str, schema: &str) -> Result<String, Self::Error> {
        match self {
            ConfiguredProvider::Mock(p) => p.generate_structured(prompt, schema),
            ConfiguredProvider::Ollama(p) => p.generate_structured(prompt, schema),
            ConfiguredProvider::OpenAi(p) => p.generate_structured(prompt, schema),
        }
    }

    fn model_name(&self) -> &str {
        match self {
            ConfiguredProvider::Mock(p) => p.model_name(),
            ConfiguredProvider::Ollama(p) => p.model_name(),
            ConfiguredProvider::OpenAi(p) => p.model_name(),
        }
    }
}
