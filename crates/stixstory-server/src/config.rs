//! Configuration file parsing for the server.
//!
//! Loads bind settings, the LLM backend, agent and generation tuning, and
//! an optional compatibility table path from a TOML file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use stixstory_agent::{load_compatibility_table, AgentConfig, AgentError};
use stixstory_domain::CompatibilityTable;
use stixstory_llm::LlmSettings;
use stixstory_synth::{SynthConfig, SynthError};
use thiserror::Error;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Agent section or compatibility table is invalid
    #[error("Invalid agent configuration: {0}")]
    Agent(#[from] AgentError),

    /// Synth section is invalid
    #[error("Invalid synth configuration: {0}")]
    Synth(#[from] SynthError),
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 5000)
    pub bind_port: u16,

    /// LLM backend
    pub llm: LlmSettings,

    /// Relationship agent tuning
    pub agent: AgentConfig,

    /// Object generation tuning
    pub synth: SynthConfig,

    /// Compatibility table file; the built-in STIX table when absent
    pub compatibility: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 5000,
            llm: LlmSettings::default(),
            agent: AgentConfig::default(),
            synth: SynthConfig::default(),
            compatibility: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(contents)?;
        config.agent.validate()?;
        config.synth.validate()?;
        Ok(config)
    }

    /// Create a default configuration for testing (mock LLM backend)
    pub fn default_test_config() -> Self {
        Self {
            llm: LlmSettings::mock(),
            ..Self::default()
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }

    /// The compatibility table to run with
    pub fn compatibility_table(&self) -> Result<CompatibilityTable, ConfigError> {
        match &self.compatibility {
            Some(path) => Ok(load_compatibility_table(path)?),
            None => Ok(CompatibilityTable::stix_default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stixstory_llm::ProviderKind;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default_test_config();
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.bind_port, 5000);
        assert_eq!(config.llm.provider, ProviderKind::Mock);
        assert!(config.compatibility.is_none());
    }

    #[test]
    fn test_bind_addr() {
        let config = ServerConfig::default_test_config();
        assert_eq!(config.bind_addr(), "127.0.0.1:5000");
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            bind_address = "0.0.0.0"
            bind_port = 9000

            [llm]
            provider = "ollama"
            model = "llama3"

            [agent]
            max_targets_per_source = 3
            max_concurrent_calls = 2

            [synth]
            max_workers = 6
        "#;

        let config = ServerConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.bind_port, 9000);
        assert_eq!(config.llm.provider, ProviderKind::Ollama);
        assert_eq!(config.llm.model, "llama3");
        assert_eq!(config.agent.max_targets_per_source, 3);
        assert_eq!(config.agent.call_timeout_secs, 60);
        assert_eq!(config.synth.max_workers, 6);
    }

    #[test]
    fn test_invalid_agent_section() {
        let toml = r#"
            [agent]
            max_concurrent_calls = 0
        "#;
        assert!(matches!(
            ServerConfig::from_toml_str(toml),
            Err(ConfigError::Agent(_))
        ));
    }

    #[test]
    fn test_builtin_table_when_no_path() {
        let table = ServerConfig::default().compatibility_table().unwrap();
        assert!(table.allows("threat-actor", "identity"));
    }
}
