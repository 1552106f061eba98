//! Configuration for the relationship agent

use crate::error::AgentError;
use serde::{Deserialize, Serialize};
use stixstory_domain::CompatibilityTable;
use std::path::Path;
use std::time::Duration;

/// Configuration for the relationship agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Potential targets considered per source object (K)
    ///
    /// The first K other objects are taken before the compatibility filter,
    /// so fewer than K candidates may survive.
    pub max_targets_per_source: usize,

    /// Upper bound on outstanding oracle calls during inference
    pub max_concurrent_calls: usize,

    /// Deadline for a single oracle call (seconds)
    pub call_timeout_secs: u64,

    /// Extra attempts after a failed relationship call
    pub max_retries: u32,

    /// Base backoff between retries (milliseconds), doubled per attempt
    pub retry_backoff_ms: u64,
}

impl AgentConfig {
    /// Get the per-call timeout as a Duration
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Backoff before retry number `attempt` (1-based)
    pub fn retry_backoff(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(factor))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), AgentError> {
        if self.max_concurrent_calls == 0 {
            return Err(AgentError::Config(
                "max_concurrent_calls must be greater than 0".to_string(),
            ));
        }
        if self.call_timeout_secs == 0 {
            return Err(AgentError::Config(
                "call_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// One oracle call at a time, as the reference pipeline runs
    pub fn sequential() -> Self {
        Self {
            max_concurrent_calls: 1,
            ..Self::default()
        }
    }

    /// Wider fan-out with one retry per failed pair
    pub fn parallel() -> Self {
        Self {
            max_concurrent_calls: 8,
            max_retries: 1,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, AgentError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, AgentError> {
        toml::to_string_pretty(self)
            .map_err(|e| AgentError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_targets_per_source: 5,
            max_concurrent_calls: 4,
            call_timeout_secs: 60,
            max_retries: 0,
            retry_backoff_ms: 500,
        }
    }
}

/// Parse a compatibility table from TOML
///
/// Each table header is a source type, each key a target type:
///
/// ```toml
/// [threat-actor]
/// identity = ["attributed-to", "impersonates"]
/// ```
///
/// A table that permits nothing is rejected.
pub fn compatibility_from_toml(toml_str: &str) -> Result<CompatibilityTable, AgentError> {
    let table: CompatibilityTable = toml::from_str(toml_str)?;
    if table.is_empty() {
        return Err(AgentError::Config(
            "compatibility table permits no relationships".to_string(),
        ));
    }
    Ok(table)
}

/// Load a compatibility table from a TOML file
pub fn load_compatibility_table(path: impl AsRef<Path>) -> Result<CompatibilityTable, AgentError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| {
        AgentError::Config(format!("Failed to read {}: {}", path.display(), e))
    })?;
    compatibility_from_toml(&contents)
}
