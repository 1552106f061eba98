//! Configuration for synthetic generation

use crate::error::SynthError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the generation worker pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// Upper bound on concurrent generation tasks
    ///
    /// Further capped by available parallelism and the number of tasks.
    pub max_workers: usize,

    /// Largest count a single kind may request
    pub objects_per_request_limit: usize,

    /// Deadline for one kind's generation task (seconds)
    pub generation_timeout_secs: u64,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            max_workers: 12,
            objects_per_request_limit: 25,
            generation_timeout_secs: 120,
        }
    }
}

impl SynthConfig {
    /// Get the per-task timeout as a Duration
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    /// Workers to use for `tasks` generation tasks
    pub fn effective_workers(&self, tasks: usize) -> usize {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        self.max_workers.min(cores).min(tasks).max(1)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), SynthError> {
        if self.max_workers == 0 {
            return Err(SynthError::Config(
                "max_workers must be greater than 0".to_string(),
            ));
        }
        if self.objects_per_request_limit == 0 {
            return Err(SynthError::Config(
                "objects_per_request_limit must be greater than 0".to_string(),
            ));
        }
        if self.generation_timeout_secs == 0 {
            return Err(SynthError::Config(
                "generation_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, SynthError> {
        Ok(toml::from_str(toml_str)?)
    }
}
