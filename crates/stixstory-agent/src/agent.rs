//! Pipeline orchestrator: inference → narrative → evaluation

use crate::config::AgentConfig;
use crate::engine::InferenceEngine;
use crate::error::AgentError;
use crate::evaluation::Evaluator;
use crate::invoke::call_limiter;
use crate::narrative::NarrativeGenerator;
use crate::types::{RunMetadata, RunResult};
use stixstory_domain::traits::LlmProvider;
use stixstory_domain::{CompatibilityTable, StixObject};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// The relationship agent
///
/// Built once with a provider, a compatibility table and a configuration;
/// [`run`](Self::run) may then be called any number of times, concurrently.
/// Every provider call the agent makes, across all runs, counts against one
/// bound of `max_concurrent_calls`.
pub struct RelationshipAgent<L> {
    engine: InferenceEngine<L>,
    narrator: NarrativeGenerator<L>,
    evaluator: Evaluator<L>,
    model_name: String,
}

impl<L> RelationshipAgent<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
{
    /// Create an agent
    ///
    /// # Errors
    ///
    /// Returns `AgentError::Config` if the table permits no relationship at
    /// all or the configuration is invalid. No object is processed before
    /// these checks pass.
    pub fn new(
        llm: L,
        table: CompatibilityTable,
        config: AgentConfig,
    ) -> Result<Self, AgentError> {
        Self::from_shared(Arc::new(llm), Arc::new(table), config)
    }

    /// Create an agent over an already-shared provider and table
    pub fn from_shared(
        llm: Arc<L>,
        table: Arc<CompatibilityTable>,
        config: AgentConfig,
    ) -> Result<Self, AgentError> {
        if table.is_empty() {
            return Err(AgentError::Config(
                "compatibility table permits no relationships".to_string(),
            ));
        }
        config.validate()?;

        info!(
            "Relationship agent ready: {} permitted type pairs, K = {}",
            table.pair_count(),
            config.max_targets_per_source
        );

        let limiter = call_limiter(config.max_concurrent_calls);
        let timeout = config.call_timeout();

        Ok(Self {
            model_name: llm.model_name().to_string(),
            narrator: NarrativeGenerator::with_limiter(
                Arc::clone(&llm),
                Arc::clone(&limiter),
                timeout,
            ),
            evaluator: Evaluator::with_limiter(Arc::clone(&llm), Arc::clone(&limiter), timeout),
            engine: InferenceEngine::with_limiter(llm, table, config, limiter),
        })
    }

    /// Run the full pipeline over `objects`
    ///
    /// Always completes. Oracle failures surface only as missing edges, the
    /// fallback narrative, or the fallback evaluation.
    pub async fn run(&self, objects: &[StixObject]) -> RunResult {
        let start = Instant::now();
        info!("Starting relationship agent over {} objects", objects.len());

        let report = self.engine.infer(objects).await;
        let narrative = self.narrator.narrate(&report.edges).await;
        let evaluation = self.evaluator.evaluate(&report.edges, &narrative).await;

        let metadata = RunMetadata {
            objects_considered: report.objects_considered,
            candidates_evaluated: report.candidates_evaluated,
            oracle_failures: report.oracle_failures,
            rejected_labels: report.rejected_labels,
            no_relationship: report.no_relationship,
            processing_time_ms: start.elapsed().as_millis() as u64,
            model_name: self.model_name.clone(),
        };

        info!(
            "Relationship agent completed its run: {} edges, score {}",
            report.edges.len(),
            evaluation.score
        );

        RunResult {
            edges: report.edges,
            narrative,
            evaluation,
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stixstory_llm::MockProvider;

    #[test]
    fn test_empty_table_fails_fast() {
        let result = RelationshipAgent::new(
            MockProvider::default(),
            CompatibilityTable::new(),
            AgentConfig::default(),
        );
        assert!(matches!(result, Err(AgentError::Config(_))));
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let config = AgentConfig {
            max_concurrent_calls: 0,
            ..AgentConfig::default()
        };
        let result =
            RelationshipAgent::new(MockProvider::default(), CompatibilityTable::stix_default(), config);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_run_with_no_objects() {
        let llm = MockProvider::new("not json").with_model_name("test-model");
        let agent =
            RelationshipAgent::new(llm, CompatibilityTable::stix_default(), AgentConfig::default())
                .unwrap();

        let result = agent.run(&[]).await;
        assert!(result.edges.is_empty());
        assert_eq!(result.narrative, "not json");
        assert_eq!(result.evaluation, crate::types::Evaluation::fallback());
        assert_eq!(result.metadata.model_name, "test-model");
        assert_eq!(result.metadata.candidates_evaluated, 0);
    }
}
