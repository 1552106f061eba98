//! Relationship inference engine
//!
//! Enumerates candidate pairs, fans the oracle calls out, and re-linearizes
//! the answers into enumeration order. Each call writes only its own slot,
//! so no decision can observe another. The concurrency bound lives in the
//! oracle's call limiter.

use crate::candidates::{enumerate_candidates, identifiable_objects};
use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::invoke::{call_limiter, CallLimiter};
use crate::oracle::{PairOutcome, RelationshipOracle};
use crate::types::Candidate;
use stixstory_domain::traits::LlmProvider;
use stixstory_domain::{CompatibilityTable, Relationship, StixObject};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info};

/// Edges plus the per-outcome counters of one inference pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InferenceReport {
    /// Accepted edges in candidate order
    pub edges: Vec<Relationship>,
    /// Objects with an id and type
    pub objects_considered: usize,
    /// Candidate pairs sent to the oracle
    pub candidates_evaluated: usize,
    /// Pairs whose call failed
    pub oracle_failures: usize,
    /// Pairs answered with a non-permitted label
    pub rejected_labels: usize,
    /// Pairs answered with the sentinel
    pub no_relationship: usize,
}

impl InferenceReport {
    fn record(&mut self, outcome: PairOutcome) {
        match outcome {
            PairOutcome::Accepted(edge) => self.edges.push(edge),
            PairOutcome::NoRelationship => self.no_relationship += 1,
            PairOutcome::RejectedLabel(_) => self.rejected_labels += 1,
            PairOutcome::Failed(_) => self.oracle_failures += 1,
        }
    }
}

/// Drives enumeration and oracle calls into an ordered edge sequence
pub struct InferenceEngine<L> {
    oracle: RelationshipOracle<L>,
    table: Arc<CompatibilityTable>,
    config: AgentConfig,
}

impl<L> InferenceEngine<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
{
    /// Create an engine over a shared provider and table
    ///
    /// # Errors
    ///
    /// Returns `AgentError::Config` if the configuration is invalid, e.g. a
    /// zero concurrency bound that would never admit a call.
    pub fn new(
        llm: Arc<L>,
        table: Arc<CompatibilityTable>,
        config: AgentConfig,
    ) -> Result<Self, AgentError> {
        config.validate()?;
        let limiter = call_limiter(config.max_concurrent_calls);
        Ok(Self::with_limiter(llm, table, config, limiter))
    }

    pub(crate) fn with_limiter(
        llm: Arc<L>,
        table: Arc<CompatibilityTable>,
        config: AgentConfig,
        limiter: CallLimiter,
    ) -> Self {
        Self {
            oracle: RelationshipOracle::with_limiter(llm, config.clone(), limiter),
            table,
            config,
        }
    }

    /// Infer edges between `objects`
    pub async fn infer(&self, objects: &[StixObject]) -> InferenceReport {
        let candidates =
            enumerate_candidates(objects, &self.table, self.config.max_targets_per_source);

        let mut report = InferenceReport {
            objects_considered: identifiable_objects(objects).len(),
            candidates_evaluated: candidates.len(),
            ..InferenceReport::default()
        };

        info!(
            "Evaluating {} candidate pairs (max {} concurrent calls)",
            candidates.len(),
            self.config.max_concurrent_calls
        );

        for outcome in self.decide_all(candidates).await {
            report.record(outcome);
        }

        info!(
            "Inference complete: {} edges, {} declined, {} rejected, {} failed",
            report.edges.len(),
            report.no_relationship,
            report.rejected_labels,
            report.oracle_failures
        );

        report
    }

    /// Decide every candidate; the result is indexed like `candidates`
    async fn decide_all(&self, candidates: Vec<Candidate>) -> Vec<PairOutcome> {
        let mut slots: Vec<Option<PairOutcome>> = vec![None; candidates.len()];
        let mut tasks = JoinSet::new();

        for (slot, candidate) in candidates.into_iter().enumerate() {
            let oracle = self.oracle.clone();
            tasks.spawn(async move { (slot, oracle.decide(&candidate).await) });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((slot, outcome)) => slots[slot] = Some(outcome),
                Err(e) => error!("Relationship task failed to complete: {}", e),
            }
        }

        slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    PairOutcome::Failed(AgentError::Llm("Task did not complete".to_string()))
                })
            })
            .collect()
    }
}
