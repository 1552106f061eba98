//! Relationship oracle client
//!
//! Asks the reasoning service to label one candidate pair and turns the
//! answer into an edge, or into one of the non-edge outcomes. Nothing here
//! returns an error to the caller: transport failures, timeouts and
//! malformed answers all end up as [`PairOutcome::Failed`].

use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::invoke::{call_limiter, call_llm, CallLimiter, CallMode};
use crate::parser::{parse_relationship, ParseOutcome, RelationshipAnswer};
use crate::prompt::{relationship_prompt, RELATIONSHIP_SCHEMA};
use crate::types::Candidate;
use stixstory_domain::traits::LlmProvider;
use stixstory_domain::Relationship;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What happened to one candidate pair
#[derive(Debug, Clone, PartialEq)]
pub enum PairOutcome {
    /// The oracle picked a permitted label
    Accepted(Relationship),
    /// The oracle declined to relate the pair
    NoRelationship,
    /// The oracle named a label the table does not permit for this pair
    RejectedLabel(String),
    /// The call or its parsing failed (after any retries)
    Failed(AgentError),
}

impl PairOutcome {
    /// The edge, if one was accepted
    pub fn into_edge(self) -> Option<Relationship> {
        match self {
            PairOutcome::Accepted(edge) => Some(edge),
            _ => None,
        }
    }
}

/// Turn a parsed answer into an outcome for `candidate`
///
/// The label must match one of the candidate's permitted labels exactly
/// (after trimming); the sentinel check is case-insensitive.
pub fn classify(candidate: &Candidate, answer: RelationshipAnswer) -> PairOutcome {
    if answer.is_no_relationship() {
        return PairOutcome::NoRelationship;
    }

    let label = answer.relationship_type.trim();
    if !candidate.permitted.iter().any(|permitted| permitted == label) {
        return PairOutcome::RejectedLabel(label.to_string());
    }

    PairOutcome::Accepted(Relationship::new(
        label,
        candidate.source.id.clone(),
        candidate.target.id.clone(),
        answer.justification,
    ))
}

/// Client that asks the oracle about candidate pairs
///
/// Clones share one call limiter, so at most `max_concurrent_calls`
/// provider calls are outstanding across all of them. A call that timed out
/// still counts until the provider actually returns.
pub struct RelationshipOracle<L> {
    llm: Arc<L>,
    config: AgentConfig,
    limiter: CallLimiter,
}

impl<L> Clone for RelationshipOracle<L> {
    fn clone(&self) -> Self {
        Self {
            llm: Arc::clone(&self.llm),
            config: self.config.clone(),
            limiter: Arc::clone(&self.limiter),
        }
    }
}

impl<L> RelationshipOracle<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
{
    /// Create a client over a shared provider
    ///
    /// # Errors
    ///
    /// Returns `AgentError::Config` if the configuration is invalid.
    pub fn new(llm: Arc<L>, config: AgentConfig) -> Result<Self, AgentError> {
        config.validate()?;
        let limiter = call_limiter(config.max_concurrent_calls);
        Ok(Self::with_limiter(llm, config, limiter))
    }

    /// Create a client whose calls count against an existing limiter
    pub(crate) fn with_limiter(llm: Arc<L>, config: AgentConfig, limiter: CallLimiter) -> Self {
        Self {
            llm,
            config,
            limiter,
        }
    }

    /// Ask about one candidate, retrying failures up to `max_retries` times
    pub async fn decide(&self, candidate: &Candidate) -> PairOutcome {
        let prompt = relationship_prompt(&candidate.source, &candidate.target, &candidate.permitted);
        let mut retries = 0;

        let outcome = loop {
            match self.attempt(candidate, &prompt).await {
                Ok(outcome) => break outcome,
                Err(e) if retries < self.config.max_retries => {
                    retries += 1;
                    let delay = self.config.retry_backoff(retries);
                    warn!(
                        "Relationship call {} -> {} failed ({}), retry {}/{} in {:?}",
                        candidate.source.id,
                        candidate.target.id,
                        e,
                        retries,
                        self.config.max_retries,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    warn!(
                        "Error generating relationship {} -> {}: {}",
                        candidate.source.id, candidate.target.id, e
                    );
                    break PairOutcome::Failed(e);
                }
            }
        };

        if let PairOutcome::RejectedLabel(label) = &outcome {
            warn!(
                "Rejected label '{}' for {} -> {} (permitted: {})",
                label,
                candidate.source.id,
                candidate.target.id,
                candidate.permitted.join(", ")
            );
        }

        outcome
    }

    async fn attempt(&self, candidate: &Candidate, prompt: &str) -> Result<PairOutcome, AgentError> {
        let response = call_llm(
            &self.llm,
            &self.limiter,
            prompt.to_string(),
            CallMode::Structured(RELATIONSHIP_SCHEMA),
            self.config.call_timeout(),
        )
        .await?;

        debug!(
            "LLM response for {} -> {}: {}",
            candidate.source.id, candidate.target.id, response
        );

        match parse_relationship(&response) {
            ParseOutcome::Parsed(answer) => {
                info!(
                    "Relationship {} -> {}: '{}' ({})",
                    candidate.source.id,
                    candidate.target.id,
                    answer.relationship_type,
                    answer.justification
                );
                Ok(classify(candidate, answer))
            }
            ParseOutcome::ParseFailed { raw, reason } => {
                debug!("Unparseable relationship response: {}", raw);
                Err(AgentError::InvalidFormat(reason))
            }
        }
    }
}
