//! Self-evaluation of edges and narrative

use crate::invoke::{call_limiter, call_llm, CallLimiter, CallMode};
use crate::narrative::render_edges;
use crate::parser::{parse_evaluation, ParseOutcome};
use crate::prompt::{evaluation_prompt, EVALUATION_SCHEMA};
use crate::types::Evaluation;
use stixstory_domain::traits::LlmProvider;
use stixstory_domain::Relationship;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Asks the oracle to score the coherence of (edges, narrative)
pub struct Evaluator<L> {
    llm: Arc<L>,
    limiter: CallLimiter,
    timeout: Duration,
}

impl<L> Evaluator<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
{
    /// Create an evaluator over a shared provider
    pub fn new(llm: Arc<L>, timeout: Duration) -> Self {
        Self::with_limiter(llm, call_limiter(1), timeout)
    }

    pub(crate) fn with_limiter(llm: Arc<L>, limiter: CallLimiter, timeout: Duration) -> Self {
        Self {
            llm,
            limiter,
            timeout,
        }
    }

    /// Score the run; any failure yields [`Evaluation::fallback`]
    pub async fn evaluate(&self, edges: &[Relationship], story: &str) -> Evaluation {
        let prompt = evaluation_prompt(&render_edges(edges), story);

        let response = match call_llm(
            &self.llm,
            &self.limiter,
            prompt,
            CallMode::Structured(EVALUATION_SCHEMA),
            self.timeout,
        )
        .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("Error during self-evaluation: {}", e);
                return Evaluation::fallback();
            }
        };

        match parse_evaluation(&response) {
            ParseOutcome::Parsed(evaluation) => {
                info!("Self-evaluation score: {}", evaluation.score);
                evaluation
            }
            ParseOutcome::ParseFailed { raw, reason } => {
                error!("Error during self-evaluation: {}", reason);
                debug!("Unparseable evaluation response: {}", raw);
                Evaluation::fallback()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stixstory_llm::MockProvider;

    #[tokio::test]
    async fn test_evaluate_parses_score() {
        let llm = Arc::new(MockProvider::new(
            "```json\n{\"score\": 8, \"justification\": \"Plausible chain.\"}\n```",
        ));
        let evaluator = Evaluator::new(Arc::clone(&llm), Duration::from_secs(5));

        let edges = vec![Relationship::new("uses", "a", "b", "x")];
        let eval = evaluator.evaluate(&edges, "The story").await;
        assert_eq!(eval.score, 8.0);
        assert_eq!(eval.justification, "Plausible chain.");

        let prompt = &llm.prompts()[0];
        assert!(prompt.contains("a uses b: x"));
        assert!(prompt.contains("The story"));
    }

    #[tokio::test]
    async fn test_evaluate_fallback_on_garbage() {
        let evaluator = Evaluator::new(Arc::new(MockProvider::new("ten out of ten")), Duration::from_secs(5));
        assert_eq!(evaluator.evaluate(&[], "s").await, Evaluation::fallback());
    }

    #[tokio::test]
    async fn test_evaluate_fallback_on_error() {
        let mut llm = MockProvider::default();
        llm.add_error("Story:");
        let evaluator = Evaluator::new(Arc::new(llm), Duration::from_secs(5));
        assert_eq!(evaluator.evaluate(&[], "s").await, Evaluation::fallback());
    }
}
