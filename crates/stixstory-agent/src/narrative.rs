//! Narrative generation over the accepted edge set

use crate::invoke::{call_limiter, call_llm, CallLimiter, CallMode};
use crate::prompt::story_prompt;
use crate::types::STORY_FALLBACK;
use stixstory_domain::traits::LlmProvider;
use stixstory_domain::Relationship;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Render edges as `"{source} {label} {target}: {description}"` lines
pub fn render_edges(edges: &[Relationship]) -> String {
    edges
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Asks the oracle to tell the threat story the edges imply
pub struct NarrativeGenerator<L> {
    llm: Arc<L>,
    limiter: CallLimiter,
    timeout: Duration,
}

impl<L> NarrativeGenerator<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
{
    /// Create a generator over a shared provider
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

    /// Produce the narrative; never fails
    ///
    /// An empty edge list is still narrated. Any oracle failure yields the
    /// fixed fallback text.
    pub async fn narrate(&self, edges: &[Relationship]) -> String {
        let prompt = story_prompt(&render_edges(edges));

        match call_llm(&self.llm, &self.limiter, prompt, CallMode::Text, self.timeout).await {
            Ok(story) if !story.trim().is_empty() => {
                info!("Generated story ({} chars)", story.len());
                story.trim().to_string()
            }
            Ok(_) => {
                error!("Error generating story: empty response");
                STORY_FALLBACK.to_string()
            }
            Err(e) => {
                error!("Error generating story: {}", e);
                STORY_FALLBACK.to_string()
            }
        }
    }
}
