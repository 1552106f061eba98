//! Bridge from async pipeline code to the blocking `LlmProvider` trait

use crate::error::AgentError;
use stixstory_domain::traits::LlmProvider;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::timeout;

/// How the oracle should be asked
#[derive(Debug, Clone, Copy)]
pub(crate) enum CallMode {
    /// Free text
    Text,
    /// JSON expected; carries the schema hint
    Structured(&'static str),
}

/// Shared bound on provider calls that have not yet returned
pub(crate) type CallLimiter = Arc<Semaphore>;

/// Create a limiter admitting `max_outstanding` calls at once
pub(crate) fn call_limiter(max_outstanding: usize) -> CallLimiter {
    Arc::new(Semaphore::new(max_outstanding))
}

/// Run one oracle call on a blocking thread, bounded by `deadline`
///
/// The limiter permit travels with the blocking call and is released only
/// when the provider returns. A timed-out call is abandoned, not cancelled:
/// it keeps its permit until the blocking thread finishes, and its answer
/// is dropped. The deadline does not include the wait for a permit.
pub(crate) async fn call_llm<L>(
    llm: &Arc<L>,
    limiter: &CallLimiter,
    prompt: String,
    mode: CallMode,
    deadline: Duration,
) -> Result<String, AgentError>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
{
    let permit = Arc::clone(limiter)
        .acquire_owned()
        .await
        .map_err(|e| AgentError::Llm(format!("Permit error: {}", e)))?;
    let llm = Arc::clone(llm);

    // Call in a blocking context since LlmProvider is not async
    let task = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        let result = match mode {
            CallMode::Text => llm.generate(&prompt),
            CallMode::Structured(schema) => llm.generate_structured(&prompt, schema),
        };
        result.map_err(|e| AgentError::Llm(e.to_string()))
    });

    timeout(deadline, task)
        .await
        .map_err(|_| AgentError::Timeout(deadline.as_secs()))?
        .map_err(|e| AgentError::Llm(format!("Task join error: {}", e)))?
}
