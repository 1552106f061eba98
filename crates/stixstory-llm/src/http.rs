//! Shared HTTP plumbing for the network-backed providers

use crate::LlmError;
use reqwest::{RequestBuilder, Response, StatusCode};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Send a request, retrying transient failures with exponential backoff
///
/// `max_attempts` counts the first try. Backoff doubles from one second.
/// 404 maps to `ModelNotAvailable` and auth failures to `Config`; neither is
/// retried.
pub(crate) async fn send_with_retry<F>(
    build: F,
    max_attempts: u32,
    model: &str,
) -> Result<Response, LlmError>
where
    F: Fn() -> RequestBuilder,
{
    let mut attempts = 0;
    let mut last_error = None;

    while attempts < max_attempts.max(1) {
        match build().send().await {
            Ok(response) if response.status().is_success() => return Ok(response),
            Ok(response) => {
                let status = response.status();
                match status {
                    StatusCode::NOT_FOUND => {
                        return Err(LlmError::ModelNotAvailable(model.to_string()));
                    }
                    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                        return Err(LlmError::Config(format!("HTTP {}: check API key", status)));
                    }
                    StatusCode::TOO_MANY_REQUESTS => {
                        last_error = Some(LlmError::RateLimitExceeded);
                    }
                    _ => {
                        let error_text = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        last_error = Some(LlmError::Communication(format!(
                            "HTTP {}: {}",
                            status, error_text
                        )));
                    }
                }
            }
            Err(e) => {
                last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
            }
        }

        attempts += 1;
        if attempts < max_attempts {
            let delay = Duration::from_secs(2u64.pow(attempts - 1));
            warn!("LLM request attempt {} failed, retrying in {:?}", attempts, delay);
            tokio::time::sleep(delay).await;
        }
    }

    Err(last_error
        .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
}

/// Drive an async provider call to completion from synchronous code
///
/// Inside a tokio runtime this must be called from a blocking thread
/// (`spawn_blocking`); the future then runs on the caller's runtime so the
/// HTTP connection pool stays alive between calls. Outside any runtime a
/// throwaway current-thread runtime is used.
pub(crate) fn block_on<F, T>(future: F) -> Result<T, LlmError>
where
    F: Future<Output = Result<T, LlmError>>,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => handle.block_on(future),
        Err(_) => {
            debug!("No ambient runtime, building a current-thread runtime");
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| LlmError::Other(format!("Failed to build runtime: {}", e)))?
                .block_on(future)
        }
    }
}

/// Build an HTTP client with the given request timeout
pub(crate) fn client(timeout: Duration) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))
}
