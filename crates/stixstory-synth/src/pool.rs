//! Bounded worker pool running one generation task per kind
//!
//! Every request is checked before any task starts. Once running, a failed
//! task never affects the others: its outcome is recorded and the remaining
//! kinds still contribute their objects.

use crate::config::SynthConfig;
use crate::error::SynthError;
use crate::registry::GeneratorRegistry;
use serde::Serialize;
use stixstory_domain::{ObjectKind, StixObject};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{error, info};

/// How many objects of one kind to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Kind to generate
    pub kind: ObjectKind,
    /// Number of objects
    pub count: usize,
}

impl GenerationRequest {
    /// Create a request
    pub fn new(kind: ObjectKind, count: usize) -> Self {
        Self { kind, count }
    }
}

/// Result of one kind's generation task
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    /// Task produced objects
    Generated {
        /// Kind generated
        kind: ObjectKind,
        /// The objects
        objects: Vec<StixObject>,
    },
    /// Task failed
    Failed {
        /// Kind that failed
        kind: ObjectKind,
        /// Why
        error: SynthError,
    },
}

/// A failed kind, as reported to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationFailure {
    /// Type tag
    pub kind: String,
    /// Error message
    pub error: String,
}

/// Objects from every successful task plus the failures
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationReport {
    /// Objects in request order
    pub objects: Vec<StixObject>,
    /// One entry per failed kind
    pub failures: Vec<GenerationFailure>,
}

impl GenerationReport {
    fn from_outcomes(outcomes: Vec<GenerationOutcome>) -> Self {
        outcomes
            .into_iter()
            .fold(Self::default(), |mut report, outcome| {
                match outcome {
                    GenerationOutcome::Generated { objects, .. } => report.objects.extend(objects),
                    GenerationOutcome::Failed { kind, error } => {
                        report.failures.push(GenerationFailure {
                            kind: kind.to_string(),
                            error: error.to_string(),
                        })
                    }
                }
                report
            })
    }
}

/// Generates objects for several kinds concurrently
pub struct Synthesizer {
    registry: Arc<GeneratorRegistry>,
    config: SynthConfig,
}

impl Synthesizer {
    /// Create a synthesizer
    ///
    /// # Errors
    ///
    /// Returns `SynthError::Config` if the configuration is invalid.
    pub fn new(registry: GeneratorRegistry, config: SynthConfig) -> Result<Self, SynthError> {
        config.validate()?;
        Ok(Self {
            registry: Arc::new(registry),
            config,
        })
    }

    /// The registry in use
    pub fn registry(&self) -> &GeneratorRegistry {
        &self.registry
    }

    /// Turn `(tag, count)` pairs into requests
    ///
    /// Fails on the first tag without a generator.
    pub fn plan<'a, I>(&self, counts: I) -> Result<Vec<GenerationRequest>, SynthError>
    where
        I: IntoIterator<Item = (&'a str, usize)>,
    {
        counts
            .into_iter()
            .map(|(tag, count)| Ok(GenerationRequest::new(self.registry.resolve(tag)?, count)))
            .collect()
    }

    /// Run every request with a positive count
    ///
    /// # Errors
    ///
    /// Returns `UnknownKind` or `LimitExceeded` before any work starts.
    /// Failures during generation are reported in the result instead.
    pub async fn generate_all(
        &self,
        requests: &[GenerationRequest],
    ) -> Result<GenerationReport, SynthError> {
        for request in requests {
            self.registry.get(request.kind)?;
            if request.count > self.config.objects_per_request_limit {
                return Err(SynthError::LimitExceeded {
                    kind: request.kind.to_string(),
                    requested: request.count,
                    limit: self.config.objects_per_request_limit,
                });
            }
        }

        let tasks: Vec<GenerationRequest> =
            requests.iter().copied().filter(|r| r.count > 0).collect();
        let workers = self.config.effective_workers(tasks.len());
        info!(
            "Generating objects for {} kinds with {} workers",
            tasks.len(),
            workers
        );

        let outcomes = self.run_tasks(tasks, workers).await;
        let report = GenerationReport::from_outcomes(outcomes);

        info!(
            "Total objects created: {} ({} kinds failed)",
            report.objects.len(),
            report.failures.len()
        );
        Ok(report)
    }

    async fn run_tasks(&self, tasks: Vec<GenerationRequest>, workers: usize) -> Vec<GenerationOutcome> {
        let mut slots: Vec<Option<GenerationOutcome>> = vec![None; tasks.len()];
        let kinds: Vec<ObjectKind> = tasks.iter().map(|t| t.kind).collect();
        let permits = Arc::new(Semaphore::new(workers));
        let deadline = self.config.generation_timeout();
        let mut set = JoinSet::new();

        for (slot, request) in tasks.into_iter().enumerate() {
            let registry = Arc::clone(&self.registry);
            let permits = Arc::clone(&permits);

            set.spawn(async move {
                let result = match permits.acquire_owned().await {
                    Ok(permit) => generate_one(&registry, request, permit, deadline).await,
                    Err(e) => Err(SynthError::Worker(format!("Permit error: {}", e))),
                };
                (slot, request.kind, result)
            });
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((slot, kind, Ok(objects))) => {
                    info!("Generated {} {} objects", objects.len(), kind);
                    slots[slot] = Some(GenerationOutcome::Generated { kind, objects });
                }
                Ok((slot, kind, Err(e))) => {
                    error!("{} generation failed: {}", kind, e);
                    slots[slot] = Some(GenerationOutcome::Failed { kind, error: e });
                }
                Err(e) => error!("Generation task failed to complete: {}", e),
            }
        }

        slots
            .into_iter()
            .zip(kinds)
            .map(|(slot, kind)| {
                slot.unwrap_or_else(|| GenerationOutcome::Failed {
                    kind,
                    error: SynthError::Worker("Task did not complete".to_string()),
                })
            })
            .collect()
    }
}

/// Run one generator on a blocking thread
///
/// The worker permit is released when the generator returns, not when the
/// deadline passes, so abandoned generators still occupy their worker.
async fn generate_one(
    registry: &GeneratorRegistry,
    request: GenerationRequest,
    permit: OwnedSemaphorePermit,
    deadline: std::time::Duration,
) -> Result<Vec<StixObject>, SynthError> {
    let generator = registry.get(request.kind)?;

    // Generators are blocking
    let task = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        generator.generate(request.count)
    });

    timeout(deadline, task)
        .await
        .map_err(|_| SynthError::Timeout(deadline.as_secs()))?
        .map_err(|e| SynthError::Worker(format!("Task join error: {}", e)))?
}
