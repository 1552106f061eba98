//! HTTP request handlers for the stixstory service.
//!
//! Graph generation, relationship inference over caller-supplied objects,
//! and a health check, using axum.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use stixstory_agent::{Evaluation, RelationshipAgent, RunMetadata, RunResult};
use stixstory_domain::{Relationship, StixObject};
use stixstory_llm::ConfiguredProvider;
use stixstory_synth::{Bundle, GenerationFailure, SynthError, Synthesizer};
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Relationship agent, built once at startup
    pub agent: Arc<RelationshipAgent<ConfiguredProvider>>,
    /// Object generator pool
    pub synth: Arc<Synthesizer>,
    /// Model reported by the health check
    pub model: String,
}

/// Graph generation request: objects to create per type tag
#[derive(Debug, Deserialize)]
pub struct GenerateGraphRequest {
    /// Count per type tag, e.g. `{"threat-actor": 2}`
    #[serde(default)]
    pub counts: BTreeMap<String, usize>,
}

/// Relationship inference request over caller-supplied objects
#[derive(Debug, Deserialize)]
pub struct RelationshipsRequest {
    /// Objects to relate
    #[serde(default)]
    pub objects: Vec<StixObject>,
}

/// An edge as the API reports it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipView {
    /// Source object id
    pub source: String,
    /// Edge label
    #[serde(rename = "type")]
    pub relationship_type: String,
    /// Target object id
    pub target: String,
    /// Justification
    pub description: String,
}

impl From<&Relationship> for RelationshipView {
    fn from(edge: &Relationship) -> Self {
        Self {
            source: edge.source_ref.clone(),
            relationship_type: edge.relationship_type.clone(),
            target: edge.target_ref.clone(),
            description: edge.description.clone(),
        }
    }
}

/// Response to `POST /relationships`
#[derive(Debug, Serialize, Deserialize)]
pub struct RelationshipsResponse {
    /// Accepted edges
    pub relationships: Vec<RelationshipView>,
    /// Threat narrative
    pub story: String,
    /// Self-evaluation
    pub evaluation: Evaluation,
    /// Run counters
    pub metadata: RunMetadata,
}

impl From<RunResult> for RelationshipsResponse {
    fn from(result: RunResult) -> Self {
        Self {
            relationships: result.edges.iter().map(RelationshipView::from).collect(),
            story: result.narrative,
            evaluation: result.evaluation,
            metadata: result.metadata,
        }
    }
}

/// Response to `POST /generate-graph`
#[derive(Debug, Serialize)]
pub struct GenerateGraphResponse {
    /// Generated objects plus relationship objects
    pub stix_bundle: Bundle,
    /// Accepted edges
    pub relationships: Vec<RelationshipView>,
    /// Threat narrative
    pub story: String,
    /// Self-evaluation
    pub evaluation: Evaluation,
    /// Run counters
    pub metadata: RunMetadata,
    /// Kinds whose generation failed
    pub failures: Vec<GenerationFailure>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
    /// Model behind the oracle
    pub model: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Request named something the service cannot do
    BadRequest(String),
    /// Internal server error
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<SynthError> for AppError {
    fn from(e: SynthError) -> Self {
        match e {
            SynthError::UnknownKind(_) | SynthError::LimitExceeded { .. } => {
                AppError::BadRequest(e.to_string())
            }
            other => AppError::InternalError(other.to_string()),
        }
    }
}

/// POST /generate-graph - Generate objects, infer relationships, bundle
async fn generate_graph(
    State(state): State<AppState>,
    Json(request): Json<GenerateGraphRequest>,
) -> Result<Json<GenerateGraphResponse>, AppError> {
    let plan = state
        .synth
        .plan(request.counts.iter().map(|(tag, count)| (tag.as_str(), *count)))?;

    let report = state.synth.generate_all(&plan).await.map_err(|e| {
        error!("Object generation rejected: {}", e);
        AppError::from(e)
    })?;
    info!("Total STIX objects created: {}", report.objects.len());

    let result = state.agent.run(&report.objects).await;
    let stix_bundle = Bundle::assemble(&report.objects, &result.edges);

    Ok(Json(GenerateGraphResponse {
        stix_bundle,
        relationships: result.edges.iter().map(RelationshipView::from).collect(),
        story: result.narrative,
        evaluation: result.evaluation,
        metadata: result.metadata,
        failures: report.failures,
    }))
}

/// POST /relationships - Infer relationships over supplied objects
async fn infer_relationships(
    State(state): State<AppState>,
    Json(request): Json<RelationshipsRequest>,
) -> Json<RelationshipsResponse> {
    let result = state.agent.run(&request.objects).await;
    Json(result.into())
}

/// GET /health - Liveness and model report
async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        model: state.model.clone(),
    })
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/generate-graph", post(generate_graph))
        .route("/relationships", post(infer_relationships))
        .route("/health", get(health_check))
        .with_state(state)
}
