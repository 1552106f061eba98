//! Stixstory Server
//!
//! HTTP front end: generates synthetic CTI object sets, runs the
//! relationship agent over them, and returns a STIX bundle with the
//! inferred story and its self-evaluation.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;

use config::{ConfigError, ServerConfig};
use handlers::{create_router, AppState};
use std::sync::Arc;
use stixstory_agent::{AgentError, RelationshipAgent};
use stixstory_domain::traits::LlmProvider;
use stixstory_llm::LlmError;
use stixstory_synth::{GeneratorRegistry, SynthError, Synthesizer};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// LLM backend could not be built
    #[error("LLM setup error: {0}")]
    Llm(#[from] LlmError),

    /// Agent rejected its configuration
    #[error("Agent setup error: {0}")]
    Agent(#[from] AgentError),

    /// Generator pool rejected its configuration
    #[error("Generator setup error: {0}")]
    Synth(#[from] SynthError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Build the shared state: one provider, agent and generator pool
pub fn build_state(config: &ServerConfig) -> Result<AppState, ServerError> {
    let llm = Arc::new(config.llm.build()?);
    let table = Arc::new(config.compatibility_table()?);
    let model = llm.model_name().to_string();

    let agent = RelationshipAgent::from_shared(Arc::clone(&llm), table, config.agent.clone())?;
    let synth = Synthesizer::new(GeneratorRegistry::with_llm(llm), config.synth.clone())?;

    Ok(AppState {
        agent: Arc::new(agent),
        synth: Arc::new(synth),
        model,
    })
}

/// Start the HTTP server
///
/// Initializes logging, builds the agent and generators, and serves until
/// the process is stopped.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    // Initialize tracing; RUST_LOG overrides the default level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    info!("Starting stixstory server");
    info!("Bind address: {}", config.bind_addr());
    info!("LLM: {:?} / {}", config.llm.provider, config.llm.model);

    let state = build_state(&config)?;
    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Server listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}
