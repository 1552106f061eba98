//! Integration tests for the stixstory HTTP service

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use std::io::Write;
use std::sync::Arc;
use stixstory_agent::AgentConfig;
use stixstory_agent::RelationshipAgent;
use stixstory_domain::CompatibilityTable;
use stixstory_llm::{ConfiguredProvider, MockProvider};
use stixstory_server::{
    build_state,
    config::ServerConfig,
    handlers::{create_router, AppState, HealthCheckResponse, RelationshipsResponse},
    ServerError,
};
use stixstory_synth::{GeneratorRegistry, SynthConfig, Synthesizer};
use tower::ServiceExt; // for oneshot

/// Scripted oracle: generation, relationship, story and evaluation prompts
fn scripted_llm() -> MockProvider {
    let mut llm = MockProvider::new(r#"{"relationship_type": "targets", "justification": "Sector focus."}"#)
        .with_model_name("scripted");
    llm.add_response("threat-actor objects", r#"[{"name": "Silent Griffin", "description": "Espionage."}]"#);
    llm.add_response("identity objects", r#"[{"name": "Contoso Defense", "description": "Contractor."}]"#);
    llm.add_response("Given the following STIX relationships", "Silent Griffin targeted Contoso.");
    llm.add_response("\nStory:\n", r#"{"score": 8, "justification": "Coherent."}"#);
    llm
}

/// Helper to create test application state
fn create_test_state(llm: MockProvider) -> AppState {
    let llm = Arc::new(ConfiguredProvider::Mock(llm));
    let agent = RelationshipAgent::from_shared(
        Arc::clone(&llm),
        Arc::new(CompatibilityTable::stix_default()),
        AgentConfig::default(),
    )
    .unwrap();
    let synth = Synthesizer::new(GeneratorRegistry::with_llm(llm), SynthConfig::default()).unwrap();

    AppState {
        agent: Arc::new(agent),
        synth: Arc::new(synth),
        model: "scripted".to_string(),
    }
}

async fn post_json(app: axum::Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_health_check_endpoint() {
    let app = create_router(create_test_state(scripted_llm()));

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let health: HealthCheckResponse = serde_json::from_slice(&body).unwrap();

    assert_eq!(health.status, "healthy");
    assert_eq!(health.model, "scripted");
}

#[tokio::test]
async fn test_generate_graph_end_to_end() {
    let app = create_router(create_test_state(scripted_llm()));

    let (status, json) = post_json(
        app,
        "/generate-graph",
        r#"{"counts": {"threat-actor": 1, "identity": 1}}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);

    let bundle = &json["stix_bundle"];
    assert_eq!(bundle["type"], "bundle");
    assert!(bundle["id"].as_str().unwrap().starts_with("bundle--"));

    // Both directions permit "targets"
    let relationships = json["relationships"].as_array().unwrap();
    assert_eq!(relationships.len(), 2);
    assert_eq!(relationships[0]["type"], "targets");
    assert_eq!(bundle["objects"].as_array().unwrap().len(), 4);

    assert_eq!(json["story"], "Silent Griffin targeted Contoso.");
    assert_eq!(json["evaluation"]["score"], 8.0);
    assert_eq!(json["metadata"]["objects_considered"], 2);
    assert_eq!(json["failures"], serde_json::json!([]));
}

#[tokio::test]
async fn test_generate_graph_reports_failed_kinds() {
    let mut llm = MockProvider::new("[]");
    llm.add_error("malware objects");
    let app = create_router(create_test_state(llm));

    let (status, json) = post_json(app, "/generate-graph", r#"{"counts": {"malware": 2}}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["failures"][0]["kind"], "malware");
    assert!(json["relationships"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_generate_graph_unknown_kind() {
    let llm = MockProvider::new("[]");
    let app = create_router(create_test_state(llm.clone()));

    let (status, json) = post_json(app, "/generate-graph", r#"{"counts": {"dragon": 1}}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("dragon"));
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_generate_graph_over_limit() {
    let app = create_router(create_test_state(scripted_llm()));

    let (status, _) = post_json(app, "/generate-graph", r#"{"counts": {"tool": 100000}}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generate_graph_empty_counts() {
    let app = create_router(create_test_state(scripted_llm()));

    let (status, json) = post_json(app, "/generate-graph", r#"{"counts": {}}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["stix_bundle"]["objects"].as_array().unwrap().is_empty());
    assert!(json["relationships"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_relationships_endpoint() {
    let app = create_router(create_test_state(scripted_llm()));

    let body = r#"{"objects": [
        {"id": "threat-actor--a", "type": "threat-actor", "name": "Silent Griffin"},
        {"id": "malware--b", "type": "malware", "name": "GriffinRAT", "labels": ["remote-access-trojan"]}
    ]}"#;
    let request = Request::builder()
        .method("POST")
        .uri("/relationships")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let result: RelationshipsResponse = serde_json::from_slice(&bytes).unwrap();

    // "targets" is permitted in neither direction between these kinds
    assert!(result.relationships.is_empty());
    assert_eq!(result.metadata.candidates_evaluated, 2);
    assert_eq!(result.metadata.rejected_labels, 2);
    assert_eq!(result.story, "Silent Griffin targeted Contoso.");
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let app = create_router(create_test_state(scripted_llm()));

    let (status, _) = post_json(app, "/relationships", "{not json").await;
    assert!(status.is_client_error());
}

#[test]
fn test_config_file_with_custom_table() {
    let mut table_file = tempfile::NamedTempFile::new().unwrap();
    writeln!(table_file, "[threat-actor]\nidentity = [\"targets\"]").unwrap();

    let mut config_file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        config_file,
        "bind_port = 8088\ncompatibility = \"{}\"\n\n[llm]\nprovider = \"mock\"\nmodel = \"mock\"",
        table_file.path().display()
    )
    .unwrap();

    let config = ServerConfig::from_file(config_file.path()).unwrap();
    assert_eq!(config.bind_port, 8088);

    let table = config.compatibility_table().unwrap();
    assert_eq!(table.pair_count(), 1);
    assert!(build_state(&config).is_ok());
}

#[test]
fn test_empty_table_fails_startup() {
    let mut table_file = tempfile::NamedTempFile::new().unwrap();
    writeln!(table_file, "[threat-actor]\nidentity = []").unwrap();

    let config = ServerConfig {
        compatibility: Some(table_file.path().to_path_buf()),
        ..ServerConfig::default_test_config()
    };
    assert!(matches!(build_state(&config), Err(ServerError::Config(_))));
}
