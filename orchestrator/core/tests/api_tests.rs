// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use hireflow_core::application::bootstrap::AgentHost;
use hireflow_core::application::dispatcher::DispatcherConfig;
use hireflow_core::domain::agent::AgentDescriptor;
use hireflow_core::domain::envelope::{AgentRequest, HandlerOutput};
use hireflow_core::domain::handler::{AgentHandler, HandlerError};
use hireflow_core::domain::node_config::NodeConfigManifest;
use hireflow_core::domain::registry::AgentRegistry;
use hireflow_core::presentation::api::router;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

struct Panicking;

#[async_trait]
impl AgentHandler for Panicking {
    async fn handle(&self, _request: &AgentRequest) -> Result<HandlerOutput, HandlerError> {
        panic!("handler bug");
    }
}

fn default_app() -> axum::Router {
    router(AgentHost::from_config(&NodeConfigManifest::default()).unwrap())
}

async fn send(app: axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let request = match body {
        Some(body) => request.body(Body::from(body.to_string())).unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_unknown_agent_is_404() {
    let (status, body) = send(
        default_app(),
        "POST",
        "/api/agents/nonexistent-agent",
        Some(json!({"action": "lookup", "params": {}})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"success": false, "error": "agent_not_found"}));
}

#[tokio::test]
async fn test_lookup_returns_envelope_with_metadata() {
    let (status, body) = send(
        default_app(),
        "POST",
        "/api/agents/dictionary-bot",
        Some(json!({"action": "lookup", "params": {"term": "Kubernetes"}})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["term"], "Kubernetes");
    assert!(body["metadata"]["processingTimeMs"].is_u64());
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn test_handler_failure_is_200_with_error() {
    let (status, body) = send(
        default_app(),
        "POST",
        "/api/agents/dictionary-bot",
        Some(json!({"action": "lookup", "params": {"term": "Fortran 77"}})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "no definition found for 'Fortran 77'");
}

#[tokio::test]
async fn test_handler_panic_is_500() {
    let mut registry = AgentRegistry::new();
    registry
        .register(AgentDescriptor::new("broken", "Broken"), Arc::new(Panicking))
        .unwrap();
    let app = router(AgentHost::from_registry(
        registry,
        DispatcherConfig::default(),
        Duration::from_secs(1),
    ));

    let (status, body) = send(app, "POST", "/api/agents/broken", Some(json!({"action": "go"}))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Failed to process request");
}

#[tokio::test]
async fn test_malformed_body_is_400() {
    let (status, body) = send(
        default_app(),
        "POST",
        "/api/agents/dictionary-bot",
        Some(json!({"params": {"term": "Rust"}})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().starts_with("invalid_request: "));
}

#[tokio::test]
async fn test_malformed_body_to_unknown_agent_is_404() {
    let (status, body) = send(
        default_app(),
        "POST",
        "/api/agents/nonexistent-agent",
        Some(json!({"params": {"term": "Rust"}})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"success": false, "error": "agent_not_found"}));
}

#[tokio::test]
async fn test_agent_listing_and_lookup() {
    let (status, body) = send(default_app(), "GET", "/api/agents", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["smart-database", "dictionary-bot", "culture-matcher"]);

    let (status, body) = send(default_app(), "GET", "/api/agents/culture-matcher", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["dependencies"], json!(["smart-database"]));

    let (status, _) = send(default_app(), "GET", "/api/agents/recruiter", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_capability_routing() {
    let (status, body) = send(default_app(), "GET", "/api/capabilities/lookup", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["id"], "dictionary-bot");

    let (status, body) = send(
        default_app(),
        "POST",
        "/api/capabilities/lookup",
        Some(json!({"action": "lookup", "params": {"term": "ATS"}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["term"], "ATS");

    let (status, body) = send(
        default_app(),
        "POST",
        "/api/capabilities/teleportation",
        Some(json!({"action": "go"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "capability_unavailable");
}

#[tokio::test]
async fn test_batch_dispatch_keeps_call_order() {
    let (status, body) = send(
        default_app(),
        "POST",
        "/api/dispatch",
        Some(json!({
            "calls": [
                {"agentId": "smart-database", "action": "analyze_job", "params": {"title": "Senior Rust Engineer"}},
                {"agentId": "nobody", "action": "noop"},
                {"agentId": "dictionary-bot", "action": "lookup", "params": {"term": "k8s"}}
            ]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let responses = body["responses"].as_array().unwrap();
    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0]["data"]["seniority"], "senior");
    assert_eq!(responses[1]["error"], "agent_not_found");
    assert_eq!(responses[2]["data"]["term"], "Kubernetes");
}

#[tokio::test]
async fn test_metrics_reflect_real_dispatches() {
    let app = default_app();
    send(
        app.clone(),
        "POST",
        "/api/agents/dictionary-bot",
        Some(json!({"action": "lookup", "params": {"term": "SQL"}})),
    )
    .await;
    send(app.clone(), "POST", "/api/agents/ghost", Some(json!({"action": "noop"}))).await;

    let (status, body) = send(app, "GET", "/api/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["agents"]["dictionary-bot"]["calls"], 1);
    assert_eq!(body["data"]["agents"]["dictionary-bot"]["successes"], 1);
    assert_eq!(body["data"]["notFound"], 1);
    assert!(body["data"]["agents"].get("smart-database").is_none());
}

#[tokio::test]
async fn test_health_reports_snapshot() {
    let host = AgentHost::from_config(&NodeConfigManifest::default()).unwrap();
    host.health.check_now().await;

    let (status, body) = send(router(host), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["generation"], 1);
    assert_eq!(body["agents"]["dictionary-bot"]["status"], "healthy");
    assert!(body["uptimeSeconds"].is_u64());
}
