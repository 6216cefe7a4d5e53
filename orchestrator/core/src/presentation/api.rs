// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! HTTP API (axum)
//!
//! | Method | Path | Behaviour |
//! |--------|------|-----------|
//! | `POST` | `/api/agents/{agent_id}` | Dispatch one request |
//! | `GET` | `/api/agents` | Registered descriptors |
//! | `GET` | `/api/agents/{agent_id}` | One descriptor |
//! | `GET` | `/api/capabilities/{capability}` | Descriptors offering a capability |
//! | `POST` | `/api/capabilities/{capability}` | Dispatch to the best agent for a capability |
//! | `POST` | `/api/dispatch` | Concurrent batch, responses in call order |
//! | `GET` | `/api/metrics` | Measured dispatch statistics |
//! | `GET` | `/api/events` | Server-sent dispatch and health events |
//! | `GET` | `/health` | Latest health snapshot |
//!
//! Every `/api` response body is an [`AgentResponse`] envelope. Dispatch
//! responses are 200 for handler-level failures (including timeouts); only an
//! unknown agent (404), a handler panic (500) and an unreadable body (400)
//! change the status. An unknown agent is reported as 404 even when the body
//! is also unreadable.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;
use tokio_stream::{wrappers::BroadcastStream, StreamExt};
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::application::bootstrap::AgentHost;
use crate::application::dispatcher::{DispatchError, DispatchOutcome};
use crate::application::health::HealthStatus;
use crate::domain::agent::AgentId;
use crate::domain::envelope::{AgentRequest, AgentResponse};
use crate::infrastructure::event_bus::DomainEvent;

pub struct AppState {
    pub host: AgentHost,
    pub started_at: Instant,
}

pub fn router(host: AgentHost) -> Router {
    let state = Arc::new(AppState {
        host,
        started_at: Instant::now(),
    });

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/agents", get(list_agents_handler))
        .route(
            "/api/agents/{agent_id}",
            get(get_agent_handler).post(invoke_agent_handler),
        )
        .route(
            "/api/capabilities/{capability}",
            get(list_capability_handler).post(invoke_capability_handler),
        )
        .route("/api/dispatch", post(batch_handler))
        .route("/api/metrics", get(metrics_handler))
        .route("/api/events", get(events_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Status code for a dispatch outcome.
pub fn status_for(outcome: &DispatchOutcome) -> StatusCode {
    match &outcome.error {
        Some(DispatchError::AgentNotFound(_)) | Some(DispatchError::CapabilityUnavailable(_)) => {
            StatusCode::NOT_FOUND
        }
        Some(DispatchError::Internal(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::OK,
    }
}

fn envelope(status: StatusCode, response: AgentResponse) -> Response {
    (status, Json(response)).into_response()
}

fn bad_request(rejection: JsonRejection) -> Response {
    debug!(error = %rejection.body_text(), "Rejected request body");
    envelope(
        StatusCode::BAD_REQUEST,
        AgentResponse::failure(format!("invalid_request: {}", rejection.body_text())),
    )
}

fn agent_not_found(agent_id: AgentId) -> Response {
    envelope(
        StatusCode::NOT_FOUND,
        AgentResponse::failure(DispatchError::AgentNotFound(agent_id).to_string()),
    )
}

async fn invoke_agent_handler(
    State(state): State<Arc<AppState>>,
    Path(agent_id): Path<String>,
    body: Result<Json<AgentRequest>, JsonRejection>,
) -> Response {
    let agent_id = AgentId::from(agent_id);
    let Json(request) = match body {
        Ok(body) => body,
        // An unresolvable path outranks a bad body.
        Err(_) if !state.host.dispatcher.registry().contains(&agent_id) => {
            return agent_not_found(agent_id)
        }
        Err(rejection) => return bad_request(rejection),
    };

    let outcome = state.host.dispatcher.dispatch_outcome(&agent_id, request).await;
    envelope(status_for(&outcome), outcome.response)
}

async fn list_agents_handler(State(state): State<Arc<AppState>>) -> Json<AgentResponse> {
    let agents: Vec<_> = state.host.dispatcher.registry().list().collect();
    Json(AgentResponse::ok(json!(agents)))
}

async fn get_agent_handler(
    State(state): State<Arc<AppState>>,
    Path(agent_id): Path<String>,
) -> Response {
    let agent_id = AgentId::from(agent_id);
    match state.host.dispatcher.registry().get(&agent_id) {
        Ok(descriptor) => envelope(StatusCode::OK, AgentResponse::ok(json!(descriptor))),
        Err(_) => agent_not_found(agent_id),
    }
}

async fn list_capability_handler(
    State(state): State<Arc<AppState>>,
    Path(capability): Path<String>,
) -> Json<AgentResponse> {
    let agents = state.host.dispatcher.registry().list_by_capability(&capability);
    Json(AgentResponse::ok(json!(agents)))
}

async fn invoke_capability_handler(
    State(state): State<Arc<AppState>>,
    Path(capability): Path<String>,
    body: Result<Json<AgentRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return bad_request(rejection),
    };

    let outcome = state
        .host
        .dispatcher
        .dispatch_capability(&capability, request)
        .await;
    envelope(status_for(&outcome), outcome.response)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchCall {
    pub agent_id: AgentId,
    #[serde(flatten)]
    pub request: AgentRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    pub calls: Vec<BatchCall>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    pub responses: Vec<AgentResponse>,
}

async fn batch_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<BatchRequest>, JsonRejection>,
) -> Response {
    let Json(batch) = match body {
        Ok(body) => body,
        Err(rejection) => return bad_request(rejection),
    };

    let calls = batch
        .calls
        .into_iter()
        .map(|call| (call.agent_id, call.request))
        .collect();
    let responses = state.host.dispatcher.dispatch_batch(calls).await;
    (StatusCode::OK, Json(BatchResponse { responses })).into_response()
}

async fn metrics_handler(State(state): State<Arc<AppState>>) -> Json<AgentResponse> {
    let stats = state.host.dispatcher.stats();
    Json(AgentResponse::ok(json!({
        "agents": stats.snapshot(),
        "notFound": stats.not_found(),
    })))
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Response {
    let snapshot = state.host.health.latest();
    let overall = snapshot.overall();
    let status = if overall == HealthStatus::Unhealthy {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    let body = json!({
        "status": overall,
        "uptimeSeconds": state.started_at.elapsed().as_secs(),
        "generation": snapshot.generation,
        "generatedAt": snapshot.generated_at,
        "agents": snapshot.agents,
    });
    (status, Json(body)).into_response()
}

async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.host.event_bus.raw_receiver()).filter_map(|received| {
        // Lagged receivers skip ahead rather than closing the stream
        let event = received.ok()?;
        let name = match &event {
            DomainEvent::Dispatch(_) => "dispatch",
            DomainEvent::Health(_) => "health",
        };
        Event::default().event(name).json_data(&event).ok().map(Ok)
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
