// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Dispatcher
//!
//! Routes an [`AgentRequest`] to the handler registered under an agent id and
//! normalises whatever happens into an [`AgentResponse`]. Nothing propagates
//! past [`Dispatcher::dispatch`]: unknown agents, handler failures, panics and
//! timeouts all come back as a failed envelope, so one failing capability can
//! never abort a multi-agent batch.
//!
//! Each handler invocation runs in its own task under a timeout (the agent's
//! override, else the configured default). On expiry the task is aborted and
//! `{success:false, error:"timeout"}` is returned. There are no retries.
//!
//! The dispatcher is `Send + Sync` and holds only the read-only registry, so
//! concurrent dispatches to the same or different agents need no coordination.

use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::task::AbortOnDropHandle;
use tracing::{debug, error, info, warn};

use crate::application::stats::{DispatchOutcomeKind, DispatchStats};
use crate::domain::agent::{AgentDescriptor, AgentId};
use crate::domain::envelope::{AgentRequest, AgentResponse, HandlerOutput, ResponseMetadata};
use crate::domain::events::{DispatchEvent, DispatchId};
use crate::domain::handler::HandlerError;
use crate::domain::registry::{AgentRegistry, RegisteredAgent};
use crate::infrastructure::event_bus::EventBus;

pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Message returned to callers when a handler fails unexpectedly.
pub const INTERNAL_ERROR_MESSAGE: &str = "Failed to process request";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DispatchError {
    #[error("agent_not_found")]
    AgentNotFound(AgentId),

    #[error("capability_unavailable")]
    CapabilityUnavailable(String),

    #[error(transparent)]
    Handler(#[from] HandlerError),

    #[error("timeout")]
    Timeout(Duration),

    /// Handler panicked or its task was torn down
    #[error("Failed to process request")]
    Internal(String),
}

/// Envelope plus the typed failure behind it, for transports that need to
/// distinguish failure classes (HTTP status mapping).
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub response: AgentResponse,
    pub error: Option<DispatchError>,
}

#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub default_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            default_timeout: DEFAULT_DISPATCH_TIMEOUT,
        }
    }
}

pub struct Dispatcher {
    registry: Arc<AgentRegistry>,
    config: DispatcherConfig,
    event_bus: EventBus,
    stats: Arc<DispatchStats>,
}

impl Dispatcher {
    pub fn new(registry: Arc<AgentRegistry>, config: DispatcherConfig, event_bus: EventBus) -> Self {
        Self {
            registry,
            config,
            event_bus,
            stats: Arc::new(DispatchStats::new()),
        }
    }

    pub fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    pub fn stats(&self) -> &Arc<DispatchStats> {
        &self.stats
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn default_timeout(&self) -> Duration {
        self.config.default_timeout
    }

    pub async fn dispatch(&self, agent_id: &AgentId, request: AgentRequest) -> AgentResponse {
        self.dispatch_outcome(agent_id, request).await.response
    }

    pub async fn dispatch_outcome(&self, agent_id: &AgentId, request: AgentRequest) -> DispatchOutcome {
        let agent = match self.registry.resolve(agent_id) {
            Ok(agent) => agent.clone(),
            Err(_) => {
                warn!(agent_id = %agent_id, action = %request.action, "Dispatch to unknown agent");
                self.stats.record_not_found();
                self.event_bus.publish_dispatch_event(DispatchEvent::AgentNotFound {
                    agent_id: agent_id.clone(),
                    action: request.action,
                    rejected_at: Utc::now(),
                });
                let error = DispatchError::AgentNotFound(agent_id.clone());
                return DispatchOutcome {
                    response: AgentResponse::failure(error.to_string()),
                    error: Some(error),
                };
            }
        };

        self.invoke(agent, request).await
    }

    /// Dispatch to the highest-priority agent offering `capability`.
    pub async fn dispatch_capability(&self, capability: &str, request: AgentRequest) -> DispatchOutcome {
        let target = self
            .registry
            .list_by_capability(capability)
            .first()
            .map(|descriptor| descriptor.id.clone());

        match target {
            Some(agent_id) => self.dispatch_outcome(&agent_id, request).await,
            None => {
                warn!(capability, "No agent offers capability");
                let error = DispatchError::CapabilityUnavailable(capability.to_string());
                DispatchOutcome {
                    response: AgentResponse::failure(error.to_string()),
                    error: Some(error),
                }
            }
        }
    }

    /// Run independent calls concurrently. Responses are returned in call order
    /// and a failed call never affects its siblings.
    pub async fn dispatch_batch(&self, calls: Vec<(AgentId, AgentRequest)>) -> Vec<AgentResponse> {
        debug!(calls = calls.len(), "Dispatching batch");
        join_all(
            calls
                .into_iter()
                .map(|(agent_id, request)| async move { self.dispatch(&agent_id, request).await }),
        )
        .await
    }

    async fn invoke(&self, agent: RegisteredAgent, request: AgentRequest) -> DispatchOutcome {
        let descriptor: &AgentDescriptor = &agent.descriptor;
        let agent_id = descriptor.id.clone();
        let timeout = descriptor.timeout.unwrap_or(self.config.default_timeout);
        let action = request.action.clone();
        let dispatch_id = DispatchId::new();

        self.event_bus.publish_dispatch_event(DispatchEvent::DispatchStarted {
            dispatch_id,
            agent_id: agent_id.clone(),
            action: action.clone(),
            started_at: Utc::now(),
        });

        let handler = agent.handler.clone();
        let started = Instant::now();
        // Dropping the handle aborts the handler task
        let task = AbortOnDropHandle::new(tokio::spawn(async move { handler.handle(&request).await }));

        let result: Result<HandlerOutput, DispatchError> = match tokio::time::timeout(timeout, task).await {
            Ok(Ok(Ok(output))) => Ok(output),
            Ok(Ok(Err(e))) => Err(DispatchError::Handler(e)),
            Ok(Err(join_error)) => Err(DispatchError::Internal(join_error.to_string())),
            Err(_) => Err(DispatchError::Timeout(timeout)),
        };
        let elapsed = started.elapsed();
        let duration_ms = elapsed.as_millis() as u64;

        match result {
            Ok(output) => {
                info!(agent_id = %agent_id, action = %action, elapsed_ms = duration_ms, "Dispatch completed");
                self.stats
                    .record(&agent_id, DispatchOutcomeKind::Success, elapsed, output.tokens_used);
                self.event_bus.publish_dispatch_event(DispatchEvent::DispatchCompleted {
                    dispatch_id,
                    agent_id,
                    action,
                    duration_ms,
                    completed_at: Utc::now(),
                });

                let metadata = ResponseMetadata {
                    processing_time_ms: duration_ms,
                    cost: output.cost,
                    tokens_used: output.tokens_used,
                };
                DispatchOutcome {
                    response: AgentResponse::ok(output.data).with_metadata(metadata),
                    error: None,
                }
            }
            Err(error) => {
                let kind = match &error {
                    DispatchError::Timeout(limit) => {
                        warn!(agent_id = %agent_id, action = %action, timeout_ms = limit.as_millis() as u64, "Dispatch timed out");
                        self.event_bus.publish_dispatch_event(DispatchEvent::DispatchTimedOut {
                            dispatch_id,
                            agent_id: agent_id.clone(),
                            action,
                            timeout_ms: limit.as_millis() as u64,
                            timed_out_at: Utc::now(),
                        });
                        DispatchOutcomeKind::Timeout
                    }
                    other => {
                        let kind = if let DispatchError::Internal(detail) = other {
                            error!(agent_id = %agent_id, action = %action, detail = %detail, "Handler task failed");
                            DispatchOutcomeKind::Panic
                        } else {
                            warn!(agent_id = %agent_id, action = %action, error = %other, "Dispatch failed");
                            DispatchOutcomeKind::Failure
                        };
                        self.event_bus.publish_dispatch_event(DispatchEvent::DispatchFailed {
                            dispatch_id,
                            agent_id: agent_id.clone(),
                            action,
                            error: other.to_string(),
                            duration_ms,
                            failed_at: Utc::now(),
                        });
                        kind
                    }
                };
                self.stats.record(&agent_id, kind, elapsed, None);

                let metadata = ResponseMetadata {
                    processing_time_ms: duration_ms,
                    ..Default::default()
                };
                DispatchOutcome {
                    response: AgentResponse::failure(error.to_string()).with_metadata(metadata),
                    error: Some(error),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::handler::AgentHandler;
    use async_trait::async_trait;
    use serde_json::json;

    struct Failing;

    #[async_trait]
    impl AgentHandler for Failing {
        async fn handle(&self, request: &AgentRequest) -> Result<HandlerOutput, HandlerError> {
            Err(HandlerError::UnsupportedAction(request.action.clone()))
        }
    }

    struct Metered;

    #[async_trait]
    impl AgentHandler for Metered {
        async fn handle(&self, _request: &AgentRequest) -> Result<HandlerOutput, HandlerError> {
            Ok(HandlerOutput::new(json!({"ok": true})).with_usage(42, 0.01))
        }
    }

    fn dispatcher() -> Dispatcher {
        let mut registry = AgentRegistry::new();
        registry
            .register(AgentDescriptor::new("failing", "Failing"), Arc::new(Failing))
            .unwrap();
        registry
            .register(AgentDescriptor::new("metered", "Metered").with_capability("score"), Arc::new(Metered))
            .unwrap();
        Dispatcher::new(Arc::new(registry), DispatcherConfig::default(), EventBus::new(16))
    }

    #[tokio::test]
    async fn test_handler_error_becomes_failed_envelope() {
        let outcome = dispatcher()
            .dispatch_outcome(&"failing".into(), AgentRequest::new("dance"))
            .await;

        assert!(!outcome.response.success);
        assert_eq!(outcome.response.error.as_deref(), Some("unsupported action 'dance'"));
        assert!(outcome.response.data.is_none());
        assert!(outcome.response.metadata.is_some());
        assert!(matches!(outcome.error, Some(DispatchError::Handler(HandlerError::UnsupportedAction(_)))));
    }

    #[tokio::test]
    async fn test_reported_usage_lands_in_metadata() {
        let response = dispatcher().dispatch(&"metered".into(), AgentRequest::new("score")).await;

        let metadata = response.metadata.unwrap();
        assert_eq!(metadata.tokens_used, Some(42));
        assert_eq!(metadata.cost, Some(0.01));
    }

    #[tokio::test]
    async fn test_dispatch_capability_routes_and_reports_missing() {
        let dispatcher = dispatcher();

        let routed = dispatcher.dispatch_capability("score", AgentRequest::new("score")).await;
        assert!(routed.response.success);

        let missing = dispatcher.dispatch_capability("offer", AgentRequest::new("send")).await;
        assert_eq!(missing.response.error.as_deref(), Some("capability_unavailable"));
        assert!(missing.response.metadata.is_none());
    }

    #[tokio::test]
    async fn test_stats_follow_dispatches() {
        let dispatcher = dispatcher();
        dispatcher.dispatch(&"metered".into(), AgentRequest::new("score")).await;
        dispatcher.dispatch(&"failing".into(), AgentRequest::new("x")).await;
        dispatcher.dispatch(&"nobody".into(), AgentRequest::new("x")).await;

        let stats = dispatcher.stats();
        assert_eq!(stats.agent(&"metered".into()).unwrap().successes, 1);
        assert_eq!(stats.agent(&"failing".into()).unwrap().failures, 1);
        assert_eq!(stats.not_found(), 1);
    }
}
