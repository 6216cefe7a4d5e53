// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use hireflow_core::application::bootstrap::build_registry;
use hireflow_core::application::dispatcher::{Dispatcher, DispatcherConfig};
use hireflow_core::domain::agent::{AgentDescriptor, AgentId};
use hireflow_core::domain::envelope::{AgentRequest, HandlerOutput};
use hireflow_core::domain::handler::{AgentHandler, HandlerError};
use hireflow_core::domain::node_config::default_agents;
use hireflow_core::domain::registry::{AgentRegistry, RegistryError};
use hireflow_core::infrastructure::event_bus::{DomainEvent, EventBus};
use hireflow_core::domain::events::DispatchEvent;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Echoes its agent id and the `seq` param back after an optional delay.
struct Echo {
    id: String,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl AgentHandler for Echo {
    async fn handle(&self, request: &AgentRequest) -> Result<HandlerOutput, HandlerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(HandlerOutput::new(json!({
            "agent": self.id,
            "seq": request.params.get("seq").cloned(),
        })))
    }
}

struct Panicking;

#[async_trait]
impl AgentHandler for Panicking {
    async fn handle(&self, _request: &AgentRequest) -> Result<HandlerOutput, HandlerError> {
        panic!("handler bug");
    }
}

fn echo(id: &str, delay: Duration) -> (Arc<Echo>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    (
        Arc::new(Echo {
            id: id.to_string(),
            delay,
            calls: calls.clone(),
        }),
        calls,
    )
}

fn dispatcher(registry: AgentRegistry, timeout: Duration) -> Dispatcher {
    Dispatcher::new(
        Arc::new(registry),
        DispatcherConfig {
            default_timeout: timeout,
        },
        EventBus::with_default_capacity(),
    )
}

#[tokio::test]
async fn test_unknown_agent_never_reaches_a_handler() {
    let (handler, calls) = echo("known", Duration::ZERO);
    let mut registry = AgentRegistry::new();
    registry
        .register(AgentDescriptor::new("known", "Known"), handler)
        .unwrap();
    let dispatcher = dispatcher(registry, Duration::from_secs(5));
    let mut events = dispatcher.event_bus().subscribe();

    let response = dispatcher
        .dispatch(&AgentId::from("nonexistent-agent"), AgentRequest::new("anything"))
        .await;

    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some("agent_not_found"));
    assert!(response.data.is_none());
    assert!(response.metadata.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(dispatcher.stats().not_found(), 1);

    match events.recv().await.unwrap() {
        DomainEvent::Dispatch(DispatchEvent::AgentNotFound { agent_id, .. }) => {
            assert_eq!(agent_id.as_str(), "nonexistent-agent");
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn test_dispatch_returns_envelope_for_every_failure_class() {
    let (slow, _) = echo("slow", Duration::from_secs(10));
    let mut registry = AgentRegistry::new();
    registry.register(AgentDescriptor::new("slow", "Slow"), slow).unwrap();
    registry
        .register(AgentDescriptor::new("broken", "Broken"), Arc::new(Panicking))
        .unwrap();
    for agent in default_agents() {
        let handler = hireflow_core::infrastructure::handlers::create_handler(agent.handler_key()).unwrap();
        registry.register(agent.descriptor, handler).unwrap();
    }
    let dispatcher = dispatcher(registry, Duration::from_millis(50));

    let cases = [
        ("slow", AgentRequest::new("wait"), "timeout"),
        ("broken", AgentRequest::new("crash"), "Failed to process request"),
        ("dictionary-bot", AgentRequest::new("translate"), "unsupported action 'translate'"),
        ("missing", AgentRequest::new("lookup"), "agent_not_found"),
    ];

    for (agent, request, expected) in cases {
        let response = dispatcher.dispatch(&AgentId::from(agent), request).await;
        assert!(!response.success, "{agent} should fail");
        assert_eq!(response.error.as_deref(), Some(expected));
        assert!(response.data.is_none());
    }
}

#[tokio::test]
async fn test_timeout_fires_within_bound_and_aborts_handler() {
    let (slow, calls) = echo("slow", Duration::from_secs(30));
    let mut registry = AgentRegistry::new();
    registry.register(AgentDescriptor::new("slow", "Slow"), slow).unwrap();
    let dispatcher = dispatcher(registry, Duration::from_millis(100));

    let started = Instant::now();
    let response = dispatcher.dispatch(&AgentId::from("slow"), AgentRequest::new("wait")).await;
    let elapsed = started.elapsed();

    assert_eq!(response.error.as_deref(), Some("timeout"));
    assert!(elapsed >= Duration::from_millis(100));
    assert!(elapsed < Duration::from_secs(1), "took {elapsed:?}");
    assert!(response.metadata.unwrap().processing_time_ms >= 100);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let stats = dispatcher.stats().agent(&AgentId::from("slow")).unwrap();
    assert_eq!(stats.timeouts, 1);
}

#[tokio::test]
async fn test_per_agent_timeout_overrides_default() {
    let (slow, _) = echo("slow", Duration::from_millis(200));
    let mut registry = AgentRegistry::new();
    registry
        .register(
            AgentDescriptor::new("slow", "Slow").with_timeout(Duration::from_secs(2)),
            slow,
        )
        .unwrap();
    let dispatcher = dispatcher(registry, Duration::from_millis(20));

    let response = dispatcher.dispatch(&AgentId::from("slow"), AgentRequest::new("wait")).await;
    assert!(response.success, "{:?}", response.error);
}

#[tokio::test]
async fn test_concurrent_dispatches_correlate_with_their_callers() {
    let mut registry = AgentRegistry::new();
    let ids: Vec<String> = (0..128).map(|i| format!("echo-{i:03}")).collect();
    for (i, id) in ids.iter().enumerate() {
        let (handler, _) = echo(id, Duration::from_millis((i as u64 % 3) * 5));
        registry.register(AgentDescriptor::new(id.as_str(), id.as_str()), handler).unwrap();
    }
    let dispatcher = Arc::new(dispatcher(registry, Duration::from_secs(5)));

    // Each agent is called exactly once, so a crossed response names the wrong agent.
    let tasks: Vec<_> = ids
        .iter()
        .enumerate()
        .map(|(seq, agent)| {
            let dispatcher = dispatcher.clone();
            let agent = agent.clone();
            let seq = seq as u64;
            tokio::spawn(async move {
                let request = AgentRequest::new("echo").with_param("seq", seq);
                let response = dispatcher.dispatch(&AgentId::from(agent.as_str()), request).await;
                (agent, seq, response)
            })
        })
        .collect();

    for task in tasks {
        let (agent, seq, response) = task.await.unwrap();
        let data = response.data.expect("echo succeeds");
        assert_eq!(data["agent"], agent.as_str());
        assert_eq!(data["seq"], seq);
    }
    assert_eq!(dispatcher.stats().snapshot().len(), 128);

    let total: u64 = dispatcher
        .stats()
        .snapshot()
        .values()
        .map(|s| s.successes)
        .sum();
    assert_eq!(total, 128);
}

#[tokio::test]
async fn test_batch_preserves_order_and_isolates_failures() {
    let registry = build_registry(&default_agents()).unwrap();
    let dispatcher = dispatcher(registry, Duration::from_secs(5));

    let responses = dispatcher
        .dispatch_batch(vec![
            (
                AgentId::from("dictionary-bot"),
                AgentRequest::new("lookup").with_param("term", "Rust"),
            ),
            (AgentId::from("ghost"), AgentRequest::new("lookup")),
            (
                AgentId::from("culture-matcher"),
                AgentRequest::new("dimensions").with_param("unused", true),
            ),
        ])
        .await;

    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0].data.as_ref().unwrap()["term"], "Rust");
    assert_eq!(responses[1].error.as_deref(), Some("agent_not_found"));
    assert!(responses[2].success);
}

#[tokio::test]
async fn test_pure_handlers_are_idempotent() {
    let registry = build_registry(&default_agents()).unwrap();
    let dispatcher = dispatcher(registry, Duration::from_secs(5));

    let request = AgentRequest::new("match")
        .with_param("candidateValues", json!(["teamwork", "ownership"]))
        .with_param("companyValues", json!(["Collaboration", "Autonomy", "Speed"]));

    let first = dispatcher.dispatch(&AgentId::from("culture-matcher"), request.clone()).await;
    let second = dispatcher.dispatch(&AgentId::from("culture-matcher"), request).await;

    assert!(first.success);
    assert_eq!(first.success, second.success);
    assert_eq!(first.data, second.data);
}

#[tokio::test]
async fn test_dictionary_bot_defines_kubernetes() {
    let registry = build_registry(&default_agents()).unwrap();
    let dispatcher = dispatcher(registry, Duration::from_secs(5));

    let response = dispatcher
        .dispatch(
            &AgentId::from("dictionary-bot"),
            AgentRequest::new("lookup").with_param("term", "Kubernetes"),
        )
        .await;

    assert!(response.success);
    let data = response.data.unwrap();
    assert_eq!(data["term"], "Kubernetes");
    assert!(data["definition"].as_str().unwrap().contains("container orchestration"));
    assert!(response.metadata.is_some());
}

#[test]
fn test_duplicate_registration_keeps_first_descriptor() {
    let (first, _) = echo("first", Duration::ZERO);
    let (second, _) = echo("second", Duration::ZERO);
    let mut registry = AgentRegistry::new();
    registry
        .register(AgentDescriptor::new("dup", "Original").with_priority(1), first)
        .unwrap();

    let err = registry
        .register(AgentDescriptor::new("dup", "Replacement").with_priority(9), second)
        .unwrap_err();

    assert!(matches!(err, RegistryError::DuplicateAgent(ref id) if id.as_str() == "dup"));
    let kept = registry.get(&AgentId::from("dup")).unwrap();
    assert_eq!(kept.name, "Original");
    assert_eq!(kept.priority, 1);
    assert_eq!(registry.len(), 1);
}
