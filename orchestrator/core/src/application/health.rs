// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Agent Health Monitor
//!
//! Each check cycle probes every registered handler and publishes a brand-new
//! [`HealthSnapshot`] on a `watch` channel. Readers receive snapshots by value
//! and never observe a snapshot while it is being built.
//!
//! Status transitions (healthy -> unhealthy and back) are also published on the
//! [`EventBus`] as [`HealthEvent`]s.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::agent::AgentId;
use crate::domain::events::HealthEvent;
use crate::domain::registry::AgentRegistry;
use crate::infrastructure::event_bus::EventBus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Unknown,
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentHealth {
    pub status: HealthStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_at: Option<DateTime<Utc>>,
    pub latency_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSnapshot {
    /// Incremented once per completed check cycle; 0 means never checked
    pub generation: u64,
    pub generated_at: DateTime<Utc>,
    pub agents: BTreeMap<AgentId, AgentHealth>,
}

impl HealthSnapshot {
    fn initial(registry: &AgentRegistry) -> Self {
        Self {
            generation: 0,
            generated_at: Utc::now(),
            agents: registry
                .list()
                .map(|descriptor| {
                    (
                        descriptor.id.clone(),
                        AgentHealth {
                            status: HealthStatus::Unknown,
                            detail: None,
                            checked_at: None,
                            latency_ms: 0,
                        },
                    )
                })
                .collect(),
        }
    }

    /// Unhealthy if any agent is, unknown until the first cycle, else healthy.
    pub fn overall(&self) -> HealthStatus {
        if self.agents.values().any(|a| a.status == HealthStatus::Unhealthy) {
            HealthStatus::Unhealthy
        } else if self.agents.values().any(|a| a.status == HealthStatus::Unknown) {
            HealthStatus::Unknown
        } else {
            HealthStatus::Healthy
        }
    }
}

pub struct HealthMonitor {
    registry: Arc<AgentRegistry>,
    event_bus: EventBus,
    probe_timeout: Duration,
    sender: watch::Sender<HealthSnapshot>,
}

impl HealthMonitor {
    pub fn new(registry: Arc<AgentRegistry>, event_bus: EventBus, probe_timeout: Duration) -> Self {
        let (sender, _) = watch::channel(HealthSnapshot::initial(&registry));
        Self {
            registry,
            event_bus,
            probe_timeout,
            sender,
        }
    }

    pub fn latest(&self) -> HealthSnapshot {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<HealthSnapshot> {
        self.sender.subscribe()
    }

    /// Run one check cycle and publish the resulting snapshot.
    pub async fn check_now(&self) -> HealthSnapshot {
        let probes = self.registry.agents().iter().map(|agent| {
            let id = agent.descriptor.id.clone();
            let handler = agent.handler.clone();
            let limit = self.probe_timeout;
            async move {
                let started = Instant::now();
                let (status, detail) = match tokio::time::timeout(limit, handler.health_check()).await {
                    Ok(Ok(())) => (HealthStatus::Healthy, None),
                    Ok(Err(e)) => (HealthStatus::Unhealthy, Some(e.to_string())),
                    Err(_) => (HealthStatus::Unhealthy, Some("health check timed out".to_string())),
                };
                let health = AgentHealth {
                    status,
                    detail,
                    checked_at: Some(Utc::now()),
                    latency_ms: started.elapsed().as_millis() as u64,
                };
                (id, health)
            }
        });
        let results: BTreeMap<AgentId, AgentHealth> = join_all(probes).await.into_iter().collect();

        let previous = self.latest();
        self.publish_transitions(&previous, &results);

        let snapshot = HealthSnapshot {
            generation: previous.generation + 1,
            generated_at: Utc::now(),
            agents: results,
        };
        self.sender.send_replace(snapshot.clone());
        debug!(generation = snapshot.generation, "Published health snapshot");
        snapshot
    }

    fn publish_transitions(&self, previous: &HealthSnapshot, current: &BTreeMap<AgentId, AgentHealth>) {
        for (agent_id, health) in current {
            let before = previous
                .agents
                .get(agent_id)
                .map(|h| h.status)
                .unwrap_or(HealthStatus::Unknown);

            match (before, health.status) {
                (HealthStatus::Unhealthy, HealthStatus::Healthy) => {
                    info!(agent_id = %agent_id, "Agent recovered");
                    self.event_bus.publish_health_event(HealthEvent::AgentRecovered {
                        agent_id: agent_id.clone(),
                        recovered_at: Utc::now(),
                    });
                }
                (before, HealthStatus::Unhealthy) if before != HealthStatus::Unhealthy => {
                    let reason = health.detail.clone().unwrap_or_default();
                    warn!(agent_id = %agent_id, reason = %reason, "Agent became unhealthy");
                    self.event_bus.publish_health_event(HealthEvent::AgentBecameUnhealthy {
                        agent_id: agent_id.clone(),
                        reason,
                        detected_at: Utc::now(),
                    });
                }
                _ => {}
            }
        }
    }

    /// Check every `interval` until `cancel` fires.
    pub fn spawn(self: Arc<Self>, interval: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("Health monitor stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        self.check_now().await;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::agent::AgentDescriptor;
    use crate::domain::envelope::{AgentRequest, HandlerOutput};
    use crate::domain::handler::{AgentHandler, HandlerError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Toggle(Arc<AtomicBool>);

    #[async_trait]
    impl AgentHandler for Toggle {
        async fn handle(&self, _request: &AgentRequest) -> Result<HandlerOutput, HandlerError> {
            Ok(HandlerOutput::new(serde_json::Value::Null))
        }

        async fn health_check(&self) -> Result<(), HandlerError> {
            if self.0.load(Ordering::SeqCst) {
                Ok(())
            } else {
                Err(HandlerError::execution("backend unreachable"))
            }
        }
    }

    #[tokio::test]
    async fn test_snapshots_are_replaced_not_mutated() {
        let up = Arc::new(AtomicBool::new(true));
        let mut registry = AgentRegistry::new();
        registry
            .register(AgentDescriptor::new("smart-database", "Smart Database"), Arc::new(Toggle(up.clone())))
            .unwrap();
        let bus = EventBus::new(16);
        let mut events = bus.subscribe();
        let monitor = HealthMonitor::new(Arc::new(registry), bus, Duration::from_secs(1));

        let before = monitor.latest();
        assert_eq!(before.generation, 0);
        assert_eq!(before.overall(), HealthStatus::Unknown);

        let first = monitor.check_now().await;
        assert_eq!(first.generation, 1);
        assert_eq!(first.overall(), HealthStatus::Healthy);
        // the earlier copy is untouched
        assert_eq!(before.overall(), HealthStatus::Unknown);

        up.store(false, Ordering::SeqCst);
        let second = monitor.check_now().await;
        assert_eq!(second.overall(), HealthStatus::Unhealthy);
        assert_eq!(
            second.agents[&AgentId::from("smart-database")].detail.as_deref(),
            Some("backend unreachable")
        );
        assert!(matches!(
            events.recv().await.unwrap(),
            crate::infrastructure::event_bus::DomainEvent::Health(HealthEvent::AgentBecameUnhealthy { .. })
        ));
    }

    #[tokio::test]
    async fn test_watch_receivers_see_latest_snapshot() {
        let mut registry = AgentRegistry::new();
        registry
            .register(
                AgentDescriptor::new("dictionary-bot", "Dictionary Bot"),
                Arc::new(Toggle(Arc::new(AtomicBool::new(true)))),
            )
            .unwrap();
        let monitor = Arc::new(HealthMonitor::new(Arc::new(registry), EventBus::new(4), Duration::from_secs(1)));
        let mut receiver = monitor.subscribe();

        let cancel = CancellationToken::new();
        let task = monitor.clone().spawn(Duration::from_millis(10), cancel.clone());

        receiver.changed().await.unwrap();
        assert!(receiver.borrow().generation >= 1);

        cancel.cancel();
        task.await.unwrap();
    }
}
