// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Bootstrap - Application Layer
//!
//! Turns a [`NodeConfigManifest`] into a running agent host: the registry is
//! built once, in roster order, and then shared read-only by the dispatcher and
//! the health monitor.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Wires configuration, handlers, dispatcher and health monitoring

use std::sync::Arc;
use tracing::info;

use crate::application::dispatcher::{Dispatcher, DispatcherConfig};
use crate::application::health::HealthMonitor;
use crate::domain::agent::AgentId;
use crate::domain::node_config::{AgentConfig, NodeConfigManifest};
use crate::domain::registry::{AgentRegistry, RegistryError};
use crate::infrastructure::event_bus::EventBus;
use crate::infrastructure::handlers::{create_handler, HANDLER_KEYS};

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("agent '{agent}' uses unknown handler '{key}' (known: {known})", known = HANDLER_KEYS.join(", "))]
    UnknownHandler { agent: AgentId, key: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Register every roster entry in order. Fails on the first bad entry.
pub fn build_registry(agents: &[AgentConfig]) -> Result<AgentRegistry, BootstrapError> {
    let mut registry = AgentRegistry::new();
    for agent in agents {
        let key = agent.handler_key();
        let handler = create_handler(key).ok_or_else(|| BootstrapError::UnknownHandler {
            agent: agent.descriptor.id.clone(),
            key: key.to_string(),
        })?;
        registry.register(agent.descriptor.clone(), handler)?;
    }
    Ok(registry)
}

/// Manifest validation plus the checks that need the handler table.
pub fn validate_manifest(manifest: &NodeConfigManifest) -> anyhow::Result<()> {
    manifest.validate()?;
    build_registry(&manifest.spec.agents)?;
    Ok(())
}

/// Everything a transport needs to serve agents.
#[derive(Clone)]
pub struct AgentHost {
    pub dispatcher: Arc<Dispatcher>,
    pub health: Arc<HealthMonitor>,
    pub event_bus: EventBus,
}

impl AgentHost {
    pub fn from_config(manifest: &NodeConfigManifest) -> Result<Self, BootstrapError> {
        let registry = build_registry(&manifest.spec.agents)?;
        info!(
            node = %manifest.metadata.name,
            agents = registry.len(),
            timeout = ?manifest.spec.dispatch.timeout,
            "Agent registry built"
        );
        Ok(Self::from_registry(
            registry,
            DispatcherConfig {
                default_timeout: manifest.spec.dispatch.timeout,
            },
            manifest.spec.health.probe_timeout,
        ))
    }

    pub fn from_registry(
        registry: AgentRegistry,
        config: DispatcherConfig,
        probe_timeout: std::time::Duration,
    ) -> Self {
        let registry = Arc::new(registry);
        let event_bus = EventBus::with_default_capacity();
        let dispatcher = Arc::new(Dispatcher::new(registry.clone(), config, event_bus.clone()));
        let health = Arc::new(HealthMonitor::new(registry, event_bus.clone(), probe_timeout));
        Self {
            dispatcher,
            health,
            event_bus,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::agent::AgentDescriptor;
    use crate::domain::envelope::AgentRequest;
    use crate::domain::node_config::default_agents;

    #[test]
    fn test_default_roster_builds_in_order() {
        let registry = build_registry(&default_agents()).unwrap();
        let ids: Vec<&str> = registry.list().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["smart-database", "dictionary-bot", "culture-matcher"]);
    }

    #[test]
    fn test_unknown_handler_is_rejected() {
        let agents = vec![AgentConfig {
            descriptor: AgentDescriptor::new("recruiter", "Recruiter"),
            handler: None,
        }];
        let err = build_registry(&agents).unwrap_err();
        assert!(matches!(err, BootstrapError::UnknownHandler { ref key, .. } if key == "recruiter"));
    }

    #[test]
    fn test_handler_key_aliases_an_implementation() {
        let agents = vec![AgentConfig {
            descriptor: AgentDescriptor::new("glossary", "Glossary"),
            handler: Some("dictionary-bot".to_string()),
        }];
        let registry = build_registry(&agents).unwrap();
        assert!(registry.contains(&AgentId::from("glossary")));
    }

    #[test]
    fn test_validate_manifest_catches_unknown_handler() {
        let mut manifest = NodeConfigManifest::default();
        manifest.spec.agents.push(AgentConfig {
            descriptor: AgentDescriptor::new("sourcer", "Sourcer"),
            handler: None,
        });
        assert!(manifest.validate().is_ok());
        assert!(validate_manifest(&manifest).is_err());
    }

    #[tokio::test]
    async fn test_host_dispatches_to_configured_agents() {
        let host = AgentHost::from_config(&NodeConfigManifest::default()).unwrap();
        let response = host
            .dispatcher
            .dispatch(
                &AgentId::from("dictionary-bot"),
                AgentRequest::new("lookup").with_param("term", "k8s"),
            )
            .await;
        assert!(response.success);
        assert_eq!(response.data.unwrap()["term"], "Kubernetes");
        assert_eq!(host.health.latest().generation, 0);
    }
}
