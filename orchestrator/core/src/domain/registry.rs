// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Agent Registry
//!
//! Holds every [`AgentDescriptor`] together with the handler bound to it.
//! The registry is populated once at startup and shared read-only afterwards
//! (the dispatcher wraps it in an `Arc`); there is no runtime removal.
//!
//! # Invariants
//!
//! - Agent ids are unique. A duplicate registration is rejected and the first
//!   registration is retained.
//! - Dependencies may only reference ids that are already registered, which
//!   rules out forward and cyclic references by construction.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::domain::agent::{AgentDescriptor, AgentId};
use crate::domain::handler::AgentHandler;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("agent '{0}' is already registered")]
    DuplicateAgent(AgentId),

    #[error("agent '{agent}' depends on unregistered agent '{dependency}'")]
    UnknownDependency { agent: AgentId, dependency: AgentId },

    #[error("agent '{0}' not found")]
    AgentNotFound(AgentId),
}

#[derive(Clone)]
pub struct RegisteredAgent {
    pub descriptor: Arc<AgentDescriptor>,
    pub handler: Arc<dyn AgentHandler>,
}

impl fmt::Debug for RegisteredAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredAgent")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct AgentRegistry {
    // Registration order is the tie-breaker for equal priorities
    agents: Vec<RegisteredAgent>,
    index: HashMap<AgentId, usize>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        descriptor: AgentDescriptor,
        handler: Arc<dyn AgentHandler>,
    ) -> Result<(), RegistryError> {
        if self.index.contains_key(&descriptor.id) {
            return Err(RegistryError::DuplicateAgent(descriptor.id));
        }

        if let Some(missing) = descriptor
            .dependencies
            .iter()
            .find(|dep| !self.index.contains_key(*dep))
        {
            return Err(RegistryError::UnknownDependency {
                agent: descriptor.id.clone(),
                dependency: missing.clone(),
            });
        }

        tracing::debug!(agent_id = %descriptor.id, "Registered agent");
        self.index.insert(descriptor.id.clone(), self.agents.len());
        self.agents.push(RegisteredAgent {
            descriptor: Arc::new(descriptor),
            handler,
        });
        Ok(())
    }

    pub fn get(&self, id: &AgentId) -> Result<&AgentDescriptor, RegistryError> {
        self.resolve(id).map(|agent| agent.descriptor.as_ref())
    }

    /// Descriptor and handler for an id
    pub fn resolve(&self, id: &AgentId) -> Result<&RegisteredAgent, RegistryError> {
        self.index
            .get(id)
            .map(|&slot| &self.agents[slot])
            .ok_or_else(|| RegistryError::AgentNotFound(id.clone()))
    }

    /// Agents offering `capability`, by ascending priority then registration order.
    pub fn list_by_capability(&self, capability: &str) -> Vec<&AgentDescriptor> {
        let mut matches: Vec<&AgentDescriptor> = self
            .agents
            .iter()
            .map(|agent| agent.descriptor.as_ref())
            .filter(|descriptor| descriptor.has_capability(capability))
            .collect();
        // stable sort keeps registration order for equal priorities
        matches.sort_by_key(|descriptor| descriptor.priority);
        matches
    }

    pub fn list(&self) -> impl Iterator<Item = &AgentDescriptor> {
        self.agents.iter().map(|agent| agent.descriptor.as_ref())
    }

    pub(crate) fn agents(&self) -> &[RegisteredAgent] {
        &self.agents
    }

    pub fn contains(&self, id: &AgentId) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
