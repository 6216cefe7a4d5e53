// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::agent::AgentId;

/// Identifies a single dispatch across its lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DispatchId(pub Uuid);

impl DispatchId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DispatchId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DispatchEvent {
    DispatchStarted {
        dispatch_id: DispatchId,
        agent_id: AgentId,
        action: String,
        started_at: DateTime<Utc>,
    },
    DispatchCompleted {
        dispatch_id: DispatchId,
        agent_id: AgentId,
        action: String,
        duration_ms: u64,
        completed_at: DateTime<Utc>,
    },
    DispatchFailed {
        dispatch_id: DispatchId,
        agent_id: AgentId,
        action: String,
        error: String,
        duration_ms: u64,
        failed_at: DateTime<Utc>,
    },
    DispatchTimedOut {
        dispatch_id: DispatchId,
        agent_id: AgentId,
        action: String,
        timeout_ms: u64,
        timed_out_at: DateTime<Utc>,
    },
    AgentNotFound {
        agent_id: AgentId,
        action: String,
        rejected_at: DateTime<Utc>,
    },
}

impl DispatchEvent {
    pub fn agent_id(&self) -> &AgentId {
        match self {
            DispatchEvent::DispatchStarted { agent_id, .. }
            | DispatchEvent::DispatchCompleted { agent_id, .. }
            | DispatchEvent::DispatchFailed { agent_id, .. }
            | DispatchEvent::DispatchTimedOut { agent_id, .. }
            | DispatchEvent::AgentNotFound { agent_id, .. } => agent_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HealthEvent {
    AgentBecameUnhealthy {
        agent_id: AgentId,
        reason: String,
        detected_at: DateTime<Utc>,
    },
    AgentRecovered {
        agent_id: AgentId,
        recovered_at: DateTime<Utc>,
    },
}
