// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Inter-agent Messages
//!
//! - [`AgentMessage`]: immutable value exchanged between agents.
//! - [`MessageId`]: unique per message, including forwarded copies.
//! - [`CorrelationId`]: shared by every message of one conversation.
//!
//! Messages are never mutated after construction. Forwarding produces a copy
//! with a fresh id and timestamp; replies reuse the correlation id.

use chrono::{DateTime, Utc};
use hireflow_core::domain::agent::AgentId;
use hireflow_core::domain::context::InvocationContext;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(pub Uuid);

impl CorrelationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Request,
    Response,
    Notification,
    Error,
}

/// Delivery priority. Variants are declared most urgent first, so the derived
/// ordering sorts `High` before `Low`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessagePriority {
    High,
    #[default]
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MessageError {
    #[error("message has no recipients")]
    NoRecipients,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMessage {
    id: MessageId,
    correlation_id: CorrelationId,
    from: AgentId,
    to: Vec<AgentId>,
    #[serde(rename = "type")]
    kind: MessageKind,
    priority: MessagePriority,
    timestamp: DateTime<Utc>,
    data: Value,
    #[serde(default)]
    context: InvocationContext,
}

impl AgentMessage {
    fn build(
        kind: MessageKind,
        correlation_id: CorrelationId,
        from: AgentId,
        to: Vec<AgentId>,
        priority: MessagePriority,
        data: Value,
        context: InvocationContext,
    ) -> Result<Self, MessageError> {
        if to.is_empty() {
            return Err(MessageError::NoRecipients);
        }
        Ok(Self {
            id: MessageId::new(),
            correlation_id,
            from,
            to,
            kind,
            priority,
            timestamp: Utc::now(),
            data,
            context,
        })
    }

    /// Open a new conversation.
    pub fn request(
        from: impl Into<AgentId>,
        to: Vec<AgentId>,
        priority: MessagePriority,
        data: Value,
        context: InvocationContext,
    ) -> Result<Self, MessageError> {
        Self::build(
            MessageKind::Request,
            CorrelationId::new(),
            from.into(),
            to,
            priority,
            data,
            context,
        )
    }

    /// Reply to the sender of `self` within the same conversation.
    pub fn reply(&self, from: impl Into<AgentId>, kind: MessageKind, data: Value, context: InvocationContext) -> Self {
        Self {
            id: MessageId::new(),
            correlation_id: self.correlation_id,
            from: from.into(),
            to: vec![self.from.clone()],
            kind,
            priority: self.priority,
            timestamp: Utc::now(),
            data,
            context,
        }
    }

    /// Copy of this message for other recipients, with a fresh id and timestamp.
    pub fn forward(&self, to: Vec<AgentId>) -> Result<Self, MessageError> {
        Self::build(
            self.kind,
            self.correlation_id,
            self.from.clone(),
            to,
            self.priority,
            self.data.clone(),
            self.context.clone(),
        )
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }

    pub fn from(&self) -> &AgentId {
        &self.from
    }

    pub fn to(&self) -> &[AgentId] {
        &self.to
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn priority(&self) -> MessagePriority {
        self.priority
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn context(&self) -> &InvocationContext {
        &self.context
    }
}
