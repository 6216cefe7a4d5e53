// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Conversation State Machine
//!
//! One conversation per [`CorrelationId`], opened by a `request`:
//!
//! | State | notification | response | error | request |
//! |-------|--------------|----------|-------|---------|
//! | `awaiting` | `in-progress` | `completed` | `failed` | `awaiting` (forwarded copy) |
//! | `in-progress` | `in-progress` | `completed` | `failed` | rejected |
//! | `completed` | rejected | rejected | rejected | rejected |
//! | `failed` | rejected | rejected | rejected | rejected |
//!
//! `completed` and `failed` are terminal. A request addressed to several agents
//! expects one `response` or `error` from each; the conversation stays
//! `in-progress` until the last of them arrives and ends `failed` if any
//! recipient replied with an error.

use chrono::{DateTime, Utc};
use hireflow_core::domain::agent::AgentId;
use serde::{Deserialize, Serialize};

use super::message::{AgentMessage, CorrelationId, MessageId, MessageKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConversationState {
    Awaiting,
    InProgress,
    Completed,
    Failed,
}

impl ConversationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConversationState::Completed | ConversationState::Failed)
    }

    fn next(self, kind: MessageKind) -> Option<ConversationState> {
        use ConversationState::*;
        match (self, kind) {
            (Completed | Failed, _) => None,
            (Awaiting, MessageKind::Request) => Some(Awaiting),
            (InProgress, MessageKind::Request) => None,
            (Awaiting | InProgress, MessageKind::Notification) => Some(InProgress),
            (Awaiting | InProgress, MessageKind::Response) => Some(Completed),
            (Awaiting | InProgress, MessageKind::Error) => Some(Failed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversationError {
    #[error("conversation must be opened by a request, got {0:?}")]
    NotARequest(MessageKind),

    #[error("message belongs to conversation {actual}, not {expected}")]
    CorrelationMismatch {
        expected: CorrelationId,
        actual: CorrelationId,
    },

    #[error("conversation {0} is already closed ({1:?})")]
    Closed(CorrelationId, ConversationState),

    #[error("{kind:?} is not allowed while conversation {correlation_id} is {state:?}")]
    InvalidTransition {
        correlation_id: CorrelationId,
        state: ConversationState,
        kind: MessageKind,
    },

    #[error("no open conversation {0}")]
    Unknown(CorrelationId),

    #[error("conversation {correlation_id} is not waiting for a reply from '{from}'")]
    UnexpectedReply {
        correlation_id: CorrelationId,
        from: AgentId,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub correlation_id: CorrelationId,
    pub initiator: AgentId,
    pub state: ConversationState,
    /// Recipients that still owe a response or error
    pub pending: Vec<AgentId>,
    #[serde(default)]
    pub any_failed: bool,
    /// Message ids in the order they were observed
    pub history: Vec<MessageId>,
    pub opened_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl Conversation {
    pub fn open(request: &AgentMessage) -> Result<Self, ConversationError> {
        if request.kind() != MessageKind::Request {
            return Err(ConversationError::NotARequest(request.kind()));
        }
        Ok(Self {
            correlation_id: request.correlation_id(),
            initiator: request.from().clone(),
            state: ConversationState::Awaiting,
            pending: request.to().to_vec(),
            any_failed: false,
            history: vec![request.id()],
            opened_at: request.timestamp(),
            closed_at: None,
        })
    }

    pub fn apply(&mut self, message: &AgentMessage) -> Result<ConversationState, ConversationError> {
        if message.correlation_id() != self.correlation_id {
            return Err(ConversationError::CorrelationMismatch {
                expected: self.correlation_id,
                actual: message.correlation_id(),
            });
        }
        if self.state.is_terminal() {
            return Err(ConversationError::Closed(self.correlation_id, self.state));
        }

        let mut next = self
            .state
            .next(message.kind())
            .ok_or(ConversationError::InvalidTransition {
                correlation_id: self.correlation_id,
                state: self.state,
                kind: message.kind(),
            })?;

        match message.kind() {
            MessageKind::Request => {
                for recipient in message.to() {
                    if !self.pending.contains(recipient) {
                        self.pending.push(recipient.clone());
                    }
                }
            }
            MessageKind::Response | MessageKind::Error => {
                let slot = self
                    .pending
                    .iter()
                    .position(|agent| agent == message.from())
                    .ok_or_else(|| ConversationError::UnexpectedReply {
                        correlation_id: self.correlation_id,
                        from: message.from().clone(),
                    })?;
                self.pending.remove(slot);
                self.any_failed |= message.kind() == MessageKind::Error;

                next = if !self.pending.is_empty() {
                    ConversationState::InProgress
                } else if self.any_failed {
                    ConversationState::Failed
                } else {
                    ConversationState::Completed
                };
            }
            MessageKind::Notification => {}
        }

        self.state = next;
        self.history.push(message.id());
        if next.is_terminal() {
            self.closed_at = Some(message.timestamp());
        }
        Ok(next)
    }
}
