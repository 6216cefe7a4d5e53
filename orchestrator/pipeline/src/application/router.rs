// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Message Router - Application Layer
//!
//! Per-agent mailboxes. Every routed message is checked against its
//! conversation, then one copy is queued per distinct recipient. Mailboxes
//! yield high priority first, FIFO within a priority, and each queued copy is
//! handed out exactly once.

use hireflow_core::domain::agent::AgentId;
use hireflow_core::domain::registry::AgentRegistry;
use parking_lot::{Mutex, RwLock};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::debug;

use crate::domain::conversation::{Conversation, ConversationError, ConversationState};
use crate::domain::message::{AgentMessage, CorrelationId, MessageKind, MessagePriority};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RouterError {
    #[error("no mailbox for agent '{0}'")]
    UnknownRecipient(AgentId),

    #[error(transparent)]
    Conversation(#[from] ConversationError),
}

struct Queued {
    priority: MessagePriority,
    seq: u64,
    message: AgentMessage,
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// BinaryHeap pops the greatest element: most urgent priority, then oldest.
impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Default)]
struct Mailbox {
    queue: Mutex<BinaryHeap<Queued>>,
    notify: Notify,
}

impl Mailbox {
    fn pop(&self) -> Option<AgentMessage> {
        self.queue.lock().pop().map(|queued| queued.message)
    }
}

#[derive(Default)]
pub struct MessageRouter {
    mailboxes: RwLock<HashMap<AgentId, Arc<Mailbox>>>,
    conversations: Mutex<HashMap<CorrelationId, Conversation>>,
    sequence: AtomicU64,
}

impl MessageRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Router with a mailbox for every registered agent.
    pub fn for_registry(registry: &AgentRegistry) -> Self {
        let router = Self::new();
        for descriptor in registry.list() {
            router.register(descriptor.id.clone());
        }
        router
    }

    /// Create a mailbox for `agent_id`. Registering twice keeps the existing one.
    pub fn register(&self, agent_id: AgentId) {
        self.mailboxes.write().entry(agent_id).or_default();
    }

    fn mailbox(&self, agent_id: &AgentId) -> Result<Arc<Mailbox>, RouterError> {
        self.mailboxes
            .read()
            .get(agent_id)
            .cloned()
            .ok_or_else(|| RouterError::UnknownRecipient(agent_id.clone()))
    }

    fn track(&self, message: &AgentMessage) -> Result<ConversationState, RouterError> {
        let mut conversations = self.conversations.lock();
        match conversations.get_mut(&message.correlation_id()) {
            Some(conversation) => Ok(conversation.apply(message)?),
            None if message.kind() == MessageKind::Request => {
                let conversation = Conversation::open(message)?;
                let state = conversation.state;
                conversations.insert(message.correlation_id(), conversation);
                Ok(state)
            }
            None => Err(ConversationError::Unknown(message.correlation_id()).into()),
        }
    }

    /// Validate and deliver `message`; returns the number of copies queued.
    /// Nothing is delivered when any recipient is unknown or the conversation
    /// rejects the message.
    pub fn route(&self, message: AgentMessage) -> Result<usize, RouterError> {
        let mut recipients: Vec<(&AgentId, Arc<Mailbox>)> = Vec::with_capacity(message.to().len());
        for agent_id in message.to() {
            if recipients.iter().any(|(seen, _)| *seen == agent_id) {
                continue;
            }
            recipients.push((agent_id, self.mailbox(agent_id)?));
        }

        let state = self.track(&message)?;
        debug!(
            message_id = %message.id(),
            correlation_id = %message.correlation_id(),
            kind = ?message.kind(),
            state = ?state,
            recipients = recipients.len(),
            "Routing message"
        );

        for (_, mailbox) in &recipients {
            let seq = self.sequence.fetch_add(1, AtomicOrdering::Relaxed);
            mailbox.queue.lock().push(Queued {
                priority: message.priority(),
                seq,
                message: message.clone(),
            });
            mailbox.notify.notify_one();
        }
        Ok(recipients.len())
    }

    /// Next message for `agent_id`, if any is queued.
    pub fn try_recv(&self, agent_id: &AgentId) -> Result<Option<AgentMessage>, RouterError> {
        Ok(self.mailbox(agent_id)?.pop())
    }

    /// Wait for the next message for `agent_id`.
    pub async fn recv(&self, agent_id: &AgentId) -> Result<AgentMessage, RouterError> {
        let mailbox = self.mailbox(agent_id)?;
        loop {
            if let Some(message) = mailbox.pop() {
                return Ok(message);
            }
            mailbox.notify.notified().await;
        }
    }

    pub fn pending(&self, agent_id: &AgentId) -> usize {
        self.mailboxes
            .read()
            .get(agent_id)
            .map(|mailbox| mailbox.queue.lock().len())
            .unwrap_or(0)
    }

    pub fn conversation(&self, correlation_id: &CorrelationId) -> Option<Conversation> {
        self.conversations.lock().get(correlation_id).cloned()
    }

    /// Drop completed and failed conversations; returns how many were removed.
    pub fn prune_closed(&self) -> usize {
        let mut conversations = self.conversations.lock();
        let before = conversations.len();
        conversations.retain(|_, conversation| !conversation.state.is_terminal());
        before - conversations.len()
    }
}
