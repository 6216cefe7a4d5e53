// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Dispatch Bridge - Application Layer
//!
//! Connects the message layer to the [`Dispatcher`]: a `request` message whose
//! `data` is an `{action, params}` object becomes one dispatcher call per
//! recipient, and each result comes back as a `response` or `error` message on
//! the same correlation id. Cost tracking from the response metadata is added
//! to the context carried by the reply.

use hireflow_core::application::dispatcher::Dispatcher;
use hireflow_core::domain::agent::AgentId;
use hireflow_core::domain::context::InvocationContext;
use hireflow_core::domain::envelope::{AgentRequest, AgentResponse};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use super::router::{MessageRouter, RouterError};
use crate::domain::message::{AgentMessage, MessageKind};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BridgeError {
    #[error("only request messages can be dispatched, got {0:?}")]
    NotARequest(MessageKind),

    #[error(transparent)]
    Router(#[from] RouterError),
}

/// The `data` of a request message
#[derive(Debug, Deserialize)]
struct RequestPayload {
    action: String,
    #[serde(default)]
    params: Map<String, Value>,
}

pub struct DispatchBridge {
    dispatcher: Arc<Dispatcher>,
}

impl DispatchBridge {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Dispatch `message` to each of its recipients; replies are returned in
    /// recipient order.
    pub async fn handle(&self, message: &AgentMessage) -> Result<Vec<AgentMessage>, BridgeError> {
        if message.kind() != MessageKind::Request {
            return Err(BridgeError::NotARequest(message.kind()));
        }
        Ok(self.answer(message, message.to()).await)
    }

    async fn answer(&self, message: &AgentMessage, recipients: &[AgentId]) -> Vec<AgentMessage> {
        let payload = match serde_json::from_value::<RequestPayload>(message.data().clone()) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(message_id = %message.id(), error = %e, "Request message has no usable action");
                let response = AgentResponse::failure(format!("invalid_request: {}", e));
                return recipients
                    .iter()
                    .map(|recipient| self.reply(message, recipient, response.clone()))
                    .collect();
            }
        };

        let calls = recipients
            .iter()
            .map(|recipient| {
                let request = AgentRequest {
                    action: payload.action.clone(),
                    params: payload.params.clone(),
                    context: message.context().clone(),
                };
                (recipient.clone(), request)
            })
            .collect();
        let responses = self.dispatcher.dispatch_batch(calls).await;

        recipients
            .iter()
            .zip(responses)
            .map(|(recipient, response)| self.reply(message, recipient, response))
            .collect()
    }

    fn reply(&self, request: &AgentMessage, recipient: &AgentId, response: AgentResponse) -> AgentMessage {
        let mut context: InvocationContext = request.context().clone();
        if let Some(metadata) = &response.metadata {
            context
                .cost_tracking
                .get_or_insert_with(Default::default)
                .record_call(metadata.tokens_used, metadata.cost);
        }

        let kind = if response.success {
            MessageKind::Response
        } else {
            MessageKind::Error
        };
        let data = serde_json::to_value(&response).unwrap_or(Value::Null);
        request.reply(recipient.clone(), kind, data, context)
    }

    /// Answer every request queued for `agent_id` and route the replies.
    /// Other message kinds are consumed and returned to the caller untouched.
    pub async fn drain(
        &self,
        router: &MessageRouter,
        agent_id: &AgentId,
    ) -> Result<Vec<AgentMessage>, BridgeError> {
        let mut passed_through = Vec::new();
        while let Some(message) = router.try_recv(agent_id)? {
            if message.kind() != MessageKind::Request {
                passed_through.push(message);
                continue;
            }

            // The queued copy may list other recipients; this mailbox answers for itself only
            for reply in self.answer(&message, std::slice::from_ref(agent_id)).await {
                debug!(
                    correlation_id = %reply.correlation_id(),
                    kind = ?reply.kind(),
                    "Routing reply"
                );
                router.route(reply)?;
            }
        }
        Ok(passed_through)
    }
}
