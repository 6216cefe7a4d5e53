// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Agent Handler Interface
//!
//! One implementation per capability. A handler maps an [`AgentRequest`] to a
//! [`HandlerOutput`] or a [`HandlerError`]; the dispatcher owns timing,
//! timeouts and enveloping.
//!
//! Handlers must not call other handlers. Any state a handler keeps is its own
//! and must tolerate concurrent dispatches to the same agent id.
//!
//! Recognised actions are declared per handler as a tagged enum implementing
//! [`ActionSet`], so unknown actions are rejected at the boundary instead of
//! falling through to a default branch.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::domain::envelope::{AgentRequest, HandlerOutput};

#[async_trait]
pub trait AgentHandler: Send + Sync {
    async fn handle(&self, request: &AgentRequest) -> Result<HandlerOutput, HandlerError>;

    /// Liveness probe used by the health monitor
    async fn health_check(&self) -> Result<(), HandlerError> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HandlerError {
    #[error("unsupported action '{0}'")]
    UnsupportedAction(String),

    #[error("invalid params for action '{action}': {reason}")]
    InvalidParams { action: String, reason: String },

    #[error("{0}")]
    Execution(String),
}

impl HandlerError {
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }
}

/// Closed set of `(action, params)` pairs a handler understands.
///
/// Implementors are enums tagged with
/// `#[serde(tag = "action", content = "params", rename_all = "snake_case")]`.
/// Parameterless actions are written as empty struct variants (`Dimensions {}`).
pub trait ActionSet: DeserializeOwned {
    const ACTIONS: &'static [&'static str];

    fn parse(request: &AgentRequest) -> Result<Self, HandlerError> {
        if !Self::ACTIONS.contains(&request.action.as_str()) {
            return Err(HandlerError::UnsupportedAction(request.action.clone()));
        }

        let tagged = json!({
            "action": request.action,
            "params": Value::Object(request.params.clone()),
        });

        serde_json::from_value(tagged).map_err(|e| HandlerError::InvalidParams {
            action: request.action.clone(),
            reason: e.to_string(),
        })
    }
}
