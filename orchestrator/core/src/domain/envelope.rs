// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Request/Response Envelope
//!
//! Every agent is invoked with an [`AgentRequest`] and every dispatch yields an
//! [`AgentResponse`], whatever the outcome. On success only `data` is set; on
//! failure only `error`. `metadata` is attached by the dispatcher whenever the
//! handler was actually invoked.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::context::InvocationContext;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRequest {
    pub action: String,

    #[serde(default)]
    pub params: Map<String, Value>,

    #[serde(default, skip_serializing_if = "InvocationContext::is_empty")]
    pub context: InvocationContext,
}

impl AgentRequest {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            params: Map::new(),
            context: InvocationContext::default(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_context(mut self, context: InvocationContext) -> Self {
        self.context = context;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub processing_time_ms: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,
}

impl AgentResponse {
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            metadata: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: ResponseMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Raw result a handler hands back to the dispatcher before enveloping.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerOutput {
    pub data: Value,
    pub cost: Option<f64>,
    pub tokens_used: Option<u64>,
}

impl HandlerOutput {
    pub fn new(data: Value) -> Self {
        Self {
            data,
            cost: None,
            tokens_used: None,
        }
    }

    pub fn with_usage(mut self, tokens_used: u64, cost: f64) -> Self {
        self.tokens_used = Some(tokens_used);
        self.cost = Some(cost);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_defaults_params_and_context() {
        let request: AgentRequest = serde_json::from_value(json!({"action": "dimensions"})).unwrap();
        assert_eq!(request.action, "dimensions");
        assert!(request.params.is_empty());
        assert!(request.context.is_empty());

        let echoed = serde_json::to_value(&request).unwrap();
        assert!(echoed.get("context").is_none());
    }

    #[test]
    fn test_failed_response_omits_data() {
        let response = AgentResponse::failure("timeout").with_metadata(ResponseMetadata {
            processing_time_ms: 30_000,
            ..Default::default()
        });
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value, json!({
            "success": false,
            "error": "timeout",
            "metadata": { "processingTimeMs": 30000 }
        }));
    }
}
