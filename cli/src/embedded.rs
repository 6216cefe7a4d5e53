// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Embedded mode: build the agent host in-process and dispatch directly,
//! without a running server.

use anyhow::{Context, Result};
use std::path::PathBuf;

use hireflow_core::application::bootstrap::{validate_manifest, AgentHost};
use hireflow_core::domain::agent::{AgentDescriptor, AgentId};
use hireflow_core::domain::envelope::{AgentRequest, AgentResponse};
use hireflow_core::domain::node_config::NodeConfigManifest;

pub struct EmbeddedHost {
    host: AgentHost,
}

impl EmbeddedHost {
    pub fn new(config_path: Option<PathBuf>) -> Result<Self> {
        let manifest = NodeConfigManifest::load_or_default(config_path)
            .context("Failed to load configuration")?;
        Self::from_manifest(&manifest)
    }

    pub fn from_manifest(manifest: &NodeConfigManifest) -> Result<Self> {
        validate_manifest(manifest).context("Configuration validation failed")?;
        let host = AgentHost::from_config(manifest).context("Failed to build agent registry")?;
        Ok(Self { host })
    }

    pub fn agents(&self) -> Vec<AgentDescriptor> {
        self.host.dispatcher.registry().list().cloned().collect()
    }

    pub async fn invoke(&self, agent_id: &str, request: AgentRequest) -> AgentResponse {
        self.host
            .dispatcher
            .dispatch(&AgentId::from(agent_id), request)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_embedded_invoke_uses_default_roster() {
        let host = EmbeddedHost::from_manifest(&NodeConfigManifest::default()).unwrap();
        assert_eq!(host.agents().len(), 3);

        let response = host
            .invoke(
                "culture-matcher",
                AgentRequest::new("match")
                    .with_param("candidateValues", serde_json::json!(["ownership"]))
                    .with_param("companyValues", serde_json::json!(["autonomy"])),
            )
            .await;
        assert!(response.success);
        assert_eq!(response.data.unwrap()["score"], 100.0);
    }
}
