// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! HTTP client for a running `hireflow serve` instance

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use std::time::Duration;

use hireflow_core::domain::agent::AgentDescriptor;
use hireflow_core::domain::envelope::{AgentRequest, AgentResponse};

#[derive(Debug, Clone)]
pub struct HireflowClient {
    client: Client,
    base_url: String,
}

impl HireflowClient {
    pub fn new(host: &str, port: u16) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(2))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = if host.starts_with("http://") || host.starts_with("https://") {
            format!("{}:{}", host.trim_end_matches('/'), port)
        } else {
            format!("http://{}:{}", host, port)
        };

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `true` when the server answers its health endpoint at all
    pub async fn is_reachable(&self) -> bool {
        self.client
            .get(format!("{}/health", self.base_url))
            .timeout(Duration::from_millis(500))
            .send()
            .await
            .is_ok()
    }

    pub async fn health(&self) -> Result<serde_json::Value> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .context("Failed to reach server")?;

        response.json().await.context("Failed to parse health response")
    }

    pub async fn list_agents(&self) -> Result<Vec<AgentDescriptor>> {
        let envelope = self.get_envelope("/api/agents").await?;
        let data = envelope.data.unwrap_or_default();
        serde_json::from_value(data).context("Failed to parse agent list")
    }

    pub async fn get_agent(&self, agent_id: &str) -> Result<Option<AgentDescriptor>> {
        let response = self
            .client
            .get(format!("{}/api/agents/{}", self.base_url, agent_id))
            .send()
            .await
            .context("Failed to fetch agent")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let envelope: AgentResponse = response.json().await.context("Failed to parse agent response")?;
        let descriptor = serde_json::from_value(envelope.data.unwrap_or_default())
            .context("Failed to parse agent descriptor")?;
        Ok(Some(descriptor))
    }

    /// Send one request. Every status the API documents carries an envelope,
    /// so the envelope is returned as-is whatever the status.
    pub async fn invoke(&self, agent_id: &str, request: &AgentRequest) -> Result<AgentResponse> {
        let response = self
            .client
            .post(format!("{}/api/agents/{}", self.base_url, agent_id))
            .json(request)
            .send()
            .await
            .context("Failed to invoke agent")?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        serde_json::from_str(&body)
            .with_context(|| format!("Unexpected response ({}): {}", status, body))
    }

    async fn get_envelope(&self, path: &str) -> Result<AgentResponse> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .with_context(|| format!("Failed to GET {}", path))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("GET {} failed: {}", path, error_text);
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse response from {}", path))
    }
}
