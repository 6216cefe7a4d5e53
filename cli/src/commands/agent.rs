// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use serde_json::{Map, Value};
use std::path::PathBuf;

use hireflow_core::domain::agent::AgentDescriptor;
use hireflow_core::domain::context::{InvocationContext, PipelineStage};
use hireflow_core::domain::envelope::{AgentRequest, AgentResponse};
use hireflow_core::domain::node_config::NodeConfigManifest;

use crate::client::HireflowClient;
use crate::embedded::EmbeddedHost;

#[derive(Subcommand)]
pub enum AgentCommand {
    /// List registered agents
    List,

    /// Show one agent descriptor
    Show {
        /// Agent ID
        #[arg(value_name = "AGENT_ID")]
        agent_id: String,
    },

    /// Invoke an agent action
    Invoke {
        /// Agent ID
        #[arg(value_name = "AGENT_ID")]
        agent_id: String,

        /// Action name (e.g. lookup, analyze_job)
        #[arg(value_name = "ACTION")]
        action: String,

        /// Action parameters as a JSON object
        #[arg(short, long, default_value = "{}")]
        params: String,

        /// Job the call belongs to
        #[arg(long)]
        job: Option<String>,

        /// Candidate the call concerns
        #[arg(long)]
        candidate: Option<String>,

        /// Pipeline stage (sourcing, screening, outreach, interview, offer)
        #[arg(long)]
        stage: Option<String>,

        /// Dispatch in-process instead of through a running server
        #[arg(long)]
        embedded: bool,
    },
}

pub async fn handle_command(
    command: AgentCommand,
    config_path: Option<PathBuf>,
    host: &str,
    port: Option<u16>,
) -> Result<()> {
    match command {
        AgentCommand::Invoke {
            agent_id,
            action,
            params,
            job,
            candidate,
            stage,
            embedded,
        } => {
            let request = build_request(&action, &params, job, candidate, stage.as_deref())?;
            let response = if embedded {
                EmbeddedHost::new(config_path)?.invoke(&agent_id, request).await
            } else {
                connect(config_path, host, port).await?.invoke(&agent_id, &request).await?
            };
            print_response(&response)
        }
        AgentCommand::List => {
            let client = connect(config_path, host, port).await?;
            print_agents(&client.list_agents().await?);
            Ok(())
        }
        AgentCommand::Show { agent_id } => {
            let client = connect(config_path, host, port).await?;
            match client.get_agent(&agent_id).await? {
                Some(descriptor) => {
                    println!("{}", serde_yaml::to_string(&descriptor)?);
                    Ok(())
                }
                None => anyhow::bail!("Agent '{}' not found", agent_id),
            }
        }
    }
}

async fn connect(config_path: Option<PathBuf>, host: &str, port: Option<u16>) -> Result<HireflowClient> {
    let port = match port {
        Some(port) => port,
        None => {
            NodeConfigManifest::load_or_default(config_path)
                .context("Failed to load configuration")?
                .spec
                .network
                .port
        }
    };

    let client = HireflowClient::new(host, port)?;
    if !client.is_reachable().await {
        anyhow::bail!(
            "No HireFlow server at {}. Start one with 'hireflow serve' or pass --embedded.",
            client.base_url()
        );
    }
    Ok(client)
}

fn parse_stage(stage: &str) -> Result<PipelineStage> {
    serde_json::from_value(Value::String(stage.to_lowercase()))
        .with_context(|| format!("Unknown pipeline stage '{}'", stage))
}

pub fn build_request(
    action: &str,
    params: &str,
    job: Option<String>,
    candidate: Option<String>,
    stage: Option<&str>,
) -> Result<AgentRequest> {
    let params: Map<String, Value> =
        serde_json::from_str(params).context("--params must be a JSON object")?;

    let context = InvocationContext {
        job_id: job,
        candidate_id: candidate,
        stage: stage.map(parse_stage).transpose()?,
        cost_tracking: None,
    };

    Ok(AgentRequest {
        action: action.to_string(),
        params,
        context,
    })
}

fn print_agents(agents: &[AgentDescriptor]) {
    if agents.is_empty() {
        println!("{}", "No agents registered".yellow());
        return;
    }

    println!("{} agents registered:", agents.len());
    println!("{:<20} {:<20} {:<9} {}", "ID", "NAME", "PRIORITY", "CAPABILITIES");
    for agent in agents {
        let capabilities: Vec<&str> = agent.capabilities.iter().map(String::as_str).collect();
        println!(
            "{:<20} {:<20} {:<9} {}",
            agent.id.as_str().bold(),
            agent.name,
            agent.priority,
            capabilities.join(", ")
        );
    }
}

fn print_response(response: &AgentResponse) -> Result<()> {
    if response.success {
        println!("{}", "✓ Success".green());
        if let Some(data) = &response.data {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
    } else {
        println!(
            "{}",
            format!("✗ {}", response.error.as_deref().unwrap_or("unknown error")).red()
        );
    }

    if let Some(metadata) = &response.metadata {
        let mut line = format!("{} ms", metadata.processing_time_ms);
        if let Some(tokens) = metadata.tokens_used {
            line.push_str(&format!(", {} tokens", tokens));
        }
        if let Some(cost) = metadata.cost {
            line.push_str(&format!(", ${:.4}", cost));
        }
        println!("{}", line.dimmed());
    }
    Ok(())
}
