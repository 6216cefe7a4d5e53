// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # HireFlow Agent Host CLI
//!
//! The `hireflow` binary hosts the recruiting agents and talks to a running host.
//!
//! ## Commands
//!
//! - `hireflow serve` - Run the HTTP API until Ctrl+C/SIGTERM
//! - `hireflow agent list|show|invoke` - Agent operations (`invoke --embedded` runs in-process)
//! - `hireflow config show|validate|generate` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use hireflow::commands::{self, AgentCommand, ConfigCommand};
use hireflow_core::domain::node_config::{LoggingConfig, NodeConfigManifest};

const DEFAULT_HOST: &str = "127.0.0.1";

/// HireFlow Agent Host - registry and dispatch for recruiting agents
#[derive(Parser)]
#[command(name = "hireflow")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "HIREFLOW_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// HTTP API port (default: from configuration, 8000)
    #[arg(long, global = true)]
    port: Option<u16>,

    /// HTTP API host (serve: bind address; other commands: server to contact)
    #[arg(long, global = true, env = "HIREFLOW_HOST")]
    host: Option<String>,

    /// Log level (trace, debug, info, warn, error); defaults to observability.logging.level
    #[arg(long, global = true, env = "HIREFLOW_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format (text, json); defaults to observability.logging.format
    #[arg(long, global = true, env = "HIREFLOW_LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    #[command(name = "serve")]
    Serve,

    /// Agent operations
    #[command(name = "agent")]
    Agent {
        #[command(subcommand)]
        command: AgentCommand,
    },

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let configured = if cli.log_level.is_none() || cli.log_format.is_none() {
        configured_logging(cli.config.clone())
    } else {
        None
    };
    let (log_level, log_format) =
        resolve_logging(cli.log_level.clone(), cli.log_format.clone(), configured);
    init_logging(&log_level, &log_format)?;

    match cli.command {
        Some(Commands::Serve) => commands::serve::handle_command(cli.config, cli.host, cli.port).await,
        Some(Commands::Agent { command }) => {
            let host = cli.host.as_deref().unwrap_or(DEFAULT_HOST);
            commands::agent::handle_command(command, cli.config, host, cli.port).await
        }
        Some(Commands::Config { command }) => commands::config::handle_command(command, cli.config).await,
        None => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Logging section of the configuration file, if one is found and sets it.
fn configured_logging(config_path: Option<PathBuf>) -> Option<LoggingConfig> {
    NodeConfigManifest::load_or_default(config_path)
        .ok()?
        .spec
        .observability?
        .logging
}

/// Level and format: flag or env first, then the configuration file, then `info`/`text`.
fn resolve_logging(
    level: Option<String>,
    format: Option<String>,
    configured: Option<LoggingConfig>,
) -> (String, String) {
    let (configured_level, configured_format) = match configured {
        Some(logging) => (Some(logging.level), Some(logging.format)),
        None => (None, None),
    };
    (
        level.or(configured_level).unwrap_or_else(|| "info".to_string()),
        format.or(configured_format).unwrap_or_else(|| "text".to_string()),
    )
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str, format: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    match format {
        "json" => builder.json().init(),
        "text" => builder.compact().init(),
        other => anyhow::bail!("Unknown log format '{}' (expected text or json)", other),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logging(level: &str, format: &str) -> LoggingConfig {
        LoggingConfig {
            level: level.to_string(),
            format: format.to_string(),
        }
    }

    #[test]
    fn test_config_level_applies_without_flag() {
        let (level, format) = resolve_logging(None, None, Some(logging("debug", "json")));
        assert_eq!(level, "debug");
        assert_eq!(format, "json");
    }

    #[test]
    fn test_flags_override_config_logging() {
        let (level, format) = resolve_logging(
            Some("warn".to_string()),
            Some("text".to_string()),
            Some(logging("debug", "json")),
        );
        assert_eq!(level, "warn");
        assert_eq!(format, "text");
    }

    #[test]
    fn test_logging_defaults_without_config() {
        assert_eq!(
            resolve_logging(None, None, None),
            ("info".to_string(), "text".to_string())
        );
    }
}
