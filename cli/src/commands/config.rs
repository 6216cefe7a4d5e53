// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::{Path, PathBuf};

use hireflow_core::application::bootstrap::validate_manifest;
use hireflow_core::domain::node_config::NodeConfigManifest;

pub const MINIMAL_TEMPLATE: &str = include_str!("../../templates/config-minimal.yaml");
pub const EXAMPLES_TEMPLATE: &str = include_str!("../../templates/config-with-examples.yaml");

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,

        /// Print the effective manifest as YAML
        #[arg(long)]
        yaml: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path (default: ./hireflow-config.yaml)
        #[arg(short, long, default_value = "./hireflow-config.yaml")]
        output: PathBuf,

        /// Include examples and comments
        #[arg(long)]
        examples: bool,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub async fn handle_command(command: ConfigCommand, config_override: Option<PathBuf>) -> Result<()> {
    match command {
        ConfigCommand::Show { paths, yaml } => show(config_override, paths, yaml),
        ConfigCommand::Validate { file } => validate(file.or(config_override)),
        ConfigCommand::Generate {
            output,
            examples,
            force,
        } => generate(&output, examples, force),
    }
}

fn show(config_override: Option<PathBuf>, show_paths: bool, as_yaml: bool) -> Result<()> {
    let config = NodeConfigManifest::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if as_yaml {
        print!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. HIREFLOW_CONFIG_PATH: {}",
            std::env::var("HIREFLOW_CONFIG_PATH")
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./hireflow-config.yaml");
        println!("  4. ~/.hireflow/config.yaml");
        println!("  5. /etc/hireflow/config.yaml");
        match NodeConfigManifest::discover_config() {
            Some(found) if config_override.is_none() => println!("  Using: {}", found.display()),
            None if config_override.is_none() => println!("  Using: {}", "built-in defaults".dimmed()),
            _ => {}
        }
        println!();
    }

    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Node:".bold());
    println!("  Name: {}", config.metadata.name);
    if let Some(version) = &config.metadata.version {
        println!("  Version: {}", version);
    }
    println!(
        "  Listen: {}:{}",
        config.spec.network.bind_address, config.spec.network.port
    );
    println!(
        "  Dispatch timeout: {}",
        humantime_display(config.spec.dispatch.timeout)
    );
    if config.spec.health.enabled {
        println!(
            "  Health checks: every {}",
            humantime_display(config.spec.health.interval)
        );
    } else {
        println!("  Health checks: {}", "disabled".dimmed());
    }
    println!();

    println!("{}", "Agents:".bold());
    for agent in &config.spec.agents {
        let descriptor = &agent.descriptor;
        println!(
            "  {} ({}) priority {}",
            descriptor.id.as_str().bold(),
            agent.handler_key(),
            descriptor.priority
        );
        if !descriptor.capabilities.is_empty() {
            let capabilities: Vec<&str> = descriptor.capabilities.iter().map(String::as_str).collect();
            println!("    Capabilities: {}", capabilities.join(", "));
        }
        if !descriptor.dependencies.is_empty() {
            let dependencies: Vec<&str> = descriptor.dependencies.iter().map(|d| d.as_str()).collect();
            println!("    Depends on: {}", dependencies.join(", "));
        }
        if let Some(timeout) = descriptor.timeout {
            println!("    Timeout: {}", humantime_display(timeout));
        }
    }
    println!();

    Ok(())
}

fn humantime_display(duration: std::time::Duration) -> String {
    humantime_serde::re::humantime::format_duration(duration).to_string()
}

fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = NodeConfigManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;

    validate_manifest(&config).context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

fn generate(output: &Path, with_examples: bool, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            output.display()
        );
    }

    let sample = if with_examples {
        EXAMPLES_TEMPLATE
    } else {
        MINIMAL_TEMPLATE
    };

    std::fs::write(output, sample)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}
