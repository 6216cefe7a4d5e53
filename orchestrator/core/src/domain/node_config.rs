// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Node Configuration Types
//
// Defines the configuration schema for a HireFlow agent host:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - Dispatch defaults (per-call timeout)
// - Agent roster (descriptor fields plus the handler each agent binds to)
// - Health monitoring cadence
// - Network and observability settings

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::agent::AgentDescriptor;

pub const API_VERSION: &str = "100monkeys.ai/v1";
pub const KIND: &str = "NodeConfig";

/// Top-level Kubernetes-style node configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfigManifest {
    /// API version (must be "100monkeys.ai/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "NodeConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    pub spec: NodeConfigSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Human-readable node name
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfigSpec {
    #[serde(default)]
    pub dispatch: DispatchSettings,

    #[serde(default)]
    pub health: HealthSettings,

    #[serde(default)]
    pub network: NetworkConfig,

    /// Agents in registration order; dependencies must point backwards
    #[serde(default = "default_agents")]
    pub agents: Vec<AgentConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub observability: Option<ObservabilityConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchSettings {
    /// Default per-call handler timeout (e.g. "30s", "1500ms")
    #[serde(default = "default_dispatch_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_health_interval", with = "humantime_serde")]
    pub interval: Duration,

    #[serde(default = "default_probe_timeout", with = "humantime_serde")]
    pub probe_timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network bind address (e.g. "0.0.0.0" or "127.0.0.1")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// HTTP API port
    #[serde(default = "default_api_port")]
    pub port: u16,
}

/// One roster entry: the descriptor plus the handler implementation key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(flatten)]
    pub descriptor: AgentDescriptor,

    /// Handler implementation key; defaults to the agent id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
}

impl AgentConfig {
    pub fn handler_key(&self) -> &str {
        self.handler.as_deref().unwrap_or(self.descriptor.id.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricsConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "info", "debug", "trace")
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format ("json" or "text")
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Prometheus scrape port
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_dispatch_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_health_interval() -> Duration {
    Duration::from_secs(30)
}

fn default_probe_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_metrics_port() -> u16 {
    9090
}

/// Reference roster used when no configuration file supplies one
pub fn default_agents() -> Vec<AgentConfig> {
    vec![
        AgentConfig {
            descriptor: AgentDescriptor::new("smart-database", "Smart Database")
                .with_capability("job-analysis")
                .with_capability("candidate-analysis")
                .with_capability("guidance")
                .with_priority(0)
                .with_description("Analyses jobs and candidates and seeds guidance for downstream agents"),
            handler: None,
        },
        AgentConfig {
            descriptor: AgentDescriptor::new("dictionary-bot", "Dictionary Bot")
                .with_capability("lookup")
                .with_capability("term-extraction")
                .with_priority(1)
                .with_description("Defines recruiting and technology terms"),
            handler: None,
        },
        AgentConfig {
            descriptor: AgentDescriptor::new("culture-matcher", "Culture Matcher")
                .with_capability("culture-fit")
                .with_dependency("smart-database")
                .with_priority(2)
                .with_description("Scores candidate values against company culture"),
            handler: None,
        },
    ]
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            timeout: default_dispatch_timeout(),
        }
    }
}

impl Default for HealthSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: default_health_interval(),
            probe_timeout: default_probe_timeout(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_api_port(),
        }
    }
}

impl Default for NodeConfigSpec {
    fn default() -> Self {
        Self {
            dispatch: DispatchSettings::default(),
            health: HealthSettings::default(),
            network: NetworkConfig::default(),
            agents: default_agents(),
            observability: None,
        }
    }
}

impl Default for NodeConfigManifest {
    fn default() -> Self {
        let hostname = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "hireflow-node".to_string());

        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: hostname,
                version: Some("1.0.0".to_string()),
                labels: None,
            },
            spec: NodeConfigSpec::default(),
        }
    }
}

impl NodeConfigManifest {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. HIREFLOW_CONFIG_PATH environment variable
    /// 2. ./hireflow-config.yaml (working directory)
    /// 3. ~/.hireflow/config.yaml (user home)
    /// 4. /etc/hireflow/config.yaml (system, Unix) or C:\ProgramData\HireFlow\config.yaml (Windows)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("HIREFLOW_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./hireflow-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".hireflow").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        #[cfg(unix)]
        let system_config = PathBuf::from("/etc/hireflow/config.yaml");
        #[cfg(windows)]
        let system_config = PathBuf::from("C:\\ProgramData\\HireFlow\\config.yaml");

        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // An explicit path must exist and parse
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load config at {:?}: {}", path, e))?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::warn!("No configuration file found in standard locations. Using built-in defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("HIREFLOW_DISPATCH_TIMEOUT") {
            match humantime_serde::re::humantime::parse_duration(&val) {
                Ok(timeout) => {
                    tracing::info!("Environment override: HIREFLOW_DISPATCH_TIMEOUT={}", val);
                    self.spec.dispatch.timeout = timeout;
                }
                Err(_) => {
                    tracing::warn!(
                        "Invalid value for HIREFLOW_DISPATCH_TIMEOUT: '{}'. Expected a duration like '10s'. Ignoring.",
                        val
                    );
                }
            }
        }

        if let Ok(val) = std::env::var("HIREFLOW_PORT") {
            match val.parse::<u16>() {
                Ok(port) => {
                    tracing::info!("Environment override: HIREFLOW_PORT={}", port);
                    self.spec.network.port = port;
                }
                Err(_) => {
                    tracing::warn!("Invalid value for HIREFLOW_PORT: '{}'. Ignoring.", val);
                }
            }
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                API_VERSION
            );
        }

        if self.kind != KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        if self.spec.dispatch.timeout.is_zero() {
            anyhow::bail!("spec.dispatch.timeout must be greater than zero");
        }

        if self.spec.health.enabled && self.spec.health.interval.is_zero() {
            anyhow::bail!("spec.health.interval must be greater than zero");
        }

        let mut seen = HashSet::new();
        for agent in &self.spec.agents {
            let id = &agent.descriptor.id;
            if id.as_str().is_empty() {
                anyhow::bail!("Agent id cannot be empty");
            }

            for dependency in &agent.descriptor.dependencies {
                if !seen.contains(dependency) {
                    anyhow::bail!(
                        "Agent '{}' depends on '{}', which must be declared earlier",
                        id,
                        dependency
                    );
                }
            }

            if agent.descriptor.timeout.is_some_and(|t| t.is_zero()) {
                anyhow::bail!("Agent '{}' has a zero timeout", id);
            }

            if !seen.insert(id.clone()) {
                anyhow::bail!("Duplicate agent id: {}", id);
            }
        }

        Ok(())
    }
}
