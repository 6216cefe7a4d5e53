// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `hireflow serve`

use anyhow::{Context, Result};
use std::path::PathBuf;

use hireflow_core::domain::node_config::NodeConfigManifest;

use crate::server::start_server;

pub async fn handle_command(
    config_path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let mut manifest =
        NodeConfigManifest::load_or_default(config_path).context("Failed to load configuration")?;

    // Flags win over both the file and environment overrides
    if let Some(host) = host {
        manifest.spec.network.bind_address = host;
    }
    if let Some(port) = port {
        manifest.spec.network.port = port;
    }

    start_server(manifest).await
}
