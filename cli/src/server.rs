// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! HTTP server for `hireflow serve`

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use hireflow_core::application::bootstrap::{validate_manifest, AgentHost};
use hireflow_core::domain::node_config::NodeConfigManifest;
use hireflow_core::presentation::api;

pub async fn start_server(manifest: NodeConfigManifest) -> Result<()> {
    validate_manifest(&manifest).context("Configuration validation failed")?;

    info!(
        node = %manifest.metadata.name,
        agents = manifest.spec.agents.len(),
        "HireFlow agent host starting"
    );

    if let Some(metrics) = manifest
        .spec
        .observability
        .as_ref()
        .and_then(|o| o.metrics.as_ref())
        .filter(|m| m.enabled)
    {
        let addr: SocketAddr = format!("{}:{}", manifest.spec.network.bind_address, metrics.port)
            .parse()
            .context("Invalid metrics listen address")?;
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("Failed to install Prometheus exporter")?;
        info!("Prometheus metrics on {}", addr);
    }

    let host = AgentHost::from_config(&manifest).context("Failed to build agent registry")?;

    let cancel = CancellationToken::new();
    let health_task = if manifest.spec.health.enabled {
        Some(
            host.health
                .clone()
                .spawn(manifest.spec.health.interval, cancel.child_token()),
        )
    } else {
        None
    };

    let app = api::router(host);

    let addr = format!(
        "{}:{}",
        manifest.spec.network.bind_address, manifest.spec.network.port
    );
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    cancel.cancel();
    if let Some(task) = health_task {
        if let Err(e) = task.await {
            warn!("Health monitor task ended abnormally: {}", e);
        }
    }

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
