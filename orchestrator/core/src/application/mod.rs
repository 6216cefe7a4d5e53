// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod bootstrap;
pub mod dispatcher;
pub mod health;
pub mod stats;

pub use bootstrap::{build_registry, validate_manifest, AgentHost, BootstrapError};
pub use dispatcher::{Dispatcher, DispatcherConfig};
pub use health::{HealthMonitor, HealthSnapshot, HealthStatus};
