// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # HireFlow Core
//!
//! Agent registry and dispatcher for the HireFlow recruiting agents.
//!
//! # Architecture
//!
//! - **domain**: descriptors, the request/response envelope, handler trait, registry, node config
//! - **application**: dispatcher, health monitor, dispatch statistics, bootstrap
//! - **infrastructure**: event bus and the reference agent handlers
//! - **presentation**: HTTP API

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use application::bootstrap::AgentHost;
pub use application::dispatcher::{Dispatcher, DispatchError, DispatchOutcome};
pub use domain::agent::{AgentDescriptor, AgentId};
pub use domain::envelope::{AgentRequest, AgentResponse};
