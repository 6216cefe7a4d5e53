// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! HireFlow CLI library - exposes testable components
//!
//! # Architecture
//!
//! - **Layer:** Interface / Presentation Layer
//! - **Purpose:** Command handlers, HTTP client, embedded host and server startup

pub mod client;
pub mod commands;
pub mod embedded;
pub mod server;
