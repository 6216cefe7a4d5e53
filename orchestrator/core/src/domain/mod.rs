// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain Layer
//!
//! Pure types and rules: no I/O, no runtime handles.

pub mod agent;
pub mod context;
pub mod envelope;
pub mod events;
pub mod handler;
pub mod node_config;
pub mod registry;
