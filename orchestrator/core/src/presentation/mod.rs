// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Presentation Layer (`hireflow-core`)
//!
//! HTTP surface that translates external requests into dispatcher calls.
//! No agent logic lives here.
//!
//! | Module | Transport | Description |
//! |--------|-----------|-------------|
//! | [`api`] | HTTP/SSE (Axum) | Agent dispatch, discovery, metrics, health and event streaming |

pub mod api;
