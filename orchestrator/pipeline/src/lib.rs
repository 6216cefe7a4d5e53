// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # `hireflow-pipeline`: Inter-agent Messaging
//!
//! Lets an orchestrator sequence the recruiting agents by exchanging
//! [`AgentMessage`]s instead of calling the dispatcher directly.
//!
//! ## Crate Layout
//!
//! | Module | Layer | Contents |
//! |--------|-------|----------|
//! | [`domain`] | Domain | `AgentMessage`, `Conversation` state machine |
//! | [`application`] | Application | `MessageRouter` mailboxes, `DispatchBridge` |
//!
//! ## Key Concepts
//!
//! - **Conversation**: every message sharing a correlation id. Opened by a
//!   request, closed by the response or error.
//! - **Mailbox**: per-agent queue, high priority first and FIFO within a
//!   priority. Each recipient receives its copy once.
//! - **Bridge**: turns request messages into dispatcher calls and the
//!   resulting envelopes back into reply messages, summing cost tracking.

pub mod domain;
pub mod application;

pub use application::{DispatchBridge, MessageRouter};
pub use domain::*;
