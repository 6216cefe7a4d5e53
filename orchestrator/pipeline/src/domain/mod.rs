// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Pipeline Domain Layer
//!
//! Pure message and conversation types. No I/O dependencies.
//!
//! | Module | Key Types |
//! |--------|-----------|
//! | [`message`] | `AgentMessage`, `MessageId`, `CorrelationId`, `MessageKind`, `MessagePriority` |
//! | [`conversation`] | `Conversation`, `ConversationState` |

pub mod conversation;
pub mod message;

pub use conversation::*;
pub use message::*;
