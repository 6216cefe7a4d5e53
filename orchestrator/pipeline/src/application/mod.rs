// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod bridge;
pub mod router;

pub use bridge::{BridgeError, DispatchBridge};
pub use router::{MessageRouter, RouterError};
