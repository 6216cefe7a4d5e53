// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Reference agent handlers
//!
//! | Key | Handler | Actions |
//! |-----|---------|---------|
//! | `smart-database` | [`SmartDatabaseHandler`] | `analyze_job`, `analyze_candidate` |
//! | `dictionary-bot` | [`DictionaryHandler`] | `lookup`, `extract`, `list`, `define` |
//! | `culture-matcher` | [`CultureMatcherHandler`] | `match`, `dimensions` |
//!
//! Configuration binds roster entries to these keys (see `AgentConfig::handler_key`).

use std::sync::Arc;

use crate::domain::handler::AgentHandler;

pub mod culture_matcher;
pub mod dictionary;
pub mod glossary;
pub mod smart_database;

pub use culture_matcher::CultureMatcherHandler;
pub use dictionary::DictionaryHandler;
pub use smart_database::SmartDatabaseHandler;

pub const HANDLER_KEYS: &[&str] = &["smart-database", "dictionary-bot", "culture-matcher"];

/// Instantiate the handler registered under `key`.
pub fn create_handler(key: &str) -> Option<Arc<dyn AgentHandler>> {
    match key {
        "smart-database" => Some(Arc::new(SmartDatabaseHandler::new())),
        "dictionary-bot" => Some(Arc::new(DictionaryHandler::new())),
        "culture-matcher" => Some(Arc::new(CultureMatcherHandler::new())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_key_has_a_handler() {
        for key in HANDLER_KEYS {
            assert!(create_handler(key).is_some(), "missing handler for {key}");
        }
        assert!(create_handler("recruiter").is_none());
    }
}
