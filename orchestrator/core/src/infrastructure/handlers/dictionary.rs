// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Dictionary Bot agent
//!
//! Defines recruiting and technology terms from the built-in glossary plus
//! any terms added at runtime through the `define` action. Runtime terms live
//! behind a read-write lock so concurrent lookups never block each other.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

use super::glossary::{self, find_word, normalize, GlossaryEntry, TermCategory, GLOSSARY};
use crate::domain::envelope::{AgentRequest, HandlerOutput};
use crate::domain::handler::{ActionSet, AgentHandler, HandlerError};

#[derive(Debug, Deserialize)]
#[serde(tag = "action", content = "params", rename_all = "snake_case")]
enum DictionaryAction {
    Lookup {
        term: String,
    },
    Extract {
        text: String,
    },
    List {
        #[serde(default)]
        category: Option<TermCategory>,
    },
    Define {
        term: String,
        definition: String,
        #[serde(default)]
        category: Option<TermCategory>,
    },
}

impl ActionSet for DictionaryAction {
    const ACTIONS: &'static [&'static str] = &["lookup", "extract", "list", "define"];
}

#[derive(Debug, Clone)]
struct CustomTerm {
    term: String,
    definition: String,
    category: Option<TermCategory>,
}

#[derive(Debug, Default)]
pub struct DictionaryHandler {
    // keyed by normalized term
    custom: RwLock<BTreeMap<String, CustomTerm>>,
}

impl DictionaryHandler {
    pub fn new() -> Self {
        Self::default()
    }

    fn builtin_json(entry: &GlossaryEntry) -> Value {
        json!({
            "term": entry.term,
            "definition": entry.definition,
            "category": entry.category,
            "aliases": entry.aliases,
            "related": entry.related,
            "source": "builtin",
        })
    }

    fn custom_json(entry: &CustomTerm) -> Value {
        json!({
            "term": entry.term,
            "definition": entry.definition,
            "category": entry.category,
            "source": "custom",
        })
    }

    fn lookup(&self, term: &str) -> Result<Value, HandlerError> {
        let key = normalize(term);
        if key.is_empty() {
            return Err(HandlerError::InvalidParams {
                action: "lookup".to_string(),
                reason: "term must not be empty".to_string(),
            });
        }

        // runtime definitions shadow the built-in glossary
        if let Some(custom) = self.custom.read().get(&key) {
            return Ok(Self::custom_json(custom));
        }

        glossary::find(term)
            .map(Self::builtin_json)
            .ok_or_else(|| HandlerError::execution(format!("no definition found for '{}'", term.trim())))
    }

    fn extract(&self, text: &str) -> Value {
        let mut terms: Vec<Value> = glossary::extract(text)
            .into_iter()
            .map(|entry| json!({"term": entry.term, "category": entry.category, "definition": entry.definition}))
            .collect();

        let haystack = normalize(text);
        for (key, custom) in self.custom.read().iter() {
            let already = terms.iter().any(|t| t["term"].as_str().map(normalize).as_deref() == Some(key.as_str()));
            if !already && find_word(&haystack, key).is_some() {
                terms.push(json!({"term": custom.term, "category": custom.category, "definition": custom.definition}));
            }
        }

        json!({ "count": terms.len(), "terms": terms })
    }

    fn list(&self, category: Option<TermCategory>) -> Value {
        let mut terms: Vec<String> = GLOSSARY
            .iter()
            .filter(|entry| category.is_none_or(|c| entry.category == c))
            .map(|entry| entry.term.to_string())
            .collect();
        terms.extend(
            self.custom
                .read()
                .values()
                .filter(|custom| category.is_none_or(|c| custom.category == Some(c)))
                .map(|custom| custom.term.clone()),
        );
        terms.sort_by_key(|t| t.to_lowercase());
        terms.dedup_by(|a, b| a.eq_ignore_ascii_case(b));

        json!({ "count": terms.len(), "terms": terms })
    }

    fn define(&self, term: String, definition: String, category: Option<TermCategory>) -> Result<Value, HandlerError> {
        let key = normalize(&term);
        if key.is_empty() || definition.trim().is_empty() {
            return Err(HandlerError::InvalidParams {
                action: "define".to_string(),
                reason: "term and definition must not be empty".to_string(),
            });
        }

        let entry = CustomTerm {
            term: term.trim().to_string(),
            definition: definition.trim().to_string(),
            category,
        };
        let replaced = self.custom.write().insert(key, entry.clone()).is_some();
        tracing::debug!(term = %entry.term, replaced, "Stored custom dictionary term");

        Ok(json!({ "term": entry.term, "created": !replaced }))
    }
}

#[async_trait]
impl AgentHandler for DictionaryHandler {
    async fn handle(&self, request: &AgentRequest) -> Result<HandlerOutput, HandlerError> {
        let data = match DictionaryAction::parse(request)? {
            DictionaryAction::Lookup { term } => self.lookup(&term)?,
            DictionaryAction::Extract { text } => self.extract(&text),
            DictionaryAction::List { category } => self.list(category),
            DictionaryAction::Define {
                term,
                definition,
                category,
            } => self.define(term, definition, category)?,
        };
        Ok(HandlerOutput::new(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_builtin_term() {
        let handler = DictionaryHandler::new();
        let request = AgentRequest::new("lookup").with_param("term", "kubernetes");

        let output = handler.handle(&request).await.unwrap();
        assert_eq!(output.data["term"], "Kubernetes");
        assert_eq!(output.data["category"], "infrastructure");
        assert_eq!(output.data["source"], "builtin");
        assert!(!output.data["definition"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lookup_unknown_term_fails() {
        let handler = DictionaryHandler::new();
        let err = handler
            .handle(&AgentRequest::new("lookup").with_param("term", "Fortran 77"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "no definition found for 'Fortran 77'");
    }

    #[tokio::test]
    async fn test_define_then_lookup_and_extract() {
        let handler = DictionaryHandler::new();
        let define = AgentRequest::new("define")
            .with_param("term", "Req")
            .with_param("definition", "An approved, open requisition to hire.")
            .with_param("category", "recruiting");

        let created = handler.handle(&define).await.unwrap();
        assert_eq!(created.data["created"], true);
        let replaced = handler.handle(&define).await.unwrap();
        assert_eq!(replaced.data["created"], false);

        let looked_up = handler
            .handle(&AgentRequest::new("lookup").with_param("term", "REQ"))
            .await
            .unwrap();
        assert_eq!(looked_up.data["source"], "custom");

        let extracted = handler
            .handle(&AgentRequest::new("extract").with_param("text", "Opened a req for a Rust role"))
            .await
            .unwrap();
        let terms: Vec<&str> = extracted.data["terms"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["term"].as_str().unwrap())
            .collect();
        assert_eq!(terms, vec!["Rust", "Req"]);
    }

    #[tokio::test]
    async fn test_list_by_category() {
        let handler = DictionaryHandler::new();
        let output = handler
            .handle(&AgentRequest::new("list").with_param("category", "recruiting"))
            .await
            .unwrap();

        let terms = output.data["terms"].as_array().unwrap();
        assert!(terms.iter().any(|t| t == "Boolean Search"));
        assert!(!terms.iter().any(|t| t == "Rust"));
    }

    #[tokio::test]
    async fn test_unknown_action_is_rejected() {
        let handler = DictionaryHandler::new();
        let err = handler.handle(&AgentRequest::new("translate")).await.unwrap_err();
        assert_eq!(err, HandlerError::UnsupportedAction("translate".to_string()));
    }
}
