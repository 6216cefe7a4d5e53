// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Culture Matcher agent
//!
//! Scores how well a candidate's stated values cover a company's values.
//! Free-text values are normalised onto a fixed set of culture dimensions;
//! anything unrecognised is compared verbatim (case-insensitive).
//!
//! `score = 100 * sum(weight of company values the candidate shares) / sum(all company weights)`
//!
//! When several weight keys land on the same dimension, a key that already is
//! the canonical form wins; otherwise the first key in sorted order does.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;

use super::glossary::{find_word, normalize};
use crate::domain::envelope::{AgentRequest, HandlerOutput};
use crate::domain::handler::{ActionSet, AgentHandler, HandlerError};

pub struct CultureDimension {
    pub id: &'static str,
    pub label: &'static str,
    pub synonyms: &'static [&'static str],
}

pub static DIMENSIONS: &[CultureDimension] = &[
    CultureDimension {
        id: "collaboration",
        label: "Collaboration",
        synonyms: &["teamwork", "collaborative", "team player", "cross-functional"],
    },
    CultureDimension {
        id: "autonomy",
        label: "Autonomy",
        synonyms: &["ownership", "independent", "self-directed", "autonomous"],
    },
    CultureDimension {
        id: "innovation",
        label: "Innovation",
        synonyms: &["innovative", "creative", "creativity", "experimentation"],
    },
    CultureDimension {
        id: "learning",
        label: "Learning & Growth",
        synonyms: &["growth", "mentorship", "curiosity", "continuous learning"],
    },
    CultureDimension {
        id: "transparency",
        label: "Transparency",
        synonyms: &["open communication", "honesty", "transparent", "candor"],
    },
    CultureDimension {
        id: "customer-focus",
        label: "Customer Focus",
        synonyms: &["customer obsessed", "customer-centric", "user-centric", "customer first"],
    },
    CultureDimension {
        id: "work-life-balance",
        label: "Work-Life Balance",
        synonyms: &["flexibility", "flexible hours", "remote-first", "balance"],
    },
    CultureDimension {
        id: "diversity",
        label: "Diversity & Inclusion",
        synonyms: &["inclusion", "inclusive", "equity", "belonging"],
    },
    CultureDimension {
        id: "impact",
        label: "Impact",
        synonyms: &["mission-driven", "purpose", "meaningful work"],
    },
    CultureDimension {
        id: "excellence",
        label: "Excellence",
        synonyms: &["quality", "craftsmanship", "high standards"],
    },
    CultureDimension {
        id: "speed",
        label: "Speed",
        synonyms: &["fast-paced", "move fast", "agility", "bias for action"],
    },
];

/// Map a free-text value to a dimension id, or keep it as a normalised literal.
fn canonical_value(value: &str) -> String {
    let normalized = normalize(value);
    DIMENSIONS
        .iter()
        .find(|d| {
            d.id == normalized
                || normalize(d.label) == normalized
                || d.synonyms.iter().any(|s| *s == normalized)
        })
        .map(|d| d.id.to_string())
        .unwrap_or(normalized)
}

/// Culture dimensions mentioned anywhere in `text`, in table order.
pub fn detect_dimensions(text: &str) -> Vec<&'static str> {
    let haystack = normalize(text);
    DIMENSIONS
        .iter()
        .filter(|d| {
            std::iter::once(d.id)
                .chain(d.synonyms.iter().copied())
                .any(|form| find_word(&haystack, form).is_some())
        })
        .map(|d| d.id)
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", content = "params", rename_all = "snake_case")]
enum CultureAction {
    #[serde(rename_all = "camelCase")]
    Match {
        candidate_values: Vec<String>,
        company_values: Vec<String>,
        #[serde(default)]
        weights: BTreeMap<String, f64>,
    },
    Dimensions {},
}

impl ActionSet for CultureAction {
    const ACTIONS: &'static [&'static str] = &["match", "dimensions"];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CultureMatch {
    pub score: f64,
    pub fit: &'static str,
    pub matched: Vec<String>,
    pub missing: Vec<String>,
    pub additional: Vec<String>,
}

fn dedup_canonical(values: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values.iter().map(|v| canonical_value(v)).filter(|v| !v.is_empty()) {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

/// Canonicalise weight keys. Iteration over the sorted input keeps the result
/// independent of how the request was built.
fn canonical_weights(
    weights: &BTreeMap<String, f64>,
) -> Result<BTreeMap<String, f64>, HandlerError> {
    let mut resolved: BTreeMap<String, (f64, bool)> = BTreeMap::new();
    for (key, weight) in weights {
        if !weight.is_finite() || *weight < 0.0 {
            return Err(HandlerError::execution(format!(
                "weight for '{}' must be a non-negative number, got {}",
                key, weight
            )));
        }
        let canonical = canonical_value(key);
        let exact = normalize(key) == canonical;
        match resolved.get(&canonical) {
            Some((_, true)) => {}
            Some((_, false)) if !exact => {}
            _ => {
                resolved.insert(canonical, (*weight, exact));
            }
        }
    }
    Ok(resolved.into_iter().map(|(k, (w, _))| (k, w)).collect())
}

pub fn score_match(
    candidate_values: &[String],
    company_values: &[String],
    weights: &BTreeMap<String, f64>,
) -> Result<CultureMatch, HandlerError> {
    let company = dedup_canonical(company_values);
    if company.is_empty() {
        return Err(HandlerError::execution("companyValues must contain at least one value"));
    }
    let candidate = dedup_canonical(candidate_values);

    let weights = canonical_weights(weights)?;
    let weight_of = |value: &String| weights.get(value).copied().unwrap_or(1.0);

    let total: f64 = company.iter().map(weight_of).sum();
    if total == 0.0 {
        return Err(HandlerError::execution("company value weights sum to zero"));
    }

    let (matched, missing): (Vec<String>, Vec<String>) =
        company.iter().cloned().partition(|value| candidate.contains(value));
    let shared: f64 = matched.iter().map(weight_of).sum();
    let additional = candidate
        .into_iter()
        .filter(|value| !company.contains(value))
        .collect();

    let score = (shared / total * 1000.0).round() / 10.0;
    let fit = if score >= 80.0 {
        "strong"
    } else if score >= 50.0 {
        "moderate"
    } else {
        "weak"
    };

    Ok(CultureMatch {
        score,
        fit,
        matched,
        missing,
        additional,
    })
}

#[derive(Debug, Default)]
pub struct CultureMatcherHandler;

impl CultureMatcherHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AgentHandler for CultureMatcherHandler {
    async fn handle(&self, request: &AgentRequest) -> Result<HandlerOutput, HandlerError> {
        match CultureAction::parse(request)? {
            CultureAction::Match {
                candidate_values,
                company_values,
                weights,
            } => {
                let result = score_match(&candidate_values, &company_values, &weights)?;
                let mut data = json!(result);
                if let Some(candidate_id) = &request.context.candidate_id {
                    data["candidateId"] = json!(candidate_id);
                }
                Ok(HandlerOutput::new(data))
            }
            CultureAction::Dimensions {} => {
                let dimensions: Vec<_> = DIMENSIONS
                    .iter()
                    .map(|d| json!({"id": d.id, "label": d.label, "synonyms": d.synonyms}))
                    .collect();
                Ok(HandlerOutput::new(json!({ "dimensions": dimensions })))
            }
        }
    }
}
