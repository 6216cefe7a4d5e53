// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Dispatch Statistics
//!
//! Measured per-agent counters backing `GET /api/metrics`. Every value here is
//! recorded by the dispatcher from real calls; nothing is synthesised.
//! The same measurements are mirrored to the `metrics` facade so a Prometheus
//! exporter can scrape them.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::domain::agent::AgentId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcomeKind {
    Success,
    Failure,
    Timeout,
    Panic,
}

impl DispatchOutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchOutcomeKind::Success => "success",
            DispatchOutcomeKind::Failure => "failure",
            DispatchOutcomeKind::Timeout => "timeout",
            DispatchOutcomeKind::Panic => "panic",
        }
    }
}

#[derive(Debug, Default)]
struct AgentCounters {
    calls: AtomicU64,
    successes: AtomicU64,
    failures: AtomicU64,
    timeouts: AtomicU64,
    total_micros: AtomicU64,
    max_micros: AtomicU64,
    tokens_used: AtomicU64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStatsSnapshot {
    pub calls: u64,
    pub successes: u64,
    pub failures: u64,
    pub timeouts: u64,
    pub average_latency_ms: f64,
    pub max_latency_ms: f64,
    pub tokens_used: u64,
}

#[derive(Debug, Default)]
pub struct DispatchStats {
    agents: DashMap<AgentId, AgentCounters>,
    not_found: AtomicU64,
}

impl DispatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &self,
        agent_id: &AgentId,
        outcome: DispatchOutcomeKind,
        elapsed: Duration,
        tokens_used: Option<u64>,
    ) {
        let micros = elapsed.as_micros().min(u64::MAX as u128) as u64;
        let counters = self.agents.entry(agent_id.clone()).or_default();

        counters.calls.fetch_add(1, Ordering::Relaxed);
        match outcome {
            DispatchOutcomeKind::Success => counters.successes.fetch_add(1, Ordering::Relaxed),
            DispatchOutcomeKind::Timeout => counters.timeouts.fetch_add(1, Ordering::Relaxed),
            DispatchOutcomeKind::Failure | DispatchOutcomeKind::Panic => {
                counters.failures.fetch_add(1, Ordering::Relaxed)
            }
        };
        counters.total_micros.fetch_add(micros, Ordering::Relaxed);
        counters.max_micros.fetch_max(micros, Ordering::Relaxed);
        if let Some(tokens) = tokens_used {
            counters.tokens_used.fetch_add(tokens, Ordering::Relaxed);
        }

        metrics::counter!(
            "hireflow_dispatch_total",
            "agent" => agent_id.to_string(),
            "outcome" => outcome.as_str()
        )
        .increment(1);
        metrics::histogram!("hireflow_dispatch_duration_seconds", "agent" => agent_id.to_string())
            .record(elapsed.as_secs_f64());
    }

    pub fn record_not_found(&self) {
        self.not_found.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("hireflow_dispatch_not_found_total").increment(1);
    }

    pub fn not_found(&self) -> u64 {
        self.not_found.load(Ordering::Relaxed)
    }

    pub fn agent(&self, agent_id: &AgentId) -> Option<AgentStatsSnapshot> {
        self.agents.get(agent_id).map(|counters| snapshot(&counters))
    }

    pub fn snapshot(&self) -> BTreeMap<AgentId, AgentStatsSnapshot> {
        self.agents
            .iter()
            .map(|entry| (entry.key().clone(), snapshot(entry.value())))
            .collect()
    }
}

fn snapshot(counters: &AgentCounters) -> AgentStatsSnapshot {
    let calls = counters.calls.load(Ordering::Relaxed);
    let total_ms = counters.total_micros.load(Ordering::Relaxed) as f64 / 1000.0;
    AgentStatsSnapshot {
        calls,
        successes: counters.successes.load(Ordering::Relaxed),
        failures: counters.failures.load(Ordering::Relaxed),
        timeouts: counters.timeouts.load(Ordering::Relaxed),
        average_latency_ms: if calls == 0 { 0.0 } else { total_ms / calls as f64 },
        max_latency_ms: counters.max_micros.load(Ordering::Relaxed) as f64 / 1000.0,
        tokens_used: counters.tokens_used.load(Ordering::Relaxed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_outcomes_per_agent() {
        let stats = DispatchStats::new();
        let agent = AgentId::from("culture-matcher");

        stats.record(&agent, DispatchOutcomeKind::Success, Duration::from_millis(10), Some(50));
        stats.record(&agent, DispatchOutcomeKind::Failure, Duration::from_millis(30), None);
        stats.record(&agent, DispatchOutcomeKind::Timeout, Duration::from_millis(20), None);
        stats.record_not_found();

        let snap = stats.agent(&agent).unwrap();
        assert_eq!(snap.calls, 3);
        assert_eq!(snap.successes, 1);
        assert_eq!(snap.failures, 1);
        assert_eq!(snap.timeouts, 1);
        assert_eq!(snap.tokens_used, 50);
        assert!((snap.average_latency_ms - 20.0).abs() < 1e-9);
        assert!((snap.max_latency_ms - 30.0).abs() < 1e-9);
        assert_eq!(stats.not_found(), 1);
        assert!(stats.agent(&AgentId::from("ghost")).is_none());
    }
}
