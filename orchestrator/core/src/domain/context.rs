// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Invocation Context - job/candidate identity, pipeline stage and cost counters
// carried alongside a request or an inter-agent message. The dispatch core
// never enforces stage ordering; it only transports these values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Recruiting pipeline phase label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    Sourcing,
    Screening,
    Outreach,
    Interview,
    Offer,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Sourcing => "sourcing",
            PipelineStage::Screening => "screening",
            PipelineStage::Outreach => "outreach",
            PipelineStage::Interview => "interview",
            PipelineStage::Offer => "offer",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Running totals of external spend across a sequence of agent calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostTracking {
    pub api_calls: u64,
    pub tokens_used: u64,
    pub estimated_cost: f64,
}

impl CostTracking {
    /// Account for one agent call and whatever usage it reported.
    pub fn record_call(&mut self, tokens: Option<u64>, cost: Option<f64>) {
        self.api_calls += 1;
        self.tokens_used += tokens.unwrap_or(0);
        self.estimated_cost += cost.unwrap_or(0.0);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<PipelineStage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_tracking: Option<CostTracking>,
}

impl InvocationContext {
    pub fn for_job(job_id: impl Into<String>) -> Self {
        Self {
            job_id: Some(job_id.into()),
            ..Self::default()
        }
    }

    pub fn with_candidate(mut self, candidate_id: impl Into<String>) -> Self {
        self.candidate_id = Some(candidate_id.into());
        self
    }

    pub fn with_stage(mut self, stage: PipelineStage) -> Self {
        self.stage = Some(stage);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_tracking_accumulates() {
        let mut tracking = CostTracking::default();
        tracking.record_call(Some(120), Some(0.002));
        tracking.record_call(None, None);

        assert_eq!(tracking.api_calls, 2);
        assert_eq!(tracking.tokens_used, 120);
        assert!((tracking.estimated_cost - 0.002).abs() < f64::EPSILON);
    }

    #[test]
    fn test_context_wire_format() {
        let ctx = InvocationContext::for_job("job-42").with_stage(PipelineStage::Screening);
        let value = serde_json::to_value(&ctx).unwrap();

        assert_eq!(value["jobId"], "job-42");
        assert_eq!(value["stage"], "screening");
        assert!(value.get("candidateId").is_none());
        assert!(InvocationContext::default().is_empty());
    }
}
