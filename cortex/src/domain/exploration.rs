// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Exploration strategies and findings produced during idle periods

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Analysis strategy picked for one idle exploration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplorationStrategy {
    /// Flag categories that perform poorly despite real traffic.
    PerformanceStudy,
    /// Flag categories with little or no observed traffic.
    CapabilityGapScan,
    /// Propose re-activation experiments for weights stuck just below the
    /// activation threshold.
    ModuleExperiment,
    /// Flag modules suppressed across many categories and chronically
    /// low-confidence categories.
    FailurePatternReview,
}

impl ExplorationStrategy {
    pub const ALL: [ExplorationStrategy; 4] = [
        ExplorationStrategy::PerformanceStudy,
        ExplorationStrategy::CapabilityGapScan,
        ExplorationStrategy::ModuleExperiment,
        ExplorationStrategy::FailurePatternReview,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExplorationStrategy::PerformanceStudy => "performance_study",
            ExplorationStrategy::CapabilityGapScan => "capability_gap_scan",
            ExplorationStrategy::ModuleExperiment => "module_experiment",
            ExplorationStrategy::FailurePatternReview => "failure_pattern_review",
        }
    }
}

impl std::fmt::Display for ExplorationStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured result of one exploration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorationResult {
    pub strategy: ExplorationStrategy,
    pub description: String,
    pub findings: Vec<String>,
    /// Concrete follow-up actions, empty when the run was purely diagnostic.
    pub proposed_changes: Vec<String>,
    pub explored_at: DateTime<Utc>,
}

impl ExplorationResult {
    pub fn new(
        strategy: ExplorationStrategy,
        description: impl Into<String>,
        findings: Vec<String>,
        proposed_changes: Vec<String>,
    ) -> Self {
        Self {
            strategy,
            description: description.into(),
            findings,
            proposed_changes,
            explored_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_labels_are_distinct() {
        let labels: std::collections::HashSet<_> =
            ExplorationStrategy::ALL.iter().map(|s| s.as_str()).collect();
        assert_eq!(labels.len(), 4);
    }

    #[test]
    fn test_result_serde_round_trip() {
        let result = ExplorationResult::new(
            ExplorationStrategy::ModuleExperiment,
            "weights near the activation threshold",
            vec!["risk_auditor/market at 0.12".to_string()],
            vec!["force-activate risk_auditor for market".to_string()],
        );
        let json = serde_json::to_string(&result).unwrap();
        let restored: ExplorationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.strategy, ExplorationStrategy::ModuleExperiment);
        assert_eq!(restored.findings.len(), 1);
    }
}
