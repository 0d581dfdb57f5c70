// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Processing outcome value object consumed by the plasticity store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::category::Category;

/// Confidence level above which a cycle counts as successful.
pub const SUCCESS_CONFIDENCE_THRESHOLD: f64 = 0.4;

/// Cost attributed to one millisecond of module wall time.
///
/// Outcome cost is derived from what actually ran, not from the registry's
/// static estimates (unbound modules are skipped and must not be billed).
pub const COST_PER_TIMED_MS: f64 = 0.0001;

/// Summary of one completed dispatch cycle.
///
/// Consumed exactly once by [`PlasticityStore::record`]; only its aggregate
/// effect on weights and statistics survives.
///
/// [`PlasticityStore::record`]: crate::application::PlasticityStore::record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingOutcome {
    pub category: Category,
    /// Ids of the modules that actually executed, in plan order.
    pub activated_modules: Vec<String>,
    pub total_latency_ms: f64,
    /// Final confidence in [0, 1].
    pub confidence: f64,
    pub success: bool,
    pub cost: f64,
    pub completed_at: DateTime<Utc>,
}

impl ProcessingOutcome {
    /// Build an outcome from a finished cycle, deriving `success` and `cost`.
    pub fn new(
        category: Category,
        activated_modules: Vec<String>,
        total_latency_ms: f64,
        timed_module_ms: f64,
        confidence: f64,
    ) -> Self {
        let confidence = confidence.clamp(0.0, 1.0);
        Self {
            category,
            activated_modules,
            total_latency_ms,
            confidence,
            success: confidence > SUCCESS_CONFIDENCE_THRESHOLD,
            cost: timed_module_ms * COST_PER_TIMED_MS,
            completed_at: Utc::now(),
        }
    }
}
