// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Learned-weight table and per-category statistics
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Hebbian weight cells and the serializable plasticity snapshot

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::category::Category;

/// Weights never drop below this floor; suppressed modules stay explorable.
pub const WEIGHT_FLOOR: f64 = 0.05;

/// Weights never exceed this ceiling.
pub const WEIGHT_CEILING: f64 = 1.0;

/// Weight assumed for a module/category pair that has never been updated.
pub const DEFAULT_WEIGHT: f64 = 0.5;

/// Smoothing factor of the exponential-moving-average weight update.
pub const LEARNING_RATE: f64 = 0.15;

/// Minimum effective weight an optional module needs to be planned in.
///
/// Shared with the dispatch planner; the curiosity engine treats the band
/// between [`WEIGHT_FLOOR`] and this threshold as "suppressed but worth an
/// experiment".
pub const ACTIVATION_THRESHOLD: f64 = 0.15;

/// Apply one Hebbian update step to a weight cell.
///
/// Modules that fired during a successful cycle move toward the ceiling,
/// modules that fired during a failed cycle move toward the floor. The
/// clamp keeps every cell inside `[WEIGHT_FLOOR, WEIGHT_CEILING]`.
pub fn hebbian_step(old_weight: f64, success: bool) -> f64 {
    let target = if success { 1.0 } else { 0.0 };
    (old_weight + LEARNING_RATE * (target - old_weight)).clamp(WEIGHT_FLOOR, WEIGHT_CEILING)
}

/// Aggregate statistics for one category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub samples: u64,
    pub confidence_sum: f64,
    pub latency_sum_ms: f64,
}

impl CategoryStats {
    pub fn avg_confidence(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.confidence_sum / self.samples as f64
        }
    }

    pub fn avg_latency_ms(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.latency_sum_ms / self.samples as f64
        }
    }
}

/// Serializable copy of the full plasticity state.
///
/// Written to the knowledge store by the flush loop and reloaded at boot;
/// a round trip reproduces every weight cell and statistic exactly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlasticitySnapshot {
    /// module id -> category -> learned weight in [0.05, 1.0]
    pub weights: HashMap<String, HashMap<Category, f64>>,
    pub stats: HashMap<Category, CategoryStats>,
}

impl PlasticitySnapshot {
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty() && self.stats.is_empty()
    }

    /// Total number of weight cells across all modules.
    pub fn cell_count(&self) -> usize {
        self.weights.values().map(|per_category| per_category.len()).sum()
    }
}
