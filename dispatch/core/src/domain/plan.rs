// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Execution plan and per-cycle context value objects

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use axon_cortex::domain::Category;

/// Resolved execution plan for one input. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub category: Category,
    /// Module ids in execution order (phase order, dependencies respected).
    pub modules: Vec<String>,
    pub estimated_cost: f64,
    pub estimated_latency_ms: f64,
    pub rationale: String,
    /// Whether the module cap truncated the optional set.
    pub capped: bool,
}

impl ExecutionPlan {
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn contains(&self, module_id: &str) -> bool {
        self.modules.iter().any(|m| m == module_id)
    }
}

/// Mutable scratch space one cycle's modules read and write.
///
/// Each execution owns its own context; nothing here is shared across
/// concurrent cycles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionContext {
    pub cycle_id: Uuid,
    pub input: String,
    pub category: Category,
    /// Free-form state accumulated across the module chain.
    pub state: HashMap<String, serde_json::Value>,
    /// Response buffer modules append to.
    pub response: String,
    /// Final confidence in [0, 1]; last writer wins.
    pub confidence: f64,
    /// Modules that actually executed, in order.
    pub activated: Vec<String>,
    /// Wall time spent in each executed module.
    pub timings_ms: HashMap<String, f64>,
    pub started_at: DateTime<Utc>,
}

impl ExecutionContext {
    pub fn new(input: impl Into<String>, category: Category) -> Self {
        Self {
            cycle_id: Uuid::new_v4(),
            input: input.into(),
            category,
            state: HashMap::new(),
            response: String::new(),
            confidence: 0.0,
            activated: Vec::new(),
            timings_ms: HashMap::new(),
            started_at: Utc::now(),
        }
    }

    pub fn set_state(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.state.insert(key.into(), value);
    }

    pub fn state_value(&self, key: &str) -> Option<&serde_json::Value> {
        self.state.get(key)
    }

    pub fn append_response(&mut self, text: &str) {
        self.response.push_str(text);
    }

    /// Summed wall time across executed modules.
    pub fn timed_module_ms(&self) -> f64 {
        self.timings_ms.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_starts_clean() {
        let ctx = ExecutionContext::new("hello", Category::SimpleChat);
        assert!(ctx.activated.is_empty());
        assert_eq!(ctx.confidence, 0.0);
        assert!(ctx.response.is_empty());
    }

    #[test]
    fn test_state_round_trip() {
        let mut ctx = ExecutionContext::new("x", Category::Unknown);
        ctx.set_state("plan_depth", serde_json::json!(3));
        assert_eq!(ctx.state_value("plan_depth"), Some(&serde_json::json!(3)));
    }

    #[test]
    fn test_timed_module_ms_sums() {
        let mut ctx = ExecutionContext::new("x", Category::Code);
        ctx.timings_ms.insert("a".to_string(), 10.0);
        ctx.timings_ms.insert("b".to_string(), 5.5);
        assert!((ctx.timed_module_ms() - 15.5).abs() < 1e-9);
    }
}
