// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Execution phases and static module descriptors

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use axon_cortex::domain::Category;

/// The seven ordered execution stages.
///
/// Modules in an earlier phase always run before modules in a later phase,
/// regardless of weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Gate,
    Pre,
    Context,
    Process,
    Audit,
    Post,
    Track,
}

impl Phase {
    pub const ALL: [Phase; 7] = [
        Phase::Gate,
        Phase::Pre,
        Phase::Context,
        Phase::Process,
        Phase::Audit,
        Phase::Post,
        Phase::Track,
    ];

    /// Position in the strict total phase order.
    pub fn index(&self) -> usize {
        match self {
            Phase::Gate => 0,
            Phase::Pre => 1,
            Phase::Context => 2,
            Phase::Process => 3,
            Phase::Audit => 4,
            Phase::Post => 5,
            Phase::Track => 6,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Gate => "gate",
            Phase::Pre => "pre",
            Phase::Context => "context",
            Phase::Process => "process",
            Phase::Audit => "audit",
            Phase::Post => "post",
            Phase::Track => "track",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of one processing module.
///
/// Built once at boot and never mutated; the execution binding and the live
/// smoothed latency are held by the orchestrator, not here.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub phase: Phase,
    /// Estimated monetary cost per activation (USD).
    pub cost_estimate: f64,
    /// Initial latency estimate (milliseconds); seeds the smoothed tracker.
    pub avg_latency_ms: f64,
    /// Ids of modules that must appear earlier in the same plan. Direct and
    /// already transitively correct by construction of the catalog.
    pub dependencies: Vec<&'static str>,
    /// Included in every plan regardless of weight.
    pub always_active: bool,
    /// Default activation weight per category; complete over all nine.
    pub default_weights: HashMap<Category, f64>,
}

impl ModuleDescriptor {
    pub fn builder(id: &'static str, name: &'static str, phase: Phase) -> ModuleDescriptorBuilder {
        ModuleDescriptorBuilder {
            id,
            name,
            phase,
            cost_estimate: 0.001,
            avg_latency_ms: 50.0,
            dependencies: Vec::new(),
            always_active: false,
            base_weight: 0.1,
            weights: HashMap::new(),
        }
    }

    pub fn default_weight(&self, category: Category) -> f64 {
        self.default_weights.get(&category).copied().unwrap_or(0.0)
    }

    pub fn depends_on(&self, other_id: &str) -> bool {
        self.dependencies.iter().any(|d| *d == other_id)
    }
}

/// Builder that guarantees a complete nine-category weight table.
pub struct ModuleDescriptorBuilder {
    id: &'static str,
    name: &'static str,
    phase: Phase,
    cost_estimate: f64,
    avg_latency_ms: f64,
    dependencies: Vec<&'static str>,
    always_active: bool,
    base_weight: f64,
    weights: HashMap<Category, f64>,
}

impl ModuleDescriptorBuilder {
    pub fn cost(mut self, usd: f64) -> Self {
        self.cost_estimate = usd;
        self
    }

    pub fn latency_ms(mut self, ms: f64) -> Self {
        self.avg_latency_ms = ms;
        self
    }

    pub fn depends_on(mut self, ids: &[&'static str]) -> Self {
        self.dependencies = ids.to_vec();
        self
    }

    pub fn always_active(mut self) -> Self {
        self.always_active = true;
        self
    }

    /// Default weight used for every category without an explicit override.
    pub fn base_weight(mut self, weight: f64) -> Self {
        self.base_weight = weight;
        self
    }

    pub fn weight(mut self, category: Category, weight: f64) -> Self {
        self.weights.insert(category, weight);
        self
    }

    pub fn build(self) -> ModuleDescriptor {
        let mut default_weights = HashMap::with_capacity(Category::ALL.len());
        for category in Category::ALL {
            let weight = self.weights.get(&category).copied().unwrap_or(self.base_weight);
            default_weights.insert(category, weight);
        }
        ModuleDescriptor {
            id: self.id,
            name: self.name,
            phase: self.phase,
            cost_estimate: self.cost_estimate,
            avg_latency_ms: self.avg_latency_ms,
            dependencies: self.dependencies,
            always_active: self.always_active,
            default_weights,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_order_is_strict() {
        for window in Phase::ALL.windows(2) {
            assert!(window[0].index() < window[1].index());
        }
    }

    #[test]
    fn test_builder_fills_all_nine_categories() {
        let module = ModuleDescriptor::builder("m", "M", Phase::Process)
            .base_weight(0.2)
            .weight(Category::Code, 0.9)
            .build();

        assert_eq!(module.default_weights.len(), 9);
        assert_eq!(module.default_weight(Category::Code), 0.9);
        assert_eq!(module.default_weight(Category::Market), 0.2);
    }

    #[test]
    fn test_depends_on() {
        let module = ModuleDescriptor::builder("b", "B", Phase::Audit)
            .depends_on(&["a"])
            .build();
        assert!(module.depends_on("a"));
        assert!(!module.depends_on("c"));
    }
}
