// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Planner - weight-driven module selection and ordering
//!
//! Combines the registry's static defaults with learned weights to pick the
//! module set for one input, then orders it by phase with dependencies
//! respected and applies the hard module cap.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Build the per-invocation execution plan

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::debug;

use axon_cortex::domain::{Category, ACTIVATION_THRESHOLD};

use crate::domain::{ExecutionPlan, ModuleDescriptor, ModuleRegistry};

/// Planner tunables.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Minimum effective weight for an optional module to be selected.
    pub activation_threshold: f64,

    /// Hard cap on the number of modules in one plan.
    pub max_modules: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            activation_threshold: ACTIVATION_THRESHOLD,
            max_modules: 20,
        }
    }
}

struct Candidate<'a> {
    module: &'a ModuleDescriptor,
    effective_weight: f64,
    /// Position in the registry catalog; keeps ordering deterministic.
    catalog_index: usize,
}

/// Build the execution plan for an already-classified input.
///
/// `learned` is the (possibly partial) learned-weight map for the category;
/// `latencies` holds the current smoothed per-module latency estimates.
pub fn build_plan(
    registry: &ModuleRegistry,
    category: Category,
    learned: &HashMap<String, f64>,
    latencies: &HashMap<String, f64>,
    config: &PlannerConfig,
) -> ExecutionPlan {
    let mut selected: Vec<Candidate<'_>> = Vec::new();

    for (catalog_index, module) in registry.all().iter().enumerate() {
        let effective_weight = learned
            .get(module.id)
            .copied()
            .unwrap_or_else(|| module.default_weight(category));

        if module.always_active || effective_weight >= config.activation_threshold {
            selected.push(Candidate {
                module,
                effective_weight,
                catalog_index,
            });
        }
    }

    let always_active = selected.iter().filter(|c| c.module.always_active).count();
    let mut capped = false;

    if selected.len() > config.max_modules {
        capped = true;
        // Always-active modules are kept unconditionally; the optional rest
        // competes on effective weight for the remaining capacity.
        let (kept, mut optional): (Vec<_>, Vec<_>) =
            selected.into_iter().partition(|c| c.module.always_active);
        optional.sort_by(|a, b| {
            b.effective_weight
                .partial_cmp(&a.effective_weight)
                .unwrap_or(Ordering::Equal)
        });
        optional.truncate(config.max_modules.saturating_sub(kept.len()));

        selected = kept;
        selected.extend(optional);
    }

    order_by_phase_and_dependencies(&mut selected);

    let estimated_cost: f64 = selected.iter().map(|c| c.module.cost_estimate).sum();
    let estimated_latency_ms: f64 = selected
        .iter()
        .map(|c| {
            latencies
                .get(c.module.id)
                .copied()
                .unwrap_or(c.module.avg_latency_ms)
        })
        .sum();

    let rationale = format!(
        "category={}: selected {}/{} modules ({} always-active){}",
        category,
        selected.len(),
        registry.len(),
        always_active,
        if capped { ", capped at module limit" } else { "" }
    );

    debug!(
        category = %category,
        modules = selected.len(),
        capped,
        "Built execution plan"
    );

    ExecutionPlan {
        category,
        modules: selected.iter().map(|c| c.module.id.to_string()).collect(),
        estimated_cost,
        estimated_latency_ms,
        rationale,
        capped,
    }
}

/// Phase order first; within the same phase a module sorts after any
/// co-selected module it directly depends on. The depth key is a fixpoint
/// over the direct dependency edges among co-selected, same-phase modules;
/// the catalog index keeps the result deterministic.
fn order_by_phase_and_dependencies(selected: &mut [Candidate<'_>]) {
    let phase_of: HashMap<&str, usize> = selected
        .iter()
        .map(|c| (c.module.id, c.module.phase.index()))
        .collect();

    let mut depth: HashMap<&str, usize> = selected.iter().map(|c| (c.module.id, 0)).collect();
    // Dependency chains are short and acyclic (registry invariant), so this
    // settles in a handful of passes.
    for _ in 0..selected.len() {
        let mut changed = false;
        for candidate in selected.iter() {
            let module = candidate.module;
            for dep in &module.dependencies {
                if phase_of.get(dep) != Some(&module.phase.index()) {
                    continue;
                }
                let wanted = depth[dep] + 1;
                if depth[module.id] < wanted {
                    depth.insert(module.id, wanted);
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }

    selected.sort_by_key(|c| (c.module.phase.index(), depth[c.module.id], c.catalog_index));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Phase;

    fn plan_for(category: Category, learned: &HashMap<String, f64>) -> ExecutionPlan {
        let registry = ModuleRegistry::create();
        build_plan(
            &registry,
            category,
            learned,
            &HashMap::new(),
            &PlannerConfig::default(),
        )
    }

    #[test]
    fn test_always_active_modules_present_for_every_category() {
        let registry = ModuleRegistry::create();
        for category in Category::ALL {
            let plan = plan_for(category, &HashMap::new());
            for id in registry.always_active_ids() {
                assert!(plan.contains(id), "{id} missing from {category} plan");
            }
        }
    }

    #[test]
    fn test_phase_order_never_violated() {
        let registry = ModuleRegistry::create();
        for category in Category::ALL {
            let plan = plan_for(category, &HashMap::new());
            let indices: Vec<usize> = plan
                .modules
                .iter()
                .map(|id| registry.get(id).unwrap().phase.index())
                .collect();
            assert!(indices.windows(2).all(|w| w[0] <= w[1]), "category {category}");
        }
    }

    #[test]
    fn test_dependencies_sort_earlier_within_phase() {
        let plan = plan_for(Category::Market, &HashMap::new());
        let fact = plan.modules.iter().position(|m| m == "fact_checker").unwrap();
        let risk = plan.modules.iter().position(|m| m == "risk_auditor").unwrap();
        assert!(fact < risk);
    }

    #[test]
    fn test_plan_never_exceeds_cap() {
        // Learned weights push every module over the threshold.
        let registry = ModuleRegistry::create();
        let learned: HashMap<String, f64> = registry
            .all()
            .iter()
            .map(|m| (m.id.to_string(), 0.9))
            .collect();

        let plan = plan_for(Category::Unknown, &learned);
        assert!(plan.capped);
        assert_eq!(plan.len(), 20);
        for id in registry.always_active_ids() {
            assert!(plan.contains(id));
        }
    }

    #[test]
    fn test_capped_plan_keeps_highest_weights_and_phase_order() {
        let registry = ModuleRegistry::create();
        let mut learned: HashMap<String, f64> = registry
            .all()
            .iter()
            .map(|m| (m.id.to_string(), 0.5))
            .collect();
        learned.insert("style_polisher".to_string(), 0.99);

        let plan = plan_for(Category::Unknown, &learned);
        assert!(plan.capped);
        assert!(plan.contains("style_polisher"));

        let indices: Vec<usize> = plan
            .modules
            .iter()
            .map(|id| registry.get(id).unwrap().phase.index())
            .collect();
        assert!(indices.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_learned_weight_overrides_default() {
        // chat_responder defaults to 0.1 for code, below the threshold.
        let mut learned = HashMap::new();
        learned.insert("chat_responder".to_string(), 0.8);

        let plan = plan_for(Category::Code, &learned);
        assert!(plan.contains("chat_responder"));
    }

    #[test]
    fn test_learned_weight_can_suppress_default() {
        // market_analyst defaults to 0.95 for market.
        let mut learned = HashMap::new();
        learned.insert("market_analyst".to_string(), 0.05);

        let plan = plan_for(Category::Market, &learned);
        assert!(!plan.contains("market_analyst"));
    }

    #[test]
    fn test_simple_chat_plan_smaller_than_reasoning_plan() {
        let chat = plan_for(Category::SimpleChat, &HashMap::new());
        let reasoning = plan_for(Category::Reasoning, &HashMap::new());
        assert!(chat.len() < reasoning.len());
    }

    #[test]
    fn test_rationale_names_category_and_counts() {
        let plan = plan_for(Category::SimpleChat, &HashMap::new());
        assert!(plan.rationale.contains("simple_chat"));
        assert!(plan.rationale.contains(&format!("{}/", plan.len())));
    }

    #[test]
    fn test_estimates_are_summed() {
        let registry = ModuleRegistry::create();
        let plan = plan_for(Category::SimpleChat, &HashMap::new());

        let expected_cost: f64 = plan
            .modules
            .iter()
            .map(|id| registry.get(id).unwrap().cost_estimate)
            .sum();
        assert!((plan.estimated_cost - expected_cost).abs() < 1e-12);
        assert!(plan.estimated_latency_ms > 0.0);
    }

    #[test]
    fn test_track_phase_runs_last() {
        let plan = plan_for(Category::SimpleChat, &HashMap::new());
        let registry = ModuleRegistry::create();
        let last = plan.modules.last().unwrap();
        assert_eq!(registry.get(last).unwrap().phase, Phase::Track);
    }
}
