// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Orchestrator Application Service
//!
//! Drives the classify -> plan -> execute -> learn cycle. Modules run
//! strictly sequentially in plan order; a failing module is isolated and
//! the rest of the chain still runs, so audit and telemetry modules always
//! see the cycle. Nothing in `execute` propagates an error to the caller:
//! degraded operation shows up as low confidence and a short activated
//! list, not as an exception.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Cycle driver and composition point for registry, learning
//!   store, bindings and bus
//! - **Dependencies:** Domain (registry, plan), Infrastructure (bindings,
//!   event bus), axon-cortex (plasticity)

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use axon_cortex::application::PlasticityStore;
use axon_cortex::domain::{Category, ProcessingOutcome};

use crate::application::classifier;
use crate::application::planner::{self, PlannerConfig};
use crate::domain::{DispatchEvent, ExecutionContext, ExecutionPlan, ModuleRegistry};
use crate::infrastructure::{DispatchBus, ModuleBindings, ModuleHandler};

/// Weight of the previous estimate in the latency EMA.
const LATENCY_RETAIN: f64 = 0.85;

/// Weight of a new observation in the latency EMA.
const LATENCY_OBSERVE: f64 = 0.15;

/// The dispatch scheduler.
pub struct Orchestrator {
    registry: Arc<ModuleRegistry>,
    plasticity: Arc<PlasticityStore>,
    bus: DispatchBus,
    bindings: ModuleBindings,
    /// Smoothed per-module latency estimates, seeded from the registry.
    latencies: RwLock<HashMap<String, f64>>,
    planner_config: PlannerConfig,
}

impl Orchestrator {
    pub fn new(
        registry: Arc<ModuleRegistry>,
        plasticity: Arc<PlasticityStore>,
        bus: DispatchBus,
    ) -> Self {
        let latencies = registry
            .all()
            .iter()
            .map(|m| (m.id.to_string(), m.avg_latency_ms))
            .collect();

        Self {
            registry,
            plasticity,
            bus,
            bindings: ModuleBindings::new(),
            latencies: RwLock::new(latencies),
            planner_config: PlannerConfig::default(),
        }
    }

    pub fn with_planner_config(mut self, config: PlannerConfig) -> Self {
        self.planner_config = config;
        self
    }

    // ========================================================================
    // Classification & Planning
    // ========================================================================

    /// Resolve the input category. Pure and deterministic.
    pub fn classify(&self, input: &str) -> Category {
        classifier::classify(input)
    }

    /// Build the execution plan for an input.
    pub fn plan(&self, input: &str) -> ExecutionPlan {
        let category = self.classify(input);
        let learned = self.plasticity.weights_for_category(category);
        let latencies = self.latencies.read().clone();
        planner::build_plan(
            &self.registry,
            category,
            &learned,
            &latencies,
            &self.planner_config,
        )
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Run one full dispatch cycle. Never fails: module errors are isolated,
    /// learning always records, and the completion event is best-effort.
    pub async fn execute(&self, input: &str) -> ExecutionContext {
        let plan = self.plan(input);
        let mut ctx = ExecutionContext::new(input, plan.category);
        let cycle_start = Instant::now();

        for module_id in &plan.modules {
            let Some(handler) = self.bindings.get(module_id) else {
                // Unbound modules are permanent no-ops until the host binds them.
                continue;
            };

            let module_start = Instant::now();
            let result = handler.handle(input, &mut ctx).await;
            let elapsed_ms = module_start.elapsed().as_secs_f64() * 1000.0;

            ctx.activated.push(module_id.clone());
            ctx.timings_ms.insert(module_id.clone(), elapsed_ms);

            if let Err(e) = result {
                warn!(
                    module = %module_id,
                    error = %e,
                    "Module failed, continuing cycle"
                );
            }
        }

        // Fold observed wall times back into the smoothed estimates.
        for (module_id, observed_ms) in ctx.timings_ms.clone() {
            self.update_latency(&module_id, observed_ms);
        }

        let total_latency_ms = cycle_start.elapsed().as_secs_f64() * 1000.0;
        let outcome = ProcessingOutcome::new(
            plan.category,
            ctx.activated.clone(),
            total_latency_ms,
            ctx.timed_module_ms(),
            ctx.confidence,
        );

        info!(
            category = %plan.category,
            activated = ctx.activated.len(),
            planned = plan.len(),
            confidence = ctx.confidence,
            success = outcome.success,
            "Dispatch cycle completed"
        );

        self.plasticity.record(&outcome);

        let event = DispatchEvent::CycleCompleted {
            category: plan.category,
            modules_activated: ctx.activated.len(),
            modules_total: self.registry.len(),
            latency_ms: total_latency_ms,
            confidence: ctx.confidence,
            timestamp: Utc::now(),
        };
        if let Err(e) = self.bus.publish(event) {
            warn!(error = %e, "Failed to publish cycle-completion event");
        }

        ctx
    }

    // ========================================================================
    // Bindings & latency feedback
    // ========================================================================

    /// Bind a module callback. Unknown ids are accepted with a warning so a
    /// host can bind ahead of a catalog rollout, but they never execute.
    pub fn bind(&self, module_id: &str, handler: Arc<dyn ModuleHandler>) {
        if self.registry.get(module_id).is_none() {
            warn!(module = %module_id, "Binding a module id that is not in the registry");
        }
        self.bindings.bind(module_id, handler);
    }

    /// Fold one observed latency into the smoothed per-module estimate.
    pub fn update_latency(&self, module_id: &str, observed_ms: f64) {
        let mut latencies = self.latencies.write();
        if let Some(current) = latencies.get_mut(module_id) {
            *current = *current * LATENCY_RETAIN + observed_ms * LATENCY_OBSERVE;
        } else {
            debug!(module = %module_id, "Latency update for unknown module id");
        }
    }

    pub fn smoothed_latency_ms(&self, module_id: &str) -> Option<f64> {
        self.latencies.read().get(module_id).copied()
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    pub fn module_count(&self) -> usize {
        self.registry.len()
    }

    pub fn bound_count(&self) -> usize {
        self.bindings.bound_count()
    }

    pub fn is_bound(&self, module_id: &str) -> bool {
        self.bindings.is_bound(module_id)
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Current weight table for a category (learned entries only).
    pub fn learned_weights(&self, category: Category) -> HashMap<String, f64> {
        self.plasticity.weights_for_category(category)
    }
}
