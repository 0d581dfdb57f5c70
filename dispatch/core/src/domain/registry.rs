// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Module Registry - static catalog of processing modules
//!
//! Pure data built once at startup. Seven entries are always-active and run
//! on every cycle (gating, normalization, core processing, consistency
//! bookkeeping, response composition, telemetry, weight tracking); the rest
//! activate by effective weight.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Module catalog and lookup

use std::collections::HashMap;

use axon_cortex::domain::Category;

use super::module::{ModuleDescriptor, Phase};

/// Immutable catalog of all processing modules, in declaration order.
pub struct ModuleRegistry {
    modules: Vec<ModuleDescriptor>,
    by_id: HashMap<&'static str, usize>,
}

impl ModuleRegistry {
    /// Build the fixed catalog. Cannot fail: the catalog is static data and
    /// its invariants are enforced by `validate` under test.
    pub fn create() -> Self {
        use Category::*;

        let modules = vec![
            // ---- gate ------------------------------------------------------
            ModuleDescriptor::builder("intent_gate", "Intent Gate", Phase::Gate)
                .cost(0.0001)
                .latency_ms(2.0)
                .always_active()
                .build(),
            ModuleDescriptor::builder("safety_filter", "Safety Filter", Phase::Gate)
                .cost(0.0002)
                .latency_ms(4.0)
                .base_weight(0.3)
                .weight(SimpleChat, 0.1)
                .weight(Creative, 0.4)
                .weight(LifeAssist, 0.4)
                .weight(System, 0.2)
                .build(),
            // ---- pre -------------------------------------------------------
            ModuleDescriptor::builder("input_normalizer", "Input Normalizer", Phase::Pre)
                .cost(0.0001)
                .latency_ms(1.0)
                .always_active()
                .build(),
            ModuleDescriptor::builder("goal_decomposer", "Goal Decomposer", Phase::Pre)
                .cost(0.002)
                .latency_ms(120.0)
                .depends_on(&["input_normalizer"])
                .base_weight(0.3)
                .weight(SimpleChat, 0.05)
                .weight(Reasoning, 0.85)
                .weight(Code, 0.5)
                .weight(Analysis, 0.5)
                .weight(Creative, 0.1)
                .weight(Unknown, 0.3)
                .build(),
            ModuleDescriptor::builder("sentiment_tagger", "Sentiment Tagger", Phase::Pre)
                .cost(0.0005)
                .latency_ms(15.0)
                .depends_on(&["input_normalizer"])
                .base_weight(0.3)
                .weight(SimpleChat, 0.6)
                .weight(Creative, 0.5)
                .weight(LifeAssist, 0.4)
                .weight(Reasoning, 0.2)
                .weight(Code, 0.05)
                .weight(System, 0.05)
                .build(),
            // ---- context ---------------------------------------------------
            ModuleDescriptor::builder("memory_recall", "Memory Recall", Phase::Context)
                .cost(0.001)
                .latency_ms(40.0)
                .base_weight(0.4)
                .weight(SimpleChat, 0.1)
                .weight(Reasoning, 0.7)
                .weight(Analysis, 0.6)
                .weight(Code, 0.5)
                .weight(LifeAssist, 0.5)
                .weight(Creative, 0.3)
                .weight(System, 0.1)
                .build(),
            ModuleDescriptor::builder("knowledge_graph", "Knowledge Graph", Phase::Context)
                .cost(0.002)
                .latency_ms(80.0)
                .depends_on(&["memory_recall"])
                .base_weight(0.3)
                .weight(SimpleChat, 0.05)
                .weight(Reasoning, 0.6)
                .weight(Analysis, 0.7)
                .weight(Market, 0.5)
                .weight(Code, 0.4)
                .weight(Creative, 0.1)
                .weight(LifeAssist, 0.1)
                .build(),
            ModuleDescriptor::builder("user_profile", "User Profile", Phase::Context)
                .cost(0.0005)
                .latency_ms(10.0)
                .base_weight(0.2)
                .weight(SimpleChat, 0.3)
                .weight(Reasoning, 0.3)
                .weight(Creative, 0.4)
                .weight(LifeAssist, 0.7)
                .weight(Code, 0.05)
                .weight(System, 0.05)
                .build(),
            ModuleDescriptor::builder("world_state", "World State", Phase::Context)
                .cost(0.001)
                .latency_ms(60.0)
                .base_weight(0.3)
                .weight(SimpleChat, 0.05)
                .weight(Market, 0.6)
                .weight(Reasoning, 0.5)
                .weight(Analysis, 0.5)
                .weight(Code, 0.1)
                .weight(Creative, 0.05)
                .weight(Unknown, 0.2)
                .build(),
            // ---- process ---------------------------------------------------
            ModuleDescriptor::builder("core_reasoner", "Core Reasoner", Phase::Process)
                .cost(0.01)
                .latency_ms(400.0)
                .always_active()
                .build(),
            ModuleDescriptor::builder("chat_responder", "Chat Responder", Phase::Process)
                .cost(0.001)
                .latency_ms(80.0)
                .depends_on(&["core_reasoner"])
                .base_weight(0.1)
                .weight(SimpleChat, 0.95)
                .weight(Unknown, 0.3)
                .build(),
            ModuleDescriptor::builder("market_analyst", "Market Analyst", Phase::Process)
                .cost(0.005)
                .latency_ms(250.0)
                .depends_on(&["core_reasoner"])
                .base_weight(0.05)
                .weight(Market, 0.95)
                .weight(Analysis, 0.3)
                .weight(Reasoning, 0.1)
                .build(),
            ModuleDescriptor::builder("code_assistant", "Code Assistant", Phase::Process)
                .cost(0.006)
                .latency_ms(300.0)
                .depends_on(&["core_reasoner"])
                .base_weight(0.05)
                .weight(Code, 0.95)
                .weight(System, 0.3)
                .weight(Reasoning, 0.1)
                .build(),
            ModuleDescriptor::builder("creative_writer", "Creative Writer", Phase::Process)
                .cost(0.004)
                .latency_ms(350.0)
                .depends_on(&["core_reasoner"])
                .base_weight(0.05)
                .weight(Creative, 0.95)
                .weight(SimpleChat, 0.1)
                .weight(LifeAssist, 0.1)
                .build(),
            ModuleDescriptor::builder("planning_engine", "Planning Engine", Phase::Process)
                .cost(0.005)
                .latency_ms(280.0)
                .depends_on(&["core_reasoner"])
                .base_weight(0.1)
                .weight(Reasoning, 0.9)
                .weight(LifeAssist, 0.5)
                .weight(Market, 0.4)
                .weight(Analysis, 0.4)
                .weight(Code, 0.5)
                .weight(SimpleChat, 0.05)
                .build(),
            ModuleDescriptor::builder("life_planner", "Life Planner", Phase::Process)
                .cost(0.003)
                .latency_ms(200.0)
                .depends_on(&["core_reasoner"])
                .base_weight(0.05)
                .weight(LifeAssist, 0.95)
                .weight(SimpleChat, 0.1)
                .build(),
            // ---- audit -----------------------------------------------------
            ModuleDescriptor::builder("consistency_audit", "Consistency Audit", Phase::Audit)
                .cost(0.0005)
                .latency_ms(20.0)
                .always_active()
                .build(),
            ModuleDescriptor::builder("fact_checker", "Fact Checker", Phase::Audit)
                .cost(0.003)
                .latency_ms(150.0)
                .base_weight(0.3)
                .weight(SimpleChat, 0.05)
                .weight(Market, 0.7)
                .weight(Analysis, 0.8)
                .weight(Reasoning, 0.6)
                .weight(Code, 0.4)
                .weight(Creative, 0.05)
                .build(),
            ModuleDescriptor::builder("risk_auditor", "Risk Auditor", Phase::Audit)
                .cost(0.002)
                .latency_ms(90.0)
                .depends_on(&["fact_checker"])
                .base_weight(0.2)
                .weight(SimpleChat, 0.05)
                .weight(Market, 0.8)
                .weight(Reasoning, 0.5)
                .weight(System, 0.4)
                .weight(Creative, 0.05)
                .weight(LifeAssist, 0.3)
                .build(),
            ModuleDescriptor::builder("self_healer", "Self Healer", Phase::Audit)
                .cost(0.002)
                .latency_ms(100.0)
                .depends_on(&["consistency_audit"])
                .base_weight(0.15)
                .weight(SimpleChat, 0.1)
                .weight(Reasoning, 0.2)
                .weight(Code, 0.5)
                .weight(System, 0.7)
                .weight(Creative, 0.05)
                .build(),
            // ---- post ------------------------------------------------------
            ModuleDescriptor::builder("response_composer", "Response Composer", Phase::Post)
                .cost(0.001)
                .latency_ms(30.0)
                .always_active()
                .build(),
            ModuleDescriptor::builder("style_polisher", "Style Polisher", Phase::Post)
                .cost(0.001)
                .latency_ms(60.0)
                .depends_on(&["response_composer"])
                .base_weight(0.2)
                .weight(SimpleChat, 0.4)
                .weight(Creative, 0.8)
                .weight(Reasoning, 0.3)
                .weight(Analysis, 0.3)
                .weight(LifeAssist, 0.3)
                .weight(System, 0.05)
                .build(),
            // ---- track -----------------------------------------------------
            ModuleDescriptor::builder("telemetry", "Telemetry", Phase::Track)
                .cost(0.0001)
                .latency_ms(2.0)
                .always_active()
                .build(),
            ModuleDescriptor::builder("weight_tracker", "Weight Tracker", Phase::Track)
                .cost(0.0001)
                .latency_ms(3.0)
                .depends_on(&["telemetry"])
                .always_active()
                .build(),
        ];

        let by_id = modules
            .iter()
            .enumerate()
            .map(|(index, module)| (module.id, index))
            .collect();

        Self { modules, by_id }
    }

    pub fn get(&self, id: &str) -> Option<&ModuleDescriptor> {
        self.by_id.get(id).map(|index| &self.modules[*index])
    }

    /// All modules in declaration order.
    pub fn all(&self) -> &[ModuleDescriptor] {
        &self.modules
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn always_active_ids(&self) -> Vec<&'static str> {
        self.modules
            .iter()
            .filter(|m| m.always_active)
            .map(|m| m.id)
            .collect()
    }

    /// Catalog invariants: dependency ids exist and never point at a later
    /// phase. A violation is a startup defect, caught by tests rather than
    /// handled at runtime.
    pub fn validate(&self) -> Result<(), String> {
        for module in &self.modules {
            for dep in &module.dependencies {
                let Some(target) = self.get(dep) else {
                    return Err(format!("{} depends on unknown module {}", module.id, dep));
                };
                if target.phase.index() > module.phase.index() {
                    return Err(format!(
                        "{} ({}) depends on {} in later phase {}",
                        module.id, module.phase, dep, target.phase
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::create()
    }
}
