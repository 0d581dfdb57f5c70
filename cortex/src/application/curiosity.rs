// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Curiosity Engine - idle-triggered self-exploration
//!
//! When no external work has arrived for a while, the engine mines the
//! plasticity tables for actionable findings: underperforming categories,
//! capability gaps, suppressed weights worth re-testing, and failure
//! patterns. Exploration never executes modules and never blocks the
//! dispatch path.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Background idle analysis over learned statistics
//! - **Dependencies:** PlasticityStore (read-only), KnowledgeStore, EventBus

use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use rand::Rng;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::application::{EventBus, PlasticityStore};
use crate::domain::{
    Category, CortexEvent, ExplorationResult, ExplorationStrategy, ACTIVATION_THRESHOLD,
    WEIGHT_FLOOR,
};
use crate::infrastructure::KnowledgeStore;

/// Configuration for the curiosity engine.
#[derive(Debug, Clone)]
pub struct CuriosityConfig {
    /// How often the idle gauge is checked (in seconds).
    pub poll_interval_secs: u64,

    /// Seconds without recorded activity before an exploration triggers.
    pub idle_threshold_secs: i64,

    /// Number of exploration results retained for introspection.
    pub history_limit: usize,

    /// Whether the background loop runs at all.
    pub enabled: bool,
}

impl Default for CuriosityConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 30,
            idle_threshold_secs: 60,
            history_limit: 50,
            enabled: true,
        }
    }
}

struct RunState {
    shutdown: tokio_util::sync::CancellationToken,
    handle: tokio::task::JoinHandle<()>,
}

/// Background self-exploration process.
pub struct CuriosityEngine {
    plasticity: Arc<PlasticityStore>,
    knowledge: Arc<dyn KnowledgeStore>,
    event_bus: Arc<dyn EventBus>,
    config: CuriosityConfig,
    /// Wall-clock millis of the last genuine external activity.
    last_activity_ms: AtomicI64,
    history: RwLock<VecDeque<ExplorationResult>>,
    run_state: Mutex<Option<RunState>>,
}

impl CuriosityEngine {
    pub fn new(
        plasticity: Arc<PlasticityStore>,
        knowledge: Arc<dyn KnowledgeStore>,
        event_bus: Arc<dyn EventBus>,
        config: CuriosityConfig,
    ) -> Self {
        Self {
            plasticity,
            knowledge,
            event_bus,
            config,
            last_activity_ms: AtomicI64::new(Utc::now().timestamp_millis()),
            history: RwLock::new(VecDeque::new()),
            run_state: Mutex::new(None),
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Start the idle-check loop. Calling `start` on a running engine is a
    /// no-op.
    pub fn start(self: Arc<Self>) {
        let mut run_state = self.run_state.lock();
        if run_state.is_some() {
            debug!("Curiosity engine already running");
            return;
        }
        if !self.config.enabled {
            info!("Curiosity engine is disabled");
            return;
        }

        let shutdown = tokio_util::sync::CancellationToken::new();
        let this = Arc::clone(&self);
        let token = shutdown.clone();
        let handle = tokio::spawn(async move {
            this.run(token).await;
        });

        *run_state = Some(RunState { shutdown, handle });
    }

    /// Stop the loop and wait for it to wind down. Calling `stop` on a
    /// stopped engine is a no-op.
    pub async fn stop(&self) {
        let state = self.run_state.lock().take();
        if let Some(state) = state {
            state.shutdown.cancel();
            if let Err(e) = state.handle.await {
                warn!(error = %e, "Curiosity loop ended abnormally");
            }
        }
    }

    /// Notify the engine that genuine external work happened, resetting the
    /// idle clock. Safe to call from any thread.
    pub fn record_activity(&self) {
        self.last_activity_ms
            .store(Utc::now().timestamp_millis(), Ordering::Release);
    }

    fn idle_secs(&self) -> i64 {
        let last = self.last_activity_ms.load(Ordering::Acquire);
        (Utc::now().timestamp_millis() - last) / 1000
    }

    async fn run(&self, shutdown: tokio_util::sync::CancellationToken) {
        info!(
            poll_interval_secs = self.config.poll_interval_secs,
            idle_threshold_secs = self.config.idle_threshold_secs,
            "Starting curiosity engine"
        );

        let mut tick = interval(Duration::from_secs(self.config.poll_interval_secs));
        tick.tick().await;

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let idle = self.idle_secs();
                    if idle >= self.config.idle_threshold_secs {
                        debug!(idle_secs = idle, "Idle threshold reached, exploring");
                        self.explore().await;
                    }
                }
                _ = shutdown.cancelled() => {
                    info!("Shutdown signal received, stopping curiosity engine");
                    break;
                }
            }
        }

        info!("Curiosity engine stopped");
    }

    // ========================================================================
    // Exploration
    // ========================================================================

    /// Run one exploration with a uniformly random strategy.
    ///
    /// Resets the idle clock afterwards so explorations are spaced out
    /// rather than repeated on every poll.
    pub async fn explore(&self) -> ExplorationResult {
        let index = rand::thread_rng().gen_range(0..ExplorationStrategy::ALL.len());
        let strategy = ExplorationStrategy::ALL[index];
        let result = self.explore_with(strategy).await;
        self.record_activity();
        result
    }

    /// Run one exploration with an explicit strategy.
    pub async fn explore_with(&self, strategy: ExplorationStrategy) -> ExplorationResult {
        let result = match strategy {
            ExplorationStrategy::PerformanceStudy => self.performance_study(),
            ExplorationStrategy::CapabilityGapScan => self.capability_gap_scan(),
            ExplorationStrategy::ModuleExperiment => self.module_experiment(),
            ExplorationStrategy::FailurePatternReview => self.failure_pattern_review(),
        };

        info!(
            strategy = %result.strategy,
            findings = result.findings.len(),
            "Exploration completed"
        );

        self.remember(result.clone());

        // Both side channels are best-effort: log and continue.
        let concept = format!("curiosity.exploration.{}", result.strategy);
        match serde_json::to_string(&result) {
            Ok(blob) => {
                if let Err(e) = self.knowledge.learn(&concept, &blob, "system", 0.6).await {
                    warn!(error = %e, concept = %concept, "Failed to persist exploration result");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize exploration result"),
        }

        let event = CortexEvent::ExplorationCompleted {
            strategy: result.strategy,
            description: result.description.clone(),
            finding_count: result.findings.len(),
            timestamp: Utc::now(),
        };
        if let Err(e) = self.event_bus.publish(event).await {
            warn!(error = %e, "Failed to publish exploration event");
        }

        result
    }

    fn remember(&self, result: ExplorationResult) {
        let mut history = self.history.write();
        history.push_back(result);
        while history.len() > self.config.history_limit {
            history.pop_front();
        }
    }

    /// The most recent exploration results, newest first.
    pub fn recent(&self, limit: usize) -> Vec<ExplorationResult> {
        self.history.read().iter().rev().take(limit).cloned().collect()
    }

    // ========================================================================
    // Strategies (read-only over plasticity state)
    // ========================================================================

    fn performance_study(&self) -> ExplorationResult {
        let stats = self.plasticity.category_stats();
        let mut findings = Vec::new();
        let mut proposed = Vec::new();

        for category in Category::ALL {
            let Some(s) = stats.get(&category) else { continue };
            if s.samples < 5 {
                continue;
            }
            if s.avg_confidence() < 0.5 {
                findings.push(format!(
                    "category {} averages {:.2} confidence over {} samples",
                    category,
                    s.avg_confidence(),
                    s.samples
                ));
                proposed.push(format!("review module mix for {}", category));
            }
            if s.avg_latency_ms() > 500.0 {
                findings.push(format!(
                    "category {} averages {:.0}ms latency over {} samples",
                    category,
                    s.avg_latency_ms(),
                    s.samples
                ));
            }
        }

        ExplorationResult::new(
            ExplorationStrategy::PerformanceStudy,
            "Studied per-category confidence and latency",
            findings,
            proposed,
        )
    }

    fn capability_gap_scan(&self) -> ExplorationResult {
        let stats = self.plasticity.category_stats();
        let mut findings = Vec::new();
        let mut proposed = Vec::new();

        for category in Category::ALL {
            let samples = stats.get(&category).map(|s| s.samples).unwrap_or(0);
            if samples == 0 {
                findings.push(format!("category {} has never been observed", category));
                proposed.push(format!("generate practice inputs for {}", category));
            } else if samples < 5 {
                findings.push(format!(
                    "category {} has only {} samples, weights are unsettled",
                    category, samples
                ));
            }
        }

        ExplorationResult::new(
            ExplorationStrategy::CapabilityGapScan,
            "Scanned the category space for unexercised capabilities",
            findings,
            proposed,
        )
    }

    fn module_experiment(&self) -> ExplorationResult {
        let snapshot = self.plasticity.snapshot();
        let mut findings = Vec::new();
        let mut proposed = Vec::new();

        for (module_id, per_category) in &snapshot.weights {
            for (category, weight) in per_category {
                if *weight > WEIGHT_FLOOR && *weight < ACTIVATION_THRESHOLD {
                    findings.push(format!(
                        "{} sits at {:.3} for {}, just below the activation threshold",
                        module_id, weight, category
                    ));
                    proposed.push(format!(
                        "force-activate {} on the next {} cycle",
                        module_id, category
                    ));
                }
            }
        }

        ExplorationResult::new(
            ExplorationStrategy::ModuleExperiment,
            "Looked for suppressed weights worth a re-activation experiment",
            findings,
            proposed,
        )
    }

    fn failure_pattern_review(&self) -> ExplorationResult {
        let snapshot = self.plasticity.snapshot();
        let stats = self.plasticity.category_stats();
        let mut findings = Vec::new();

        for (module_id, per_category) in &snapshot.weights {
            let bottomed = per_category
                .values()
                .filter(|w| **w <= WEIGHT_FLOOR + 1e-9)
                .count();
            if bottomed >= 3 {
                findings.push(format!(
                    "{} is bottomed out in {} categories",
                    module_id, bottomed
                ));
            }
        }

        for category in Category::ALL {
            let Some(s) = stats.get(&category) else { continue };
            if s.samples >= 10 && s.avg_confidence() < 0.4 {
                findings.push(format!(
                    "category {} fails persistently: {:.2} confidence over {} samples",
                    category,
                    s.avg_confidence(),
                    s.samples
                ));
            }
        }

        ExplorationResult::new(
            ExplorationStrategy::FailurePatternReview,
            "Reviewed bottomed-out modules and persistently failing categories",
            findings,
            Vec::new(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProcessingOutcome;
    use crate::infrastructure::InMemoryKnowledgeStore;
    use anyhow::Result;
    use async_trait::async_trait;

    struct RecordingBus {
        events: Mutex<Vec<CortexEvent>>,
    }

    impl RecordingBus {
        fn new() -> Self {
            Self {
                events: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl EventBus for RecordingBus {
        async fn publish(&self, event: CortexEvent) -> Result<()> {
            self.events.lock().push(event);
            Ok(())
        }
    }

    fn engine_with(plasticity: Arc<PlasticityStore>) -> (Arc<CuriosityEngine>, Arc<RecordingBus>) {
        let bus = Arc::new(RecordingBus::new());
        let engine = Arc::new(CuriosityEngine::new(
            plasticity,
            Arc::new(InMemoryKnowledgeStore::new()),
            bus.clone(),
            CuriosityConfig::default(),
        ));
        (engine, bus)
    }

    fn outcome(category: Category, modules: &[&str], confidence: f64, latency: f64) -> ProcessingOutcome {
        ProcessingOutcome::new(
            category,
            modules.iter().map(|m| m.to_string()).collect(),
            latency,
            latency,
            confidence,
        )
    }

    #[tokio::test]
    async fn test_performance_study_flags_low_confidence() {
        let plasticity = Arc::new(PlasticityStore::default());
        for _ in 0..6 {
            plasticity.record(&outcome(Category::Creative, &["m1"], 0.3, 100.0));
        }
        let (engine, _) = engine_with(plasticity);

        let result = engine.explore_with(ExplorationStrategy::PerformanceStudy).await;
        assert!(result.findings.iter().any(|f| f.contains("creative")));
    }

    #[tokio::test]
    async fn test_performance_study_flags_slow_categories() {
        let plasticity = Arc::new(PlasticityStore::default());
        for _ in 0..5 {
            plasticity.record(&outcome(Category::Market, &["m1"], 0.9, 900.0));
        }
        let (engine, _) = engine_with(plasticity);

        let result = engine.explore_with(ExplorationStrategy::PerformanceStudy).await;
        assert!(result.findings.iter().any(|f| f.contains("latency") || f.contains("ms")));
    }

    #[tokio::test]
    async fn test_capability_gap_scan_covers_full_enumeration() {
        let plasticity = Arc::new(PlasticityStore::default());
        let (engine, _) = engine_with(plasticity);

        let result = engine.explore_with(ExplorationStrategy::CapabilityGapScan).await;
        // Nothing observed yet: all nine categories are gaps.
        assert_eq!(result.findings.len(), 9);
        assert_eq!(result.proposed_changes.len(), 9);
    }

    #[tokio::test]
    async fn test_module_experiment_flags_band_weights() {
        let plasticity = Arc::new(PlasticityStore::default());
        // Drive a weight into the (floor, threshold) band: 0.5 decays below
        // 0.15 after ~8 failures but stays above the floor for a while.
        for _ in 0..9 {
            plasticity.record(&outcome(Category::Code, &["m1"], 0.1, 50.0));
        }
        let weight = plasticity.weight("m1", Category::Code).unwrap();
        assert!(weight > WEIGHT_FLOOR && weight < ACTIVATION_THRESHOLD);

        let (engine, _) = engine_with(plasticity);
        let result = engine.explore_with(ExplorationStrategy::ModuleExperiment).await;
        assert!(result.findings.iter().any(|f| f.contains("m1")));
        assert!(result
            .proposed_changes
            .iter()
            .any(|p| p.contains("force-activate m1")));
    }

    #[tokio::test]
    async fn test_failure_pattern_review_flags_bottomed_modules() {
        let plasticity = Arc::new(PlasticityStore::default());
        for category in [Category::Code, Category::Market, Category::Analysis] {
            for _ in 0..50 {
                plasticity.record(&outcome(category, &["m1"], 0.1, 50.0));
            }
        }
        let (engine, _) = engine_with(plasticity);

        let result = engine
            .explore_with(ExplorationStrategy::FailurePatternReview)
            .await;
        assert!(result.findings.iter().any(|f| f.contains("m1")));
    }

    #[tokio::test]
    async fn test_exploration_published_and_remembered() {
        let plasticity = Arc::new(PlasticityStore::default());
        let (engine, bus) = engine_with(plasticity);

        engine.explore_with(ExplorationStrategy::CapabilityGapScan).await;

        assert_eq!(engine.recent(10).len(), 1);
        let events = bus.events.lock();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "exploration_completed");
    }

    #[tokio::test]
    async fn test_history_is_bounded() {
        let plasticity = Arc::new(PlasticityStore::default());
        let bus = Arc::new(RecordingBus::new());
        let mut config = CuriosityConfig::default();
        config.history_limit = 3;
        let engine = Arc::new(CuriosityEngine::new(
            plasticity,
            Arc::new(InMemoryKnowledgeStore::new()),
            bus,
            config,
        ));

        for _ in 0..5 {
            engine.explore_with(ExplorationStrategy::CapabilityGapScan).await;
        }
        assert_eq!(engine.recent(10).len(), 3);
    }

    #[tokio::test]
    async fn test_explore_resets_idle_clock() {
        let plasticity = Arc::new(PlasticityStore::default());
        let (engine, _) = engine_with(plasticity);

        // Pretend the engine has been idle for two minutes.
        engine
            .last_activity_ms
            .store(Utc::now().timestamp_millis() - 120_000, Ordering::Release);
        assert!(engine.idle_secs() >= 120);

        engine.explore().await;
        assert!(engine.idle_secs() < 2);
    }

    #[tokio::test]
    async fn test_start_and_stop_are_idempotent() {
        let plasticity = Arc::new(PlasticityStore::default());
        let (engine, _) = engine_with(plasticity);

        engine.clone().start();
        engine.clone().start();
        assert!(engine.run_state.lock().is_some());

        engine.stop().await;
        engine.stop().await;
        assert!(engine.run_state.lock().is_none());
    }
}
