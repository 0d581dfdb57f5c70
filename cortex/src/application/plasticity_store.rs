// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Plasticity Store - learned module weights and category statistics
//!
//! Owns the Hebbian weight table: every recorded outcome reinforces the
//! modules that fired in a successful cycle and suppresses the ones that
//! fired in a failed cycle. Read accessors are synchronous and never touch
//! storage; durability runs on a background flush loop.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Outcome recording, weight lookup, snapshot persistence
//! - **Dependencies:** Domain (plasticity, outcome), Infrastructure (KnowledgeStore)

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use parking_lot::RwLock;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::application::EventBus;
use crate::domain::{
    hebbian_step, Category, CategoryStats, CortexEvent, PlasticitySnapshot, ProcessingOutcome,
    DEFAULT_WEIGHT,
};
use crate::infrastructure::KnowledgeStore;

/// Configuration for the plasticity store.
#[derive(Debug, Clone)]
pub struct PlasticityConfig {
    /// Concept key the snapshot is persisted under.
    pub concept_key: String,

    /// How often the background flush loop wakes up (in seconds).
    pub flush_interval_secs: u64,
}

impl Default for PlasticityConfig {
    fn default() -> Self {
        Self {
            concept_key: "plasticity.weights".to_string(),
            flush_interval_secs: 300, // Flush every 5 minutes
        }
    }
}

/// Learned-weight table with per-category statistics.
///
/// Single-writer discipline: every read-modify-write of the table happens
/// under one lock, so overlapping `record` calls from concurrent dispatch
/// cycles cannot lose updates. The flush loop snapshots under the same lock.
pub struct PlasticityStore {
    state: RwLock<PlasticitySnapshot>,
    dirty: AtomicBool,
    config: PlasticityConfig,
}

impl PlasticityStore {
    pub fn new(config: PlasticityConfig) -> Self {
        Self {
            state: RwLock::new(PlasticitySnapshot::default()),
            dirty: AtomicBool::new(false),
            config,
        }
    }

    // ========================================================================
    // Learning
    // ========================================================================

    /// Record one processing outcome.
    ///
    /// Updates category statistics and applies the Hebbian step to every
    /// module that fired. Marks the store dirty; never persists inline.
    pub fn record(&self, outcome: &ProcessingOutcome) {
        let mut state = self.state.write();

        let stats = state.stats.entry(outcome.category).or_default();
        stats.samples += 1;
        stats.confidence_sum += outcome.confidence;
        stats.latency_sum_ms += outcome.total_latency_ms;

        for module_id in &outcome.activated_modules {
            let cell = state
                .weights
                .entry(module_id.clone())
                .or_default()
                .entry(outcome.category)
                .or_insert(DEFAULT_WEIGHT);
            *cell = hebbian_step(*cell, outcome.success);
        }
        drop(state);

        self.dirty.store(true, Ordering::Release);
        debug!(
            category = %outcome.category,
            modules = outcome.activated_modules.len(),
            success = outcome.success,
            confidence = outcome.confidence,
            "Recorded processing outcome"
        );
    }

    // ========================================================================
    // Read accessors (in-memory only, never block on storage)
    // ========================================================================

    /// Learned weight for one module/category pair, if any.
    pub fn weight(&self, module_id: &str, category: Category) -> Option<f64> {
        self.state
            .read()
            .weights
            .get(module_id)
            .and_then(|per_category| per_category.get(&category))
            .copied()
    }

    /// Learned weights for a category (module id -> weight; may be partial).
    pub fn weights_for_category(&self, category: Category) -> std::collections::HashMap<String, f64> {
        self.state
            .read()
            .weights
            .iter()
            .filter_map(|(module_id, per_category)| {
                per_category.get(&category).map(|w| (module_id.clone(), *w))
            })
            .collect()
    }

    /// Module ids for a category, sorted by descending learned weight.
    pub fn recommend_modules(&self, category: Category) -> Vec<String> {
        let mut ranked: Vec<(String, f64)> = self.weights_for_category(category).into_iter().collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.into_iter().map(|(module_id, _)| module_id).collect()
    }

    /// Copy of the per-category statistics.
    pub fn category_stats(&self) -> std::collections::HashMap<Category, CategoryStats> {
        self.state.read().stats.clone()
    }

    /// Consistent copy of the full learned state.
    pub fn snapshot(&self) -> PlasticitySnapshot {
        self.state.read().clone()
    }

    /// Replace the in-memory state wholesale (restart recovery).
    pub fn restore(&self, snapshot: PlasticitySnapshot) {
        *self.state.write() = snapshot;
        self.dirty.store(false, Ordering::Release);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Load the most recent snapshot from the knowledge store.
    ///
    /// A missing or malformed snapshot is not an error: the store starts
    /// from empty state and returns `Ok(false)`. A store-level failure is
    /// returned to the caller, which may ignore it.
    pub async fn load(&self, store: &dyn KnowledgeStore) -> Result<bool> {
        let items = store
            .recall(&self.config.concept_key, 1)
            .await
            .context("recalling plasticity snapshot")?;

        let Some(item) = items.first() else {
            info!(concept = %self.config.concept_key, "No prior plasticity snapshot, starting empty");
            return Ok(false);
        };

        match serde_json::from_str::<PlasticitySnapshot>(&item.definition) {
            Ok(snapshot) => {
                let cells = snapshot.cell_count();
                self.restore(snapshot);
                info!(cells, "Restored plasticity snapshot");
                Ok(true)
            }
            Err(e) => {
                warn!(error = %e, "Malformed plasticity snapshot, starting empty");
                Ok(false)
            }
        }
    }

    /// Serialize the table to the knowledge store if it changed since the
    /// last flush. Returns `Ok(true)` when a write happened.
    pub async fn flush(&self, store: &dyn KnowledgeStore) -> Result<bool> {
        if !self.dirty.swap(false, Ordering::AcqRel) {
            return Ok(false);
        }

        let snapshot = self.snapshot();
        let result = async {
            let blob = serde_json::to_string(&snapshot).context("serializing plasticity snapshot")?;
            store
                .learn(&self.config.concept_key, &blob, "system", 1.0)
                .await
                .context("persisting plasticity snapshot")?;
            Ok::<_, anyhow::Error>(())
        }
        .await;

        match result {
            Ok(()) => {
                debug!(cells = snapshot.cell_count(), "Flushed plasticity snapshot");
                Ok(true)
            }
            Err(e) => {
                // Keep the state marked dirty so the next flush retries.
                self.dirty.store(true, Ordering::Release);
                Err(e)
            }
        }
    }

    /// Start the periodic flush loop.
    ///
    /// Flushes only when dirty; publishes a `WeightsPersisted` event after
    /// each successful write (best-effort). A final flush runs when the
    /// cancellation token fires, and awaiting the returned handle waits for
    /// any in-flight write.
    pub fn spawn_flush_loop(
        self: Arc<Self>,
        store: Arc<dyn KnowledgeStore>,
        event_bus: Arc<dyn EventBus>,
        shutdown: tokio_util::sync::CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        let this = self;
        tokio::spawn(async move {
            info!(
                interval_secs = this.config.flush_interval_secs,
                concept = %this.config.concept_key,
                "Starting plasticity flush loop"
            );

            let mut tick = interval(Duration::from_secs(this.config.flush_interval_secs));
            // The first tick of a tokio interval completes immediately.
            tick.tick().await;

            loop {
                tokio::select! {
                    _ = tick.tick() => {
                        this.flush_and_announce(store.as_ref(), event_bus.as_ref()).await;
                    }
                    _ = shutdown.cancelled() => {
                        info!("Shutdown signal received, flushing plasticity state");
                        this.flush_and_announce(store.as_ref(), event_bus.as_ref()).await;
                        break;
                    }
                }
            }

            info!("Plasticity flush loop stopped");
        })
    }

    async fn flush_and_announce(&self, store: &dyn KnowledgeStore, event_bus: &dyn EventBus) {
        match self.flush(store).await {
            Ok(false) => {}
            Ok(true) => {
                let snapshot = self.snapshot();
                let event = CortexEvent::WeightsPersisted {
                    modules: snapshot.weights.len(),
                    categories: snapshot.stats.len(),
                    timestamp: Utc::now(),
                };
                if let Err(e) = event_bus.publish(event).await {
                    warn!(error = %e, "Failed to publish weights-persisted event");
                }
            }
            Err(e) => {
                warn!(error = %e, "Plasticity flush failed, will retry next cycle");
            }
        }
    }
}

impl Default for PlasticityStore {
    fn default() -> Self {
        Self::new(PlasticityConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WEIGHT_FLOOR;
    use crate::infrastructure::InMemoryKnowledgeStore;
    use async_trait::async_trait;

    struct NullEventBus;

    #[async_trait]
    impl EventBus for NullEventBus {
        async fn publish(&self, _event: CortexEvent) -> Result<()> {
            Ok(())
        }
    }

    fn outcome(category: Category, modules: &[&str], confidence: f64) -> ProcessingOutcome {
        ProcessingOutcome::new(
            category,
            modules.iter().map(|m| m.to_string()).collect(),
            100.0,
            80.0,
            confidence,
        )
    }

    #[test]
    fn test_successful_outcome_reinforces_fired_modules() {
        let store = PlasticityStore::default();

        store.record(&outcome(Category::Market, &["m1", "m2"], 0.9));

        let w1 = store.weight("m1", Category::Market).unwrap();
        let w2 = store.weight("m2", Category::Market).unwrap();
        assert!(w1 > DEFAULT_WEIGHT);
        assert!(w2 > DEFAULT_WEIGHT);
        assert!(store.is_dirty());
    }

    #[test]
    fn test_failed_outcome_suppresses_fired_modules() {
        let store = PlasticityStore::default();

        store.record(&outcome(Category::Code, &["m1"], 0.2));

        assert!(store.weight("m1", Category::Code).unwrap() < DEFAULT_WEIGHT);
    }

    #[test]
    fn test_weight_bottoms_out_at_floor() {
        let store = PlasticityStore::default();

        for _ in 0..50 {
            store.record(&outcome(Category::Code, &["m1"], 0.1));
        }

        let weight = store.weight("m1", Category::Code).unwrap();
        assert!(weight >= WEIGHT_FLOOR);
        assert!((weight - WEIGHT_FLOOR).abs() < 1e-9);
    }

    #[test]
    fn test_category_stats_aggregate() {
        let store = PlasticityStore::default();

        store.record(&outcome(Category::Market, &["m1"], 0.7));
        store.record(&outcome(Category::Market, &["m1"], 0.6));

        let stats = store.category_stats();
        let market = stats.get(&Category::Market).unwrap();
        assert_eq!(market.samples, 2);
        assert!((market.avg_confidence() - 0.65).abs() < 1e-9);
    }

    #[test]
    fn test_recommend_modules_sorted_by_weight() {
        let store = PlasticityStore::default();

        // m1 fires in successes, m2 in failures.
        for _ in 0..3 {
            store.record(&outcome(Category::Analysis, &["m1"], 0.9));
            store.record(&outcome(Category::Analysis, &["m2"], 0.1));
        }

        let ranked = store.recommend_modules(Category::Analysis);
        assert_eq!(ranked, vec!["m1".to_string(), "m2".to_string()]);
    }

    #[test]
    fn test_weights_for_category_is_partial() {
        let store = PlasticityStore::default();
        store.record(&outcome(Category::Code, &["m1"], 0.9));

        assert_eq!(store.weights_for_category(Category::Code).len(), 1);
        assert!(store.weights_for_category(Category::Market).is_empty());
    }

    #[tokio::test]
    async fn test_flush_and_load_round_trip() {
        let knowledge = InMemoryKnowledgeStore::new();
        let store = PlasticityStore::default();

        store.record(&outcome(Category::Market, &["m1", "m2"], 0.8));
        store.record(&outcome(Category::Code, &["m2"], 0.3));
        let before = store.snapshot();

        assert!(store.flush(&knowledge).await.unwrap());

        // Simulated restart.
        let restarted = PlasticityStore::default();
        assert!(restarted.load(&knowledge).await.unwrap());
        assert_eq!(restarted.snapshot(), before);
    }

    #[tokio::test]
    async fn test_flush_skipped_when_clean() {
        let knowledge = InMemoryKnowledgeStore::new();
        let store = PlasticityStore::default();

        store.record(&outcome(Category::Code, &["m1"], 0.9));
        assert!(store.flush(&knowledge).await.unwrap());
        assert!(!store.flush(&knowledge).await.unwrap());
    }

    #[tokio::test]
    async fn test_load_malformed_snapshot_starts_empty() {
        let knowledge = InMemoryKnowledgeStore::new();
        knowledge
            .learn("plasticity.weights", "not json at all", "system", 1.0)
            .await
            .unwrap();

        let store = PlasticityStore::default();
        assert!(!store.load(&knowledge).await.unwrap());
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_load_absent_snapshot_starts_empty() {
        let knowledge = InMemoryKnowledgeStore::new();
        let store = PlasticityStore::default();
        assert!(!store.load(&knowledge).await.unwrap());
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_flush_loop_persists_on_shutdown() {
        let knowledge: Arc<InMemoryKnowledgeStore> = Arc::new(InMemoryKnowledgeStore::new());
        let store = Arc::new(PlasticityStore::default());
        let shutdown = tokio_util::sync::CancellationToken::new();

        let handle = store.clone().spawn_flush_loop(
            knowledge.clone() as Arc<dyn KnowledgeStore>,
            Arc::new(NullEventBus),
            shutdown.clone(),
        );

        store.record(&outcome(Category::Reasoning, &["m1"], 0.9));
        shutdown.cancel();
        handle.await.unwrap();

        let items = knowledge.recall("plasticity.weights", 1).await.unwrap();
        assert_eq!(items.len(), 1);
    }
}
