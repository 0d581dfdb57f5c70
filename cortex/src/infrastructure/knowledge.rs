// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Knowledge store port for durable learning state
//! Defines the contract the host's long-term store must satisfy

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KnowledgeId(pub Uuid);

impl KnowledgeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for KnowledgeId {
    fn default() -> Self {
        Self::new()
    }
}

/// One stored piece of knowledge, as returned by `recall`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeItem {
    pub id: KnowledgeId,
    pub concept: String,
    /// Serialized payload; the cortex stores JSON blobs here.
    pub definition: String,
    pub category: String,
    pub confidence: f64,
    pub learned_at: DateTime<Utc>,
}

/// Long-term knowledge store used to persist weight snapshots and
/// exploration findings.
///
/// Callers treat both operations as best-effort: a failure is surfaced as
/// an error value and the in-memory learning path continues undegraded.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Persist one definition under a concept key.
    async fn learn(
        &self,
        concept: &str,
        definition: &str,
        category: &str,
        confidence: f64,
    ) -> Result<KnowledgeId>;

    /// Retrieve up to `limit` items for a concept, most recent first.
    async fn recall(&self, concept: &str, limit: usize) -> Result<Vec<KnowledgeItem>>;
}

/// In-memory implementation of KnowledgeStore for tests and embedded hosts
pub struct InMemoryKnowledgeStore {
    items: Arc<RwLock<HashMap<String, Vec<KnowledgeItem>>>>,
}

impl InMemoryKnowledgeStore {
    pub fn new() -> Self {
        Self {
            items: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn concept_count(&self) -> usize {
        self.items.read().await.len()
    }
}

impl Default for InMemoryKnowledgeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KnowledgeStore for InMemoryKnowledgeStore {
    async fn learn(
        &self,
        concept: &str,
        definition: &str,
        category: &str,
        confidence: f64,
    ) -> Result<KnowledgeId> {
        let item = KnowledgeItem {
            id: KnowledgeId::new(),
            concept: concept.to_string(),
            definition: definition.to_string(),
            category: category.to_string(),
            confidence,
            learned_at: Utc::now(),
        };
        let id = item.id;

        let mut items = self.items.write().await;
        // Newest first, so recall(concept, 1) is the latest snapshot.
        items.entry(concept.to_string()).or_default().insert(0, item);
        Ok(id)
    }

    async fn recall(&self, concept: &str, limit: usize) -> Result<Vec<KnowledgeItem>> {
        let items = self.items.read().await;
        Ok(items
            .get(concept)
            .map(|entries| entries.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}
