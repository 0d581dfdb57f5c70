// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Domain events for the Cortex bounded context
//! Published to the event bus for observability and host integration

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::exploration::ExplorationStrategy;

/// Cortex domain events.
///
/// Publishing is always best-effort: a failed publish is logged by the
/// caller and never fails the learning path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CortexEvent {
    /// An idle exploration finished and its findings were recorded.
    ExplorationCompleted {
        strategy: ExplorationStrategy,
        description: String,
        finding_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// The learned-weight table was flushed to the knowledge store.
    WeightsPersisted {
        modules: usize,
        categories: usize,
        timestamp: DateTime<Utc>,
    },
}

impl CortexEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            CortexEvent::ExplorationCompleted { .. } => "exploration_completed",
            CortexEvent::WeightsPersisted { .. } => "weights_persisted",
        }
    }
}
