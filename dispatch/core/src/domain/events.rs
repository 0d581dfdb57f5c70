// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Domain events published on the dispatch bus

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use axon_cortex::domain::{Category, CortexEvent};

/// Unified event type carried by the dispatch bus.
///
/// One in-process bus serves both bounded contexts: dispatch cycles publish
/// directly, cortex events arrive through the bus adapter. Tagged by topic;
/// cortex payloads keep their own inner `type` tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "topic", rename_all = "snake_case")]
pub enum DispatchEvent {
    /// One classify/plan/execute/learn cycle finished.
    CycleCompleted {
        category: Category,
        modules_activated: usize,
        modules_total: usize,
        latency_ms: f64,
        confidence: f64,
        timestamp: DateTime<Utc>,
    },

    /// Learning & memory layer event (exploration, persistence).
    Cortex(CortexEvent),
}

impl DispatchEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            DispatchEvent::CycleCompleted { .. } => "cycle_completed",
            DispatchEvent::Cortex(event) => event.event_type(),
        }
    }
}
