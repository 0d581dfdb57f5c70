// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::CortexEvent;

pub mod curiosity;
pub mod plasticity_store;

pub use curiosity::{CuriosityConfig, CuriosityEngine};
pub use plasticity_store::{PlasticityConfig, PlasticityStore};

/// Event bus port for publishing cortex domain events.
///
/// Publishing is fire-and-forget from the cortex's point of view: callers
/// log a failed publish and continue, it never affects the learning path.
#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, event: CortexEvent) -> Result<()>;
}
