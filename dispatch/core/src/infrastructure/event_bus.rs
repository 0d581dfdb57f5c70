// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Dispatch bus - in-process pub/sub for domain events
//!
//! Tokio broadcast channel carrying [`DispatchEvent`]s to host observers.
//! Publishing is fire-and-forget for the dispatch path: the result is
//! surfaced to the caller, which logs and moves on.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure Layer
//! - **Purpose:** Event fan-out to subscribers (host tooling, tests)

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use axon_cortex::application::EventBus;
use axon_cortex::domain::CortexEvent;

use crate::domain::DispatchEvent;

/// In-process event bus for dispatch and cortex events.
#[derive(Clone)]
pub struct DispatchBus {
    sender: Arc<broadcast::Sender<DispatchEvent>>,
}

impl DispatchBus {
    /// Create a bus with the given buffer capacity; old events are dropped
    /// for lagging subscribers once the buffer fills.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Default capacity (1000 events).
    pub fn with_default_capacity() -> Self {
        Self::new(1000)
    }

    /// Publish an event to all subscribers, returning the number of
    /// receivers it reached. Zero subscribers is not an error; transports
    /// behind a remote bus may fail and callers treat any error as
    /// non-fatal.
    pub fn publish(&self, event: DispatchEvent) -> Result<usize, EventBusError> {
        let delivered = self.sender.send(event).unwrap_or(0);
        if delivered == 0 {
            debug!("No subscribers listening to event");
        }
        Ok(delivered)
    }

    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for DispatchBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

/// Receiver half of the dispatch bus.
pub struct EventReceiver {
    receiver: broadcast::Receiver<DispatchEvent>,
}

impl EventReceiver {
    /// Receive the next event, waiting until one is available.
    pub async fn recv(&mut self) -> Result<DispatchEvent, EventBusError> {
        self.receiver.recv().await.map_err(|e| match e {
            broadcast::error::RecvError::Closed => EventBusError::Closed,
            broadcast::error::RecvError::Lagged(n) => {
                warn!("Event receiver lagged by {} events", n);
                EventBusError::Lagged(n)
            }
        })
    }

    /// Receive without blocking.
    pub fn try_recv(&mut self) -> Result<DispatchEvent, EventBusError> {
        self.receiver.try_recv().map_err(|e| match e {
            broadcast::error::TryRecvError::Empty => EventBusError::Empty,
            broadcast::error::TryRecvError::Closed => EventBusError::Closed,
            broadcast::error::TryRecvError::Lagged(n) => {
                warn!("Event receiver lagged by {} events", n);
                EventBusError::Lagged(n)
            }
        })
    }
}

/// Errors surfaced by bus operations.
#[derive(Debug, thiserror::Error)]
pub enum EventBusError {
    #[error("Event bus is closed")]
    Closed,

    #[error("No events available")]
    Empty,

    #[error("Receiver lagged by {0} events (events were dropped)")]
    Lagged(u64),
}

/// Adapter exposing the dispatch bus through the cortex's `EventBus` port.
pub struct CortexBusAdapter {
    bus: DispatchBus,
}

impl CortexBusAdapter {
    pub fn new(bus: DispatchBus) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl EventBus for CortexBusAdapter {
    async fn publish(&self, event: CortexEvent) -> anyhow::Result<()> {
        self.bus.publish(DispatchEvent::Cortex(event))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axon_cortex::domain::{Category, ExplorationStrategy};
    use chrono::Utc;

    fn cycle_event() -> DispatchEvent {
        DispatchEvent::CycleCompleted {
            category: Category::SimpleChat,
            modules_activated: 3,
            modules_total: 24,
            latency_ms: 12.5,
            confidence: 0.8,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_publish_subscribe() {
        let bus = DispatchBus::new(10);
        let mut receiver = bus.subscribe();

        bus.publish(cycle_event()).unwrap();

        let received = receiver.recv().await.unwrap();
        assert_eq!(received.event_type(), "cycle_completed");
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_ok() {
        let bus = DispatchBus::new(10);
        assert_eq!(bus.publish(cycle_event()).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_multiple_subscribers_each_receive() {
        let bus = DispatchBus::new(10);
        let mut r1 = bus.subscribe();
        let mut r2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(cycle_event()).unwrap();
        r1.recv().await.unwrap();
        r2.recv().await.unwrap();
    }

    #[tokio::test]
    async fn test_cortex_adapter_wraps_events() {
        let bus = DispatchBus::new(10);
        let mut receiver = bus.subscribe();
        let adapter = CortexBusAdapter::new(bus.clone());

        adapter
            .publish(CortexEvent::ExplorationCompleted {
                strategy: ExplorationStrategy::PerformanceStudy,
                description: "study".to_string(),
                finding_count: 0,
                timestamp: Utc::now(),
            })
            .await
            .unwrap();

        let received = receiver.recv().await.unwrap();
        assert_eq!(received.event_type(), "exploration_completed");
    }
}
