// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Module bindings - capability-keyed execution callbacks
//!
//! The registry stays immutable data; the callbacks the host supplies at
//! boot live in this separately mutable table. An unbound module is a
//! permanent no-op until bound.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure Layer
//! - **Purpose:** Hold and resolve host-bound module callbacks

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use crate::domain::ExecutionContext;

/// Execution callback for one module.
///
/// The handler may suspend (module bodies do their own I/O) and may mutate
/// the cycle context. A returned error is isolated by the execution driver
/// and never aborts the cycle.
#[async_trait]
pub trait ModuleHandler: Send + Sync {
    async fn handle(&self, input: &str, ctx: &mut ExecutionContext) -> Result<()>;
}

/// Adapter for synchronous handler bodies; implement [`ModuleHandler`]
/// directly when the body needs to await.
pub struct FnHandler<F>(pub F);

#[async_trait]
impl<F> ModuleHandler for FnHandler<F>
where
    F: Fn(&str, &mut ExecutionContext) -> Result<()> + Send + Sync,
{
    async fn handle(&self, input: &str, ctx: &mut ExecutionContext) -> Result<()> {
        (self.0)(input, ctx)
    }
}

/// Capability table mapping module id to its bound callback.
pub struct ModuleBindings {
    handlers: RwLock<HashMap<String, Arc<dyn ModuleHandler>>>,
}

impl ModuleBindings {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Bind a callback. Rebinding an id replaces the previous handler,
    /// which is benign and mostly useful in tests.
    pub fn bind(&self, module_id: impl Into<String>, handler: Arc<dyn ModuleHandler>) {
        let module_id = module_id.into();
        let replaced = self.handlers.write().insert(module_id.clone(), handler);
        if replaced.is_some() {
            debug!(module = %module_id, "Rebound module handler");
        }
    }

    pub fn get(&self, module_id: &str) -> Option<Arc<dyn ModuleHandler>> {
        self.handlers.read().get(module_id).cloned()
    }

    pub fn is_bound(&self, module_id: &str) -> bool {
        self.handlers.read().contains_key(module_id)
    }

    pub fn bound_count(&self) -> usize {
        self.handlers.read().len()
    }
}

impl Default for ModuleBindings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axon_cortex::domain::Category;

    #[tokio::test]
    async fn test_bind_and_invoke() {
        let bindings = ModuleBindings::new();
        bindings.bind(
            "echo",
            Arc::new(FnHandler(|input: &str, ctx: &mut ExecutionContext| {
                ctx.append_response(input);
                Ok(())
            })),
        );

        let mut ctx = ExecutionContext::new("ping", Category::SimpleChat);
        bindings.get("echo").unwrap().handle("ping", &mut ctx).await.unwrap();
        assert_eq!(ctx.response, "ping");
    }

    #[test]
    fn test_unbound_module_resolves_to_none() {
        let bindings = ModuleBindings::new();
        assert!(bindings.get("ghost").is_none());
        assert_eq!(bindings.bound_count(), 0);
    }

    #[test]
    fn test_rebinding_replaces() {
        let bindings = ModuleBindings::new();
        let noop = |_: &str, _: &mut ExecutionContext| -> Result<()> { Ok(()) };
        bindings.bind("m", Arc::new(FnHandler(noop)));
        bindings.bind("m", Arc::new(FnHandler(noop)));
        assert_eq!(bindings.bound_count(), 1);
    }
}
