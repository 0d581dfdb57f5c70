// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Infrastructure layer for the dispatch core

pub mod bindings;
pub mod event_bus;

pub use bindings::{FnHandler, ModuleBindings, ModuleHandler};
pub use event_bus::{CortexBusAdapter, DispatchBus, EventBusError, EventReceiver};
