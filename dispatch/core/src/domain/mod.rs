// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Mod
//!
//! Provides mod functionality for the system.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Implements mod

pub mod events;
pub mod module;
pub mod plan;
pub mod registry;

pub use events::*;
pub use module::*;
pub use plan::*;
pub use registry::*;
