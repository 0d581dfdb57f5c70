// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Infrastructure layer for Cortex bounded context

pub mod knowledge;

pub use knowledge::{InMemoryKnowledgeStore, KnowledgeId, KnowledgeItem, KnowledgeStore};
