// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Input category taxonomy shared by the classifier and the learning tables

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of input categories.
///
/// Weight tables and per-category statistics are keyed by this enum; it is
/// never extended at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    SimpleChat,
    Analysis,
    Creative,
    Reasoning,
    Market,
    Code,
    LifeAssist,
    System,
    Unknown,
}

impl Category {
    /// Every category, in a stable order (used by gap scans and reports).
    pub const ALL: [Category; 9] = [
        Category::SimpleChat,
        Category::Analysis,
        Category::Creative,
        Category::Reasoning,
        Category::Market,
        Category::Code,
        Category::LifeAssist,
        Category::System,
        Category::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::SimpleChat => "simple_chat",
            Category::Analysis => "analysis",
            Category::Creative => "creative",
            Category::Reasoning => "reasoning",
            Category::Market => "market",
            Category::Code => "code",
            Category::LifeAssist => "life_assist",
            Category::System => "system",
            Category::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognised category label.
#[derive(Debug, thiserror::Error)]
#[error("unknown category label: {0}")]
pub struct ParseCategoryError(String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .find(|c| c.as_str() == s)
            .copied()
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}
