// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Input classifier - fast heuristic category resolution
//!
//! A prioritized chain of vocabulary tests over the lower-cased, trimmed
//! input; the first match wins, with a length fallback when nothing fires.
//! Deterministic and side-effect free so the same input always lands in the
//! same category and learned weights stay attributable.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Sub-millisecond input categorization

use std::collections::HashSet;

use axon_cortex::domain::Category;

/// Inputs shorter than this with no vocabulary match count as small talk.
const SHORT_INPUT_CHARS: usize = 60;

/// Inputs longer than this with no vocabulary match get the reasoning path.
const LONG_INPUT_CHARS: usize = 500;

struct Vocabulary {
    category: Category,
    /// Single keywords, matched against the tokenized input (word boundary).
    words: &'static [&'static str],
    /// Multi-word phrases, matched by substring.
    phrases: &'static [&'static str],
}

static GREETINGS: &[&str] = &[
    "hello",
    "hi",
    "hey",
    "howdy",
    "greetings",
    "yo",
    "good morning",
    "good afternoon",
    "good evening",
    "what's up",
];

/// Vocabulary tests in priority order; the first hit wins.
static VOCABULARIES: &[Vocabulary] = &[
    Vocabulary {
        category: Category::Market,
        words: &[
            "stock", "stocks", "market", "markets", "invest", "investing", "investment",
            "portfolio", "crypto", "bitcoin", "ethereum", "trading", "trade", "ticker",
            "dividend", "etf", "nasdaq", "forex", "shares", "price", "prices",
        ],
        phrases: &["interest rate", "bull market", "bear market"],
    },
    Vocabulary {
        category: Category::Code,
        words: &[
            "code", "bug", "debug", "function", "compile", "compiler", "program", "script",
            "api", "refactor", "deploy", "repository", "git", "python", "rust", "javascript",
            "algorithm", "exception", "syntax", "implement", "regex", "sql",
        ],
        phrases: &["pull request", "unit test", "stack trace", "error message"],
    },
    Vocabulary {
        category: Category::Analysis,
        words: &[
            "analyze", "analyse", "analysis", "compare", "comparison", "evaluate",
            "evaluation", "data", "dataset", "metrics", "statistics", "statistical", "trend",
            "trends", "report", "insights", "correlation", "summarize", "summary",
        ],
        phrases: &["break down", "deep dive"],
    },
    Vocabulary {
        category: Category::Reasoning,
        words: &[
            "plan", "planning", "strategy", "strategic", "decide", "decision", "reason",
            "reasoning", "logic", "tradeoff", "goal", "goals", "prioritize", "roadmap",
            "dilemma",
        ],
        phrases: &[
            "think through",
            "pros and cons",
            "trade-off",
            "step by step",
            "should i",
            "what if",
        ],
    },
    Vocabulary {
        category: Category::Creative,
        words: &[
            "story", "poem", "poetry", "creative", "imagine", "brainstorm", "fiction", "novel",
            "lyrics", "song", "metaphor", "haiku",
        ],
        phrases: &["write a story", "make up"],
    },
    Vocabulary {
        category: Category::LifeAssist,
        words: &[
            "remind", "reminder", "schedule", "appointment", "calendar", "recipe", "workout",
            "exercise", "travel", "trip", "shopping", "grocery", "groceries", "habit", "diet",
            "sleep", "meal",
        ],
        phrases: &["to-do list", "todo list"],
    },
    Vocabulary {
        category: Category::System,
        words: &[
            "diagnostics", "introspection", "modules", "subsystem", "uptime", "shutdown",
            "reboot", "config", "configuration", "telemetry", "heartbeat", "watchdog",
        ],
        phrases: &["system status", "self test", "memory usage", "your modules", "health check"],
    },
];

/// Resolve the category for an input.
///
/// Pure and deterministic: no I/O, no randomness, identical input always
/// yields the identical category.
pub fn classify(input: &str) -> Category {
    let text = input.trim().to_lowercase();

    if is_greeting(&text) {
        return Category::SimpleChat;
    }

    let tokens: HashSet<&str> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    for vocabulary in VOCABULARIES {
        let word_hit = vocabulary.words.iter().any(|w| tokens.contains(w));
        let phrase_hit = vocabulary.phrases.iter().any(|p| text.contains(p));
        if word_hit || phrase_hit {
            return vocabulary.category;
        }
    }

    // Length fallback: short unmatched inputs are small talk, very long ones
    // get the reasoning-heavy path.
    match text.chars().count() {
        n if n < SHORT_INPUT_CHARS => Category::SimpleChat,
        n if n > LONG_INPUT_CHARS => Category::Reasoning,
        _ => Category::Unknown,
    }
}

/// Greeting match: the input must start with a greeting phrase on a word
/// boundary, so "hi!" matches but "history" does not.
fn is_greeting(text: &str) -> bool {
    GREETINGS.iter().any(|greeting| {
        text.strip_prefix(greeting)
            .is_some_and(|rest| rest.chars().next().is_none_or(|c| !c.is_alphanumeric()))
    })
}
