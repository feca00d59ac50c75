//! Typed view of the session record and its per-field defaults.
//!
//! Every field has exactly one fallback, held by [`SessionRecord::default`]:
//!
//! | key              | fallback  |
//! |------------------|-----------|
//! | `feature`        | `""`      |
//! | `phase`          | `CORE`    |
//! | `substate`       | `RED`     |
//! | `loop_active`    | `false`   |
//! | `iteration`      | `1`       |
//! | `max_iterations` | `0`       |
//! | `test_files`     | `[]`      |
//! | `test_patterns`  | `[]`      |
//! | `started_at`     | absent    |
//!
//! A missing key and a key whose value does not parse both resolve to the
//! fallback, so corrupted state lands on the most restrictive gating posture
//! and on a fresh, unlimited loop for the counters.

use crate::core::header::SessionDocument;
use crate::core::phase::{Phase, Position, Substate};

pub const KEY_FEATURE: &str = "feature";
pub const KEY_PHASE: &str = "phase";
pub const KEY_SUBSTATE: &str = "substate";
pub const KEY_LOOP_ACTIVE: &str = "loop_active";
pub const KEY_ITERATION: &str = "iteration";
pub const KEY_MAX_ITERATIONS: &str = "max_iterations";
pub const KEY_TEST_FILES: &str = "test_files";
pub const KEY_TEST_PATTERNS: &str = "test_patterns";
pub const KEY_STARTED_AT: &str = "started_at";

/// Session state consumed by the gates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub feature: String,
    pub phase: Phase,
    pub substate: Substate,
    pub loop_active: bool,
    /// Continuation cycles so far (always `>= 1`).
    pub iteration: u64,
    /// Hard ceiling on `iteration`; `0` means unlimited.
    pub max_iterations: u64,
    /// Advisory list of known test files. Not used for classification.
    pub test_files: Vec<String>,
    /// Extra patterns OR-ed into test-artifact classification.
    pub test_patterns: Vec<String>,
    pub started_at: Option<String>,
}

impl SessionRecord {
    /// Record in the state a freshly initialized session starts in.
    pub fn new(feature: impl Into<String>, max_iterations: u64) -> Self {
        Self {
            feature: feature.into(),
            phase: Phase::Core,
            substate: Substate::Red,
            loop_active: true,
            iteration: 1,
            max_iterations,
            test_files: Vec::new(),
            test_patterns: Vec::new(),
            started_at: None,
        }
    }

    /// Read the typed record out of a parsed document.
    pub fn from_document(doc: &SessionDocument) -> Self {
        let fallback = Self::default();
        let scalar = |key: &str| doc.get(key).and_then(|v| v.as_scalar().map(str::to_string));
        let list = |key: &str| doc.get(key).map(|v| v.items());

        Self {
            feature: scalar(KEY_FEATURE).unwrap_or(fallback.feature),
            phase: scalar(KEY_PHASE)
                .and_then(|raw| Phase::parse(&raw))
                .unwrap_or(fallback.phase),
            substate: scalar(KEY_SUBSTATE)
                .and_then(|raw| Substate::parse(&raw))
                .unwrap_or(fallback.substate),
            loop_active: scalar(KEY_LOOP_ACTIVE)
                .and_then(|raw| parse_bool(&raw))
                .unwrap_or(fallback.loop_active),
            iteration: scalar(KEY_ITERATION)
                .and_then(|raw| parse_count(&raw))
                .filter(|n| *n >= 1)
                .unwrap_or(fallback.iteration),
            max_iterations: scalar(KEY_MAX_ITERATIONS)
                .and_then(|raw| parse_count(&raw))
                .unwrap_or(fallback.max_iterations),
            test_files: list(KEY_TEST_FILES).unwrap_or(fallback.test_files),
            test_patterns: list(KEY_TEST_PATTERNS).unwrap_or(fallback.test_patterns),
            started_at: scalar(KEY_STARTED_AT)
                .filter(|s| !s.trim().is_empty())
                .or(fallback.started_at),
        }
    }

    /// Render as a new document with the standard key order.
    pub fn to_document(&self, body: &str) -> SessionDocument {
        let mut pairs = vec![
            (KEY_FEATURE, quote(&self.feature)),
            (KEY_PHASE, self.phase.to_string()),
            (KEY_SUBSTATE, self.substate.to_string()),
            (KEY_LOOP_ACTIVE, self.loop_active.to_string()),
            (KEY_ITERATION, self.iteration.to_string()),
            (KEY_MAX_ITERATIONS, self.max_iterations.to_string()),
            (KEY_TEST_FILES, inline_list(&self.test_files)),
            (KEY_TEST_PATTERNS, inline_list(&self.test_patterns)),
        ];
        if let Some(started_at) = &self.started_at {
            pairs.push((KEY_STARTED_AT, quote(started_at)));
        }
        SessionDocument::from_pairs(pairs, body)
    }

    pub fn position(&self) -> Position {
        Position::new(self.phase, self.substate)
    }

    /// True once a limited loop has used up its iterations.
    pub fn iterations_exhausted(&self) -> bool {
        self.max_iterations > 0 && self.iteration >= self.max_iterations
    }

    /// `3/10`, or `3/∞` for an unlimited loop.
    pub fn iteration_label(&self) -> String {
        if self.max_iterations == 0 {
            format!("{}/∞", self.iteration)
        } else {
            format!("{}/{}", self.iteration, self.max_iterations)
        }
    }
}

impl Default for SessionRecord {
    /// Fallback values for missing or corrupted fields.
    fn default() -> Self {
        Self {
            feature: String::new(),
            phase: Phase::Core,
            substate: Substate::Red,
            loop_active: false,
            iteration: 1,
            max_iterations: 0,
            test_files: Vec::new(),
            test_patterns: Vec::new(),
            started_at: None,
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn parse_count(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok()
}

fn quote(value: &str) -> String {
    let flat: String = value
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    format!("\"{}\"", flat.replace('"', "'"))
}

fn inline_list(items: &[String]) -> String {
    format!("[{}]", items.join(", "))
}
