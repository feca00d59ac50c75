//! Pure decision for "may the session end now?".
//!
//! The continuation gate is the only writer of `iteration` and
//! `loop_active`. [`decide_stop`] computes the decision together with the
//! record update to persist; the caller applies the update under the store
//! lock.

use crate::core::guidance::{continuation_instruction, status_line};
use crate::core::phase::Substate;
use crate::core::record::{KEY_ITERATION, KEY_LOOP_ACTIVE, SessionRecord};
use crate::core::types::StopDecision;

/// Completion signals found in the most recent agent message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletionSignal {
    /// The literal completion marker was present.
    pub marker: bool,
    /// An alternate natural-language completion phrase was present.
    pub phrase: bool,
}

impl CompletionSignal {
    pub const NONE: CompletionSignal = CompletionSignal {
        marker: false,
        phrase: false,
    };

    /// Scan `message` for `marker` (exact) and any of `phrases` (case-insensitive).
    pub fn scan<S: AsRef<str>>(message: &str, marker: &str, phrases: &[S]) -> Self {
        let lowered = message.to_lowercase();
        Self {
            marker: !marker.is_empty() && message.contains(marker),
            phrase: phrases.iter().any(|phrase| {
                let phrase = phrase.as_ref().trim();
                !phrase.is_empty() && lowered.contains(&phrase.to_lowercase())
            }),
        }
    }
}

/// Which branch of the decision tree was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopRule {
    NoSession,
    LoopInactive,
    MaxIterations,
    Complete,
    Continue,
}

impl StopRule {
    pub fn as_str(self) -> &'static str {
        match self {
            StopRule::NoSession => "no_session",
            StopRule::LoopInactive => "loop_inactive",
            StopRule::MaxIterations => "max_iterations",
            StopRule::Complete => "complete",
            StopRule::Continue => "continue",
        }
    }
}

/// Field changes to persist to the session record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordUpdate {
    pub iteration: Option<u64>,
    pub loop_active: Option<bool>,
}

impl RecordUpdate {
    pub fn is_empty(&self) -> bool {
        self.iteration.is_none() && self.loop_active.is_none()
    }

    pub fn apply(&self, record: &mut SessionRecord) {
        if let Some(iteration) = self.iteration {
            record.iteration = iteration;
        }
        if let Some(loop_active) = self.loop_active {
            record.loop_active = loop_active;
        }
    }

    /// Header `(key, value)` pairs for the changed fields.
    pub fn header_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(iteration) = self.iteration {
            pairs.push((KEY_ITERATION, iteration.to_string()));
        }
        if let Some(loop_active) = self.loop_active {
            pairs.push((KEY_LOOP_ACTIVE, loop_active.to_string()));
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopOutcome {
    pub rule: StopRule,
    pub decision: StopDecision,
    pub update: RecordUpdate,
    /// The marker was present but ignored because the phase is not terminal.
    pub marker_ignored: bool,
}

/// Decide a stop attempt.
///
/// Branches, each terminal:
/// 1. no session: allow.
/// 2. loop inactive: allow with a status summary.
/// 3. iteration ceiling reached: deactivate the loop and allow.
/// 4. completion signalled in SIMPLICITY: deactivate the loop and allow.
///    The marker counts in SIMPLICITY only; the alternate phrase only in
///    SIMPLICITY/REFACTOR. Outside SIMPLICITY the marker is ignored.
/// 5. otherwise: bump the iteration and block with the next instruction.
pub fn decide_stop(
    record: Option<&SessionRecord>,
    signal: CompletionSignal,
    marker: &str,
) -> StopOutcome {
    let Some(record) = record else {
        return outcome(StopRule::NoSession, StopDecision::allow(None), RecordUpdate::default());
    };

    if !record.loop_active {
        let summary = format!("TDD loop inactive · {}", record.position());
        return outcome(
            StopRule::LoopInactive,
            StopDecision::allow(Some(summary)),
            RecordUpdate::default(),
        );
    }

    let deactivate = RecordUpdate {
        iteration: None,
        loop_active: Some(false),
    };

    if record.iterations_exhausted() {
        let message = format!(
            "🛑 TDD loop stopped: max iterations ({}) reached at {}.",
            record.max_iterations,
            record.position()
        );
        return outcome(StopRule::MaxIterations, StopDecision::allow(Some(message)), deactivate);
    }

    let terminal = record.phase.is_terminal();
    let phrase_counts = terminal && record.substate == Substate::Refactor && signal.phrase;
    if terminal && (signal.marker || phrase_counts) {
        let message = format!(
            "✅ TDD loop complete: all five phases finished after {} iteration(s).",
            record.iteration
        );
        return outcome(StopRule::Complete, StopDecision::allow(Some(message)), deactivate);
    }

    let mut next = record.clone();
    let update = RecordUpdate {
        iteration: Some(record.iteration.saturating_add(1)),
        loop_active: None,
    };
    update.apply(&mut next);
    let mut result = outcome(
        StopRule::Continue,
        StopDecision::block(continuation_instruction(&next, marker), status_line(&next)),
        update,
    );
    result.marker_ignored = signal.marker && !terminal;
    result
}

fn outcome(rule: StopRule, decision: StopDecision, update: RecordUpdate) -> StopOutcome {
    StopOutcome {
        rule,
        decision,
        update,
        marker_ignored: false,
    }
}
