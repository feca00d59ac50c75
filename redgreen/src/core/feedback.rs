//! Advisory feedback after a test command completes.

use crate::core::phase::{Position, Substate};

/// Outcome of a recognized test command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestRun {
    Passed,
    Failed,
}

impl TestRun {
    pub fn from_exit_status(status: i64) -> Self {
        if status == 0 {
            TestRun::Passed
        } else {
            TestRun::Failed
        }
    }
}

/// How the run relates to what the current substate expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    /// The run matches the cycle; the message says what to do next.
    OnTrack,
    /// The run contradicts the cycle (passing in RED, failing in REFACTOR).
    Anomalous,
}

/// Feedback for one test run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub expectation: Expectation,
    pub message: String,
}

/// Guidance for a test run at `position`.
pub fn feedback_for(position: Position, run: TestRun) -> Feedback {
    let phase = position.phase;
    let (expectation, message) = match (position.substate, run) {
        (Substate::Red, TestRun::Passed) => (
            Expectation::Anomalous,
            format!(
                "⚠️ [{phase}/RED] Tests PASSED, but in RED the new test should have failed. \
                 Do NOT move to GREEN. Check that the new test actually exercises the missing \
                 behavior and is not passing by accident, then make it fail for the right reason."
            ),
        ),
        (Substate::Red, TestRun::Failed) => (
            Expectation::OnTrack,
            format!(
                "✅ [{phase}/RED] Tests failed as expected. Move to GREEN: write the minimum \
                 implementation that makes the failing test pass."
            ),
        ),
        (Substate::Green, TestRun::Passed) => (
            Expectation::OnTrack,
            format!(
                "✅ [{phase}/GREEN] Tests pass. Move to REFACTOR: clean up the implementation \
                 while keeping every test green."
            ),
        ),
        (Substate::Green, TestRun::Failed) => (
            Expectation::OnTrack,
            format!(
                "🔧 [{phase}/GREEN] Tests still failing. Keep implementing until the failing \
                 test passes; do not change the test to fit the code."
            ),
        ),
        (Substate::Refactor, TestRun::Passed) => (
            Expectation::OnTrack,
            format!(
                "✅ [{phase}/REFACTOR] Tests still pass. Continue refactoring, or advance {}.",
                advance_hint(position)
            ),
        ),
        (Substate::Refactor, TestRun::Failed) => (
            Expectation::Anomalous,
            format!(
                "🛑 [{phase}/REFACTOR] Tests FAILED during refactor: the last change \
                 introduced a regression. Revert it immediately and refactor in smaller steps."
            ),
        ),
    };
    Feedback {
        expectation,
        message,
    }
}

fn advance_hint(position: Position) -> String {
    match position.phase.next() {
        Some(next) => format!("to {next}/RED and write the first failing {next} test"),
        None => "by finishing the loop once SIMPLICITY is complete".to_string(),
    }
}
