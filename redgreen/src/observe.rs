//! Orchestration for the post-command hook.

use crate::context::HookContext;
use crate::core::classifier::is_test_command;
use crate::core::feedback::{TestRun, feedback_for};
use crate::core::payload::Payload;
use crate::core::types::ObserverFeedback;
use crate::io::session_store::SessionStore;

/// Advisory feedback after a shell command finished. Never writes the record.
pub fn run_observer<S: SessionStore>(ctx: &HookContext<S>, raw: &[u8]) -> ObserverFeedback {
    let payload = Payload::parse(raw);
    let Some(command) = payload.command() else {
        return ObserverFeedback::neutral();
    };
    if !is_test_command(command) {
        return ObserverFeedback::neutral();
    }
    let Some(record) = ctx.load_record() else {
        return ObserverFeedback::neutral();
    };
    let Some(status) = payload.exit_status() else {
        ctx.log.record(
            "post-command",
            &[("result", "no_exit_status"), ("command", command)],
        );
        return ObserverFeedback::neutral();
    };

    let run = TestRun::from_exit_status(status);
    let feedback = feedback_for(record.position(), run);
    let position = record.position().to_string();
    let status = status.to_string();
    ctx.log.record(
        "post-command",
        &[
            ("result", if run == TestRun::Passed { "passed" } else { "failed" }),
            ("exit", status.as_str()),
            ("at", position.as_str()),
            ("command", command),
        ],
    );
    ObserverFeedback::message(feedback.message)
}
