//! Orchestration for the pre-edit hook.

use crate::context::HookContext;
use crate::core::edit_gate::decide_edit;
use crate::core::payload::Payload;
use crate::core::types::{EditDecision, Verdict};
use crate::io::session_store::SessionStore;

/// Decide whether the file named in `raw` may be written.
///
/// Read-only: the session record is loaded but never locked or written.
pub fn run_edit_gate<S: SessionStore>(ctx: &HookContext<S>, raw: &[u8]) -> EditDecision {
    let payload = Payload::parse(raw);
    let path = payload.file_path();
    let record = path.and_then(|_| ctx.load_record());
    let outcome = decide_edit(path, record.as_ref());

    let verdict = match outcome.decision.decision {
        Verdict::Approve => "approve",
        Verdict::Deny => "deny",
    };
    let position = record.as_ref().map(|r| r.position().to_string());
    let mut fields = vec![("decision", verdict), ("rule", outcome.rule.as_str())];
    if let Some(path) = path {
        fields.push(("path", path));
    }
    if let Some(position) = position.as_deref() {
        fields.push(("at", position));
    }
    ctx.log.record("pre-edit", &fields);

    outcome.decision
}
