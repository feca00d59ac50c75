//! Orchestration for the stop hook.
//!
//! The only writer of the session record. The read-modify-write runs under
//! the store lock; the decision is returned even if the write fails.

use std::path::Path;

use tracing::{debug, warn};

use crate::context::HookContext;
use crate::core::continuation::{CompletionSignal, StopOutcome, decide_stop};
use crate::core::header::SessionDocument;
use crate::core::payload::Payload;
use crate::core::record::SessionRecord;
use crate::core::types::StopDecision;
use crate::io::session_store::SessionStore;
use crate::io::transcript::last_assistant_message;

/// Decide whether the agent may end its session.
pub fn run_stop_gate<S: SessionStore>(ctx: &HookContext<S>, raw: &[u8]) -> StopDecision {
    let payload = Payload::parse(raw);

    // No record: nothing to lock or write.
    if ctx.load_document().is_none() {
        ctx.log.record("stop", &[("rule", "no_session")]);
        return decide_stop(None, CompletionSignal::NONE, &ctx.config.completion_marker).decision;
    }

    let guard = match ctx.store.lock() {
        Ok(guard) => Some(guard),
        Err(err) => {
            warn!(error = %format!("{err:#}"), "session record lock failed; continuing unlocked");
            None
        }
    };

    let doc = ctx.load_document();
    let record = doc.as_ref().map(SessionRecord::from_document);
    let signal = match &record {
        Some(record) if record.loop_active && !record.iterations_exhausted() => {
            completion_signal(ctx, &payload)
        }
        _ => CompletionSignal::NONE,
    };
    let outcome = decide_stop(record.as_ref(), signal, &ctx.config.completion_marker);
    let persisted = match doc {
        Some(doc) if !outcome.update.is_empty() => persist(ctx, doc, &outcome),
        _ => true,
    };
    drop(guard);

    log_outcome(ctx, record.as_ref(), &outcome, persisted);
    outcome.decision
}

fn completion_signal<S: SessionStore>(ctx: &HookContext<S>, payload: &Payload) -> CompletionSignal {
    let Some(location) = payload.transcript_path() else {
        return CompletionSignal::NONE;
    };
    let path = ctx.paths.resolve(Path::new(location));
    match last_assistant_message(&path) {
        Ok(Some(message)) => CompletionSignal::scan(
            &message,
            &ctx.config.completion_marker,
            &ctx.config.completion_phrases,
        ),
        Ok(None) => CompletionSignal::NONE,
        Err(err) => {
            debug!(error = %format!("{err:#}"), "transcript unreadable; treating as absent");
            CompletionSignal::NONE
        }
    }
}

fn persist<S: SessionStore>(ctx: &HookContext<S>, mut doc: SessionDocument, outcome: &StopOutcome) -> bool {
    for (key, value) in outcome.update.header_pairs() {
        doc.set_scalar(key, &value);
    }
    match ctx.store.replace(&doc) {
        Ok(()) => true,
        Err(err) => {
            warn!(error = %format!("{err:#}"), "session record write failed; decision still returned");
            false
        }
    }
}

fn log_outcome<S: SessionStore>(
    ctx: &HookContext<S>,
    record: Option<&SessionRecord>,
    outcome: &StopOutcome,
    persisted: bool,
) {
    let decision = if outcome.decision.is_block() { "block" } else { "allow" };
    let position = record.map(|r| r.position().to_string()).unwrap_or_default();
    let iteration = outcome
        .update
        .iteration
        .or(record.map(|r| r.iteration))
        .map(|n| n.to_string())
        .unwrap_or_default();
    let mut fields = vec![
        ("decision", decision),
        ("rule", outcome.rule.as_str()),
        ("at", position.as_str()),
        ("iteration", iteration.as_str()),
    ];
    if outcome.marker_ignored {
        fields.push(("marker", "ignored_outside_simplicity"));
    }
    if !persisted {
        fields.push(("write", "failed"));
    }
    ctx.log.record("stop", &fields);
}
