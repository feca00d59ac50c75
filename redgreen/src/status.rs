//! Read-only session summary for `redgreen status`.

use std::fmt::Write as _;

use anyhow::{Context, Result};

use crate::context::HookContext;
use crate::core::guidance::{SNIPPET_LIMIT, snippet, status_line};
use crate::core::record::SessionRecord;
use crate::io::session_store::SessionStore;

/// Load the current record. Unlike the gates, read errors are surfaced.
pub fn session_status<S: SessionStore>(ctx: &HookContext<S>) -> Result<Option<SessionRecord>> {
    let doc = ctx.store.load().context("load session record")?;
    Ok(doc.map(|doc| SessionRecord::from_document(&doc)))
}

/// Multi-line human summary of `record`.
pub fn render_status(record: &SessionRecord) -> String {
    let mut out = String::new();
    let feature = snippet(record.feature.trim(), SNIPPET_LIMIT);
    let _ = writeln!(out, "{}", status_line(record));
    let _ = writeln!(
        out,
        "feature:    {}",
        if feature.is_empty() { "(not recorded)" } else { feature.as_str() }
    );
    let _ = writeln!(
        out,
        "phase:      {}/5 {} ({})",
        record.phase.number(),
        record.phase,
        record.phase.focus()
    );
    let _ = writeln!(out, "substate:   {}", record.substate);
    let _ = writeln!(
        out,
        "loop:       {}",
        if record.loop_active { "active" } else { "inactive" }
    );
    if let Some(started_at) = &record.started_at {
        let _ = writeln!(out, "started:    {}", snippet(started_at, SNIPPET_LIMIT));
    }
    let _ = writeln!(out, "test files: {}", list(&record.test_files));
    let _ = writeln!(out, "patterns:   {}", list(&record.test_patterns));
    out
}

fn list(items: &[String]) -> String {
    if items.is_empty() {
        return "(none)".to_string();
    }
    let joined = items
        .iter()
        .map(|item| item.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    snippet(&joined, SNIPPET_LIMIT)
}
