//! Advisory hook log, one line per event under `.claude/`.
//!
//! Never read back by the gates. Concurrent writers may interleave lines;
//! each append is a single `write_all` on an append-mode handle.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use tracing::debug;

use crate::core::guidance::snippet;

const VALUE_LIMIT: usize = 160;

/// Append-only hook log. A disabled log discards every entry.
#[derive(Debug, Clone)]
pub struct HookLog {
    path: Option<PathBuf>,
}

impl HookLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append one entry; failures are swallowed.
    pub fn record(&self, hook: &str, fields: &[(&str, &str)]) {
        let Some(path) = &self.path else {
            return;
        };
        let line = format_line(&timestamp(), hook, fields);
        if let Err(err) = append(path, &line) {
            debug!(path = %path.display(), error = %format!("{err:#}"), "hook log append failed");
        }
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn format_line(timestamp: &str, hook: &str, fields: &[(&str, &str)]) -> String {
    let mut line = format!("{timestamp} {hook}");
    for (key, value) in fields {
        line.push(' ');
        line.push_str(key);
        line.push('=');
        line.push_str(&escape(value));
    }
    line.push('\n');
    line
}

/// Quote a value so the entry stays on one line and splits on spaces.
fn escape(value: &str) -> String {
    let value = snippet(value, VALUE_LIMIT);
    let plain = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_graphic() && c != '"' && c != '\\' && c != '=');
    if plain {
        return value;
    }
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{{{:x}}}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn append(path: &Path, line: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {}", path.display()))?;
    file.write_all(line.as_bytes())
        .with_context(|| format!("append {}", path.display()))?;
    Ok(())
}
