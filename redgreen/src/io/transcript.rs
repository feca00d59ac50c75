//! Agent transcript lookup (JSON Lines).

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::debug;

/// Return the text of the last assistant-authored message in a transcript.
///
/// Lines that are not JSON, or not assistant messages, are skipped.
/// `Ok(None)` means the transcript holds no assistant message.
pub fn last_assistant_message(path: &Path) -> Result<Option<String>> {
    let file = File::open(path).with_context(|| format!("open transcript {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let mut line = Vec::new();
    let mut last = None;
    let mut skipped = 0usize;

    loop {
        line.clear();
        let read = reader
            .read_until(b'\n', &mut line)
            .with_context(|| format!("read transcript {}", path.display()))?;
        if read == 0 {
            break;
        }
        let text = String::from_utf8_lossy(&line);
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(text) {
            Ok(entry) => {
                if let Some(message) = assistant_text(&entry) {
                    last = Some(message);
                }
            }
            Err(_) => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(path = %path.display(), skipped, "skipped unparseable transcript lines");
    }
    Ok(last)
}

fn assistant_text(entry: &Value) -> Option<String> {
    let is_assistant = entry.get("type").and_then(Value::as_str) == Some("assistant")
        || entry.pointer("/message/role").and_then(Value::as_str) == Some("assistant");
    if !is_assistant {
        return None;
    }
    let content = entry
        .pointer("/message/content")
        .or_else(|| entry.get("content"))?;
    match content {
        Value::String(text) => Some(text.clone()),
        Value::Array(blocks) => {
            let parts: Vec<&str> = blocks
                .iter()
                .filter(|block| block.get("type").and_then(Value::as_str) == Some("text"))
                .filter_map(|block| block.get("text").and_then(Value::as_str))
                .collect();
            Some(parts.join("\n"))
        }
        _ => None,
    }
}
