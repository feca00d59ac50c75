//! Test-only helpers: scratch project roots with records and transcripts.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use tempfile::TempDir;

use crate::context::HookContext;
use crate::core::header::SessionDocument;
use crate::core::phase::{Phase, Substate};
use crate::core::record::SessionRecord;
use crate::io::paths::ProjectPaths;

/// A temporary project root with a `.claude/` directory.
pub struct TestProject {
    dir: TempDir,
    paths: ProjectPaths,
}

impl TestProject {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = ProjectPaths::new(dir.path());
        fs::create_dir_all(&paths.config_dir).expect("create .claude");
        Self { dir, paths }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn paths(&self) -> &ProjectPaths {
        &self.paths
    }

    pub fn record_path(&self) -> &Path {
        &self.paths.default_record_path
    }

    pub fn context(&self) -> HookContext {
        HookContext::open(self.root())
    }

    /// Write `record` as a fresh session document.
    pub fn write_record(&self, record: &SessionRecord) {
        let doc = record.to_document("\n# TDD session\n");
        self.write_record_raw(&doc.render());
    }

    pub fn write_record_raw(&self, contents: &str) {
        fs::write(self.record_path(), contents).expect("write record");
    }

    pub fn read_record_raw(&self) -> String {
        fs::read_to_string(self.record_path()).expect("read record")
    }

    pub fn read_record(&self) -> SessionRecord {
        SessionRecord::from_document(&SessionDocument::parse(&self.read_record_raw()))
    }

    /// Write a JSONL transcript ending with one assistant message per entry.
    pub fn write_transcript(&self, name: &str, assistant_messages: &[&str]) -> PathBuf {
        let mut lines = vec![json!({"type": "user", "message": {"role": "user", "content": "start"}}).to_string()];
        lines.extend(assistant_messages.iter().map(|text| assistant_line(text)));
        let path = self.root().join(name);
        fs::write(&path, lines.join("\n") + "\n").expect("write transcript");
        path
    }

    pub fn log_contents(&self) -> String {
        fs::read_to_string(&self.paths.default_log_path).unwrap_or_default()
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// An active record at `phase`/`substate`.
pub fn active_record(phase: Phase, substate: Substate, iteration: u64, max_iterations: u64) -> SessionRecord {
    let mut record = SessionRecord::new("shopping cart totals", max_iterations);
    record.phase = phase;
    record.substate = substate;
    record.iteration = iteration;
    record
}

/// One transcript line holding an assistant text block.
pub fn assistant_line(text: &str) -> String {
    json!({
        "type": "assistant",
        "message": {"role": "assistant", "content": [{"type": "text", "text": text}]},
    })
    .to_string()
}

/// Stop-hook payload naming `transcript`.
pub fn stop_payload(transcript: &Path) -> Vec<u8> {
    json!({"hook_event_name": "Stop", "transcript_path": transcript}).to_string().into_bytes()
}

/// Pre-edit payload for `path`.
pub fn edit_payload(path: &str) -> Vec<u8> {
    json!({"tool_name": "Edit", "tool_input": {"file_path": path}}).to_string().into_bytes()
}

/// Post-command payload for `command` finishing with `exit_code`.
pub fn command_payload(command: &str, exit_code: i64) -> Vec<u8> {
    json!({
        "tool_name": "Bash",
        "tool_input": {"command": command},
        "tool_response": {"exit_code": exit_code},
    })
    .to_string()
    .into_bytes()
}
