//! Tolerant field extraction from hook event payloads.
//!
//! Payloads are decoded into a generic JSON value tree and looked up by a
//! fixed list of aliases per field. Any ambiguity (undecodable bytes,
//! truncated or over-nested JSON, a non-object root, a value of the wrong
//! type) yields "field absent" rather than an error. Extracted strings are
//! returned verbatim: nothing is expanded, unescaped beyond JSON, or run.

use serde_json::Value;
use tracing::debug;

/// Known payload fields and their aliases, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    FilePath,
    Command,
    ExitStatus,
    TranscriptPath,
}

impl Field {
    /// JSON pointer aliases tried in order; the first present one wins.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Field::FilePath => &[
                "/tool_input/file_path",
                "/tool_input/path",
                "/tool_input/notebook_path",
                "/file_path",
                "/path",
            ],
            Field::Command => &["/tool_input/command", "/command"],
            Field::ExitStatus => &[
                "/tool_response/exit_code",
                "/tool_response/exitCode",
                "/tool_response/returncode",
                "/tool_response/status",
                "/exit_code",
                "/exitCode",
            ],
            Field::TranscriptPath => &["/transcript_path", "/transcriptPath", "/transcript"],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Field::FilePath => "file_path",
            Field::Command => "command",
            Field::ExitStatus => "exit_status",
            Field::TranscriptPath => "transcript_path",
        }
    }
}

/// A decoded event payload.
#[derive(Debug, Clone, Default)]
pub struct Payload {
    root: Option<Value>,
}

impl Payload {
    /// Decode raw bytes. Never fails; undecodable input produces an empty payload.
    pub fn parse(raw: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(raw) {
            Ok(value @ Value::Object(_)) => Self { root: Some(value) },
            Ok(other) => {
                debug!(kind = value_kind(&other), "payload root is not an object");
                Self::default()
            }
            Err(err) => {
                debug!(bytes = raw.len(), error = %err, "payload did not decode");
                Self::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// First alias of `field` holding a non-empty string.
    ///
    /// An alias holding a non-string value counts as absent and lookup moves
    /// on to the next alias.
    pub fn string(&self, field: Field) -> Option<&str> {
        let root = self.root.as_ref()?;
        field
            .aliases()
            .iter()
            .filter_map(|pointer| root.pointer(pointer))
            .find_map(|value| value.as_str().filter(|s| !s.is_empty()))
    }

    /// First alias of `field` holding an integer, as a JSON number or a
    /// string of decimal digits.
    pub fn integer(&self, field: Field) -> Option<i64> {
        let root = self.root.as_ref()?;
        field
            .aliases()
            .iter()
            .filter_map(|pointer| root.pointer(pointer))
            .find_map(as_integer)
    }

    pub fn file_path(&self) -> Option<&str> {
        self.string(Field::FilePath)
    }

    pub fn command(&self) -> Option<&str> {
        self.string(Field::Command)
    }

    pub fn exit_status(&self) -> Option<i64> {
        self.integer(Field::ExitStatus)
    }

    pub fn transcript_path(&self) -> Option<&str> {
        self.string(Field::TranscriptPath)
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => {
            let text = text.trim();
            let digits = text.strip_prefix('-').unwrap_or(text);
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            text.parse().ok()
        }
        _ => None,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
