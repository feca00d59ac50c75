//! Parsing and editing of the delimited header region of a session document.
//!
//! A session document looks like:
//!
//! ```text
//! ---
//! phase: CORE
//! test_patterns: [\.feature$, /fixtures/]
//! test_files:
//!   - src/app.test.ts
//! ---
//!
//! free-form body
//! ```
//!
//! Only `key: value` scalars, `key: [a, b]` inline lists and indented `- item`
//! block lists are understood. Anything else inside the header is kept as an
//! opaque line so that edits round-trip unknown content untouched.

/// Marker line that opens and closes the header region.
pub const HEADER_DELIMITER: &str = "---";

/// A header value as written in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    Scalar(String),
    List(Vec<String>),
}

impl HeaderValue {
    /// Scalar text, or `None` for list values.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            HeaderValue::Scalar(value) => Some(value),
            HeaderValue::List(_) => None,
        }
    }

    /// Items of a list. A scalar is split on commas so `a, b` and `[a, b]`
    /// read the same way.
    pub fn items(&self) -> Vec<String> {
        match self {
            HeaderValue::List(items) => items.clone(),
            HeaderValue::Scalar(value) => split_inline_list(value),
        }
    }
}

/// Parsed session document: header lines plus untouched body text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionDocument {
    lines: Vec<String>,
    body: String,
}

impl SessionDocument {
    /// Parse a document. Never fails: input without a complete header yields
    /// an empty header and keeps the whole input as body.
    pub fn parse(contents: &str) -> Self {
        match split_header(contents) {
            Some((header, body)) => Self {
                lines: header.lines().map(str::to_string).collect(),
                body: body.to_string(),
            },
            None => Self {
                lines: Vec::new(),
                body: contents.to_string(),
            },
        }
    }

    /// Build a document from scalar key/value pairs and a body.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, String)>, body: &str) -> Self {
        Self {
            lines: pairs
                .into_iter()
                .map(|(key, value)| format!("{key}: {value}"))
                .collect(),
            body: body.to_string(),
        }
    }

    pub fn has_header(&self) -> bool {
        !self.lines.is_empty()
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Look up `key`. The first occurrence wins.
    pub fn get(&self, key: &str) -> Option<HeaderValue> {
        for (idx, line) in self.lines.iter().enumerate() {
            let Some((line_key, raw)) = split_key(line) else {
                continue;
            };
            if line_key != key {
                continue;
            }
            let raw = raw.trim();
            if raw.is_empty() {
                let items = self.block_items(idx + 1);
                return Some(HeaderValue::List(items));
            }
            if raw.starts_with('[') {
                return Some(HeaderValue::List(split_inline_list(raw)));
            }
            return Some(HeaderValue::Scalar(unquote(raw).to_string()));
        }
        None
    }

    /// Insert or replace a scalar `key: value` line.
    ///
    /// Later duplicates of `key` (and their block-list items) are dropped; all
    /// other lines keep their position and text.
    pub fn set_scalar(&mut self, key: &str, value: &str) {
        let mut lines = Vec::with_capacity(self.lines.len() + 1);
        let mut saw_key = false;
        let mut skipping_block = false;

        for line in &self.lines {
            if skipping_block {
                if is_block_item(line) {
                    continue;
                }
                skipping_block = false;
            }
            if let Some((line_key, raw)) = split_key(line)
                && line_key == key
            {
                if !saw_key {
                    lines.push(format!("{key}: {value}"));
                    saw_key = true;
                }
                skipping_block = raw.trim().is_empty();
                continue;
            }
            lines.push(line.clone());
        }

        if !saw_key {
            lines.push(format!("{key}: {value}"));
        }
        self.lines = lines;
    }

    /// Render the document with delimited header and the original body.
    pub fn render(&self) -> String {
        let mut buf = String::new();
        buf.push_str(HEADER_DELIMITER);
        buf.push('\n');
        for line in &self.lines {
            buf.push_str(line);
            buf.push('\n');
        }
        buf.push_str(HEADER_DELIMITER);
        buf.push('\n');
        buf.push_str(&self.body);
        buf
    }

    fn block_items(&self, start: usize) -> Vec<String> {
        self.lines[start..]
            .iter()
            .take_while(|line| is_block_item(line))
            .filter_map(|line| {
                let item = line.trim_start().strip_prefix('-')?.trim();
                let item = unquote(item);
                (!item.is_empty()).then(|| item.to_string())
            })
            .collect()
    }
}

/// Split a document into (header, rest). Returns `None` without a complete header.
fn split_header(contents: &str) -> Option<(&str, &str)> {
    let first_end = contents.find('\n')?;
    if contents[..first_end].trim_end_matches('\r') != HEADER_DELIMITER {
        return None;
    }
    let after = &contents[first_end + 1..];
    let mut offset = 0;
    for line in after.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == HEADER_DELIMITER {
            return Some((&after[..offset], &after[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Split `key: value` at the first colon. Indented lines, comments and list
/// items are not keys.
fn split_key(line: &str) -> Option<(&str, &str)> {
    if line.starts_with([' ', '\t', '#', '-']) {
        return None;
    }
    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    if key.is_empty() || key.contains(char::is_whitespace) {
        return None;
    }
    Some((key, value))
}

fn is_block_item(line: &str) -> bool {
    (line.starts_with([' ', '\t']) && line.trim_start().starts_with('-')) || line.starts_with("- ")
}

fn split_inline_list(raw: &str) -> Vec<String> {
    let inner = raw.trim();
    let inner = inner.strip_prefix('[').unwrap_or(inner);
    let inner = inner.strip_suffix(']').unwrap_or(inner);
    inner
        .split(',')
        .map(|item| unquote(item.trim()).trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn unquote(raw: &str) -> &str {
    if raw.len() >= 2
        && ((raw.starts_with('"') && raw.ends_with('"'))
            || (raw.starts_with('\'') && raw.ends_with('\'')))
    {
        return &raw[1..raw.len() - 1];
    }
    raw
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "---\nfeature: \"login form\"\nphase: EDGE\ntest_patterns: [\\.feature$, /fixtures/ ]\ntest_files:\n  - src/a.test.ts\n  - 'src/b.spec.ts'\nnote: keep me\n---\n\n# Notes\nbody: not a header key\n";

    #[test]
    fn reads_scalars_and_strips_quotes() {
        let doc = SessionDocument::parse(DOC);
        assert_eq!(
            doc.get("feature"),
            Some(HeaderValue::Scalar("login form".to_string()))
        );
        assert_eq!(doc.get("phase").unwrap().as_scalar(), Some("EDGE"));
    }

    #[test]
    fn reads_inline_and_block_lists() {
        let doc = SessionDocument::parse(DOC);
        assert_eq!(
            doc.get("test_patterns").unwrap().items(),
            vec!["\\.feature$".to_string(), "/fixtures/".to_string()]
        );
        assert_eq!(
            doc.get("test_files").unwrap().items(),
            vec!["src/a.test.ts".to_string(), "src/b.spec.ts".to_string()]
        );
    }

    #[test]
    fn body_is_not_parsed() {
        let doc = SessionDocument::parse(DOC);
        assert_eq!(doc.get("body"), None);
        assert_eq!(doc.body(), "\n# Notes\nbody: not a header key\n");
    }

    #[test]
    fn missing_or_unterminated_header_is_empty() {
        let doc = SessionDocument::parse("phase: GREEN\n");
        assert!(!doc.has_header());
        assert_eq!(doc.get("phase"), None);

        let doc = SessionDocument::parse("---\nphase: GREEN\nno closing marker\n");
        assert!(!doc.has_header());
        assert_eq!(doc.get("phase"), None);

        assert!(!SessionDocument::parse("").has_header());
    }

    #[test]
    fn accepts_crlf_delimiters() {
        let doc = SessionDocument::parse("---\r\nphase: GREEN\r\n---\r\nbody");
        assert_eq!(doc.get("phase").unwrap().as_scalar(), Some("GREEN"));
    }

    #[test]
    fn first_duplicate_key_wins() {
        let doc = SessionDocument::parse("---\nphase: GREEN\nphase: RED\n---\n");
        assert_eq!(doc.get("phase").unwrap().as_scalar(), Some("GREEN"));
    }

    #[test]
    fn set_scalar_preserves_other_lines_and_body() {
        let mut doc = SessionDocument::parse(DOC);
        doc.set_scalar("phase", "SECURITY");
        doc.set_scalar("iteration", "7");
        let rendered = doc.render();

        assert!(rendered.starts_with("---\nfeature: \"login form\"\nphase: SECURITY\n"));
        assert!(rendered.contains("  - 'src/b.spec.ts'\nnote: keep me\niteration: 7\n---\n"));
        assert!(rendered.ends_with("\n# Notes\nbody: not a header key\n"));

        let reparsed = SessionDocument::parse(&rendered);
        assert_eq!(reparsed.get("iteration").unwrap().as_scalar(), Some("7"));
        assert_eq!(reparsed.get("test_files").unwrap().items().len(), 2);
    }

    #[test]
    fn set_scalar_replaces_block_list_and_drops_duplicates() {
        let mut doc =
            SessionDocument::parse("---\nloop_active:\n  - weird\nloop_active: true\nx: 1\n---\n");
        doc.set_scalar("loop_active", "false");
        assert_eq!(doc.render(), "---\nloop_active: false\nx: 1\n---\n");
    }

    #[test]
    fn adversarial_values_are_kept_literally() {
        let doc = SessionDocument::parse("---\nfeature: $(touch pwned) `id` ; rm -rf ~\n---\n");
        assert_eq!(
            doc.get("feature").unwrap().as_scalar(),
            Some("$(touch pwned) `id` ; rm -rf ~")
        );
    }

    #[test]
    fn from_pairs_renders_parseable_document() {
        let doc = SessionDocument::from_pairs(
            [("phase", "CORE".to_string()), ("iteration", "1".to_string())],
            "\nbody\n",
        );
        let reparsed = SessionDocument::parse(&doc.render());
        assert_eq!(reparsed, doc);
    }
}
