//! Versioned document snapshots for the layout engine
//!
//! The host owns the editable text; the engine only ever sees an immutable
//! snapshot with a monotonic version and a content fingerprint. Replacing the
//! snapshot wholesale (instead of mutating in place) is what keeps every
//! derived structure a pure function of its inputs.

use std::hash::{Hash, Hasher};

/// Immutable snapshot of the logical document: an ordered, 0-indexed list of
/// lines without their terminating newlines.
#[derive(Debug, Clone)]
pub struct Document {
    lines: Vec<String>,
    version: u64,
    fingerprint: u64,
}

impl Document {
    /// Create an empty document (a single empty logical line).
    pub fn new() -> Self {
        Self::from_str("")
    }

    /// Snapshot a full text. Lines are delimited by stored `\n` bytes, so
    /// `"a\n"` yields two logical lines: `"a"` and `""`.
    pub fn from_str(text: &str) -> Self {
        let lines = split_lines(text);
        let fingerprint = fingerprint_lines(&lines);
        Self {
            lines,
            version: 0,
            fingerprint,
        }
    }

    /// Replace the entire content, bumping the version. The input handler
    /// calls this after applying an edit batch.
    pub fn replace(&mut self, text: &str) {
        self.lines = split_lines(text);
        self.fingerprint = fingerprint_lines(&self.lines);
        self.version = self.version.wrapping_add(1);
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Line text by 0-based index.
    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Length of a line in columns (chars). Out-of-range lines are length 0.
    pub fn line_len(&self, index: usize) -> usize {
        self.lines
            .get(index)
            .map(|l| l.chars().count())
            .unwrap_or(0)
    }

    /// A line is blank when it contains nothing but whitespace.
    pub fn is_blank(&self, index: usize) -> bool {
        self.lines
            .get(index)
            .map(|l| l.trim().is_empty())
            .unwrap_or(false)
    }

    /// Monotonic snapshot version.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Content identity, used as part of the layout cache key. Two snapshots
    /// with the same text share a fingerprint regardless of version.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Split on `\n`, keeping the trailing empty line a trailing newline implies.
fn split_lines(text: &str) -> Vec<String> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    for nl in memchr::memchr_iter(b'\n', bytes) {
        lines.push(text[start..nl].to_string());
        start = nl + 1;
    }
    lines.push(text[start..].to_string());
    lines
}

fn fingerprint_lines(lines: &[String]) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    lines.len().hash(&mut hasher);
    for line in lines {
        line.hash(&mut hasher);
    }
    hasher.finish()
}
