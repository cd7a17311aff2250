//! Markdown frontmatter in the "meta" convention.
//!
//! A document may start with a block of `key: value` lines:
//!
//! ```text
//! ---                      ← optional opening fence
//! Title: Hello
//! Authors: Ada
//!     Grace                ← 4+ spaces: another value for the previous key
//! ---                      ← optional closing fence (`...` also works)
//!
//! # Body starts here
//! ```
//!
//! Keys are `[A-Za-z0-9_-]+`, lowercased on read, and may be indented by up
//! to three spaces. The block ends at the first blank line, at a closing
//! fence, or at the first line that is neither a key line nor a
//! continuation; such a line is *not* consumed and starts the body.
//!
//! Every key maps to a non-empty ordered list of values. Macro substitution
//! only ever uses the first one ([`Frontmatter::first`]); the rest are kept
//! for callers that want them.

use crate::macros::{Resolution, Resolve};
use std::collections::BTreeMap;

/// Parsed frontmatter: key → one or more values in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    entries: BTreeMap<String, Vec<String>>,
}

impl Frontmatter {
    /// First value for `key`, the one used for `{{key}}` substitution.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values for `key`, in source order.
    pub fn values(&self, key: &str) -> &[String] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, key: &str, value: &str) {
        self.entries
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
    }
}

impl Resolve for Frontmatter {
    fn resolve(&self, name: &str) -> Resolution {
        match self.first(name) {
            Some(value) => Resolution::Value(value.to_string()),
            None => Resolution::Unknown,
        }
    }
}

/// Split a Markdown document into its frontmatter and the remaining body.
///
/// Documents without a frontmatter block return an empty [`Frontmatter`] and
/// the full text as body.
pub fn split(document: &str) -> (Frontmatter, &str) {
    let mut meta = Frontmatter::default();
    let mut current_key: Option<String> = None;
    let mut rest = document;
    let mut first_line = true;

    while !rest.is_empty() {
        let (line, next) = take_line(rest);
        let content = line.trim_end_matches(['\n', '\r']);

        if first_line && is_fence(content, '-') {
            first_line = false;
            rest = next;
            continue;
        }
        first_line = false;

        if content.trim().is_empty() || is_fence(content, '-') || is_fence(content, '.') {
            rest = next;
            break;
        }

        if let Some((key, value)) = key_line(content) {
            let key = key.to_ascii_lowercase();
            meta.push(&key, value);
            current_key = Some(key);
        } else if let (Some(value), Some(key)) = (continuation_line(content), &current_key) {
            meta.push(key, value);
        } else {
            break;
        }
        rest = next;
    }

    (meta, rest)
}

/// Split off the first line, newline included.
fn take_line(text: &str) -> (&str, &str) {
    match text.find('\n') {
        Some(idx) => text.split_at(idx + 1),
        None => (text, ""),
    }
}

/// `---` or `...` at the start of a line, optionally followed by whitespace
/// and anything else.
fn is_fence(line: &str, mark: char) -> bool {
    let Some(after) = line
        .strip_prefix(mark)
        .and_then(|l| l.strip_prefix(mark))
        .and_then(|l| l.strip_prefix(mark))
    else {
        return false;
    };
    after.is_empty() || after.starts_with(char::is_whitespace)
}

fn key_line(line: &str) -> Option<(&str, &str)> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    let line = &line[indent..];
    let colon = line.find(':')?;
    let key = &line[..colon];
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    valid.then(|| (key, line[colon + 1..].trim()))
}

fn continuation_line(line: &str) -> Option<&str> {
    line.starts_with("    ").then(|| line.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Block detection
    // =========================================================================

    #[test]
    fn parses_simple_block() {
        let (meta, body) = split("title: Hello\nauthor: Ada\n\n# Hi\n");
        assert_eq!(meta.first("title"), Some("Hello"));
        assert_eq!(meta.first("author"), Some("Ada"));
        assert_eq!(body, "# Hi\n");
    }

    #[test]
    fn document_without_frontmatter() {
        let (meta, body) = split("# Just a heading\n\nText.");
        assert!(meta.is_empty());
        assert_eq!(body, "# Just a heading\n\nText.");
    }

    #[test]
    fn empty_document() {
        let (meta, body) = split("");
        assert!(meta.is_empty());
        assert_eq!(body, "");
    }

    #[test]
    fn fenced_block() {
        let (meta, body) = split("---\ntitle: Fenced\n---\nBody text\n");
        assert_eq!(meta.first("title"), Some("Fenced"));
        assert_eq!(body, "Body text\n");
    }

    #[test]
    fn dot_fence_closes_block() {
        let (meta, body) = split("title: Dots\n...\nBody\n");
        assert_eq!(meta.first("title"), Some("Dots"));
        assert_eq!(body, "Body\n");
    }

    #[test]
    fn non_meta_line_ends_block_and_starts_body() {
        let (meta, body) = split("title: T\n# Heading\n");
        assert_eq!(meta.first("title"), Some("T"));
        assert_eq!(body, "# Heading\n");
    }

    #[test]
    fn crlf_line_endings() {
        let (meta, body) = split("title: Windows\r\n\r\nBody\r\n");
        assert_eq!(meta.first("title"), Some("Windows"));
        assert_eq!(body, "Body\r\n");
    }

    #[test]
    fn block_at_end_of_document() {
        let (meta, body) = split("title: Only");
        assert_eq!(meta.first("title"), Some("Only"));
        assert_eq!(body, "");
    }

    // =========================================================================
    // Keys and values
    // =========================================================================

    #[test]
    fn keys_are_lowercased() {
        let (meta, _) = split("Title: Hello\n\n");
        assert_eq!(meta.first("title"), Some("Hello"));
        assert_eq!(meta.first("Title"), None);
    }

    #[test]
    fn values_are_trimmed() {
        let (meta, _) = split("title:    spaced out   \n\n");
        assert_eq!(meta.first("title"), Some("spaced out"));
    }

    #[test]
    fn empty_value_is_kept() {
        let (meta, _) = split("draft:\n\n");
        assert!(meta.contains_key("draft"));
        assert_eq!(meta.first("draft"), Some(""));
    }

    #[test]
    fn value_may_contain_colons() {
        let (meta, _) = split("link: https://example.com\n\n");
        assert_eq!(meta.first("link"), Some("https://example.com"));
    }

    #[test]
    fn continuation_lines_add_values() {
        let (meta, body) = split("authors: Ada\n    Grace\n    Barbara\n\nBody");
        assert_eq!(meta.values("authors"), &["Ada", "Grace", "Barbara"]);
        assert_eq!(meta.first("authors"), Some("Ada"));
        assert_eq!(body, "Body");
    }

    #[test]
    fn repeated_key_appends() {
        let (meta, _) = split("tag: a\ntag: b\n\n");
        assert_eq!(meta.values("tag"), &["a", "b"]);
    }

    #[test]
    fn indented_first_line_is_body() {
        let (meta, body) = split("    code block\n");
        assert!(meta.is_empty());
        assert_eq!(body, "    code block\n");
    }

    #[test]
    fn invalid_key_characters_end_block() {
        let (meta, body) = split("not a key: value\n");
        assert!(meta.is_empty());
        assert_eq!(body, "not a key: value\n");
    }

    #[test]
    fn missing_key_has_no_values() {
        let (meta, _) = split("title: T\n\n");
        assert!(meta.values("author").is_empty());
        assert_eq!(meta.keys().collect::<Vec<_>>(), vec!["title"]);
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    #[test]
    fn resolves_first_value_only() {
        let (meta, _) = split("authors: Ada\n    Grace\n\n");
        assert_eq!(meta.resolve("authors"), Resolution::Value("Ada".into()));
    }

    #[test]
    fn unknown_key_is_unknown() {
        let (meta, _) = split("title: T\n\n");
        assert_eq!(meta.resolve("FOO"), Resolution::Unknown);
    }
}
