//! Positional difference between two versions of a buffer
//!
//! The comparison is deliberately simple: entries are compared index by
//! index and the shorter side is padded with empty strings. That is enough
//! to tell which lines of a short, chat-sized text a user touched.

use once_cell::sync::Lazy;
use regex::Regex;

static TOKEN_SPLIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+|[。、！？\n]").expect("token split regex"));

/// How an entry differs between the previous and current sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffKind {
    /// Present only in the current sequence (previous side is empty)
    Added,
    /// Present only in the previous sequence (current side is empty)
    Removed,
    /// Present on both sides with different content
    Changed,
}

/// One differing position between two sequences
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDiff {
    pub index: usize,
    pub previous: String,
    pub current: String,
    pub kind: DiffKind,
}

/// Compare two sequences position by position
///
/// # Example
///
/// ```ignore
/// let diffs = diff_lines(&["a", "b"], &["a", "c", "d"]);
/// assert_eq!(diffs.len(), 2);
/// assert_eq!(diffs[0].kind, DiffKind::Changed);
/// assert_eq!(diffs[1].kind, DiffKind::Added);
/// ```
pub fn diff_lines<P: AsRef<str>, C: AsRef<str>>(previous: &[P], current: &[C]) -> Vec<LineDiff> {
    let max_len = previous.len().max(current.len());
    (0..max_len)
        .filter_map(|index| {
            let prev = previous.get(index).map_or("", |s| s.as_ref());
            let cur = current.get(index).map_or("", |s| s.as_ref());
            if prev == cur {
                return None;
            }
            let kind = if prev.is_empty() {
                DiffKind::Added
            } else if cur.is_empty() {
                DiffKind::Removed
            } else {
                DiffKind::Changed
            };
            Some(LineDiff {
                index,
                previous: prev.to_string(),
                current: cur.to_string(),
                kind,
            })
        })
        .collect()
}

/// Indices at which the two sequences differ
pub fn changed_indices<P: AsRef<str>, C: AsRef<str>>(previous: &[P], current: &[C]) -> Vec<usize> {
    diff_lines(previous, current)
        .into_iter()
        .map(|diff| diff.index)
        .collect()
}

/// Split text into tokens, keeping the whitespace and Japanese punctuation
/// delimiters as tokens of their own
pub fn split_tokens(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut last = 0;
    for m in TOKEN_SPLIT_RE.find_iter(text) {
        tokens.push(&text[last..m.start()]);
        tokens.push(m.as_str());
        last = m.end();
    }
    tokens.push(&text[last..]);
    tokens
}

/// Token-granularity positional diff of two texts
pub fn diff_tokens(previous: &str, current: &str) -> Vec<LineDiff> {
    diff_lines(&split_tokens(previous), &split_tokens(current))
}
