//! Line-level helpers shared by both reconciliation directions
//!
//! Every buffer the engine sees is treated as an ordered list of lines.
//! These helpers split and join buffers, produce the normalized keys used
//! for alignment, and recognize the few structural line shapes that are
//! carried across translation without being sent to a provider.

use once_cell::sync::Lazy;
use regex::Regex;

static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("ws regex"));
static RULE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*---\s*$").expect("rule regex"));
static BULLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*[*-](?:\s+|$))(.*)$").expect("bullet regex"));

/// Canonical text emitted for a horizontal rule line
pub const HORIZONTAL_RULE: &str = "---";

/// Split a buffer into lines on `\n`, dropping a `\r` that precedes it
///
/// An empty buffer is a single empty line, so that a pane always has at
/// least one line to align against.
///
/// # Example
///
/// ```ignore
/// assert_eq!(split_lines("a\r\nb"), vec!["a", "b"]);
/// assert_eq!(split_lines(""), vec![""]);
/// ```
pub fn split_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

/// Join lines back into a buffer with `\n`
pub fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
    lines
        .iter()
        .map(|line| line.as_ref())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapse every whitespace run to a single space and trim both ends
///
/// This is the key used to recognize a line that already existed in the
/// previous buffer, regardless of incidental spacing edits.
pub fn normalize_line(line: &str) -> String {
    WS_RE.replace_all(line, " ").trim().to_string()
}

/// Whether the line is a `---` horizontal rule (surrounding whitespace allowed)
pub fn is_horizontal_rule(line: &str) -> bool {
    RULE_RE.is_match(line)
}

/// Whether the trimmed line opens or closes a triple-backtick code fence
pub fn is_code_fence(line: &str) -> bool {
    line.trim().starts_with("```")
}

/// A line split into its bullet marker and the text after it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulletLine<'a> {
    /// Leading indentation, the `*` or `-`, and the whitespace after it.
    /// Empty when the line is not a bullet.
    pub marker: &'a str,
    /// Everything after the marker
    pub body: &'a str,
}

/// Split a `*` / `-` bullet marker off the front of a line
///
/// The marker must be followed by whitespace or end the line, so `- item`,
/// `  * item` and a bare `-` are bullets while `-5 degrees` is not.
pub fn split_bullet(line: &str) -> BulletLine<'_> {
    match BULLET_RE.captures(line) {
        Some(caps) => {
            let marker = caps.get(1).map_or("", |m| m.as_str());
            let body = caps.get(2).map_or("", |m| m.as_str());
            BulletLine { marker, body }
        }
        None => BulletLine {
            marker: "",
            body: line,
        },
    }
}

/// Mark every line that is a code fence or sits between two fences
///
/// The flag toggles on each fence line. An unterminated fence covers the
/// rest of the buffer.
pub fn code_fence_mask<S: AsRef<str>>(lines: &[S]) -> Vec<bool> {
    let mut inside = false;
    lines
        .iter()
        .map(|line| {
            if is_code_fence(line.as_ref()) {
                inside = !inside;
                true
            } else {
                inside
            }
        })
        .collect()
}
