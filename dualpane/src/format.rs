//! Structural description of a single line
//!
//! A line may open with a structural marker (a bullet, a numbered list
//! prefix or a markdown heading) followed by its body. The first word of
//! the body is the token whose casing is carried across translations.

use once_cell::sync::Lazy;
use regex::Regex;

static MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:[*\-•]|\d+[.)]|#+)(?:\s+|$)").expect("line marker regex")
});
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{N}_-]+").expect("token regex"));

/// A word inside a line, with byte offsets into that line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
}

/// Marker, body offset and first token of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineFormat<'a> {
    /// Indentation, marker symbol and the whitespace after it; empty when
    /// the line has no marker
    pub marker: &'a str,
    /// Byte offset where the body starts (the marker length)
    pub body_start: usize,
    /// First run of letters, digits, `_` or `-` in the body
    pub first_token: Option<Token<'a>>,
}

impl<'a> LineFormat<'a> {
    /// Describe a line
    ///
    /// # Example
    ///
    /// ```ignore
    /// let format = LineFormat::parse("2. Install deps");
    /// assert_eq!(format.marker, "2. ");
    /// assert_eq!(format.first_token.unwrap().text, "Install");
    /// ```
    pub fn parse(line: &'a str) -> Self {
        let marker = MARKER_RE.find(line).map_or("", |m| m.as_str());
        let body_start = marker.len();
        let first_token = TOKEN_RE.find(&line[body_start..]).map(|m| Token {
            text: m.as_str(),
            start: body_start + m.start(),
            end: body_start + m.end(),
        });
        LineFormat {
            marker,
            body_start,
            first_token,
        }
    }
}
