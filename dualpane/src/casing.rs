//! Casing and format preservation across re-translation
//!
//! Translating a line on its own can flip the capitalization of its first
//! word or swap its list marker relative to the untouched lines around it.
//! Given the line that used to sit at a position and its fresh translation,
//! these functions stamp the old case style and marker onto the new line
//! when both lines start with the same word.

use crate::format::LineFormat;
use crate::lines::{code_fence_mask, join_lines, split_lines};

/// Case pattern of a single token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseStyle {
    /// Every cased letter is uppercase (`DEPLOY`)
    Upper,
    /// Every cased letter is lowercase (`deploy`)
    Lower,
    /// Leading uppercase letter, the rest lowercase (`Deploy`)
    Capitalized,
    /// Mixed case, or no cased letters at all; nothing is imposed
    AsIs,
}

impl CaseStyle {
    /// Classify a token. `Upper` wins over `Capitalized` for one-letter tokens.
    pub fn of(token: &str) -> Self {
        let mut cased = token
            .chars()
            .filter(|c| c.is_uppercase() || c.is_lowercase())
            .peekable();
        if cased.peek().is_none() {
            return CaseStyle::AsIs;
        }
        let cased: Vec<char> = cased.collect();
        if cased.iter().all(|c| c.is_uppercase()) {
            CaseStyle::Upper
        } else if cased.iter().all(|c| c.is_lowercase()) {
            CaseStyle::Lower
        } else if token.chars().next().is_some_and(char::is_uppercase)
            && cased[1..].iter().all(|c| c.is_lowercase())
        {
            CaseStyle::Capitalized
        } else {
            CaseStyle::AsIs
        }
    }

    /// Rewrite a token in this style
    pub fn apply(self, token: &str) -> String {
        match self {
            CaseStyle::Upper => token.to_uppercase(),
            CaseStyle::Lower => token.to_lowercase(),
            CaseStyle::Capitalized => {
                let mut chars = token.chars();
                match chars.next() {
                    Some(first) => {
                        let rest = chars.as_str().to_lowercase();
                        first.to_uppercase().chain(rest.chars()).collect()
                    }
                    None => String::new(),
                }
            }
            CaseStyle::AsIs => token.to_string(),
        }
    }
}

fn starts_with_backtick(line: &str) -> bool {
    line.trim_start().starts_with('`')
}

/// Re-apply the previous line's case style and marker to a candidate line
///
/// The candidate is returned untouched unless both lines have a first
/// token and those tokens are the same word ignoring case. Lines starting
/// with a backtick are code and are never adjusted.
///
/// # Example
///
/// ```ignore
/// assert_eq!(preserve_line("DEPLOY now", "deploy later"), "DEPLOY later");
/// assert_eq!(preserve_line("- Deploy now", "* deploy later"), "- Deploy later");
/// ```
pub fn preserve_line(previous: &str, candidate: &str) -> String {
    if starts_with_backtick(previous) || starts_with_backtick(candidate) {
        return candidate.to_string();
    }

    let prev = LineFormat::parse(previous);
    let cand = LineFormat::parse(candidate);
    let (Some(prev_token), Some(cand_token)) = (prev.first_token, cand.first_token) else {
        return candidate.to_string();
    };
    if prev_token.text.to_lowercase() != cand_token.text.to_lowercase() {
        return candidate.to_string();
    }

    let restyled = CaseStyle::of(prev_token.text).apply(cand_token.text);
    let marker = if prev.marker != cand.marker {
        prev.marker
    } else {
        cand.marker
    };

    let mut out = String::with_capacity(candidate.len() + marker.len());
    out.push_str(marker);
    out.push_str(&candidate[cand.body_start..cand_token.start]);
    out.push_str(&restyled);
    out.push_str(&candidate[cand_token.end..]);
    out
}

/// Apply [`preserve_line`] position by position across two whole texts
///
/// Candidate lines that are fences or sit inside a fenced code block are
/// passed through byte-identical. Candidate lines with no previous
/// counterpart are compared against an empty line, which leaves them as is.
pub fn preserve_whole(previous_text: &str, candidate_text: &str) -> String {
    let previous = split_lines(previous_text);
    let candidate = split_lines(candidate_text);
    let in_code = code_fence_mask(&candidate);

    let adjusted: Vec<String> = candidate
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if in_code[i] {
                line.clone()
            } else {
                let prev = previous.get(i).map_or("", String::as_str);
                preserve_line(prev, line)
            }
        })
        .collect();

    join_lines(&adjusted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_case_style_of() {
        assert_eq!(CaseStyle::of("DEPLOY"), CaseStyle::Upper);
        assert_eq!(CaseStyle::of("deploy"), CaseStyle::Lower);
        assert_eq!(CaseStyle::of("Deploy"), CaseStyle::Capitalized);
        assert_eq!(CaseStyle::of("iPhone"), CaseStyle::AsIs);
        assert_eq!(CaseStyle::of("API2"), CaseStyle::Upper);
        assert_eq!(CaseStyle::of("I"), CaseStyle::Upper);
        assert_eq!(CaseStyle::of("42"), CaseStyle::AsIs);
        assert_eq!(CaseStyle::of("日本"), CaseStyle::AsIs);
    }

    #[test]
    fn test_case_style_apply() {
        assert_eq!(CaseStyle::Upper.apply("deploy"), "DEPLOY");
        assert_eq!(CaseStyle::Lower.apply("DePloy"), "deploy");
        assert_eq!(CaseStyle::Capitalized.apply("dEPLOY"), "Deploy");
        assert_eq!(CaseStyle::AsIs.apply("dEPLOY"), "dEPLOY");
        assert_eq!(CaseStyle::Capitalized.apply(""), "");
    }

    #[test]
    fn test_uppercase_style_reapplied() {
        assert_eq!(preserve_line("DEPLOY now", "deploy later"), "DEPLOY later");
    }

    #[test]
    fn test_capitalized_and_lower_styles() {
        assert_eq!(
            preserve_line("Restart the server", "restart the box"),
            "Restart the box"
        );
        assert_eq!(
            preserve_line("ssh into the host", "SSH into the machine"),
            "ssh into the machine"
        );
    }

    #[test]
    fn test_different_first_word_is_untouched() {
        assert_eq!(
            preserve_line("Deploy the service", "restart the server"),
            "restart the server"
        );
    }

    #[test]
    fn test_marker_carried_over() {
        assert_eq!(
            preserve_line("- Deploy now", "* deploy later"),
            "- Deploy later"
        );
        assert_eq!(preserve_line("1. Fix bug", "1) fix bugs"), "1. Fix bugs");
        assert_eq!(preserve_line("## Setup", "# setup steps"), "## Setup steps");
    }

    #[test]
    fn test_marker_dropped_when_previous_had_none() {
        assert_eq!(preserve_line("Deploy now", "- deploy later"), "Deploy later");
    }

    #[test]
    fn test_marker_without_match_is_not_touched() {
        assert_eq!(preserve_line("- Deploy now", "Restart later"), "Restart later");
    }

    #[test]
    fn test_no_token_returns_candidate() {
        assert_eq!(preserve_line("- ", "- hello"), "- hello");
        assert_eq!(preserve_line("Hello", "!!!"), "!!!");
    }

    #[test]
    fn test_backtick_lines_untouched() {
        assert_eq!(preserve_line("`Deploy`", "`deploy` now"), "`deploy` now");
        assert_eq!(preserve_line("DEPLOY", "`deploy`"), "`deploy`");
    }

    #[test]
    fn test_preserve_whole_positional() {
        let previous = "DEPLOY now\n- Check logs\nThen rest";
        let candidate = "deploy later\n* check metrics\nfinally sleep";
        assert_eq!(
            preserve_whole(previous, candidate),
            "DEPLOY later\n- Check metrics\nfinally sleep"
        );
    }

    #[test]
    fn test_preserve_whole_skips_code_fences() {
        let previous = "Intro\n```\nLET x = 1\n```\nOutro";
        let candidate = "intro\n```\nlet x = 1\n```\noutro";
        assert_eq!(
            preserve_whole(previous, candidate),
            "Intro\n```\nlet x = 1\n```\nOutro"
        );
    }

    #[test]
    fn test_preserve_whole_extra_candidate_lines() {
        assert_eq!(preserve_whole("Hello", "hello\nnew line"), "Hello\nnew line");
    }
}
