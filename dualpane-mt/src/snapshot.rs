//! The committed state a reconciliation diffs against
//!
//! A snapshot records the English text and both line sequences as they
//! were after the last successful reconciliation. It is replaced as a
//! whole on commit and never patched in place, so a failed or discarded
//! reconciliation leaves the previous one intact.

use dualpane::{join_lines, split_lines};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedSnapshot {
    pub last_english_text: String,
    pub last_english_lines: Vec<String>,
    pub last_japanese_lines: Vec<String>,
}

impl CommittedSnapshot {
    /// Snapshot after an English-driven reconciliation
    pub fn new(english_text: &str, japanese_lines: Vec<String>) -> Self {
        Self {
            last_english_text: english_text.to_string(),
            last_english_lines: split_lines(english_text),
            last_japanese_lines: japanese_lines,
        }
    }

    /// Snapshot after a Japanese-driven reconciliation
    ///
    /// English lines are kept for reuse only when they pair up one to one
    /// with the Japanese lines. Otherwise the English line list is left
    /// empty, so the next English edit retranslates every line rather than
    /// reusing a Japanese line that covers only part of its English.
    pub fn from_texts(english_text: &str, japanese_text: &str) -> Self {
        let mut snapshot = Self::new(english_text, split_lines(japanese_text));
        if !snapshot.is_aligned() {
            snapshot.last_english_lines.clear();
        }
        snapshot
    }

    /// True for the initial state and after either pane was cleared
    pub fn is_empty(&self) -> bool {
        self.last_english_text.is_empty()
            && self.last_english_lines.is_empty()
            && self.last_japanese_lines.is_empty()
    }

    /// The committed Japanese buffer
    pub fn japanese_text(&self) -> String {
        join_lines(&self.last_japanese_lines)
    }

    /// Whether every English line has a Japanese line at the same index
    pub fn is_aligned(&self) -> bool {
        self.last_english_lines.len() == self.last_japanese_lines.len()
    }
}
