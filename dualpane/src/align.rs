//! Alignment of a new buffer against the previously committed one
//!
//! Lines are matched by content rather than by position, so a line keeps
//! its translation when other lines are inserted above it or when lines
//! are reordered.

use crate::lines::normalize_line;
use std::collections::HashMap;

/// Maps a normalized line to its index in the previous buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignmentMap(HashMap<String, usize>);

impl AlignmentMap {
    /// Build the map from the previous buffer's lines
    ///
    /// When the same normalized line occurs more than once, the last
    /// occurrence wins.
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let map = lines
            .iter()
            .enumerate()
            .map(|(index, line)| (normalize_line(line.as_ref()), index))
            .collect();
        AlignmentMap(map)
    }

    /// Find the previous index of a line, normalizing the query first
    pub fn lookup(&self, line: &str) -> Option<usize> {
        self.0.get(&normalize_line(line)).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
