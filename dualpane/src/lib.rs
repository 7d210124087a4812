//! Text primitives for incremental re-translation
//!
//! This crate holds the pure, synchronous half of the dual-pane editor:
//! splitting buffers into lines, aligning a new buffer against the last
//! committed one, positional diffs, and the casing/format preservation
//! applied to freshly translated lines. It performs no I/O; the
//! translation engines in `dualpane-mt` build on it.
//!
//! # Example
//!
//! ```ignore
//! use dualpane::{AlignmentMap, preserve_line, split_lines};
//!
//! let previous = split_lines("Hello\nWorld");
//! let map = AlignmentMap::from_lines(&previous);
//! assert_eq!(map.lookup("  World "), Some(1));
//!
//! assert_eq!(preserve_line("DEPLOY now", "deploy later"), "DEPLOY later");
//! ```

pub mod align;
pub mod casing;
pub mod diff;
pub mod format;
pub mod lines;

pub use align::AlignmentMap;
pub use casing::{CaseStyle, preserve_line, preserve_whole};
pub use diff::{DiffKind, LineDiff, changed_indices, diff_lines, diff_tokens, split_tokens};
pub use format::{LineFormat, Token};
pub use lines::{
    BulletLine, HORIZONTAL_RULE, code_fence_mask, is_code_fence, is_horizontal_rule, join_lines,
    normalize_line, split_bullet, split_lines,
};
