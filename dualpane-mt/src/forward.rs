//! English-driven reconciliation (EN → JA)
//!
//! A new English buffer is aligned line by line against the committed one.
//! Lines that already existed keep their Japanese translation, structural
//! lines pass through, and only the remaining lines are sent to the
//! translator, in one batch.

use crate::error::{MtError, MtResult};
use crate::snapshot::CommittedSnapshot;
use crate::translator::{Language, MachineTranslator};
use dualpane::{
    AlignmentMap, HORIZONTAL_RULE, code_fence_mask, is_horizontal_rule, join_lines, split_bullet,
    split_lines,
};
use tracing::debug;

/// What a forward reconciliation did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardMode {
    /// English was blank: Japanese and the snapshot were reset
    Cleared,
    /// English equals the committed text: nothing to do
    Unchanged,
    /// A new Japanese buffer was produced
    Reconciled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardOutcome {
    pub japanese: String,
    pub snapshot: CommittedSnapshot,
    /// Lines sent to the translator
    pub translated_lines: usize,
    pub mode: ForwardMode,
}

/// Where each output line comes from
enum Slot {
    Ready(String),
    /// Marker to prepend to the `n`th batch translation
    Pending(String, usize),
}

/// Reconcile the Japanese pane with an edited English buffer
///
/// On error nothing is committed; the caller keeps its snapshot.
///
/// # Example
///
/// ```ignore
/// let snapshot = CommittedSnapshot::new("A\nB", vec!["a".into(), "b".into()]);
/// let outcome = reconcile_english("A\nB\nC", &snapshot, &translator).await?;
/// // only "C" was translated
/// assert_eq!(outcome.translated_lines, 1);
/// ```
pub async fn reconcile_english(
    current: &str,
    snapshot: &CommittedSnapshot,
    translator: &dyn MachineTranslator,
) -> MtResult<ForwardOutcome> {
    if current.trim().is_empty() {
        return Ok(ForwardOutcome {
            japanese: String::new(),
            snapshot: CommittedSnapshot::default(),
            translated_lines: 0,
            mode: ForwardMode::Cleared,
        });
    }

    if current == snapshot.last_english_text {
        return Ok(ForwardOutcome {
            japanese: snapshot.japanese_text(),
            snapshot: snapshot.clone(),
            translated_lines: 0,
            mode: ForwardMode::Unchanged,
        });
    }

    let lines = split_lines(current);
    let in_code = code_fence_mask(&lines);
    let alignment = AlignmentMap::from_lines(&snapshot.last_english_lines);
    if alignment.is_empty() {
        debug!("no committed english lines to reuse");
    } else {
        debug!(reusable = alignment.len(), "aligning against committed english");
    }

    let mut slots = Vec::with_capacity(lines.len());
    let mut pending: Vec<String> = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if in_code[i] {
            slots.push(Slot::Ready(line.clone()));
            continue;
        }
        if is_horizontal_rule(line) {
            slots.push(Slot::Ready(HORIZONTAL_RULE.to_string()));
            continue;
        }

        let bullet = split_bullet(line);
        let reused = alignment
            .lookup(line)
            .and_then(|prev| snapshot.last_japanese_lines.get(prev));
        if let Some(japanese) = reused {
            debug!(line = i, "reusing committed translation");
            slots.push(Slot::Ready(japanese.clone()));
        } else if bullet.body.trim().is_empty() {
            slots.push(Slot::Ready(bullet.marker.to_string()));
        } else {
            slots.push(Slot::Pending(bullet.marker.to_string(), pending.len()));
            pending.push(bullet.body.to_string());
        }
    }

    let translations = if pending.is_empty() {
        Vec::new()
    } else {
        translator
            .translate_batch(&pending, Language::English, Language::Japanese)
            .await?
    };
    if translations.len() != pending.len() {
        return Err(MtError::ProviderUnavailable(format!(
            "{} returned {} translations for {} lines",
            translator.provider_name(),
            translations.len(),
            pending.len()
        )));
    }

    let japanese_lines: Vec<String> = slots
        .into_iter()
        .map(|slot| match slot {
            Slot::Ready(line) => line,
            Slot::Pending(marker, n) => format!("{}{}", marker, translations[n]),
        })
        .collect();

    debug!(
        lines = lines.len(),
        translated = pending.len(),
        "forward reconciliation complete"
    );

    Ok(ForwardOutcome {
        japanese: join_lines(&japanese_lines),
        snapshot: CommittedSnapshot {
            last_english_text: current.to_string(),
            last_english_lines: lines,
            last_japanese_lines: japanese_lines,
        },
        translated_lines: pending.len(),
        mode: ForwardMode::Reconciled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeepLConfig;
    use crate::credentials::{Credentials, Service};
    use crate::deepl::DeepLProvider;
    use crate::mock::{MockMode, MockTranslator};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn committed(english: &str, japanese: &str) -> CommittedSnapshot {
        CommittedSnapshot::from_texts(english, japanese)
    }

    #[tokio::test]
    async fn test_first_reconciliation_translates_every_line() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let outcome = reconcile_english("Hello\nWorld", &CommittedSnapshot::default(), &mock)
            .await
            .unwrap();
        assert_eq!(outcome.japanese, "Hello_ja\nWorld_ja");
        assert_eq!(outcome.mode, ForwardMode::Reconciled);
        assert_eq!(outcome.translated_lines, 2);
        assert_eq!(outcome.snapshot.last_english_text, "Hello\nWorld");
        assert_eq!(outcome.snapshot.last_japanese_lines, vec!["Hello_ja", "World_ja"]);
    }

    #[tokio::test]
    async fn test_identical_input_is_a_noop() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let snapshot = committed("A\nB", "a\nb");
        let outcome = reconcile_english("A\nB", &snapshot, &mock).await.unwrap();
        assert_eq!(outcome.mode, ForwardMode::Unchanged);
        assert_eq!(outcome.japanese, "a\nb");
        assert_eq!(outcome.snapshot, snapshot);
        assert!(mock.calls().is_empty());
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_appended_line_reuses_existing_translations() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let snapshot = committed("A\nB", "a\nb");
        let outcome = reconcile_english("A\nB\nC", &snapshot, &mock).await.unwrap();
        assert_eq!(outcome.japanese, "a\nb\nC_ja");
        assert_eq!(mock.calls(), vec!["C"]);
        assert_eq!(outcome.translated_lines, 1);
    }

    #[tokio::test]
    async fn test_reordered_and_respaced_lines_are_reused() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let snapshot = committed("First line\nSecond line", "一行目\n二行目");
        let outcome = reconcile_english("Second   line\nNew\nFirst line ", &snapshot, &mock)
            .await
            .unwrap();
        assert_eq!(outcome.japanese, "二行目\nNew_ja\n一行目");
        assert_eq!(mock.calls(), vec!["New"]);
    }

    #[tokio::test]
    async fn test_marker_only_bullet_needs_no_translation() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let outcome = reconcile_english("- ", &CommittedSnapshot::default(), &mock)
            .await
            .unwrap();
        assert_eq!(outcome.japanese, "- ");
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_bullet_body_translated_and_marker_kept() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let outcome = reconcile_english("Todo\n- buy milk\n  * call mom", &CommittedSnapshot::default(), &mock)
            .await
            .unwrap();
        assert_eq!(outcome.japanese, "Todo_ja\n- buy milk_ja\n  * call mom_ja");
        assert_eq!(mock.calls(), vec!["Todo", "buy milk", "call mom"]);
    }

    #[tokio::test]
    async fn test_horizontal_rule_and_blank_lines_pass_through() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let outcome = reconcile_english("Intro\n\n  ---  \nOutro", &CommittedSnapshot::default(), &mock)
            .await
            .unwrap();
        assert_eq!(outcome.japanese, "Intro_ja\n\n---\nOutro_ja");
        assert_eq!(mock.calls(), vec!["Intro", "Outro"]);
    }

    #[tokio::test]
    async fn test_code_fence_passes_through() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let english = "Run this:\n```\ncargo run\n```";
        let outcome = reconcile_english(english, &CommittedSnapshot::default(), &mock)
            .await
            .unwrap();
        assert_eq!(outcome.japanese, "Run this:_ja\n```\ncargo run\n```");
        assert_eq!(mock.calls(), vec!["Run this:"]);
    }

    #[tokio::test]
    async fn test_blank_input_clears_without_calls() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let outcome = reconcile_english("  \n ", &committed("A", "a"), &mock)
            .await
            .unwrap();
        assert_eq!(outcome.mode, ForwardMode::Cleared);
        assert_eq!(outcome.japanese, "");
        assert!(outcome.snapshot.is_empty());
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_reuse_requires_japanese_line_at_index() {
        let mock = MockTranslator::new(MockMode::Suffix);
        // "B" has no Japanese line at index 1
        let snapshot = CommittedSnapshot::new("A\nB", vec!["a".to_string()]);
        let outcome = reconcile_english("A\nB\nC", &snapshot, &mock).await.unwrap();
        assert_eq!(outcome.japanese, "a\nB_ja\nC_ja");
        assert_eq!(mock.calls(), vec!["B", "C"]);
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let mock = MockTranslator::new(MockMode::Error("rate limited".to_string()));
        let result = reconcile_english("Hello", &CommittedSnapshot::default(), &mock).await;
        assert!(matches!(result, Err(MtError::ProviderUnavailable(_))));
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_translating() {
        let provider = DeepLProvider::new(
            Arc::new(Credentials::new().without_env()),
            DeepLConfig::default(),
        )
        .unwrap();
        let snapshot = committed("A\nB", "a\nb");
        let result = reconcile_english("A\nB\nC", &snapshot, &provider).await;
        assert_eq!(result, Err(MtError::MissingApiKey(Service::DeepL)));
    }

    #[tokio::test]
    async fn test_lines_after_whole_text_retranslation_are_not_reused() {
        let mock = MockTranslator::new(MockMode::Suffix);
        // One English line covering two Japanese lines
        let snapshot = committed("First. Second.", "一文目。\n二文目。");
        let outcome = reconcile_english("First. Second.\nThird.", &snapshot, &mock)
            .await
            .unwrap();
        assert_eq!(outcome.japanese, "First. Second._ja\nThird._ja");
        assert_eq!(mock.calls(), vec!["First. Second.", "Third."]);
    }
}
