//! Japanese-driven reconciliation (JA → EN)
//!
//! Small hand edits to the Japanese pane are patched line by line into the
//! prior English, keeping its casing and list structure. Anything larger,
//! or a line layout that no longer lines up, is retranslated whole.

use crate::error::{MtError, MtResult};
use crate::snapshot::CommittedSnapshot;
use crate::translator::{Language, MachineTranslator};
use dualpane::{
    HORIZONTAL_RULE, changed_indices, code_fence_mask, diff_tokens, is_horizontal_rule,
    join_lines, preserve_line, preserve_whole, split_bullet, split_lines,
};
use futures::future::try_join_all;
use tracing::{debug, warn};

/// Everything the reverse engine reads
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReverseInput {
    pub new_japanese: String,
    pub prior_japanese: String,
    pub prior_english: String,
    pub prior_english_lines: Vec<String>,
}

impl ReverseInput {
    /// Input for a Japanese edit against the committed state
    pub fn from_snapshot(new_japanese: &str, snapshot: &CommittedSnapshot) -> Self {
        Self {
            new_japanese: new_japanese.to_string(),
            prior_japanese: snapshot.japanese_text(),
            prior_english: snapshot.last_english_text.clone(),
            prior_english_lines: snapshot.last_english_lines.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReverseMode {
    /// Japanese was blank: English is cleared
    Cleared,
    /// Japanese did not change: prior English returned as is
    Unchanged,
    /// This many lines were translated individually
    Patched(usize),
    /// The whole text was retranslated
    Full,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReverseOutcome {
    pub english: String,
    pub mode: ReverseMode,
}

/// Reconcile the English pane with an edited Japanese buffer
///
/// At most `patch_limit` changed lines are patched. A patch the provider
/// failed falls back to a full retranslation, whose failure is returned; a
/// local failure such as a missing key is returned as is.
pub async fn reconcile_japanese(
    input: &ReverseInput,
    translator: &dyn MachineTranslator,
    patch_limit: usize,
) -> MtResult<ReverseOutcome> {
    if input.new_japanese.trim().is_empty() {
        return Ok(ReverseOutcome {
            english: String::new(),
            mode: ReverseMode::Cleared,
        });
    }

    if input.new_japanese == input.prior_japanese && !input.prior_english.trim().is_empty() {
        return Ok(ReverseOutcome {
            english: input.prior_english.clone(),
            mode: ReverseMode::Unchanged,
        });
    }

    let prior_lines = split_lines(&input.prior_japanese);
    let new_lines = split_lines(&input.new_japanese);

    let eligible = !input.prior_japanese.trim().is_empty()
        && !input.prior_english.trim().is_empty()
        && prior_lines.len() == new_lines.len()
        && input.prior_english_lines.len() == prior_lines.len();

    if eligible {
        let changed = changed_indices(&prior_lines, &new_lines);
        debug!(
            changed = changed.len(),
            tokens = diff_tokens(&input.prior_japanese, &input.new_japanese).len(),
            "japanese edit measured"
        );
        if (1..=patch_limit).contains(&changed.len()) {
            match patch_lines(input, &new_lines, &changed, translator).await {
                Ok(english) => {
                    return Ok(ReverseOutcome {
                        english,
                        mode: ReverseMode::Patched(changed.len()),
                    });
                }
                Err(e) if e.is_provider_failure() => {
                    warn!("partial patch failed, retranslating whole text: {}", e);
                }
                Err(e) => return Err(e),
            }
        }
    }

    let candidate = translator
        .translate(&input.new_japanese, Language::Japanese, Language::English)
        .await?;
    Ok(ReverseOutcome {
        english: preserve_whole(&input.prior_english, &candidate),
        mode: ReverseMode::Full,
    })
}

/// Translate the changed lines concurrently and splice them into the prior English
async fn patch_lines(
    input: &ReverseInput,
    new_lines: &[String],
    changed: &[usize],
    translator: &dyn MachineTranslator,
) -> MtResult<String> {
    let japanese_code = code_fence_mask(new_lines);
    let english_code = code_fence_mask(&input.prior_english_lines);

    let patches = try_join_all(changed.iter().map(|&i| {
        let line = new_lines[i].as_str();
        let verbatim = japanese_code[i];
        async move {
            if verbatim {
                return Ok((i, line.to_string()));
            }
            if is_horizontal_rule(line) {
                return Ok((i, HORIZONTAL_RULE.to_string()));
            }
            let bullet = split_bullet(line);
            if bullet.body.trim().is_empty() {
                return Ok((i, bullet.marker.to_string()));
            }
            let body = translator
                .translate(bullet.body, Language::Japanese, Language::English)
                .await?;
            Ok::<_, MtError>((i, format!("{}{}", bullet.marker, body)))
        }
    }))
    .await?;

    let mut english = input.prior_english_lines.clone();
    for (i, candidate) in patches {
        english[i] = if english_code[i] || japanese_code[i] {
            candidate
        } else {
            preserve_line(&english[i], &candidate)
        };
    }
    Ok(join_lines(&english))
}
