//! Debounced two-pane editing session
//!
//! Each pane has its own trailing-edge debounce timer. A pane moves
//! `Idle → PendingEdit → Reconciling → Idle`; every edit bumps the pane's
//! generation, and a reconciliation whose generation is no longer current
//! when it finishes is discarded instead of committed.

use crate::config::Config;
use crate::forward::{ForwardMode, ForwardOutcome, reconcile_english};
use crate::reverse::{ReverseInput, ReverseMode, ReverseOutcome, reconcile_japanese};
use crate::snapshot::CommittedSnapshot;
use crate::translator::MachineTranslator;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    English,
    Japanese,
}

impl Pane {
    pub fn opposite(self) -> Self {
        match self {
            Pane::English => Pane::Japanese,
            Pane::Japanese => Pane::English,
        }
    }
}

impl fmt::Display for Pane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pane::English => write!(f, "english"),
            Pane::Japanese => write!(f, "japanese"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaneState {
    #[default]
    Idle,
    PendingEdit,
    Reconciling,
}

#[derive(Debug, Default)]
struct PaneTracker {
    state: PaneState,
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

impl PaneTracker {
    /// Register a new edit and return its generation
    ///
    /// A timer that has not fired yet is aborted. An in-flight
    /// reconciliation keeps running; its result will be stale.
    fn begin_edit(&mut self) -> u64 {
        if self.state == PaneState::PendingEdit {
            if let Some(timer) = self.timer.take() {
                timer.abort();
            }
        }
        self.generation += 1;
        self.state = PaneState::PendingEdit;
        self.generation
    }

    fn cancel(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.generation += 1;
        self.state = PaneState::Idle;
    }
}

#[derive(Debug, Default)]
struct SessionState {
    english: String,
    japanese: String,
    snapshot: CommittedSnapshot,
    last_error: Option<String>,
    english_pane: PaneTracker,
    japanese_pane: PaneTracker,
}

impl SessionState {
    fn buffer_mut(&mut self, pane: Pane) -> &mut String {
        match pane {
            Pane::English => &mut self.english,
            Pane::Japanese => &mut self.japanese,
        }
    }

    fn tracker_mut(&mut self, pane: Pane) -> &mut PaneTracker {
        match pane {
            Pane::English => &mut self.english_pane,
            Pane::Japanese => &mut self.japanese_pane,
        }
    }

    fn clear(&mut self, pane: Pane) {
        self.buffer_mut(pane.opposite()).clear();
        self.snapshot = CommittedSnapshot::default();
        self.last_error = None;
        self.english_pane.cancel();
        self.japanese_pane.cancel();
    }

    fn commit_forward(&mut self, outcome: ForwardOutcome) {
        self.last_error = None;
        if outcome.mode == ForwardMode::Unchanged {
            return;
        }
        info!(
            translated = outcome.translated_lines,
            "committed english → japanese"
        );
        self.japanese = outcome.japanese;
        self.snapshot = outcome.snapshot;
    }

    fn commit_reverse(&mut self, japanese: &str, outcome: ReverseOutcome) {
        self.last_error = None;
        match outcome.mode {
            ReverseMode::Unchanged => return,
            ReverseMode::Cleared => self.snapshot = CommittedSnapshot::default(),
            ReverseMode::Patched(_) | ReverseMode::Full => {
                self.snapshot = CommittedSnapshot::from_texts(&outcome.english, japanese);
            }
        }
        info!(mode = ?outcome.mode, "committed japanese → english");
        self.english = outcome.english;
    }
}

/// Work captured under the lock when a timer fires
enum Job {
    Forward {
        english: String,
        snapshot: CommittedSnapshot,
    },
    Reverse(ReverseInput),
}

/// Serializable view of both panes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub english: String,
    pub japanese: String,
    pub error: Option<String>,
    pub english_state: PaneState,
    pub japanese_state: PaneState,
}

struct Inner {
    state: Mutex<SessionState>,
    translator: Arc<dyn MachineTranslator>,
    debounce: Duration,
    patch_limit: usize,
}

/// Two panes, one committed snapshot, and a debounced reconciler per pane
///
/// Cloning is cheap and every clone drives the same session.
#[derive(Clone)]
pub struct EditorSession {
    inner: Arc<Inner>,
}

impl EditorSession {
    pub fn new(translator: Arc<dyn MachineTranslator>, config: &Config) -> Self {
        Self::with_settings(translator, config.debounce(), config.patch_limit)
    }

    pub fn with_settings(
        translator: Arc<dyn MachineTranslator>,
        debounce: Duration,
        patch_limit: usize,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(SessionState::default()),
                translator,
                debounce,
                patch_limit,
            }),
        }
    }

    pub fn translator(&self) -> &Arc<dyn MachineTranslator> {
        &self.inner.translator
    }

    /// Replace the English buffer and schedule reconciliation of the Japanese pane
    pub async fn edit_english(&self, text: &str) {
        self.edit(Pane::English, text).await;
    }

    /// Replace the Japanese buffer and schedule reconciliation of the English pane
    pub async fn edit_japanese(&self, text: &str) {
        self.edit(Pane::Japanese, text).await;
    }

    pub async fn view(&self) -> SessionView {
        let state = self.inner.state.lock().await;
        SessionView {
            english: state.english.clone(),
            japanese: state.japanese.clone(),
            error: state.last_error.clone(),
            english_state: state.english_pane.state,
            japanese_state: state.japanese_pane.state,
        }
    }

    pub async fn snapshot(&self) -> CommittedSnapshot {
        self.inner.state.lock().await.snapshot.clone()
    }

    async fn edit(&self, pane: Pane, text: &str) {
        let mut state = self.inner.state.lock().await;
        *state.buffer_mut(pane) = text.to_string();

        if text.trim().is_empty() {
            info!(%pane, "pane cleared, resetting session");
            state.clear(pane);
            return;
        }

        let generation = state.tracker_mut(pane).begin_edit();
        debug!(%pane, generation, "edit scheduled");
        let session = self.clone();
        let timer = tokio::spawn(async move {
            session.reconcile_after_debounce(pane, generation).await;
        });
        state.tracker_mut(pane).timer = Some(timer);
    }

    async fn reconcile_after_debounce(&self, pane: Pane, generation: u64) {
        tokio::time::sleep(self.inner.debounce).await;

        let job = {
            let mut state = self.inner.state.lock().await;
            let tracker = state.tracker_mut(pane);
            if tracker.generation != generation {
                return;
            }
            tracker.state = PaneState::Reconciling;
            tracker.timer = None;
            match pane {
                Pane::English => Job::Forward {
                    english: state.english.clone(),
                    snapshot: state.snapshot.clone(),
                },
                Pane::Japanese => {
                    Job::Reverse(ReverseInput::from_snapshot(&state.japanese, &state.snapshot))
                }
            }
        };

        let translator = self.inner.translator.as_ref();
        let result = match job {
            Job::Forward { english, snapshot } => {
                reconcile_english(&english, &snapshot, translator)
                    .await
                    .map(Commit::Forward)
            }
            Job::Reverse(input) => {
                let outcome = reconcile_japanese(&input, translator, self.inner.patch_limit).await;
                outcome.map(|outcome| Commit::Reverse {
                    japanese: input.new_japanese,
                    outcome,
                })
            }
        };

        let mut state = self.inner.state.lock().await;
        let tracker = state.tracker_mut(pane);
        if tracker.generation != generation {
            warn!(
                %pane,
                generation,
                current = tracker.generation,
                "discarding stale reconciliation"
            );
            return;
        }
        tracker.state = PaneState::Idle;

        match result {
            Ok(Commit::Forward(outcome)) => state.commit_forward(outcome),
            Ok(Commit::Reverse { japanese, outcome }) => state.commit_reverse(&japanese, outcome),
            Err(e) => {
                warn!(%pane, "reconciliation failed: {}", e);
                state.last_error = Some(e.to_string());
            }
        }
    }
}

enum Commit {
    Forward(ForwardOutcome),
    Reverse {
        japanese: String,
        outcome: ReverseOutcome,
    },
}
