//! Two-pane English/Japanese translation engine
//!
//! This crate keeps an English pane and a Japanese pane consistent while
//! either one is being edited. Edits are debounced, unchanged lines keep
//! their existing translation, and small Japanese edits are patched into
//! the English without disturbing its casing or list structure.
//!
//! # Workflow Example
//!
//! ```ignore
//! use dualpane_mt::{
//!     CommittedSnapshot, MockMode, MockTranslator, ReverseInput, reconcile_english,
//!     reconcile_japanese,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let translator = MockTranslator::new(MockMode::Suffix);
//!
//!     // 1. English edit: every new line is translated
//!     let forward = reconcile_english("Hello\nWorld", &CommittedSnapshot::default(), &translator).await?;
//!     println!("{}", forward.japanese);
//!
//!     // 2. Hand edit of one Japanese line: only that line goes back to English
//!     let input = ReverseInput::from_snapshot("Hello_ja\n世界", &forward.snapshot);
//!     let reverse = reconcile_japanese(&input, &translator, 3).await?;
//!     println!("{}", reverse.english);
//!     Ok(())
//! }
//! ```
//!
//! [`EditorSession`] wraps both engines with per-pane debounce timers.

pub mod config;
pub mod credentials;
pub mod deepl;
pub mod error;
pub mod forward;
pub mod mock;
pub mod openai;
pub mod reverse;
pub mod session;
pub mod snapshot;
pub mod translator;

// Re-export main types for convenient access
pub use config::{Config, ConfigError, DeepLConfig, OpenAiConfig, ProviderKind};
pub use credentials::{CredentialProvider, Credentials, KeyStore, MemoryKeyStore, Service};
pub use deepl::DeepLProvider;
pub use error::{MtError, MtResult};
pub use forward::{ForwardMode, ForwardOutcome, reconcile_english};
pub use mock::{MockMode, MockTranslator};
pub use openai::OpenAiProvider;
pub use reverse::{ReverseInput, ReverseMode, ReverseOutcome, reconcile_japanese};
pub use session::{EditorSession, Pane, PaneState, SessionView};
pub use snapshot::CommittedSnapshot;
pub use translator::{Language, MachineTranslator};
