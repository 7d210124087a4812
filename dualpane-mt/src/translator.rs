//! Machine translation capability
//!
//! This module defines the `MachineTranslator` trait the engines translate
//! through, so providers (OpenAI, DeepL, mock) can be swapped without the
//! reconciliation logic knowing which one is in use. The provider is chosen
//! once, when the translator is constructed.
//!
//! # Example
//!
//! ```ignore
//! use dualpane_mt::{Language, MachineTranslator, MockMode, MockTranslator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = MockTranslator::new(MockMode::Suffix);
//!     let result = provider
//!         .translate("Hello", Language::English, Language::Japanese)
//!         .await?;
//!     println!("{}", result); // "Hello_ja"
//!     Ok(())
//! }
//! ```

use crate::error::MtResult;
use async_trait::async_trait;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};

/// One side of the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Japanese,
}

impl Language {
    /// ISO 639-1 code (`en`, `ja`)
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Japanese => "ja",
        }
    }

    /// Upper-case code used by DeepL (`EN`, `JA`)
    pub fn deepl_code(self) -> &'static str {
        match self {
            Language::English => "EN",
            Language::Japanese => "JA",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Language::English => Language::Japanese,
            Language::Japanese => Language::English,
        }
    }

    /// Parse a language tag such as `ja`, `JA` or `en-US`
    pub fn from_tag(tag: &str) -> Option<Self> {
        let base = tag.split(['-', '_']).next().unwrap_or(tag).to_lowercase();
        match base.as_str() {
            "en" | "english" => Some(Language::English),
            "ja" | "jp" | "japanese" => Some(Language::Japanese),
            _ => None,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Generic trait for machine translation providers
///
/// All methods are async: every call is a network round trip for real
/// providers and the only suspension point of a reconciliation.
#[async_trait]
pub trait MachineTranslator: Send + Sync {
    /// Translate a single text
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The translated text
    /// * `Err(MtError)` - If the key is missing or the provider fails
    async fn translate(&self, text: &str, source: Language, target: Language) -> MtResult<String>;

    /// Translate several independent texts
    ///
    /// The default implementation issues one `translate` call per text
    /// concurrently. Providers with a native batch endpoint override it.
    ///
    /// # Guarantees
    ///
    /// - Output order matches input order
    /// - Output length equals input length
    /// - The first failure fails the whole batch
    async fn translate_batch(
        &self,
        texts: &[String],
        source: Language,
        target: Language,
    ) -> MtResult<Vec<String>> {
        try_join_all(texts.iter().map(|text| self.translate(text, source, target))).await
    }

    /// Name used in logs to identify the provider
    fn provider_name(&self) -> &str;
}
