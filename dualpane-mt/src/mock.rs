//! Mock machine translator for tests and offline runs
//!
//! This module provides a deterministic, API-free translator. Besides the
//! translation modes it records every text it was asked to translate, so
//! tests can assert exactly which lines a reconciliation sent out.
//!
//! # Example
//!
//! ```ignore
//! use dualpane_mt::{Language, MachineTranslator, MockMode, MockTranslator};
//!
//! #[tokio::test]
//! async fn test_translation() {
//!     let mock = MockTranslator::new(MockMode::Suffix);
//!     let result = mock
//!         .translate("hello", Language::English, Language::Japanese)
//!         .await
//!         .unwrap();
//!     assert_eq!(result, "hello_ja");
//!     assert_eq!(mock.calls(), vec!["hello"]);
//! }
//! ```

use crate::error::{MtError, MtResult};
use crate::translator::{Language, MachineTranslator};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Mock translation modes for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append the target code: "hello" → "hello_ja"
    Suffix,

    /// Use predefined mappings, keyed by (text, target language).
    /// Unknown texts fall back to suffix mode.
    Mappings(HashMap<(String, Language), String>),

    /// Reverse the order of space-separated words
    Reorder,

    /// Fail every call with this message
    Error(String),

    /// Return input unchanged
    NoOp,
}

/// Mock translator that simulates various translation scenarios
#[derive(Debug)]
pub struct MockTranslator {
    mode: MockMode,
    /// Simulated network delay per request (in milliseconds)
    delay_ms: u64,
    /// Inputs that fail with `ProviderUnavailable` whatever the mode
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
    requests: Mutex<usize>,
}

impl MockTranslator {
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            delay_ms: 0,
            failing: HashSet::new(),
            calls: Mutex::new(Vec::new()),
            requests: Mutex::new(0),
        }
    }

    /// Create a MockTranslator with simulated network delay
    pub fn with_delay(mode: MockMode, delay_ms: u64) -> Self {
        Self {
            delay_ms,
            ..Self::new(mode)
        }
    }

    /// Convenience constructor for mapping mode
    pub fn with_mappings<I, S, T>(target: Language, pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        let map = pairs
            .into_iter()
            .map(|(from, to)| ((from.into(), target), to.into()))
            .collect();
        Self::new(MockMode::Mappings(map))
    }

    /// Offline demo translator with a handful of greetings in both directions
    pub fn demo() -> Self {
        const PHRASES: [(&str, &str); 5] = [
            ("Hello", "こんにちは"),
            ("Good morning", "おはようございます"),
            ("Thank you", "ありがとうございます"),
            ("How are you?", "元気ですか？"),
            ("I am fine", "元気です"),
        ];
        let mut map = HashMap::new();
        for (en, ja) in PHRASES {
            map.insert((en.to_string(), Language::Japanese), ja.to_string());
            map.insert((ja.to_string(), Language::English), en.to_string());
        }
        Self::new(MockMode::Mappings(map))
    }

    /// Make translating exactly this input fail
    pub fn fail_on(mut self, text: &str) -> Self {
        self.failing.insert(text.to_string());
        self
    }

    /// Every text translated so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of provider round trips (a batch counts once)
    pub fn request_count(&self) -> usize {
        *self.requests.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn reset_calls(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        *self.requests.lock().unwrap_or_else(PoisonError::into_inner) = 0;
    }

    async fn begin_request(&self) {
        *self.requests.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
    }

    /// Apply translation logic based on the mode
    fn apply_translation(&self, text: &str, target: Language) -> MtResult<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(text.to_string());

        if self.failing.contains(text) {
            return Err(MtError::ProviderUnavailable(format!(
                "mock failure for {:?}",
                text
            )));
        }

        match &self.mode {
            MockMode::Suffix => Ok(format!("{}_{}", text, target.code())),
            MockMode::Mappings(map) => Ok(map
                .get(&(text.to_string(), target))
                .cloned()
                .unwrap_or_else(|| format!("{}_{}", text, target.code()))),
            MockMode::Reorder => {
                let words: Vec<&str> = text.split_whitespace().rev().collect();
                Ok(words.join(" "))
            }
            MockMode::Error(msg) => Err(MtError::ProviderUnavailable(msg.clone())),
            MockMode::NoOp => Ok(text.to_string()),
        }
    }
}

#[async_trait]
impl MachineTranslator for MockTranslator {
    async fn translate(&self, text: &str, _source: Language, target: Language) -> MtResult<String> {
        self.begin_request().await;
        self.apply_translation(text, target)
    }

    async fn translate_batch(
        &self,
        texts: &[String],
        _source: Language,
        target: Language,
    ) -> MtResult<Vec<String>> {
        // Delay once per batch, like a single request
        self.begin_request().await;
        texts
            .iter()
            .map(|text| self.apply_translation(text, target))
            .collect()
    }

    fn provider_name(&self) -> &str {
        "Mock Translator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EN: Language = Language::English;
    const JA: Language = Language::Japanese;

    #[tokio::test]
    async fn test_suffix_single_translation() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let result = mock.translate("hello", EN, JA).await.unwrap();
        assert_eq!(result, "hello_ja");
        let back = mock.translate("こんにちは", JA, EN).await.unwrap();
        assert_eq!(back, "こんにちは_en");
    }

    #[tokio::test]
    async fn test_suffix_batch_translation() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let texts = vec!["hello".to_string(), "world".to_string()];
        let results = mock.translate_batch(&texts, EN, JA).await.unwrap();
        assert_eq!(results, vec!["hello_ja", "world_ja"]);
        assert_eq!(mock.request_count(), 1);
        assert_eq!(mock.calls(), vec!["hello", "world"]);
    }

    #[tokio::test]
    async fn test_mapping_with_fallback() {
        let mock = MockTranslator::with_mappings(JA, [("hello", "こんにちは")]);
        assert_eq!(mock.translate("hello", EN, JA).await.unwrap(), "こんにちは");
        assert_eq!(mock.translate("unknown", EN, JA).await.unwrap(), "unknown_ja");
    }

    #[tokio::test]
    async fn test_mapping_is_keyed_by_target() {
        let mock = MockTranslator::with_mappings(JA, [("hello", "こんにちは")]);
        assert_eq!(mock.translate("hello", JA, EN).await.unwrap(), "hello_en");
    }

    #[tokio::test]
    async fn test_demo_translates_both_directions() {
        let mock = MockTranslator::demo();
        assert_eq!(mock.translate("Thank you", EN, JA).await.unwrap(), "ありがとうございます");
        assert_eq!(mock.translate("元気です", JA, EN).await.unwrap(), "I am fine");
    }

    #[tokio::test]
    async fn test_reorder() {
        let mock = MockTranslator::new(MockMode::Reorder);
        let result = mock.translate("one two three", EN, JA).await.unwrap();
        assert_eq!(result, "three two one");
    }

    #[tokio::test]
    async fn test_error_mode() {
        let mock = MockTranslator::new(MockMode::Error("boom".to_string()));
        let result = mock.translate("hello", EN, JA).await;
        assert_eq!(result, Err(MtError::ProviderUnavailable("boom".to_string())));
    }

    #[tokio::test]
    async fn test_noop() {
        let mock = MockTranslator::new(MockMode::NoOp);
        assert_eq!(mock.translate("same", EN, JA).await.unwrap(), "same");
    }

    #[tokio::test]
    async fn test_fail_on_specific_input() {
        let mock = MockTranslator::new(MockMode::Suffix).fail_on("bad");
        assert!(mock.translate("good", EN, JA).await.is_ok());
        assert!(mock.translate("bad", EN, JA).await.is_err());

        let texts = vec!["good".to_string(), "bad".to_string()];
        assert!(mock.translate_batch(&texts, EN, JA).await.is_err());
    }

    #[tokio::test]
    async fn test_reset_calls() {
        let mock = MockTranslator::new(MockMode::Suffix);
        mock.translate("a", EN, JA).await.unwrap();
        mock.reset_calls();
        assert!(mock.calls().is_empty());
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_is_applied() {
        let mock = MockTranslator::with_delay(MockMode::Suffix, 50);
        let start = tokio::time::Instant::now();
        mock.translate("hello", EN, JA).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_provider_name() {
        let mock = MockTranslator::new(MockMode::Suffix);
        assert_eq!(mock.provider_name(), "Mock Translator");
    }
}
