//! DeepL provider
//!
//! Sends form-encoded requests to the DeepL `/translate` endpoint. Several
//! texts can travel in one request as repeated `text` fields, so batch
//! translation is a single round trip per chunk.

use crate::config::DeepLConfig;
use crate::credentials::{CredentialProvider, Service};
use crate::error::{MtError, MtResult};
use crate::translator::{Language, MachineTranslator};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct DeepLResponse {
    translations: Vec<DeepLTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeepLTranslation {
    text: String,
}

/// DeepL API v2 provider
#[derive(Clone)]
pub struct DeepLProvider {
    credentials: Arc<dyn CredentialProvider>,
    client: reqwest::Client,
    config: DeepLConfig,
}

impl DeepLProvider {
    /// DeepL accepts at most 50 texts per request
    const MAX_TEXTS_PER_REQUEST: usize = 50;

    pub fn new(credentials: Arc<dyn CredentialProvider>, config: DeepLConfig) -> MtResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| MtError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            credentials,
            client,
            config,
        })
    }

    fn form_fields<'a>(
        texts: &'a [String],
        source: Language,
        target: Language,
    ) -> Vec<(&'static str, &'a str)> {
        let mut fields: Vec<(&'static str, &'a str)> =
            texts.iter().map(|text| ("text", text.as_str())).collect();
        fields.push(("target_lang", target.deepl_code()));
        fields.push(("source_lang", source.deepl_code()));
        fields
    }

    /// Map a non-2xx status to the error taxonomy
    fn status_error(status: StatusCode, body: &str) -> MtError {
        match status.as_u16() {
            403 => MtError::InvalidCredential("DeepL API key is invalid".to_string()),
            456 => MtError::RateLimited("DeepL usage quota has been reached".to_string()),
            429 => MtError::RateLimited(
                "Too many requests to DeepL, wait a moment and retry".to_string(),
            ),
            _ => MtError::ProviderUnavailable(format!("DeepL API error ({}): {}", status, body)),
        }
    }

    fn parse_response(body: &str, expected: usize) -> MtResult<Vec<String>> {
        let parsed: DeepLResponse = serde_json::from_str(body).map_err(|e| {
            MtError::ProviderUnavailable(format!("Failed to parse API response: {}", e))
        })?;
        if parsed.translations.len() != expected {
            return Err(MtError::ProviderUnavailable(format!(
                "DeepL returned {} translations for {} texts",
                parsed.translations.len(),
                expected
            )));
        }
        Ok(parsed.translations.into_iter().map(|t| t.text).collect())
    }

    async fn translate_chunk(
        &self,
        api_key: &str,
        texts: &[String],
        source: Language,
        target: Language,
    ) -> MtResult<Vec<String>> {
        let url = format!("{}/translate", self.config.base_url.trim_end_matches('/'));
        debug!(%source, %target, texts = texts.len(), "deepl request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("DeepL-Auth-Key {}", api_key))
            .form(&Self::form_fields(texts, source, target))
            .send()
            .await?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        if !status.is_success() {
            return Err(Self::status_error(status, &body));
        }

        Self::parse_response(&body, texts.len())
    }
}

impl std::fmt::Debug for DeepLProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepLProvider")
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for DeepLProvider {
    async fn translate(&self, text: &str, source: Language, target: Language) -> MtResult<String> {
        let results = self
            .translate_batch(&[text.to_string()], source, target)
            .await?;
        Ok(results.into_iter().next().unwrap_or_default())
    }

    async fn translate_batch(
        &self,
        texts: &[String],
        source: Language,
        target: Language,
    ) -> MtResult<Vec<String>> {
        if texts.iter().all(|text| text.trim().is_empty()) {
            return Ok(vec![String::new(); texts.len()]);
        }

        let api_key = self
            .credentials
            .api_key(Service::DeepL)
            .ok_or(MtError::MissingApiKey(Service::DeepL))?;

        let mut all_results = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(Self::MAX_TEXTS_PER_REQUEST) {
            let chunk_results = self.translate_chunk(&api_key, chunk, source, target).await?;
            all_results.extend(chunk_results);
        }
        Ok(all_results)
    }

    fn provider_name(&self) -> &str {
        "DeepL"
    }
}
