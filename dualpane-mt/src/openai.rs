//! OpenAI chat-completion provider
//!
//! Translation is requested as a single-turn chat completion with a system
//! prompt fixing the direction. The API key is resolved through the
//! injected credential provider on every call (service `openai`, env var
//! `OPENAI_API_KEY`).
//!
//! # Example
//!
//! ```ignore
//! use dualpane_mt::{Credentials, Language, MachineTranslator, OpenAiConfig, OpenAiProvider};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = OpenAiProvider::new(Arc::new(Credentials::new()), OpenAiConfig::default())?;
//!     let result = provider
//!         .translate("Hello, world!", Language::English, Language::Japanese)
//!         .await?;
//!     println!("{}", result);
//!     Ok(())
//! }
//! ```

use crate::config::OpenAiConfig;
use crate::credentials::{CredentialProvider, Service};
use crate::error::{MtError, MtResult};
use crate::translator::{Language, MachineTranslator};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

const EN_TO_JA_PROMPT: &str = "You are a professional translator. Translate the given English text to natural Japanese. Only return the translation, no explanations.";
const JA_TO_EN_PROMPT: &str = "You are a professional translator. Translate the given Japanese text to natural English. Only return the translation, no explanations.";

/// OpenAI chat completions provider
#[derive(Clone)]
pub struct OpenAiProvider {
    credentials: Arc<dyn CredentialProvider>,
    /// HTTP client for async requests
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiProvider {
    pub fn new(credentials: Arc<dyn CredentialProvider>, config: OpenAiConfig) -> MtResult<Self> {
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

    fn system_prompt(target: Language) -> &'static str {
        match target {
            Language::Japanese => EN_TO_JA_PROMPT,
            Language::English => JA_TO_EN_PROMPT,
        }
    }

    fn request_body(&self, text: &str, target: Language) -> Value {
        json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": Self::system_prompt(target) },
                { "role": "user", "content": text }
            ],
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens
        })
    }

    /// Map a non-2xx status to the error taxonomy
    fn status_error(status: StatusCode, body: &str) -> MtError {
        match status.as_u16() {
            401 | 403 => {
                MtError::InvalidCredential(format!("OpenAI rejected the API key ({})", status))
            }
            429 => MtError::RateLimited(format!("OpenAI rate limit reached ({})", status)),
            _ => MtError::ProviderUnavailable(format!("OpenAI API error ({}): {}", status, body)),
        }
    }

    /// Extract `choices[0].message.content` from a response
    fn parse_response(json: &Value) -> MtResult<String> {
        json["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.trim().to_string())
            .ok_or_else(|| {
                MtError::ProviderUnavailable(
                    "Invalid API response: missing 'choices[0].message.content'".to_string(),
                )
            })
    }
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for OpenAiProvider {
    async fn translate(&self, text: &str, source: Language, target: Language) -> MtResult<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let api_key = self
            .credentials
            .api_key(Service::OpenAi)
            .ok_or(MtError::MissingApiKey(Service::OpenAi))?;

        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        debug!(%source, %target, chars = text.len(), "openai request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&self.request_body(text, target))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Self::status_error(status, &error_text));
        }

        let json: Value = response.json().await.map_err(|e| {
            MtError::ProviderUnavailable(format!("Failed to parse API response: {}", e))
        })?;

        Self::parse_response(&json)
    }

    fn provider_name(&self) -> &str {
        "OpenAI"
    }
}
