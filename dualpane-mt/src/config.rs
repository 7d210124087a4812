//! Engine configuration
//!
//! Loaded from an optional TOML file; every field has a default so an
//! empty file (or no file at all) yields a working DeepL setup with the
//! 500 ms debounce and the three-line partial patch limit.
//!
//! ```toml
//! provider = "openai"
//! debounce_ms = 300
//!
//! [openai]
//! model = "gpt-4o-mini"
//! ```

use crate::credentials::{CredentialProvider, Service};
use crate::deepl::DeepLProvider;
use crate::error::{MtError, MtResult};
use crate::mock::MockTranslator;
use crate::openai::OpenAiProvider;
use crate::translator::MachineTranslator;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    Read {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    Parse {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl From<ConfigError> for MtError {
    fn from(err: ConfigError) -> Self {
        MtError::Config(err.to_string())
    }
}

/// Which translation provider backs the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProviderKind {
    #[serde(rename = "openai")]
    OpenAi,
    #[default]
    #[serde(rename = "deepl")]
    DeepL,
    /// Offline demo translator
    #[serde(rename = "mock")]
    Mock,
}

impl ProviderKind {
    /// Credential the provider needs, if any
    pub fn service(self) -> Option<Service> {
        match self {
            ProviderKind::OpenAi => Some(Service::OpenAi),
            ProviderKind::DeepL => Some(Service::DeepL),
            ProviderKind::Mock => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.3,
            max_tokens: 2000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeepLConfig {
    /// `https://api-free.deepl.com/v2` for free keys, `https://api.deepl.com/v2` for pro keys
    pub base_url: String,
}

impl Default for DeepLConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api-free.deepl.com/v2".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderKind,
    /// Quiet period after the last edit before a pane is reconciled
    pub debounce_ms: u64,
    /// Most changed Japanese lines patched one by one; more triggers a full retranslation
    pub patch_limit: usize,
    pub openai: OpenAiConfig,
    pub deepl: DeepLConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            debounce_ms: 500,
            patch_limit: 3,
            openai: OpenAiConfig::default(),
            deepl: DeepLConfig::default(),
        }
    }
}

impl Config {
    /// Load a config file; a missing file is not an error
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content =
            std::fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            config_path: config_path.to_path_buf(),
            source,
        })?;
        config.validate()?;

        Ok(Some(config))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.openai.base_url.trim().is_empty() || self.deepl.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "provider base_url cannot be empty".to_string(),
            ));
        }
        if self.openai.model.trim().is_empty() {
            return Err(ConfigError::Invalid("openai.model cannot be empty".to_string()));
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Construct the configured provider
    pub fn build_translator(
        &self,
        credentials: Arc<dyn CredentialProvider>,
    ) -> MtResult<Arc<dyn MachineTranslator>> {
        let translator: Arc<dyn MachineTranslator> = match self.provider {
            ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(credentials, self.openai.clone())?),
            ProviderKind::DeepL => Arc::new(DeepLProvider::new(credentials, self.deepl.clone())?),
            ProviderKind::Mock => Arc::new(MockTranslator::demo()),
        };
        Ok(translator)
    }
}
