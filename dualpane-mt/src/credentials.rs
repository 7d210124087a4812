//! API key resolution for translation providers
//!
//! Keys are resolved per call through an injected [`CredentialProvider`],
//! so a key entered after start-up is picked up by the next reconciliation.
//! [`Credentials`] resolves with the precedence
//! explicit argument > key store > environment variable.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// A translation service that needs an API key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Service {
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "deepl")]
    DeepL,
}

impl Service {
    /// Environment variable consulted when no other source has a key
    pub fn env_var(self) -> &'static str {
        match self {
            Service::OpenAi => "OPENAI_API_KEY",
            Service::DeepL => "DEEPL_API_KEY",
        }
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Service::OpenAi => write!(f, "OpenAI"),
            Service::DeepL => write!(f, "DeepL"),
        }
    }
}

/// Persisted key storage, owned by the host application
pub trait KeyStore: Send + Sync {
    fn get(&self, service: Service) -> Option<String>;
}

/// Something that can hand out an API key for a service
pub trait CredentialProvider: Send + Sync {
    fn api_key(&self, service: Service) -> Option<String>;
}

/// In-memory [`KeyStore`], filled through the web server's key route
#[derive(Debug, Default)]
pub struct MemoryKeyStore {
    keys: RwLock<HashMap<Service, String>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a key, trimmed. A blank key removes the entry.
    pub fn set(&self, service: Service, key: &str) {
        let mut keys = self.keys.write().unwrap_or_else(PoisonError::into_inner);
        let key = key.trim();
        if key.is_empty() {
            keys.remove(&service);
        } else {
            keys.insert(service, key.to_string());
        }
    }

    pub fn remove(&self, service: Service) {
        self.set(service, "");
    }
}

impl KeyStore for MemoryKeyStore {
    fn get(&self, service: Service) -> Option<String> {
        self.keys
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&service)
            .cloned()
    }
}

/// Layered credential resolution with a cache over the key store
///
/// # Example
///
/// ```ignore
/// let credentials = Credentials::new().with_explicit(Service::DeepL, "my-key");
/// assert_eq!(credentials.api_key(Service::DeepL).as_deref(), Some("my-key"));
/// ```
pub struct Credentials {
    explicit: HashMap<Service, String>,
    store: Option<Arc<dyn KeyStore>>,
    read_env: bool,
    cache: RwLock<HashMap<Service, String>>,
}

impl Credentials {
    /// Credentials backed by environment variables only
    pub fn new() -> Self {
        Self {
            explicit: HashMap::new(),
            store: None,
            read_env: true,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Pin a key for a service; blank keys are ignored
    pub fn with_explicit(mut self, service: Service, key: &str) -> Self {
        let key = key.trim();
        if !key.is_empty() {
            self.explicit.insert(service, key.to_string());
        }
        self
    }

    pub fn with_store(mut self, store: Arc<dyn KeyStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Stop falling back to environment variables
    pub fn without_env(mut self) -> Self {
        self.read_env = false;
        self
    }

    /// Forget keys cached from the store so the next lookup reads it again
    pub fn refresh(&self) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn from_store(&self, service: Service) -> Option<String> {
        if let Some(key) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&service)
        {
            return Some(key.clone());
        }
        let key = self.store.as_ref()?.get(service)?;
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(service, key.clone());
        Some(key)
    }

    fn from_env(&self, service: Service) -> Option<String> {
        if !self.read_env {
            return None;
        }
        std::env::var(service.env_var())
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("explicit", &self.explicit.keys().collect::<Vec<_>>())
            .field("store", &self.store.is_some())
            .field("read_env", &self.read_env)
            .finish()
    }
}

impl CredentialProvider for Credentials {
    fn api_key(&self, service: Service) -> Option<String> {
        self.explicit
            .get(&service)
            .cloned()
            .or_else(|| self.from_store(service))
            .or_else(|| self.from_env(service))
    }
}
