//! Error types for the translation engine
//!
//! Every variant's message is meant to be shown to the user as is: a failed
//! reconciliation surfaces it and leaves both panes and the committed
//! snapshot untouched.

use crate::credentials::Service;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MtError {
    /// No API key could be resolved for the provider; no request was sent
    #[error("{0} API key is not configured")]
    MissingApiKey(Service),
    /// The provider rejected the credential (403-class)
    #[error("Invalid API key: {0}")]
    InvalidCredential(String),
    /// The provider throttled the request or the quota is exhausted
    #[error("Rate limited: {0}")]
    RateLimited(String),
    /// Any other non-2xx status, transport failure, or malformed response
    #[error("Translation provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MtError {
    /// Whether the error came back from the translation provider, as opposed
    /// to a local precondition such as a missing key
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            MtError::InvalidCredential(_) | MtError::RateLimited(_) | MtError::ProviderUnavailable(_)
        )
    }
}

impl From<reqwest::Error> for MtError {
    fn from(err: reqwest::Error) -> Self {
        MtError::ProviderUnavailable(format!("request failed: {}", err))
    }
}

/// Result type for translation operations
pub type MtResult<T> = Result<T, MtError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_user_facing() {
        assert_eq!(
            MtError::MissingApiKey(Service::DeepL).to_string(),
            "DeepL API key is not configured"
        );
        assert_eq!(
            MtError::RateLimited("quota exceeded".to_string()).to_string(),
            "Rate limited: quota exceeded"
        );
    }

    #[test]
    fn test_provider_failure_classification() {
        assert!(MtError::InvalidCredential(String::new()).is_provider_failure());
        assert!(MtError::RateLimited(String::new()).is_provider_failure());
        assert!(MtError::ProviderUnavailable(String::new()).is_provider_failure());
        assert!(!MtError::MissingApiKey(Service::OpenAi).is_provider_failure());
        assert!(!MtError::Config(String::new()).is_provider_failure());
    }
}
