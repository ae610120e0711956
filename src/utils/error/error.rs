//! Error types for the router

use crate::core::types::common::ProviderMethod;
use serde::Serialize;
use thiserror::Error;

/// Result type alias for the router
pub type Result<T> = std::result::Result<T, SwitchError>;

/// Main error type for the router
///
/// Provider failures are classified into this taxonomy by inspecting
/// the upstream failure text (see [`crate::utils::error::classify`]);
/// anything unmatched lands in [`SwitchError::Generation`].
#[derive(Error, Debug, Clone)]
pub enum SwitchError {
    /// The provider call exceeded its deadline
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The provider rejected the call for rate/quota reasons
    #[error("Rate limited: {message}")]
    RateLimited {
        message: String,
        /// Seconds to wait before retrying, when the provider said so
        retry_after: Option<u64>,
    },

    /// Authentication with the provider failed
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The requested model does not exist at the provider
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Connection-level failure reaching the provider
    #[error("Network error: {0}")]
    Network(String),

    /// The provider reported itself unavailable
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Catch-all for provider failures that match no other kind
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Configuration errors (never retried)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors (never retried)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Both the primary and the fallback provider exhausted their
    /// retry budgets
    #[error(
        "All providers failed. {primary}: {primary_error}; {fallback}: {fallback_error}. \
         Suggestions: {}", .suggestions.join(", ")
    )]
    BothProvidersFailed {
        primary: ProviderMethod,
        primary_error: String,
        fallback: ProviderMethod,
        fallback_error: String,
        suggestions: Vec<String>,
    },

    /// The requested provider is not enabled or not instantiated
    #[error("Provider not available: {0}")]
    ProviderNotAvailable(String),

    /// Serialization errors (cache tier payloads)
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SwitchError {
    /// Whether the retry loop may try this failure again
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SwitchError::Timeout(_)
                | SwitchError::RateLimited { .. }
                | SwitchError::Network(_)
                | SwitchError::ServiceUnavailable(_)
                | SwitchError::Generation(_)
        )
    }

    /// Provider-supplied retry delay, if any
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            SwitchError::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Stable error code for the caller-facing surface
    pub fn error_code(&self) -> &'static str {
        match self {
            SwitchError::Timeout(_) => "TIMEOUT",
            SwitchError::RateLimited { .. } => "RATE_LIMITED",
            SwitchError::InvalidCredentials(_) => "INVALID_CREDENTIALS",
            SwitchError::ModelNotFound(_) => "MODEL_NOT_FOUND",
            SwitchError::Network(_) => "NETWORK_ERROR",
            SwitchError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            SwitchError::Generation(_) => "GENERATION_FAILED",
            SwitchError::Config(_) => "CONFIG_ERROR",
            SwitchError::Validation(_) => "VALIDATION_ERROR",
            SwitchError::BothProvidersFailed { .. } => "ALL_PROVIDERS_FAILED",
            SwitchError::ProviderNotAvailable(_) => "PROVIDER_NOT_AVAILABLE",
            SwitchError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Convert into the structured payload the web layer returns
    pub fn to_payload(&self, provider: Option<ProviderMethod>) -> ErrorPayload {
        let suggestions = match self {
            SwitchError::BothProvidersFailed { suggestions, .. } => suggestions.clone(),
            SwitchError::InvalidCredentials(_) => {
                vec!["Check the provider API key in the routing configuration".to_string()]
            }
            SwitchError::Network(_) | SwitchError::ServiceUnavailable(_) => {
                vec!["Check network connectivity to the provider".to_string()]
            }
            _ => Vec::new(),
        };
        ErrorPayload {
            error_code: self.error_code().to_string(),
            message: self.to_string(),
            provider: provider.map(|m| m.as_str().to_string()),
            suggestions,
            retry_after: self.retry_after(),
        }
    }
}

impl From<serde_json::Error> for SwitchError {
    fn from(err: serde_json::Error) -> Self {
        SwitchError::Serialization(err.to_string())
    }
}

/// Structured error payload for the caller-facing surface
#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub error_code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}
