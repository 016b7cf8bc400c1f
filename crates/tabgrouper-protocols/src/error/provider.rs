//! Remote model provider errors.

use thiserror::Error;

/// Failure of a call to a remote model provider.
///
/// `NoApiKey`, `UnsupportedProvider` and `MissingBaseUrl` are configuration
/// failures raised before any network attempt. The remaining variants are
/// transport failures.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("No API key available for provider: {0}")]
    NoApiKey(String),

    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("No base URL configured for provider: {0}")]
    MissingBaseUrl(String),

    #[error("Authentication failed ({status}): {message}")]
    AuthenticationFailed { status: u16, message: String },

    #[error("Rate limited by provider: {0}")]
    RateLimited(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),
}

impl ProviderError {
    /// Classify a non-success HTTP response.
    pub fn from_api_response(status: u16, message: String) -> Self {
        match status {
            401 | 403 => ProviderError::AuthenticationFailed { status, message },
            429 => ProviderError::RateLimited(message),
            _ => ProviderError::ApiError { status, message },
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::AuthenticationFailed { status, .. }
            | ProviderError::ApiError { status, .. } => Some(*status),
            ProviderError::RateLimited(_) => Some(429),
            _ => None,
        }
    }

    /// Whether this is a configuration failure that never reached the network.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ProviderError::NoApiKey(_)
                | ProviderError::UnsupportedProvider(_)
                | ProviderError::MissingBaseUrl(_)
        )
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
