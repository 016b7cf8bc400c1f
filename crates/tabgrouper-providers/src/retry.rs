//! Retry policy for provider calls.

use std::time::Duration;

use tabgrouper_config::RetrySettings;
use tabgrouper_protocols::ProviderError;

/// Retry configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first call.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Exponential backoff multiplier.
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::from_settings(&RetrySettings::default())
    }
}

impl RetryConfig {
    pub fn from_settings(settings: &RetrySettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            base_delay: Duration::from_millis(settings.base_delay_ms),
            backoff_multiplier: settings.backoff_multiplier,
        }
    }

    /// Total number of attempts including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Calculate delay after a failed attempt (0-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self.base_delay.as_millis() as f64
            * self.backoff_multiplier.powi(attempt as i32);
        Duration::from_millis(delay as u64)
    }
}

/// Check if an error is retryable.
///
/// Authentication failures and configuration errors abort immediately.
/// Every other transport failure is retried.
pub fn is_retryable(error: &ProviderError) -> bool {
    if error.is_config_error() {
        return false;
    }
    !matches!(error, ProviderError::AuthenticationFailed { .. })
}

/// Short label for log lines.
pub fn failure_kind(error: &ProviderError) -> &'static str {
    if error.is_config_error() {
        return "configuration error";
    }
    match error {
        ProviderError::RateLimited(_) => "rate limited",
        ProviderError::Network(_) => "network error",
        ProviderError::AuthenticationFailed { .. } => "authentication failed",
        _ if error.status().is_some_and(|status| status >= 500) => "server error",
        _ => "api error",
    }
}
