//! Rate-limited, retrying prompt client.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use tabgrouper_config::Config;
use tabgrouper_protocols::{HttpRequest, HttpTransport, PromptTransport, ProviderError};

use crate::credentials::{EnvSource, ProcessEnv, ProviderSettings, ResolvedProvider, env_key_present};
use crate::descriptor::{ProviderDescriptor, lookup};
use crate::rate_limiter::{self, RateLimiter};
use crate::retry::{RetryConfig, failure_kind, is_retryable};

/// Sends prompts to the active provider.
///
/// Every attempt takes a rate-limit slot. Transient failures are retried
/// with exponential backoff; when every attempt fails the last slot is
/// handed back so the failure does not count against the budget.
pub struct LlmClient {
    transport: Arc<dyn HttpTransport>,
    settings: RwLock<ProviderSettings>,
    env: Arc<dyn EnvSource>,
    limiter: Mutex<RateLimiter>,
    retry: RetryConfig,
}

impl LlmClient {
    pub fn new(settings: ProviderSettings, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            settings: RwLock::new(settings),
            env: Arc::new(ProcessEnv),
            limiter: Mutex::new(RateLimiter::from_settings(&Default::default())),
            retry: RetryConfig::default(),
        }
    }

    pub fn from_config(config: &Config, transport: Arc<dyn HttpTransport>) -> Self {
        Self::new(ProviderSettings::from_config(config), transport)
            .with_rate_limiter(RateLimiter::from_settings(&config.rate_limit))
            .with_retry(RetryConfig::from_settings(&config.retry))
    }

    pub fn with_env(mut self, env: Arc<dyn EnvSource>) -> Self {
        self.env = env;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = Mutex::new(limiter);
        self
    }

    pub fn provider_id(&self) -> String {
        self.settings.read().provider.clone()
    }

    pub fn resolve(&self) -> Result<ResolvedProvider, ProviderError> {
        self.settings.read().resolve(self.env.as_ref())
    }

    /// Whether a request for the active provider can be built.
    pub fn has_credentials(&self) -> bool {
        self.resolve().is_ok_and(|resolved| resolved.is_usable())
    }

    /// Update the global API key and optionally switch provider.
    ///
    /// `None` keeps the current key; a blank key clears it.
    pub fn update_credentials(
        &self,
        api_key: Option<String>,
        provider: Option<&str>,
    ) -> Result<(), ProviderError> {
        let descriptor = provider.map(known_provider).transpose()?;
        let mut settings = self.settings.write();
        if let Some(key) = api_key {
            settings.api_key = Some(key).filter(|k| !k.trim().is_empty());
        }
        if let Some(descriptor) = descriptor {
            settings.provider = descriptor.id.to_string();
        }
        info!("Credentials updated for provider {}", settings.provider);
        Ok(())
    }

    pub fn set_provider(&self, provider: &str) -> Result<(), ProviderError> {
        let descriptor = known_provider(provider)?;
        self.settings.write().provider = descriptor.id.to_string();
        info!("Active provider set to {}", descriptor.id);
        Ok(())
    }

    /// Whether an environment API key exists for `provider`.
    pub fn probe_env_key(&self, provider: &str) -> bool {
        env_key_present(provider, self.env.as_ref())
    }

    pub fn calls_in_window(&self) -> usize {
        self.limiter.lock().calls_in_window(tokio::time::Instant::now())
    }

    async fn attempt(
        &self,
        request: &HttpRequest,
        descriptor: &ProviderDescriptor,
    ) -> Result<Option<String>, ProviderError> {
        let response = self.transport.post_json(request).await?;
        if !response.is_success() {
            return Err(ProviderError::from_api_response(
                response.status,
                error_message(&response.body),
            ));
        }

        match serde_json::from_str::<Value>(&response.body) {
            Ok(body) => Ok((descriptor.extract_content)(&body)),
            Err(e) => {
                warn!("Unparseable response from {}: {}", descriptor.id, e);
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl PromptTransport for LlmClient {
    async fn send(&self, prompt: &str) -> Result<Option<String>, ProviderError> {
        let resolved = self.resolve()?;
        let request = resolved.request(prompt)?;
        let max_attempts = self.retry.max_attempts();
        let mut attempt = 0;

        loop {
            let slot = rate_limiter::acquire(&self.limiter).await;
            attempt += 1;
            debug!(
                "Sending prompt to {} (attempt {}/{})",
                resolved.descriptor.id, attempt, max_attempts
            );

            let error = match self.attempt(&request, resolved.descriptor).await {
                Ok(content) => return Ok(content),
                Err(e) => e,
            };

            if !is_retryable(&error) || attempt >= max_attempts {
                self.limiter.lock().retract(slot);
                warn!(
                    "Provider call failed after {} attempt(s), {}: {}",
                    attempt,
                    failure_kind(&error),
                    error
                );
                return Err(error);
            }

            let delay = self.retry.delay_for_attempt(attempt - 1);
            warn!(
                "Provider {} (attempt {}/{}): {}, retrying in {:?}",
                failure_kind(&error),
                attempt,
                max_attempts,
                error,
                delay
            );
            sleep(delay).await;
        }
    }
}

fn known_provider(id: &str) -> Result<&'static ProviderDescriptor, ProviderError> {
    lookup(id).ok_or_else(|| ProviderError::UnsupportedProvider(id.to_string()))
}

/// Prefer the provider's `error.message` over the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
