//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// Debounce delays beyond this feel unresponsive.
const LONG_DEBOUNCE_MS: u64 = 30_000;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    ///
    /// `known_providers` lists the provider ids the caller can build
    /// clients for; anything else only produces a warning.
    pub fn validate(
        config: &Config,
        known_providers: &[&str],
    ) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_llm(config, known_providers, &mut result);
        Self::validate_providers(config, known_providers, &mut result);
        Self::validate_batching(config, &mut result);
        Self::validate_rate_limit(config, &mut result);
        Self::validate_retry(config, &mut result);

        Ok(result)
    }

    fn validate_llm(config: &Config, known: &[&str], result: &mut ValidationResult) {
        let provider = config.llm.provider.as_str();
        if !known.contains(&provider) {
            result.add_warning(ValidationWarning::new(
                "llm.provider",
                format!(
                    "Unknown provider '{}', valid values: {:?}",
                    provider, known
                ),
            ));
        }

        if let Some(ref url) = config.llm.base_url {
            check_url("llm.base_url", url, result);
        }

        if provider == "custom" {
            let has_base = config.llm.base_url.is_some()
                || config
                    .providers
                    .get("custom")
                    .is_some_and(|p| p.base_url.is_some());
            if !has_base {
                result.add_error(ValidationError::new(
                    "providers.custom.base_url",
                    "custom provider requires an explicit base_url",
                ));
            }
        }

        if !(0.0..=2.0).contains(&config.llm.temperature) {
            result.add_error(ValidationError::new(
                "llm.temperature",
                "temperature must be between 0.0 and 2.0",
            ));
        }

        if config.llm.max_tokens == 0 {
            result.add_error(ValidationError::new(
                "llm.max_tokens",
                "max_tokens must be greater than 0",
            ));
        }
    }

    fn validate_providers(config: &Config, known: &[&str], result: &mut ValidationResult) {
        for (name, provider) in &config.providers {
            if !known.contains(&name.as_str()) {
                result.add_warning(ValidationWarning::new(
                    format!("providers.{}", name),
                    "Unknown provider, this section is ignored",
                ));
            }

            if let Some(ref url) = provider.base_url {
                check_url(&format!("providers.{}.base_url", name), url, result);
            }
        }
    }

    fn validate_batching(config: &Config, result: &mut ValidationResult) {
        if config.batching.delay_ms == 0 {
            result.add_error(ValidationError::new(
                "batching.delay_ms",
                "delay_ms must be greater than 0",
            ));
        }

        if config.batching.delay_ms > LONG_DEBOUNCE_MS {
            result.add_warning(ValidationWarning::new(
                "batching.delay_ms",
                "delay_ms is very long (>30s), new tabs will wait a long time before grouping",
            ));
        }
    }

    fn validate_rate_limit(config: &Config, result: &mut ValidationResult) {
        let rate = &config.rate_limit;
        if rate.max_calls_per_minute == 0 {
            result.add_error(ValidationError::new(
                "rate_limit.max_calls_per_minute",
                "max_calls_per_minute must be greater than 0",
            ));
        }

        let spacing_total = rate.min_delay_ms.saturating_mul(u64::from(rate.max_calls_per_minute));
        if spacing_total > 60_000 {
            result.add_warning(ValidationWarning::new(
                "rate_limit.min_delay_ms",
                "min_delay_ms x max_calls_per_minute exceeds one minute, the call limit is unreachable",
            ));
        }
    }

    fn validate_retry(config: &Config, result: &mut ValidationResult) {
        if config.retry.backoff_multiplier < 1.0 {
            result.add_error(ValidationError::new(
                "retry.backoff_multiplier",
                "backoff_multiplier must be at least 1.0",
            ));
        }

        if config.retry.max_retries > 10 {
            result.add_warning(ValidationWarning::new(
                "retry.max_retries",
                "max_retries is very high (>10), failing batches will stall for a long time",
            ));
        }
    }
}

fn check_url(path: &str, url: &str, result: &mut ValidationResult) {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        result.add_error(ValidationError::new(
            path,
            "base_url must start with http:// or https://",
        ));
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
