//! Credential, base URL and model resolution.
//!
//! Each value resolves in order: the per-provider section of the
//! configuration, the global override, the provider's environment
//! variable, then the compiled-in default. Empty strings count as unset.

use std::collections::HashMap;

use tabgrouper_config::{Config, ProviderConfig};
use tabgrouper_protocols::{HttpRequest, ProviderError};

use crate::descriptor::{ProviderDescriptor, RequestParams, lookup};

/// Source of environment-style fallback variables.
pub trait EnvSource: Send + Sync {
    fn var(&self, name: &str) -> Option<String>;
}

/// The process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Mutable provider selection and overrides.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub provider: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub providers: HashMap<String, ProviderConfig>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl ProviderSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            provider: config.llm.provider.clone(),
            api_key: config.llm.api_key.clone(),
            base_url: config.llm.base_url.clone(),
            model: config.llm.model.clone(),
            providers: config.providers.clone(),
            max_tokens: config.llm.max_tokens,
            temperature: config.llm.temperature,
        }
    }

    /// Resolve the active provider.
    ///
    /// A missing key is not an error here; [`ResolvedProvider::request`]
    /// fails before any network attempt instead.
    pub fn resolve(&self, env: &dyn EnvSource) -> Result<ResolvedProvider, ProviderError> {
        let descriptor = lookup(&self.provider)
            .ok_or_else(|| ProviderError::UnsupportedProvider(self.provider.clone()))?;
        let section = self.providers.get(descriptor.id);

        let api_key = first_present([
            section.and_then(|s| s.api_key.clone()),
            self.api_key.clone(),
            descriptor.key_env_vars.iter().find_map(|name| present(env.var(name))),
        ]);
        let base_url = first_present([
            section.and_then(|s| s.base_url.clone()),
            self.base_url.clone(),
            descriptor.base_url_env.and_then(|name| env.var(name)),
            descriptor.default_base_url.map(str::to_string),
        ]);
        let model = first_present([
            section.and_then(|s| s.default_model.clone()),
            self.model.clone(),
            descriptor.model_env.and_then(|name| env.var(name)),
        ])
        .unwrap_or_else(|| descriptor.default_model.to_string());

        Ok(ResolvedProvider {
            descriptor,
            api_key,
            base_url,
            model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        })
    }
}

/// A provider with every value resolved.
#[derive(Debug, Clone)]
pub struct ResolvedProvider {
    pub descriptor: &'static ProviderDescriptor,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl ResolvedProvider {
    /// Whether a request can be built without a configuration error.
    pub fn is_usable(&self) -> bool {
        self.base_url.is_some() && (self.api_key.is_some() || !self.descriptor.requires_key)
    }

    /// Build the outbound request for a prompt.
    pub fn request(&self, prompt: &str) -> Result<HttpRequest, ProviderError> {
        let id = self.descriptor.id.to_string();
        if self.descriptor.requires_key && self.api_key.is_none() {
            return Err(ProviderError::NoApiKey(id));
        }
        let base_url = self
            .base_url
            .as_deref()
            .ok_or(ProviderError::MissingBaseUrl(id))?;

        let params = RequestParams {
            base_url,
            api_key: self.api_key.as_deref(),
            model: &self.model,
            prompt,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };
        Ok((self.descriptor.build_request)(&params))
    }
}

/// Whether any of the provider's key variables is set.
pub fn env_key_present(provider: &str, env: &dyn EnvSource) -> bool {
    lookup(provider).is_some_and(|descriptor| {
        descriptor
            .key_env_vars
            .iter()
            .any(|name| present(env.var(name)).is_some())
    })
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn first_present<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates.into_iter().find_map(present)
}

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod tests;
