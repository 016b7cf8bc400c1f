//! Provider descriptor registry.
//!
//! Adding a provider means adding a row to [`PROVIDERS`]; nothing else
//! branches on provider ids.

use std::fmt;

use serde_json::Value;

use tabgrouper_protocols::HttpRequest;

use crate::{anthropic, gemini, openai};

/// Inputs for building one provider request.
#[derive(Debug, Clone, Copy)]
pub struct RequestParams<'a> {
    pub base_url: &'a str,
    pub api_key: Option<&'a str>,
    pub model: &'a str,
    pub prompt: &'a str,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Request shape and response extraction for one provider.
pub struct ProviderDescriptor {
    pub id: &'static str,
    pub label: &'static str,
    /// `None` means the base URL must be configured explicitly.
    pub default_base_url: Option<&'static str>,
    pub default_model: &'static str,
    /// Environment variables checked for an API key, in order.
    pub key_env_vars: &'static [&'static str],
    pub base_url_env: Option<&'static str>,
    pub model_env: Option<&'static str>,
    pub requires_key: bool,
    pub build_request: fn(&RequestParams<'_>) -> HttpRequest,
    /// Returns `None` for missing or malformed fields.
    pub extract_content: fn(&Value) -> Option<String>,
}

impl fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("default_base_url", &self.default_base_url)
            .field("default_model", &self.default_model)
            .field("requires_key", &self.requires_key)
            .finish_non_exhaustive()
    }
}

static PROVIDERS: &[ProviderDescriptor] = &[
    ProviderDescriptor {
        id: "openai",
        label: "OpenAI",
        default_base_url: Some("https://api.openai.com/v1"),
        default_model: "gpt-4o-mini",
        key_env_vars: &["OPENAI_API_KEY"],
        base_url_env: Some("OPENAI_BASE_URL"),
        model_env: Some("OPENAI_MODEL"),
        requires_key: true,
        build_request: openai::build_request,
        extract_content: openai::extract_content,
    },
    ProviderDescriptor {
        id: "anthropic",
        label: "Anthropic Claude",
        default_base_url: Some("https://api.anthropic.com/v1"),
        default_model: "claude-3-5-haiku-latest",
        key_env_vars: &["ANTHROPIC_API_KEY"],
        base_url_env: Some("ANTHROPIC_BASE_URL"),
        model_env: Some("ANTHROPIC_MODEL"),
        requires_key: true,
        build_request: anthropic::build_request,
        extract_content: anthropic::extract_content,
    },
    ProviderDescriptor {
        id: "gemini",
        label: "Google Gemini",
        default_base_url: Some("https://generativelanguage.googleapis.com/v1beta"),
        default_model: "gemini-1.5-flash",
        key_env_vars: &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
        base_url_env: Some("GEMINI_BASE_URL"),
        model_env: Some("GEMINI_MODEL"),
        requires_key: true,
        build_request: gemini::build_request,
        extract_content: gemini::extract_content,
    },
    ProviderDescriptor {
        id: "zai",
        label: "Z.ai GLM",
        default_base_url: Some("https://api.z.ai/api/paas/v4"),
        default_model: "glm-4.5-flash",
        key_env_vars: &["ZAI_API_KEY"],
        base_url_env: Some("ZAI_BASE_URL"),
        model_env: Some("ZAI_MODEL"),
        requires_key: true,
        build_request: openai::build_request,
        extract_content: openai::extract_content,
    },
    ProviderDescriptor {
        id: "custom",
        label: "Custom (OpenAI-compatible)",
        default_base_url: None,
        default_model: "default",
        key_env_vars: &["CUSTOM_LLM_API_KEY"],
        base_url_env: Some("CUSTOM_LLM_BASE_URL"),
        model_env: Some("CUSTOM_LLM_MODEL"),
        requires_key: true,
        build_request: openai::build_request,
        extract_content: openai::extract_content,
    },
];

/// All registered providers, in display order.
pub fn descriptors() -> &'static [ProviderDescriptor] {
    PROVIDERS
}

/// Ids of all registered providers.
pub fn provider_ids() -> Vec<&'static str> {
    PROVIDERS.iter().map(|p| p.id).collect()
}

/// Find a provider by id, ignoring ASCII case.
pub fn lookup(id: &str) -> Option<&'static ProviderDescriptor> {
    PROVIDERS.iter().find(|p| p.id.eq_ignore_ascii_case(id.trim()))
}

#[cfg(test)]
#[path = "descriptor_tests.rs"]
mod tests;
