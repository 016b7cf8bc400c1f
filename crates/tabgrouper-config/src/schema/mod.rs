//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use tabgrouper_protocols::GroupingMode;

mod schema_engine;

pub use schema_engine::*;

/// Shared default helper used by submodules.
pub(crate) fn default_true() -> bool {
    true
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,

    /// Per-provider overrides keyed by provider id.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    #[serde(default)]
    pub batching: BatchingConfig,

    #[serde(default)]
    pub rate_limit: RateLimitSettings,

    #[serde(default)]
    pub retry: RetrySettings,

    #[serde(default)]
    pub grouping: GroupingConfig,
}

impl Config {
    /// Default location of the configuration file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tabgrouper").join("config.toml"))
    }
}

/// Remote classifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Global key applied to every provider without its own key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Fall back to the offline classifier when no key resolves.
    #[serde(default = "default_true")]
    pub mock_when_unconfigured: bool,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_key: None,
            base_url: None,
            model: None,
            mock_when_unconfigured: default_true(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_max_tokens() -> u32 {
    500
}

fn default_temperature() -> f32 {
    0.3
}

/// Provider configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

/// Grouping behaviour configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupingConfig {
    /// Mode used until the settings store says otherwise.
    #[serde(default)]
    pub default_mode: GroupingMode,

    /// Extract page content for the prompt.
    #[serde(default = "default_true")]
    pub extract_content: bool,

    #[serde(default = "default_notification_icon")]
    pub notification_icon: String,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            default_mode: GroupingMode::default(),
            extract_content: default_true(),
            notification_icon: default_notification_icon(),
        }
    }
}

fn default_notification_icon() -> String {
    "icons/icon128.png".to_string()
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
