//! Key-value settings store.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::HostError;

/// Keys the engine reads and writes.
pub mod keys {
    pub const API_KEY: &str = "apiKey";
    pub const LLM_PROVIDER: &str = "llmProvider";
    pub const GROUPING_MODE: &str = "groupingMode";
    pub const GROUPING_PAUSED: &str = "groupingPaused";
}

/// Async key-value settings.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, HostError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), HostError>;

    /// String value of a key; non-string values read as absent.
    async fn get_string(&self, key: &str) -> Result<Option<String>, HostError> {
        Ok(self
            .get(key)
            .await?
            .and_then(|v| v.as_str().map(str::to_string)))
    }

    /// Boolean value of a key; non-boolean values read as absent.
    async fn get_bool(&self, key: &str) -> Result<Option<bool>, HostError> {
        Ok(self.get(key).await?.and_then(|v| v.as_bool()))
    }
}
