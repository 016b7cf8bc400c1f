//! Notification display.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::HostError;

/// A notification to display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub icon: String,
    /// 0 (lowest) to 2 (highest).
    pub priority: u8,
}

/// Notification display and dismissal. Clicks arrive as engine events.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn create(&self, id: &str, notification: Notification) -> Result<(), HostError>;

    /// Returns whether a notification with that id existed.
    async fn clear(&self, id: &str) -> Result<bool, HostError>;
}
