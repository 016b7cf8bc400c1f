//! Extracted page content.

use serde::{Deserialize, Serialize};

/// Best-effort summary of a page, as returned by the host's content extractor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContent {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub headings: Vec<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub hostname: String,
}

impl PageContent {
    /// True when there is nothing beyond url/title to add to a prompt.
    pub fn is_empty(&self) -> bool {
        self.description.trim().is_empty() && self.headings.iter().all(|h| h.trim().is_empty())
    }
}
