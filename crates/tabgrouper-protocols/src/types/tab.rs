//! Tab snapshots.

use serde::{Deserialize, Serialize};

use super::GroupId;

/// Host-assigned tab identifier.
pub type TabId = i64;

/// Host-assigned window identifier.
pub type WindowId = i64;

/// Snapshot of a host tab at the moment it was observed.
///
/// The host owns tabs; a snapshot may be stale by the time it is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub id: TabId,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: String,
    pub window_id: WindowId,
    /// `None` is the host's "no group" sentinel.
    #[serde(default)]
    pub group_id: Option<GroupId>,
    #[serde(default)]
    pub incognito: bool,
}

impl Tab {
    /// Create an ungrouped, non-incognito tab snapshot.
    pub fn new(
        id: TabId,
        window_id: WindowId,
        url: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id,
            url: Some(url.into()),
            title: title.into(),
            window_id,
            group_id: None,
            incognito: false,
        }
    }

    pub fn with_group(mut self, group_id: GroupId) -> Self {
        self.group_id = Some(group_id);
        self
    }

    pub fn incognito(mut self) -> Self {
        self.incognito = true;
        self
    }

    pub fn is_grouped(&self) -> bool {
        self.group_id.is_some()
    }

    /// URL or the empty string.
    pub fn url_str(&self) -> &str {
        self.url.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_new_is_ungrouped() {
        let tab = Tab::new(1, 7, "https://example.com", "Example");
        assert_eq!(tab.window_id, 7);
        assert!(!tab.is_grouped());
        assert!(!tab.incognito);
        assert_eq!(tab.url_str(), "https://example.com");
    }

    #[test]
    fn test_tab_serde_camel_case() {
        let tab = Tab::new(3, 1, "https://a.com", "A").with_group(9);
        let json = serde_json::to_value(&tab).unwrap();
        assert_eq!(json["windowId"], 1);
        assert_eq!(json["groupId"], 9);
    }

    #[test]
    fn test_tab_missing_url() {
        let tab: Tab = serde_json::from_value(serde_json::json!({
            "id": 5,
            "windowId": 1
        }))
        .unwrap();
        assert!(tab.url.is_none());
        assert_eq!(tab.url_str(), "");
        assert_eq!(tab.title, "");
    }
}
