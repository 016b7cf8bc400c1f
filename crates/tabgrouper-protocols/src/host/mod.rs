//! Host capability traits.
//!
//! The engine never talks to a browser directly; it calls into these
//! interfaces, which the embedding host implements.

mod notification;
mod settings;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HostError;
use crate::types::{Group, GroupColor, GroupId, PageContent, Tab, TabId, WindowId};

pub use notification::*;
pub use settings::*;

/// Tab lookup and grouping.
#[async_trait]
pub trait TabHost: Send + Sync {
    /// Fetch the current state of a tab.
    async fn get_tab(&self, tab_id: TabId) -> Result<Tab, HostError>;

    /// All tabs in a window.
    async fn tabs_in_window(&self, window_id: WindowId) -> Result<Vec<Tab>, HostError>;

    /// Move tabs into `group_id`, or into a fresh untitled group when `None`.
    /// Returns the id of the group the tabs ended up in.
    async fn group(&self, tab_ids: &[TabId], group_id: Option<GroupId>)
        -> Result<GroupId, HostError>;
}

/// Properties that can be changed on an existing group.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupUpdate {
    pub title: Option<String>,
    pub color: Option<GroupColor>,
}

/// Group queries and updates.
#[async_trait]
pub trait GroupHost: Send + Sync {
    /// All groups in a window.
    async fn groups_in_window(&self, window_id: WindowId) -> Result<Vec<Group>, HostError>;

    /// Change a group's title and/or color.
    async fn update(&self, group_id: GroupId, update: GroupUpdate) -> Result<Group, HostError>;
}

/// Best-effort page content extraction.
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    async fn extract(&self, tab_id: TabId) -> Result<PageContent, HostError>;
}

/// Bundle of every capability the engine consumes.
#[derive(Clone)]
pub struct HostApis {
    pub tabs: Arc<dyn TabHost>,
    pub groups: Arc<dyn GroupHost>,
    pub settings: Arc<dyn SettingsStore>,
    pub notifier: Arc<dyn Notifier>,
    pub content: Arc<dyn ContentExtractor>,
}

impl HostApis {
    /// Use one object that implements every capability.
    pub fn from_shared<H>(host: Arc<H>) -> Self
    where
        H: TabHost + GroupHost + SettingsStore + Notifier + ContentExtractor + 'static,
    {
        Self {
            tabs: host.clone(),
            groups: host.clone(),
            settings: host.clone(),
            notifier: host.clone(),
            content: host,
        }
    }
}
