//! In-memory browser host.
//!
//! Implements every host capability over plain maps so the engine can run
//! without a browser: in the `simulate` command and in tests.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use tabgrouper_protocols::{
    ContentExtractor, Group, GroupColor, GroupHost, GroupId, GroupUpdate, HostError, Notification,
    Notifier, PageContent, SettingsStore, Tab, TabHost, TabId, WindowId,
};

/// A group mutation received by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Group {
        tab_ids: Vec<TabId>,
        group_id: Option<GroupId>,
    },
    Update {
        group_id: GroupId,
        update: GroupUpdate,
    },
}

#[derive(Debug)]
struct BrowserState {
    tabs: BTreeMap<TabId, Tab>,
    groups: BTreeMap<GroupId, Group>,
    next_tab_id: TabId,
    next_group_id: GroupId,
    settings: HashMap<String, Value>,
    notifications: BTreeMap<String, Notification>,
    cleared: Vec<String>,
    contents: HashMap<TabId, PageContent>,
    calls: Vec<HostCall>,
    reject_grouping: bool,
}

impl Default for BrowserState {
    fn default() -> Self {
        Self {
            tabs: BTreeMap::new(),
            groups: BTreeMap::new(),
            next_tab_id: 1,
            next_group_id: 100,
            settings: HashMap::new(),
            notifications: BTreeMap::new(),
            cleared: Vec::new(),
            contents: HashMap::new(),
            calls: Vec::new(),
            reject_grouping: false,
        }
    }
}

/// A fake browser holding tabs, groups, settings and notifications.
#[derive(Debug, Default)]
pub struct InMemoryBrowser {
    state: Mutex<BrowserState>,
}

impl InMemoryBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new ungrouped tab.
    pub fn open_tab(&self, window_id: WindowId, url: &str, title: &str) -> Tab {
        let mut state = self.state.lock();
        let tab = Tab::new(state.next_tab_id, window_id, url, title);
        state.next_tab_id += 1;
        state.tabs.insert(tab.id, tab.clone());
        tab
    }

    /// Insert or replace a tab as given.
    pub fn put_tab(&self, tab: Tab) {
        let mut state = self.state.lock();
        state.next_tab_id = state.next_tab_id.max(tab.id + 1);
        state.tabs.insert(tab.id, tab);
    }

    pub fn remove_tab(&self, tab_id: TabId) -> Option<Tab> {
        self.state.lock().tabs.remove(&tab_id)
    }

    pub fn tab(&self, tab_id: TabId) -> Option<Tab> {
        self.state.lock().tabs.get(&tab_id).cloned()
    }

    pub fn tabs(&self) -> Vec<Tab> {
        self.state.lock().tabs.values().cloned().collect()
    }

    /// Create a titled group with no tabs.
    pub fn add_group(&self, window_id: WindowId, title: &str, color: GroupColor) -> Group {
        let mut state = self.state.lock();
        let group = Group::new(state.next_group_id, title, color, window_id);
        state.next_group_id += 1;
        state.groups.insert(group.id, group.clone());
        group
    }

    /// Delete a group, leaving its tabs ungrouped.
    pub fn remove_group(&self, group_id: GroupId) -> Option<Group> {
        let mut state = self.state.lock();
        for tab in state.tabs.values_mut() {
            if tab.group_id == Some(group_id) {
                tab.group_id = None;
            }
        }
        state.groups.remove(&group_id)
    }

    pub fn find_group(&self, group_id: GroupId) -> Option<Group> {
        self.state.lock().groups.get(&group_id).cloned()
    }

    pub fn groups(&self) -> Vec<Group> {
        self.state.lock().groups.values().cloned().collect()
    }

    pub fn tabs_in_group(&self, group_id: GroupId) -> Vec<TabId> {
        self.state
            .lock()
            .tabs
            .values()
            .filter(|t| t.group_id == Some(group_id))
            .map(|t| t.id)
            .collect()
    }

    pub fn set_content(&self, tab_id: TabId, content: PageContent) {
        self.state.lock().contents.insert(tab_id, content);
    }

    pub fn set_setting(&self, key: &str, value: Value) {
        self.state.lock().settings.insert(key.to_string(), value);
    }

    pub fn setting(&self, key: &str) -> Option<Value> {
        self.state.lock().settings.get(key).cloned()
    }

    /// Displayed notifications, ordered by id.
    pub fn notifications(&self) -> Vec<(String, Notification)> {
        self.state
            .lock()
            .notifications
            .iter()
            .map(|(id, n)| (id.clone(), n.clone()))
            .collect()
    }

    pub fn cleared_notifications(&self) -> Vec<String> {
        self.state.lock().cleared.clone()
    }

    /// Every group mutation received, in order.
    pub fn calls(&self) -> Vec<HostCall> {
        self.state.lock().calls.clone()
    }

    pub fn group_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, HostCall::Group { .. }))
            .count()
    }

    pub fn update_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, HostCall::Update { .. }))
            .count()
    }

    /// Make every grouping call fail with [`HostError::Rejected`].
    pub fn set_reject_grouping(&self, reject: bool) {
        self.state.lock().reject_grouping = reject;
    }
}

#[async_trait]
impl TabHost for InMemoryBrowser {
    async fn get_tab(&self, tab_id: TabId) -> Result<Tab, HostError> {
        self.tab(tab_id).ok_or(HostError::TabNotFound(tab_id))
    }

    async fn tabs_in_window(&self, window_id: WindowId) -> Result<Vec<Tab>, HostError> {
        Ok(self
            .state
            .lock()
            .tabs
            .values()
            .filter(|t| t.window_id == window_id)
            .cloned()
            .collect())
    }

    async fn group(
        &self,
        tab_ids: &[TabId],
        group_id: Option<GroupId>,
    ) -> Result<GroupId, HostError> {
        let mut state = self.state.lock();
        state.calls.push(HostCall::Group {
            tab_ids: tab_ids.to_vec(),
            group_id,
        });

        if state.reject_grouping {
            return Err(HostError::Rejected("grouping rejected".to_string()));
        }
        let Some(&first) = tab_ids.first() else {
            return Err(HostError::Rejected("no tabs to group".to_string()));
        };
        if let Some(missing) = tab_ids.iter().find(|id| !state.tabs.contains_key(*id)) {
            return Err(HostError::TabNotFound(*missing));
        }

        let target = match group_id {
            Some(id) if state.groups.contains_key(&id) => id,
            Some(id) => return Err(HostError::GroupNotFound(id)),
            None => {
                let window_id = state.tabs.get(&first).map(|t| t.window_id).unwrap_or_default();
                let id = state.next_group_id;
                state.next_group_id += 1;
                state.groups.insert(id, Group::new(id, "", GroupColor::Grey, window_id));
                id
            }
        };

        for id in tab_ids {
            if let Some(tab) = state.tabs.get_mut(id) {
                tab.group_id = Some(target);
            }
        }
        Ok(target)
    }
}

#[async_trait]
impl GroupHost for InMemoryBrowser {
    async fn groups_in_window(&self, window_id: WindowId) -> Result<Vec<Group>, HostError> {
        Ok(self
            .state
            .lock()
            .groups
            .values()
            .filter(|g| g.window_id == window_id)
            .cloned()
            .collect())
    }

    async fn update(&self, group_id: GroupId, update: GroupUpdate) -> Result<Group, HostError> {
        let mut state = self.state.lock();
        state.calls.push(HostCall::Update {
            group_id,
            update: update.clone(),
        });

        let group = state
            .groups
            .get_mut(&group_id)
            .ok_or(HostError::GroupNotFound(group_id))?;
        if let Some(title) = update.title {
            group.title = title;
        }
        if let Some(color) = update.color {
            group.color = color;
        }
        Ok(group.clone())
    }
}

#[async_trait]
impl SettingsStore for InMemoryBrowser {
    async fn get(&self, key: &str) -> Result<Option<Value>, HostError> {
        Ok(self.setting(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), HostError> {
        self.set_setting(key, value);
        Ok(())
    }
}

#[async_trait]
impl Notifier for InMemoryBrowser {
    async fn create(&self, id: &str, notification: Notification) -> Result<(), HostError> {
        self.state
            .lock()
            .notifications
            .insert(id.to_string(), notification);
        Ok(())
    }

    async fn clear(&self, id: &str) -> Result<bool, HostError> {
        let mut state = self.state.lock();
        let existed = state.notifications.remove(id).is_some();
        state.cleared.push(id.to_string());
        Ok(existed)
    }
}

#[async_trait]
impl ContentExtractor for InMemoryBrowser {
    async fn extract(&self, tab_id: TabId) -> Result<PageContent, HostError> {
        let state = self.state.lock();
        if !state.tabs.contains_key(&tab_id) {
            return Err(HostError::TabNotFound(tab_id));
        }
        state
            .contents
            .get(&tab_id)
            .cloned()
            .ok_or_else(|| HostError::Unavailable(format!("no content for tab {}", tab_id)))
    }
}
