//! Pending manual-mode confirmations.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use tabgrouper_protocols::{GroupingDecision, Notification, Tab};

const NOTIFICATION_PREFIX: &str = "group-suggestion-";

/// A suggestion waiting for the user to click its notification.
#[derive(Debug, Clone)]
pub struct PendingConfirmation {
    pub tabs: Vec<Tab>,
    pub decision: GroupingDecision,
    pub created_at: DateTime<Utc>,
}

/// Suggestions keyed by notification id.
///
/// Entries live until clicked; there is no expiry.
#[derive(Debug, Default)]
pub struct Confirmations {
    pending: Mutex<HashMap<String, PendingConfirmation>>,
}

impl Confirmations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a suggestion and return its notification id.
    pub fn insert(&self, tabs: Vec<Tab>, decision: GroupingDecision) -> String {
        let id = format!("{}{}", NOTIFICATION_PREFIX, Uuid::new_v4());
        self.pending.lock().insert(
            id.clone(),
            PendingConfirmation {
                tabs,
                decision,
                created_at: Utc::now(),
            },
        );
        id
    }

    /// Remove and return a suggestion.
    pub fn take(&self, id: &str) -> Option<PendingConfirmation> {
        self.pending.lock().remove(id)
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

/// Notification asking the user to confirm a suggestion.
pub fn suggestion_notification(
    tab_count: usize,
    decision: &GroupingDecision,
    icon: &str,
) -> Notification {
    let noun = if tab_count == 1 { "tab" } else { "tabs" };
    Notification {
        title: "Tab Grouping Suggestion".to_string(),
        message: format!(
            "Group {} {} into \"{}\"?",
            tab_count,
            noun,
            decision.display_name()
        ),
        icon: icon.to_string(),
        priority: 2,
    }
}
