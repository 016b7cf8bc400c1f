//! Grouping decisions and operating modes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{GroupColor, GroupId};

/// Group name used when a decision to group carries no usable name.
pub const DEFAULT_GROUP_NAME: &str = "Uncategorized";

/// Verdict on whether and how a batch of tabs should be grouped.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupingDecision {
    pub should_group: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<GroupColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_group_id: Option<GroupId>,
    #[serde(default)]
    pub reasoning: String,
}

impl GroupingDecision {
    /// A decision not to group.
    pub fn no_group(reasoning: impl Into<String>) -> Self {
        Self {
            should_group: false,
            reasoning: reasoning.into(),
            ..Default::default()
        }
    }

    /// A decision to put the tabs into a new group.
    pub fn new_group(
        name: impl Into<String>,
        color: GroupColor,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            should_group: true,
            group_name: Some(name.into()),
            color: Some(color),
            existing_group_id: None,
            reasoning: reasoning.into(),
        }
    }

    /// Redirect the decision into an existing group.
    pub fn into_existing(mut self, group_id: Option<GroupId>) -> Self {
        self.existing_group_id = group_id;
        self
    }

    /// Name to show or apply, defaulting to [`DEFAULT_GROUP_NAME`].
    pub fn display_name(&self) -> &str {
        self.group_name.as_deref().unwrap_or(DEFAULT_GROUP_NAME)
    }

    /// Color to apply, defaulting to grey.
    pub fn effective_color(&self) -> GroupColor {
        self.color.unwrap_or_default()
    }
}

/// User-selected operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupingMode {
    /// Apply decisions immediately.
    #[default]
    Auto,
    /// Surface decisions as confirmation notifications.
    Manual,
    /// Do nothing.
    Disabled,
}

impl GroupingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupingMode::Auto => "auto",
            GroupingMode::Manual => "manual",
            GroupingMode::Disabled => "disabled",
        }
    }
}

impl fmt::Display for GroupingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(GroupingMode::Auto),
            "manual" => Ok(GroupingMode::Manual),
            "disabled" => Ok(GroupingMode::Disabled),
            other => Err(format!("unknown grouping mode: {}", other)),
        }
    }
}

#[cfg(test)]
#[path = "decision_tests.rs"]
mod tests;
