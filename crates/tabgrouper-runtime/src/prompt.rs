//! Classification prompt.

use std::fmt::Write;

use tabgrouper_protocols::{Group, GroupColor, PageContent, Tab};

/// Headings included per tab.
const MAX_HEADINGS: usize = 5;

/// Everything the classifier sees for one batch.
#[derive(Debug, Clone, Default)]
pub struct BatchContext {
    /// The newly observed tabs. Never empty when classified.
    pub tabs: Vec<Tab>,
    /// All tabs currently in the window, the batch included.
    pub window_tabs: Vec<Tab>,
    pub groups: Vec<Group>,
    /// Extracted content, index-aligned with `tabs`. Empty when extraction
    /// is disabled.
    pub contents: Vec<Option<PageContent>>,
}

impl BatchContext {
    pub fn new(tabs: Vec<Tab>, window_tabs: Vec<Tab>, groups: Vec<Group>) -> Self {
        Self {
            tabs,
            window_tabs,
            groups,
            contents: Vec::new(),
        }
    }

    pub fn with_contents(mut self, contents: Vec<Option<PageContent>>) -> Self {
        self.contents = contents;
        self
    }

    fn content_for(&self, index: usize) -> Option<&PageContent> {
        self.contents.get(index).and_then(Option::as_ref)
    }

    /// Window tabs that are not part of the batch.
    pub fn other_tabs(&self) -> impl Iterator<Item = &Tab> {
        self.window_tabs
            .iter()
            .filter(|tab| !self.tabs.iter().any(|t| t.id == tab.id))
    }

    pub fn prompt(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "You are helping organize browser tabs into groups. Decide whether the \
             following newly opened tab(s) should be grouped together, and if so, \
             whether they belong in an existing group or a new one."
        );

        let _ = writeln!(out, "\nNew tabs ({}):", self.tabs.len());
        for (index, tab) in self.tabs.iter().enumerate() {
            let _ = writeln!(out, "{}. Title: {}", index + 1, tab.title);
            let _ = writeln!(out, "   URL: {}", tab.url_str());
            if let Some(content) = self.content_for(index) {
                if !content.description.trim().is_empty() {
                    let _ = writeln!(out, "   Description: {}", content.description.trim());
                }
                let headings: Vec<&str> = content
                    .headings
                    .iter()
                    .map(|h| h.trim())
                    .filter(|h| !h.is_empty())
                    .take(MAX_HEADINGS)
                    .collect();
                if !headings.is_empty() {
                    let _ = writeln!(out, "   Headings: {}", headings.join(" | "));
                }
            }
        }

        let others: Vec<&Tab> = self.other_tabs().collect();
        if !others.is_empty() {
            let _ = writeln!(out, "\nOther tabs in this window:");
            for tab in others {
                let _ = writeln!(out, "- {} ({})", tab.title, tab.url_str());
            }
        }

        let _ = writeln!(out, "\nExisting groups in this window:");
        if self.groups.is_empty() {
            let _ = writeln!(out, "(none)");
        }
        for group in &self.groups {
            let _ = writeln!(
                out,
                "- id {}: \"{}\" ({})",
                group.id, group.title, group.color
            );
        }

        let colors: Vec<&str> = GroupColor::ALL.iter().map(|c| c.as_str()).collect();
        let _ = writeln!(
            out,
            "\nRespond with only a JSON object of this shape:\n\
             {{\"shouldGroup\": true|false, \"groupName\": \"short name\", \
             \"color\": \"<color>\", \"existingGroupId\": <id or null>, \
             \"reasoning\": \"one sentence\"}}\n\
             Use existingGroupId when the tabs fit an existing group. \
             Pick a color from: {}. Prefer red for social media, blue for \
             development or email, purple for work, pink for entertainment, \
             orange for shopping, yellow for news and green for research.",
            colors.join(", ")
        );
        out
    }
}
