//! Static rule classifier.
//!
//! Rules are checked in order and the first match wins. A tab matches a
//! rule when its lowercased hostname or path contains one of the rule's
//! patterns; when no rule matches on the URL, the title is tried against
//! the same patterns.

use url::Url;

use tabgrouper_protocols::{Group, GroupColor, GroupingDecision, Tab};

/// A named, colored group and the substrings that select it.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupingRule {
    pub name: &'static str,
    pub color: GroupColor,
    pub patterns: &'static [&'static str],
}

/// Built-in rules in precedence order.
pub const DEFAULT_RULES: &[GroupingRule] = &[
    GroupingRule {
        name: "Social Media",
        color: GroupColor::Red,
        patterns: &[
            "facebook",
            "twitter",
            "instagram",
            "linkedin",
            "reddit",
            "tiktok",
            "pinterest",
        ],
    },
    GroupingRule {
        name: "Work",
        color: GroupColor::Purple,
        patterns: &[
            "docs.google.com",
            "mail.google.com",
            "calendar.google.com",
            "drive.google.com",
            "slack.com",
            "notion.so",
            "zoom.us",
            "trello.com",
        ],
    },
    GroupingRule {
        name: "Development",
        color: GroupColor::Blue,
        patterns: &[
            "github",
            "gitlab",
            "stackoverflow",
            "bitbucket",
            "developer.mozilla.org",
            "npmjs",
            "docs.rs",
            "crates.io",
        ],
    },
    GroupingRule {
        name: "Entertainment",
        color: GroupColor::Pink,
        patterns: &["youtube", "netflix", "twitch", "spotify", "hulu", "vimeo", "disneyplus"],
    },
    GroupingRule {
        name: "Shopping",
        color: GroupColor::Orange,
        patterns: &["amazon", "ebay", "etsy", "walmart", "aliexpress", "bestbuy"],
    },
    GroupingRule {
        name: "News",
        color: GroupColor::Yellow,
        patterns: &["news", "cnn", "bbc", "nytimes", "theguardian", "reuters", "bloomberg"],
    },
    GroupingRule {
        name: "Research",
        color: GroupColor::Green,
        patterns: &["wikipedia", "scholar.google", "arxiv", "researchgate", "jstor"],
    },
];

/// Pure, ordered pattern matcher.
#[derive(Debug, Clone)]
pub struct RulesClassifier {
    rules: Vec<GroupingRule>,
}

impl Default for RulesClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_RULES.to_vec())
    }
}

impl RulesClassifier {
    pub fn new(rules: Vec<GroupingRule>) -> Self {
        Self { rules }
    }

    /// Classify a single tab against the rules.
    ///
    /// An existing group whose title contains the rule name (ignoring
    /// case) is reused.
    pub fn classify(&self, tab: &Tab, existing_groups: &[Group]) -> GroupingDecision {
        let (host, path) = host_and_path(tab.url_str());
        let title = tab.title.to_lowercase();

        let by_url = self.find(|pattern| host.contains(pattern) || path.contains(pattern));
        let matched = by_url
            .map(|(rule, pattern)| (rule, pattern, "URL"))
            .or_else(|| {
                self.find(|pattern| !title.is_empty() && title.contains(pattern))
                    .map(|(rule, pattern)| (rule, pattern, "title"))
            });

        let Some((rule, pattern, source)) = matched else {
            return GroupingDecision::no_group("No matching rule");
        };

        let name = rule.name.to_lowercase();
        let existing = existing_groups
            .iter()
            .find(|group| group.title.to_lowercase().contains(&name))
            .map(|group| group.id);

        GroupingDecision::new_group(
            rule.name,
            rule.color,
            format!("{} matched '{}' in rule '{}'", source, pattern, rule.name),
        )
        .into_existing(existing)
    }

    fn find(&self, matches: impl Fn(&str) -> bool) -> Option<(&GroupingRule, &'static str)> {
        self.rules.iter().find_map(|rule| {
            rule.patterns
                .iter()
                .find(|pattern| matches(pattern))
                .map(|pattern| (rule, *pattern))
        })
    }
}

/// Lowercased hostname and path, empty when the URL does not parse.
pub(crate) fn host_and_path(url: &str) -> (String, String) {
    match Url::parse(url) {
        Ok(parsed) => (
            parsed.host_str().unwrap_or_default().to_lowercase(),
            parsed.path().to_lowercase(),
        ),
        Err(_) => (String::new(), String::new()),
    }
}

#[cfg(test)]
#[path = "rules_tests.rs"]
mod tests;
