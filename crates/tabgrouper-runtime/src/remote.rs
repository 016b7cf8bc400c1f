//! Remote classifier with an offline mock mode.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use tabgrouper_protocols::{
    Group, GroupColor, GroupingDecision, PromptTransport, ProviderError, Tab,
};

use crate::decision::{interpret, normalize};
use crate::prompt::BatchContext;
use crate::rules::host_and_path;

/// Hostname keywords for the offline classifier, in precedence order.
const MOCK_CATEGORIES: &[(&str, GroupColor, &[&str])] = &[
    (
        "Social Media",
        GroupColor::Red,
        &["facebook", "twitter", "instagram", "linkedin", "reddit", "tiktok"],
    ),
    ("Email", GroupColor::Blue, &["mail", "gmail", "outlook"]),
    (
        "Entertainment",
        GroupColor::Pink,
        &["youtube", "netflix", "twitch", "vimeo", "hulu", "spotify"],
    ),
];

/// Classifies whole batches through a prompt transport.
pub struct RemoteClassifier {
    transport: Arc<dyn PromptTransport>,
    mock: AtomicBool,
}

impl RemoteClassifier {
    pub fn new(transport: Arc<dyn PromptTransport>) -> Self {
        Self {
            transport,
            mock: AtomicBool::new(false),
        }
    }

    pub fn is_mock(&self) -> bool {
        self.mock.load(Ordering::SeqCst)
    }

    pub fn set_mock(&self, mock: bool) {
        if self.mock.swap(mock, Ordering::SeqCst) != mock {
            info!("Mock mode {}", if mock { "enabled" } else { "disabled" });
        }
    }

    /// Classify a batch, surfacing transport failures.
    pub async fn try_classify_batch(
        &self,
        context: &BatchContext,
    ) -> Result<GroupingDecision, ProviderError> {
        if self.is_mock() {
            let decision = mock_decision(&context.tabs, &context.groups);
            debug!("Mock decision: {:?}", decision);
            return Ok(decision);
        }

        let prompt = context.prompt();
        let decision = match self.transport.send(&prompt).await? {
            Some(text) => interpret(&text),
            None => {
                warn!("Provider returned no usable content");
                GroupingDecision::no_group("No usable content in LLM response")
            }
        };
        let (decision, _) = normalize(decision, &context.groups);
        Ok(decision)
    }

    /// Classify a batch. Failures become a decision not to group.
    pub async fn classify_batch(&self, context: &BatchContext) -> GroupingDecision {
        match self.try_classify_batch(context).await {
            Ok(decision) => decision,
            Err(e) => GroupingDecision::no_group(format!("LLM API Error: {}", e)),
        }
    }
}

/// Offline decision from hostname keywords of the first matching tab.
pub fn mock_decision(tabs: &[Tab], groups: &[Group]) -> GroupingDecision {
    let matched = tabs.iter().find_map(|tab| {
        let (host, _) = host_and_path(tab.url_str());
        MOCK_CATEGORIES
            .iter()
            .find(|(_, _, keywords)| keywords.iter().any(|k| host.contains(k)))
    });

    let Some((name, color, _)) = matched else {
        return GroupingDecision::no_group("Mock mode: no recognizable category");
    };

    let existing = groups
        .iter()
        .find(|g| g.title.eq_ignore_ascii_case(name))
        .map(|g| g.id);

    GroupingDecision::new_group(
        *name,
        *color,
        format!("Mock mode: hostname suggests {}", name),
    )
    .into_existing(existing)
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
