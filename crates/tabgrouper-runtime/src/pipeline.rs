//! Grouping pipeline: mode routing, classification, fallback and
//! application of decisions.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, error, info, warn};

use tabgrouper_config::Config;
use tabgrouper_protocols::{
    GroupId, GroupUpdate, GroupingDecision, GroupingMode, HostApis, PageContent, Tab, TabId, keys,
};

use crate::batch::is_processable;
use crate::confirmations::{Confirmations, PendingConfirmation, suggestion_notification};
use crate::decision::normalize;
use crate::error::PipelineError;
use crate::prompt::BatchContext;
use crate::remote::RemoteClassifier;
use crate::rules::RulesClassifier;

/// Static pipeline options.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Mode used when the settings store has none.
    pub default_mode: GroupingMode,
    pub extract_content: bool,
    pub notification_icon: String,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl PipelineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            default_mode: config.grouping.default_mode,
            extract_content: config.grouping.extract_content,
            notification_icon: config.grouping.notification_icon.clone(),
        }
    }
}

/// Turns a flushed batch into host group changes.
///
/// Nothing here returns an error to the caller: failures are logged and
/// trigger the rule-based fallback.
pub struct GroupingPipeline {
    host: HostApis,
    classifier: Arc<RemoteClassifier>,
    rules: RulesClassifier,
    confirmations: Arc<Confirmations>,
    options: PipelineOptions,
}

impl GroupingPipeline {
    pub fn new(host: HostApis, classifier: Arc<RemoteClassifier>, options: PipelineOptions) -> Self {
        Self {
            host,
            classifier,
            rules: RulesClassifier::default(),
            confirmations: Arc::new(Confirmations::new()),
            options,
        }
    }

    pub fn classifier(&self) -> &Arc<RemoteClassifier> {
        &self.classifier
    }

    pub fn confirmations(&self) -> &Arc<Confirmations> {
        &self.confirmations
    }

    pub fn host(&self) -> &HostApis {
        &self.host
    }

    /// Current mode and paused flag from the settings store.
    pub async fn mode(&self) -> (GroupingMode, bool) {
        let mode = match self.host.settings.get_string(keys::GROUPING_MODE).await {
            Ok(Some(value)) => value.parse().unwrap_or_else(|_| {
                warn!("Unknown grouping mode '{}', using {}", value, self.options.default_mode);
                self.options.default_mode
            }),
            Ok(None) => self.options.default_mode,
            Err(e) => {
                warn!("Failed to read grouping mode: {}", e);
                self.options.default_mode
            }
        };

        let paused = match self.host.settings.get_bool(keys::GROUPING_PAUSED).await {
            Ok(paused) => paused.unwrap_or(false),
            Err(e) => {
                warn!("Failed to read paused flag: {}", e);
                false
            }
        };

        (mode, paused)
    }

    /// Re-fetch each tab and keep those that still exist and are processable.
    pub async fn revalidate(&self, tabs: Vec<Tab>) -> Vec<Tab> {
        let mut live = Vec::with_capacity(tabs.len());
        for tab in tabs {
            match self.host.tabs.get_tab(tab.id).await {
                Ok(current) if is_processable(&current) => live.push(current),
                Ok(_) => debug!("Tab {} is no longer processable", tab.id),
                Err(e) => debug!("Dropping tab {}: {}", tab.id, e),
            }
        }
        live
    }

    /// Revalidate a flushed batch and group what survives.
    pub async fn process_batch(&self, tabs: Vec<Tab>) {
        let flushed = tabs.len();
        let live = self.revalidate(tabs).await;
        if live.is_empty() {
            debug!("No live tabs left in batch of {}", flushed);
            return;
        }
        self.analyze_and_group(live).await;
    }

    /// Classify a batch and act on the decision according to the mode.
    pub async fn analyze_and_group(&self, tabs: Vec<Tab>) {
        if tabs.is_empty() {
            return;
        }

        let (mode, paused) = self.mode().await;
        if paused {
            info!("Grouping paused, skipping batch of {} tab(s)", tabs.len());
            return;
        }
        if mode == GroupingMode::Disabled {
            info!("Grouping disabled, skipping batch of {} tab(s)", tabs.len());
            return;
        }

        if let Err(e) = self.try_analyze(mode, &tabs).await {
            warn!("Grouping failed, falling back to rules: {}", e);
            if let Err(e) = self.fallback(mode, &tabs).await {
                error!("Fallback grouping failed: {}", e);
            }
        }
    }

    async fn try_analyze(&self, mode: GroupingMode, tabs: &[Tab]) -> Result<(), PipelineError> {
        let window_id = tabs[0].window_id;
        let window_tabs = self.host.tabs.tabs_in_window(window_id).await?;
        let groups = self.host.groups.groups_in_window(window_id).await?;
        let contents = if self.options.extract_content {
            self.extract_contents(tabs).await
        } else {
            Vec::new()
        };

        let context = BatchContext::new(tabs.to_vec(), window_tabs, groups).with_contents(contents);
        let decision = self.classifier.try_classify_batch(&context).await?;
        if !decision.should_group {
            info!("Not grouping {} tab(s): {}", tabs.len(), decision.reasoning);
            return Ok(());
        }
        self.route(mode, tabs, decision).await
    }

    async fn extract_contents(&self, tabs: &[Tab]) -> Vec<Option<PageContent>> {
        let results = join_all(tabs.iter().map(|tab| self.host.content.extract(tab.id))).await;
        results
            .into_iter()
            .zip(tabs)
            .map(|(result, tab)| match result {
                Ok(content) => Some(content),
                Err(e) => {
                    debug!("No content for tab {}: {}", tab.id, e);
                    None
                }
            })
            .collect()
    }

    async fn fallback(&self, mode: GroupingMode, tabs: &[Tab]) -> Result<(), PipelineError> {
        let first = &tabs[0];
        let groups = self
            .host
            .groups
            .groups_in_window(first.window_id)
            .await
            .unwrap_or_else(|e| {
                warn!("Failed to query groups for fallback: {}", e);
                Vec::new()
            });

        let decision = self.rules.classify(first, &groups);
        if !decision.should_group {
            info!("Fallback found no rule for tab {}", first.id);
            return Ok(());
        }
        info!("Fallback decision: {} ({})", decision.display_name(), decision.reasoning);
        self.route(mode, tabs, decision).await
    }

    async fn route(
        &self,
        mode: GroupingMode,
        tabs: &[Tab],
        decision: GroupingDecision,
    ) -> Result<(), PipelineError> {
        if mode == GroupingMode::Manual {
            return self.request_confirmation(tabs, decision).await;
        }

        let live = self.revalidate(tabs.to_vec()).await;
        if live.is_empty() {
            info!("All tabs closed before grouping, discarding decision");
            return Ok(());
        }
        self.execute_grouping(&live, &decision).await.map(|_| ())
    }

    /// Apply a decision to the host.
    ///
    /// With an existing group id the tabs join that group and nothing is
    /// renamed. Otherwise a new group is created, then titled and colored.
    pub async fn execute_grouping(
        &self,
        tabs: &[Tab],
        decision: &GroupingDecision,
    ) -> Result<GroupId, PipelineError> {
        let ids: Vec<TabId> = tabs.iter().map(|t| t.id).collect();

        if let Some(existing) = decision.existing_group_id {
            let group_id = self.host.tabs.group(&ids, Some(existing)).await?;
            info!("Added {} tab(s) to existing group {}", ids.len(), group_id);
            return Ok(group_id);
        }

        let group_id = self.host.tabs.group(&ids, None).await?;
        let update = GroupUpdate {
            title: Some(decision.display_name().to_string()),
            color: Some(decision.effective_color()),
        };
        self.host.groups.update(group_id, update).await?;
        info!(
            "Created group {} \"{}\" with {} tab(s)",
            group_id,
            decision.display_name(),
            ids.len()
        );
        Ok(group_id)
    }

    async fn request_confirmation(
        &self,
        tabs: &[Tab],
        decision: GroupingDecision,
    ) -> Result<(), PipelineError> {
        let notification =
            suggestion_notification(tabs.len(), &decision, &self.options.notification_icon);
        let id = self.confirmations.insert(tabs.to_vec(), decision);

        if let Err(e) = self.host.notifier.create(&id, notification).await {
            self.confirmations.take(&id);
            return Err(e.into());
        }
        info!("Suggested grouping {} tab(s), awaiting confirmation {}", tabs.len(), id);
        Ok(())
    }

    /// Apply the suggestion behind a clicked notification.
    ///
    /// Returns whether any tabs were grouped: `false` for unknown ids and
    /// for suggestions whose tabs have all been closed or grouped since.
    /// The entry is removed before the decision is applied, so a second
    /// click is a no-op.
    pub async fn handle_notification_click(&self, notification_id: &str) -> Result<bool, PipelineError> {
        let Some(pending) = self.confirmations.take(notification_id) else {
            debug!("Ignoring click on unknown notification {}", notification_id);
            return Ok(false);
        };

        let result = self.apply_confirmation(pending).await;
        if let Err(e) = self.host.notifier.clear(notification_id).await {
            warn!("Failed to clear notification {}: {}", notification_id, e);
        }
        result
    }

    /// Refetch the suggested tabs and re-check the decision against the
    /// window's current groups before applying it.
    async fn apply_confirmation(&self, pending: PendingConfirmation) -> Result<bool, PipelineError> {
        let suggested = pending.tabs.len();
        let live = self.revalidate(pending.tabs).await;
        let Some(first) = live.first() else {
            info!("All {} suggested tab(s) are gone, discarding suggestion", suggested);
            return Ok(false);
        };

        let groups = self.host.groups.groups_in_window(first.window_id).await?;
        let (decision, issues) = normalize(pending.decision, &groups);
        for issue in &issues {
            debug!("Adjusted suggestion field {}: {}", issue.field, issue.message);
        }
        if live.len() < suggested {
            debug!("Applying suggestion to {} of {} tab(s)", live.len(), suggested);
        }
        self.execute_grouping(&live, &decision).await?;
        Ok(true)
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
