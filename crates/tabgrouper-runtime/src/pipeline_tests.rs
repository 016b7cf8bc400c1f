use super::*;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};

use tabgrouper_protocols::{GroupColor, PromptTransport, ProviderError};

use crate::memory_host::{HostCall, InMemoryBrowser};

struct FakePrompt {
    reply: Result<Option<String>, ProviderError>,
    prompts: Mutex<Vec<String>>,
}

impl FakePrompt {
    fn replying(value: Value) -> Arc<Self> {
        Self::with(Ok(Some(value.to_string())))
    }

    fn with(reply: Result<Option<String>, ProviderError>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn sent(&self) -> usize {
        self.prompts.lock().len()
    }
}

#[async_trait]
impl PromptTransport for FakePrompt {
    async fn send(&self, prompt: &str) -> Result<Option<String>, ProviderError> {
        self.prompts.lock().push(prompt.to_string());
        self.reply.clone()
    }
}

fn setup(prompt: Arc<FakePrompt>) -> (Arc<InMemoryBrowser>, GroupingPipeline) {
    let browser = Arc::new(InMemoryBrowser::new());
    let classifier = Arc::new(RemoteClassifier::new(prompt));
    let pipeline = GroupingPipeline::new(
        HostApis::from_shared(browser.clone()),
        classifier,
        PipelineOptions::default(),
    );
    (browser, pipeline)
}

fn work_tools() -> Value {
    json!({
        "shouldGroup": true,
        "groupName": "Work Tools",
        "color": "purple",
        "existingGroupId": null,
        "reasoning": "Both are productivity tools"
    })
}

#[tokio::test]
async fn test_auto_mode_creates_group() {
    let prompt = FakePrompt::replying(work_tools());
    let (browser, pipeline) = setup(prompt.clone());
    let a = browser.open_tab(1, "https://docs.google.com/document/d/1", "Doc");
    let b = browser.open_tab(1, "https://app.slack.com/client", "Slack");

    pipeline.process_batch(vec![a.clone(), b.clone()]).await;

    assert_eq!(prompt.sent(), 1);
    let groups = browser.groups();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].title, "Work Tools");
    assert_eq!(groups[0].color, GroupColor::Purple);
    assert_eq!(browser.tabs_in_group(groups[0].id), vec![a.id, b.id]);
}

#[tokio::test]
async fn test_existing_group_reused_without_update() {
    let prompt = FakePrompt::replying(json!({
        "shouldGroup": true,
        "groupName": "Development",
        "color": "blue",
        "existingGroupId": 100,
        "reasoning": "Code hosting"
    }));
    let (browser, pipeline) = setup(prompt);
    let group = browser.add_group(1, "Development", GroupColor::Blue);
    assert_eq!(group.id, 100);
    let tab = browser.open_tab(1, "https://github.com/rust-lang/rust", "rust");

    pipeline.process_batch(vec![tab.clone()]).await;

    assert_eq!(
        browser.calls(),
        vec![HostCall::Group {
            tab_ids: vec![tab.id],
            group_id: Some(100),
        }]
    );
    assert_eq!(browser.update_calls(), 0);
    assert_eq!(browser.groups().len(), 1);
}

#[tokio::test]
async fn test_unknown_existing_group_creates_new() {
    let prompt = FakePrompt::replying(json!({
        "shouldGroup": true,
        "groupName": "Development",
        "color": "blue",
        "existingGroupId": 777,
        "reasoning": "Code hosting"
    }));
    let (browser, pipeline) = setup(prompt);
    let tab = browser.open_tab(1, "https://github.com", "GitHub");

    pipeline.process_batch(vec![tab]).await;

    assert_eq!(browser.group_calls(), 1);
    assert_eq!(browser.update_calls(), 1);
    assert_eq!(browser.groups()[0].title, "Development");
}

#[tokio::test]
async fn test_should_not_group_leaves_tabs() {
    let prompt = FakePrompt::replying(json!({
        "shouldGroup": false,
        "reasoning": "Unrelated"
    }));
    let (browser, pipeline) = setup(prompt.clone());
    let tab = browser.open_tab(1, "https://example.com", "Example");

    pipeline.process_batch(vec![tab]).await;

    assert_eq!(prompt.sent(), 1);
    assert!(browser.calls().is_empty());
}

#[tokio::test]
async fn test_manual_mode_waits_for_click() {
    let prompt = FakePrompt::replying(work_tools());
    let (browser, pipeline) = setup(prompt);
    browser.set_setting(keys::GROUPING_MODE, json!("manual"));
    let a = browser.open_tab(1, "https://docs.google.com/document/d/1", "Doc");
    let b = browser.open_tab(1, "https://app.slack.com/client", "Slack");

    pipeline.process_batch(vec![a, b]).await;

    assert!(browser.calls().is_empty());
    let notifications = browser.notifications();
    assert_eq!(notifications.len(), 1);
    let (id, notification) = &notifications[0];
    assert!(notification.message.contains("2 tabs"));
    assert!(notification.message.contains("Work Tools"));
    assert_eq!(pipeline.confirmations().len(), 1);

    assert!(pipeline.handle_notification_click(id).await.unwrap());
    assert_eq!(browser.groups()[0].title, "Work Tools");
    assert_eq!(browser.groups()[0].color, GroupColor::Purple);
    assert!(browser.notifications().is_empty());
    assert!(pipeline.confirmations().is_empty());

    assert!(!pipeline.handle_notification_click(id).await.unwrap());
    assert_eq!(browser.group_calls(), 1);
}

#[tokio::test]
async fn test_click_groups_only_tabs_still_open() {
    let (browser, pipeline) = setup(FakePrompt::replying(work_tools()));
    browser.set_setting(keys::GROUPING_MODE, json!("manual"));
    let a = browser.open_tab(1, "https://docs.google.com/document/d/1", "Doc");
    let b = browser.open_tab(1, "https://app.slack.com/client", "Slack");

    pipeline.process_batch(vec![a.clone(), b.clone()]).await;
    let (id, _) = browser.notifications().remove(0);
    browser.remove_tab(a.id);

    assert!(pipeline.handle_notification_click(&id).await.unwrap());
    assert_eq!(
        browser.calls()[0],
        HostCall::Group {
            tab_ids: vec![b.id],
            group_id: None,
        }
    );
    assert_eq!(browser.tabs_in_group(browser.groups()[0].id), vec![b.id]);
}

#[tokio::test]
async fn test_click_after_all_tabs_closed_groups_nothing() {
    let (browser, pipeline) = setup(FakePrompt::replying(work_tools()));
    browser.set_setting(keys::GROUPING_MODE, json!("manual"));
    let a = browser.open_tab(1, "https://docs.google.com/document/d/1", "Doc");
    let b = browser.open_tab(1, "https://app.slack.com/client", "Slack");

    pipeline.process_batch(vec![a.clone(), b.clone()]).await;
    let (id, _) = browser.notifications().remove(0);
    browser.remove_tab(a.id);
    browser.remove_tab(b.id);

    assert!(!pipeline.handle_notification_click(&id).await.unwrap());
    assert!(browser.calls().is_empty());
    assert!(browser.groups().is_empty());
    assert_eq!(browser.cleared_notifications(), vec![id]);
    assert!(pipeline.confirmations().is_empty());
}

#[tokio::test]
async fn test_click_creates_group_when_suggested_group_was_removed() {
    let prompt = FakePrompt::replying(json!({
        "shouldGroup": true,
        "groupName": "Development",
        "color": "blue",
        "existingGroupId": 100,
        "reasoning": "Code hosting"
    }));
    let (browser, pipeline) = setup(prompt);
    browser.set_setting(keys::GROUPING_MODE, json!("manual"));
    browser.add_group(1, "Development", GroupColor::Blue);
    let tab = browser.open_tab(1, "https://github.com/rust-lang/rust", "rust");

    pipeline.process_batch(vec![tab.clone()]).await;
    let (id, _) = browser.notifications().remove(0);
    browser.remove_group(100);

    assert!(pipeline.handle_notification_click(&id).await.unwrap());
    assert_eq!(
        browser.calls()[0],
        HostCall::Group {
            tab_ids: vec![tab.id],
            group_id: None,
        }
    );
    assert_eq!(browser.update_calls(), 1);
    let groups = browser.groups();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].id, 101);
    assert_eq!(groups[0].title, "Development");
    assert_eq!(browser.tabs_in_group(101), vec![tab.id]);
}

#[tokio::test]
async fn test_unknown_notification_click_ignored() {
    let (browser, pipeline) = setup(FakePrompt::replying(work_tools()));

    assert!(!pipeline.handle_notification_click("something-else").await.unwrap());
    assert!(browser.calls().is_empty());
    assert!(browser.cleared_notifications().is_empty());
}

#[tokio::test]
async fn test_remote_error_falls_back_to_rules() {
    let prompt = FakePrompt::with(Err(ProviderError::ApiError {
        status: 500,
        message: "boom".into(),
    }));
    let (browser, pipeline) = setup(prompt);
    let tab = browser.open_tab(1, "https://www.reddit.com/r/rust", "r/rust");

    pipeline.process_batch(vec![tab]).await;

    let groups = browser.groups();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].title, "Social Media");
    assert_eq!(groups[0].color, GroupColor::Red);
}

#[tokio::test]
async fn test_fallback_in_manual_mode_only_suggests() {
    let prompt = FakePrompt::with(Err(ProviderError::Network("down".into())));
    let (browser, pipeline) = setup(prompt);
    browser.set_setting(keys::GROUPING_MODE, json!("manual"));
    let tab = browser.open_tab(1, "https://github.com", "GitHub");

    pipeline.process_batch(vec![tab]).await;

    assert!(browser.calls().is_empty());
    assert_eq!(browser.notifications().len(), 1);
    assert!(browser.notifications()[0].1.message.contains("Development"));
}

#[tokio::test]
async fn test_fallback_without_rule_does_nothing() {
    let prompt = FakePrompt::with(Err(ProviderError::Network("down".into())));
    let (browser, pipeline) = setup(prompt);
    let tab = browser.open_tab(1, "https://example.org", "Example");

    pipeline.process_batch(vec![tab]).await;

    assert!(browser.calls().is_empty());
    assert!(browser.notifications().is_empty());
}

#[tokio::test]
async fn test_paused_skips_batch() {
    let prompt = FakePrompt::replying(work_tools());
    let (browser, pipeline) = setup(prompt.clone());
    browser.set_setting(keys::GROUPING_PAUSED, json!(true));
    let tab = browser.open_tab(1, "https://docs.google.com", "Doc");

    pipeline.process_batch(vec![tab]).await;

    assert_eq!(prompt.sent(), 0);
    assert!(browser.calls().is_empty());
}

#[tokio::test]
async fn test_disabled_skips_batch() {
    let prompt = FakePrompt::replying(work_tools());
    let (browser, pipeline) = setup(prompt.clone());
    browser.set_setting(keys::GROUPING_MODE, json!("disabled"));
    let tab = browser.open_tab(1, "https://docs.google.com", "Doc");

    pipeline.process_batch(vec![tab]).await;

    assert_eq!(prompt.sent(), 0);
    assert!(browser.calls().is_empty());
}

#[tokio::test]
async fn test_mode_falls_back_to_default() {
    let (browser, pipeline) = setup(FakePrompt::replying(work_tools()));
    assert_eq!(pipeline.mode().await, (GroupingMode::Auto, false));

    browser.set_setting(keys::GROUPING_MODE, json!("sometimes"));
    assert_eq!(pipeline.mode().await, (GroupingMode::Auto, false));

    browser.set_setting(keys::GROUPING_MODE, json!("manual"));
    browser.set_setting(keys::GROUPING_PAUSED, json!(true));
    assert_eq!(pipeline.mode().await, (GroupingMode::Manual, true));
}

#[tokio::test]
async fn test_closed_tabs_dropped_before_classification() {
    let prompt = FakePrompt::replying(work_tools());
    let (browser, pipeline) = setup(prompt.clone());
    let a = browser.open_tab(1, "https://docs.google.com", "Doc");
    let b = browser.open_tab(1, "https://slack.com", "Slack");
    browser.remove_tab(a.id);

    pipeline.process_batch(vec![a, b.clone()]).await;

    assert_eq!(
        browser.calls()[0],
        HostCall::Group {
            tab_ids: vec![b.id],
            group_id: None,
        }
    );
}

#[tokio::test]
async fn test_all_tabs_closed_skips_classification() {
    let prompt = FakePrompt::replying(work_tools());
    let (browser, pipeline) = setup(prompt.clone());
    let a = browser.open_tab(1, "https://docs.google.com", "Doc");
    browser.remove_tab(a.id);

    pipeline.process_batch(vec![a]).await;

    assert_eq!(prompt.sent(), 0);
    assert!(browser.calls().is_empty());
}

#[tokio::test]
async fn test_tabs_grouped_meanwhile_are_skipped() {
    let prompt = FakePrompt::replying(work_tools());
    let (browser, pipeline) = setup(prompt.clone());
    let a = browser.open_tab(1, "https://docs.google.com", "Doc");
    browser.put_tab(a.clone().with_group(5));

    pipeline.process_batch(vec![a]).await;

    assert_eq!(prompt.sent(), 0);
}

#[tokio::test]
async fn test_content_included_when_available() {
    let prompt = FakePrompt::replying(work_tools());
    let (browser, pipeline) = setup(prompt.clone());
    let a = browser.open_tab(1, "https://docs.google.com", "Doc");
    let b = browser.open_tab(1, "https://slack.com", "Slack");
    browser.set_content(
        a.id,
        PageContent {
            description: "Quarterly planning notes".into(),
            ..Default::default()
        },
    );

    pipeline.process_batch(vec![a, b]).await;

    let prompts = prompt.prompts.lock();
    assert!(prompts[0].contains("Quarterly planning notes"));
    assert_eq!(browser.groups().len(), 1);
}

#[tokio::test]
async fn test_host_rejection_is_contained() {
    let prompt = FakePrompt::replying(work_tools());
    let (browser, pipeline) = setup(prompt);
    browser.set_reject_grouping(true);
    let tab = browser.open_tab(1, "https://github.com", "GitHub");

    pipeline.process_batch(vec![tab]).await;

    assert!(browser.groups().is_empty());
    assert!(browser.group_calls() >= 1);
}

#[tokio::test]
async fn test_mock_mode_skips_transport() {
    let prompt = FakePrompt::replying(work_tools());
    let (browser, pipeline) = setup(prompt.clone());
    pipeline.classifier().set_mock(true);
    let a = browser.open_tab(1, "https://www.facebook.com", "Facebook");
    let b = browser.open_tab(1, "https://twitter.com/home", "Home");

    pipeline.process_batch(vec![a, b]).await;

    assert_eq!(prompt.sent(), 0);
    let groups = browser.groups();
    assert_eq!(groups[0].title, "Social Media");
    assert_eq!(groups[0].color, GroupColor::Red);
    assert_eq!(browser.tabs_in_group(groups[0].id).len(), 2);
}

#[tokio::test]
async fn test_execute_grouping_blank_name_uses_default() {
    let (browser, pipeline) = setup(FakePrompt::replying(work_tools()));
    let tab = browser.open_tab(1, "https://a.com", "A");
    let decision = GroupingDecision {
        should_group: true,
        ..Default::default()
    };

    let group_id = pipeline.execute_grouping(&[tab], &decision).await.unwrap();

    let group = browser.find_group(group_id).unwrap();
    assert_eq!(group.title, "Uncategorized");
    assert_eq!(group.color, GroupColor::Grey);
}
