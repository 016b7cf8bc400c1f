//! Subcommands that exercise the remote classifier and the engine.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use serde_json::Value;
use tracing::info;

use tabgrouper_config::Config;
use tabgrouper_protocols::{GroupingMode, HostApis, Tab, keys};
use tabgrouper_providers::{LlmClient, ReqwestTransport};
use tabgrouper_runtime::{
    BatchContext, ControlMessage, Engine, EngineHandle, HostEvent, InMemoryBrowser,
    RemoteClassifier,
};

const SIMULATION_WINDOW: i64 = 1;
const IDLE_POLL: Duration = Duration::from_millis(50);
const IDLE_TIMEOUT: Duration = Duration::from_secs(120);

fn build_client(config: &Config) -> anyhow::Result<Arc<LlmClient>> {
    let transport = ReqwestTransport::new().context("Failed to create HTTP client")?;
    Ok(Arc::new(LlmClient::from_config(config, Arc::new(transport))))
}

fn batch_tabs(urls: &[String]) -> Vec<Tab> {
    urls.iter()
        .enumerate()
        .map(|(i, url)| Tab::new(i as i64 + 1, SIMULATION_WINDOW, url.as_str(), ""))
        .collect()
}

/// One remote classification for the given URLs.
pub(crate) async fn suggest(config: &Config, urls: &[String]) -> anyhow::Result<()> {
    let client = build_client(config)?;
    let mock = config.llm.mock_when_unconfigured && !client.has_credentials();

    let classifier = RemoteClassifier::new(client);
    classifier.set_mock(mock);

    let tabs = batch_tabs(urls);
    let context = BatchContext::new(tabs.clone(), tabs, Vec::new());
    let decision = classifier.classify_batch(&context).await;
    println!("{}", serde_json::to_string_pretty(&decision)?);
    Ok(())
}

/// Drive the full engine over an in-memory browser and print the outcome.
pub(crate) async fn simulate(
    config: &Config,
    urls: &[String],
    mode: GroupingMode,
    accept: bool,
) -> anyhow::Result<()> {
    let browser = Arc::new(InMemoryBrowser::new());
    browser.set_setting(keys::GROUPING_MODE, Value::from(mode.as_str()));

    let client = build_client(config)?;
    let (handle, task) = Engine::spawn(config, HostApis::from_shared(browser.clone()), client);

    for url in urls {
        let tab = browser.open_tab(SIMULATION_WINDOW, url, "");
        handle.dispatch(HostEvent::TabCreated(tab))?;
    }
    handle.send(ControlMessage::GroupNow).await?;
    wait_idle(&handle).await?;

    if accept {
        for (id, _) in browser.notifications() {
            info!("Accepting suggestion {}", id);
            handle.dispatch(HostEvent::NotificationClicked(id))?;
        }
        wait_idle(&handle).await?;
    }

    handle.shutdown()?;
    task.await.context("Engine task failed")?;

    print_browser(&browser);
    Ok(())
}

async fn wait_idle(handle: &EngineHandle) -> anyhow::Result<()> {
    let poll = async {
        loop {
            let reply = handle.send(ControlMessage::Status).await?;
            if let Some(status) = reply.status {
                if status.pending_tabs == 0 && status.in_flight == 0 {
                    return anyhow::Ok(());
                }
            }
            tokio::time::sleep(IDLE_POLL).await;
        }
    };
    match tokio::time::timeout(IDLE_TIMEOUT, poll).await {
        Ok(result) => result,
        Err(_) => bail!("Timed out waiting for the engine to settle"),
    }
}

fn print_browser(browser: &InMemoryBrowser) {
    let tabs = browser.tabs();

    println!("Groups:");
    for group in browser.groups() {
        println!("  [{}] {} ({})", group.id, group.title, group.color);
        for tab in tabs.iter().filter(|t| t.group_id == Some(group.id)) {
            println!("    - {}", tab.url_str());
        }
    }

    let ungrouped: Vec<&Tab> = tabs.iter().filter(|t| !t.is_grouped()).collect();
    if !ungrouped.is_empty() {
        println!("Ungrouped:");
        for tab in ungrouped {
            println!("    - {}", tab.url_str());
        }
    }

    let notifications = browser.notifications();
    if !notifications.is_empty() {
        println!("Pending suggestions:");
        for (id, notification) in notifications {
            println!("  {}: {}", id, notification.message);
        }
    }
}
