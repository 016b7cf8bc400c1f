//! Event-loop engine.
//!
//! One task owns the batch scheduler and consumes host events, control
//! messages and debounce firings in arrival order. Each event is handled
//! to completion before the next; batch processing and notification
//! clicks run as spawned tasks so rate-limit waits never stall scheduling.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

use tabgrouper_config::Config;
use tabgrouper_protocols::{GroupingMode, HostApis, Tab, TabId, keys};
use tabgrouper_providers::LlmClient;

use crate::batch::{BatchScheduler, FlushSignal};
use crate::error::EngineError;
use crate::pipeline::{GroupingPipeline, PipelineOptions};
use crate::remote::RemoteClassifier;

/// Lifecycle events raised by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    TabCreated(Tab),
    /// A tab changed. Only updates that finish loading schedule analysis.
    TabUpdated { tab: Tab, status_complete: bool },
    TabRemoved(TabId),
    NotificationClicked(String),
}

/// Messages from the settings surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ControlMessage {
    UpdateApiKey {
        #[serde(rename = "apiKey", default)]
        api_key: Option<String>,
        #[serde(rename = "llmProvider", default)]
        llm_provider: Option<String>,
    },
    UpdateGroupingMode {
        mode: GroupingMode,
    },
    UpdateLlmProvider {
        provider: String,
    },
    ProbeEnvKey {
        provider: String,
    },
    SetGroupingPaused {
        paused: bool,
    },
    GroupNow,
    Status,
}

/// Snapshot reported by [`ControlMessage::Status`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStatus {
    pub pending_tabs: usize,
    pub pending_confirmations: usize,
    /// Batches and confirmed suggestions still being applied.
    pub in_flight: usize,
    pub mock_mode: bool,
    pub provider: String,
}

/// Acknowledgement for a control message.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlReply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub present: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EngineStatus>,
}

impl ControlReply {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }

    fn with_present(present: bool) -> Self {
        Self {
            present: Some(present),
            ..Self::ok()
        }
    }

    fn with_status(status: EngineStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::ok()
        }
    }
}

/// Everything the engine loop consumes.
#[derive(Debug)]
pub enum EngineEvent {
    Host(HostEvent),
    Control(ControlMessage, oneshot::Sender<ControlReply>),
    Shutdown,
}

/// Cloneable sender side of a running engine.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    tx: UnboundedSender<EngineEvent>,
}

impl EngineHandle {
    /// Deliver a host event.
    pub fn dispatch(&self, event: HostEvent) -> Result<(), EngineError> {
        self.tx
            .send(EngineEvent::Host(event))
            .map_err(|_| EngineError::ChannelClosed)
    }

    /// Send a control message and wait for its reply.
    pub async fn send(&self, message: ControlMessage) -> Result<ControlReply, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(EngineEvent::Control(message, reply_tx))
            .map_err(|_| EngineError::ChannelClosed)?;
        reply_rx.await.map_err(|_| EngineError::ChannelClosed)
    }

    /// Ask the engine to stop once in-flight work completes.
    pub fn shutdown(&self) -> Result<(), EngineError> {
        self.tx
            .send(EngineEvent::Shutdown)
            .map_err(|_| EngineError::ChannelClosed)
    }
}

/// The tab grouping engine.
pub struct Engine {
    pipeline: Arc<GroupingPipeline>,
    client: Arc<LlmClient>,
    scheduler: BatchScheduler,
    events: UnboundedReceiver<EngineEvent>,
    flushes: UnboundedReceiver<FlushSignal>,
    in_flight: JoinSet<()>,
    mock_when_unconfigured: bool,
}

impl Engine {
    pub fn new(config: &Config, host: HostApis, client: Arc<LlmClient>) -> (Self, EngineHandle) {
        let (tx, events) = mpsc::unbounded_channel();
        let (flush_tx, flushes) = mpsc::unbounded_channel();

        let classifier = Arc::new(RemoteClassifier::new(client.clone()));
        let pipeline = GroupingPipeline::new(host, classifier, PipelineOptions::from_config(config));
        let scheduler = BatchScheduler::new(config.batching.delay(), config.batching.scope, flush_tx);

        let engine = Self {
            pipeline: Arc::new(pipeline),
            client,
            scheduler,
            events,
            flushes,
            in_flight: JoinSet::new(),
            mock_when_unconfigured: config.llm.mock_when_unconfigured,
        };
        (engine, EngineHandle { tx })
    }

    /// Build an engine and run it on a new task.
    pub fn spawn(
        config: &Config,
        host: HostApis,
        client: Arc<LlmClient>,
    ) -> (EngineHandle, JoinHandle<()>) {
        let (engine, handle) = Self::new(config, host, client);
        (handle, tokio::spawn(engine.run()))
    }

    /// Run until shutdown is requested or every handle is dropped.
    pub async fn run(mut self) {
        self.load_settings().await;
        info!(
            "Engine started (provider: {}, mock: {})",
            self.client.provider_id(),
            self.pipeline.classifier().is_mock()
        );

        loop {
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(EngineEvent::Host(event)) => self.handle_host_event(event),
                    Some(EngineEvent::Control(message, reply)) => {
                        let response = self.handle_control(message).await;
                        if reply.send(response).is_err() {
                            debug!("Control reply dropped by sender");
                        }
                    }
                    Some(EngineEvent::Shutdown) | None => break,
                },
                Some(signal) = self.flushes.recv() => self.handle_flush(signal),
                Some(result) = self.in_flight.join_next(), if !self.in_flight.is_empty() => {
                    log_task_result(result);
                }
            }
        }

        let dropped = self.scheduler.pending_count();
        if dropped > 0 {
            info!("Discarding {} pending tab(s) on shutdown", dropped);
        }
        while let Some(result) = self.in_flight.join_next().await {
            log_task_result(result);
        }
        info!("Engine stopped");
    }

    /// Apply stored credentials and provider, then decide mock mode.
    async fn load_settings(&mut self) {
        let settings = self.pipeline.host().settings.clone();

        match settings.get_string(keys::LLM_PROVIDER).await {
            Ok(Some(provider)) if !provider.trim().is_empty() => {
                if let Err(e) = self.client.set_provider(&provider) {
                    warn!("Ignoring stored provider: {}", e);
                }
            }
            Ok(_) => {}
            Err(e) => warn!("Failed to read stored provider: {}", e),
        }

        match settings.get_string(keys::API_KEY).await {
            Ok(Some(key)) if !key.trim().is_empty() => {
                if let Err(e) = self.client.update_credentials(Some(key), None) {
                    warn!("Ignoring stored API key: {}", e);
                }
            }
            Ok(_) => {}
            Err(e) => warn!("Failed to read stored API key: {}", e),
        }

        self.refresh_mock();
    }

    fn refresh_mock(&self) {
        let mock = self.mock_when_unconfigured && !self.client.has_credentials();
        self.pipeline.classifier().set_mock(mock);
    }

    fn handle_host_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::TabCreated(tab) => {
                self.scheduler.schedule(tab);
            }
            HostEvent::TabUpdated {
                tab,
                status_complete,
            } => {
                if status_complete {
                    self.scheduler.schedule(tab);
                }
            }
            HostEvent::TabRemoved(tab_id) => {
                if self.scheduler.evict(tab_id) {
                    debug!("Evicted closed tab {} from pending batch", tab_id);
                }
            }
            HostEvent::NotificationClicked(id) => {
                let pipeline = self.pipeline.clone();
                self.in_flight.spawn(async move {
                    if let Err(e) = pipeline.handle_notification_click(&id).await {
                        error!("Failed to apply confirmed grouping {}: {}", id, e);
                    }
                });
            }
        }
    }

    fn handle_flush(&mut self, signal: FlushSignal) {
        match self.scheduler.take(signal) {
            Some(tabs) => self.spawn_batch(tabs),
            None => debug!("Ignoring stale flush for {:?}", signal.key),
        }
    }

    fn spawn_batch(&mut self, tabs: Vec<Tab>) {
        debug!("Flushing batch of {} tab(s)", tabs.len());
        let pipeline = self.pipeline.clone();
        self.in_flight
            .spawn(async move { pipeline.process_batch(tabs).await });
    }

    async fn handle_control(&mut self, message: ControlMessage) -> ControlReply {
        let settings = self.pipeline.host().settings.clone();

        match message {
            ControlMessage::UpdateApiKey {
                api_key,
                llm_provider,
            } => {
                if let Err(e) = self
                    .client
                    .update_credentials(api_key.clone(), llm_provider.as_deref())
                {
                    return ControlReply::failed(e.to_string());
                }
                self.refresh_mock();

                if let Some(key) = api_key {
                    let stored = Value::from(key);
                    if let Err(e) = settings.set(keys::API_KEY, stored).await {
                        return ControlReply::failed(e.to_string());
                    }
                }
                if llm_provider.is_some() {
                    let provider = Value::from(self.client.provider_id());
                    if let Err(e) = settings.set(keys::LLM_PROVIDER, provider).await {
                        return ControlReply::failed(e.to_string());
                    }
                }
                ControlReply::ok()
            }
            ControlMessage::UpdateGroupingMode { mode } => {
                match settings.set(keys::GROUPING_MODE, Value::from(mode.as_str())).await {
                    Ok(()) => {
                        info!("Grouping mode set to {}", mode);
                        ControlReply::ok()
                    }
                    Err(e) => ControlReply::failed(e.to_string()),
                }
            }
            ControlMessage::UpdateLlmProvider { provider } => {
                if let Err(e) = self.client.set_provider(&provider) {
                    return ControlReply::failed(e.to_string());
                }
                self.refresh_mock();
                let provider = Value::from(self.client.provider_id());
                match settings.set(keys::LLM_PROVIDER, provider).await {
                    Ok(()) => ControlReply::ok(),
                    Err(e) => ControlReply::failed(e.to_string()),
                }
            }
            ControlMessage::ProbeEnvKey { provider } => {
                ControlReply::with_present(self.client.probe_env_key(&provider))
            }
            ControlMessage::SetGroupingPaused { paused } => {
                match settings.set(keys::GROUPING_PAUSED, Value::from(paused)).await {
                    Ok(()) => {
                        info!("Grouping {}", if paused { "paused" } else { "resumed" });
                        ControlReply::ok()
                    }
                    Err(e) => ControlReply::failed(e.to_string()),
                }
            }
            ControlMessage::GroupNow => {
                let batches = self.scheduler.take_all();
                info!("Grouping {} pending batch(es) now", batches.len());
                for tabs in batches {
                    self.spawn_batch(tabs);
                }
                ControlReply::ok()
            }
            ControlMessage::Status => ControlReply::with_status(EngineStatus {
                pending_tabs: self.scheduler.pending_count(),
                pending_confirmations: self.pipeline.confirmations().len(),
                in_flight: self.in_flight.len(),
                mock_mode: self.pipeline.classifier().is_mock(),
                provider: self.client.provider_id(),
            }),
        }
    }
}

fn log_task_result(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        error!("Grouping task failed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_control_message_from_json() {
        let message: ControlMessage = serde_json::from_value(json!({
            "action": "updateApiKey",
            "apiKey": "sk-1",
            "llmProvider": "anthropic"
        }))
        .unwrap();
        assert_eq!(
            message,
            ControlMessage::UpdateApiKey {
                api_key: Some("sk-1".into()),
                llm_provider: Some("anthropic".into()),
            }
        );

        let message: ControlMessage =
            serde_json::from_value(json!({"action": "updateGroupingMode", "mode": "manual"}))
                .unwrap();
        assert_eq!(
            message,
            ControlMessage::UpdateGroupingMode {
                mode: GroupingMode::Manual
            }
        );

        let message: ControlMessage =
            serde_json::from_value(json!({"action": "probeEnvKey", "provider": "gemini"})).unwrap();
        assert!(matches!(message, ControlMessage::ProbeEnvKey { .. }));

        let message: ControlMessage = serde_json::from_value(json!({"action": "groupNow"})).unwrap();
        assert_eq!(message, ControlMessage::GroupNow);
    }

    #[test]
    fn test_update_api_key_fields_optional() {
        let message: ControlMessage =
            serde_json::from_value(json!({"action": "updateApiKey"})).unwrap();
        assert_eq!(
            message,
            ControlMessage::UpdateApiKey {
                api_key: None,
                llm_provider: None,
            }
        );
    }

    #[test]
    fn test_unknown_action_rejected() {
        let result: Result<ControlMessage, _> =
            serde_json::from_value(json!({"action": "reboot"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_reply_serialization() {
        assert_eq!(
            serde_json::to_value(ControlReply::ok()).unwrap(),
            json!({"success": true})
        );
        assert_eq!(
            serde_json::to_value(ControlReply::with_present(false)).unwrap(),
            json!({"success": true, "present": false})
        );
        assert_eq!(
            serde_json::to_value(ControlReply::failed("nope")).unwrap(),
            json!({"success": false, "error": "nope"})
        );

        let status = ControlReply::with_status(EngineStatus {
            pending_tabs: 2,
            pending_confirmations: 1,
            in_flight: 0,
            mock_mode: true,
            provider: "openai".into(),
        });
        assert_eq!(
            serde_json::to_value(status).unwrap()["status"],
            json!({
                "pendingTabs": 2,
                "pendingConfirmations": 1,
                "inFlight": 0,
                "mockMode": true,
                "provider": "openai"
            })
        );
    }
}
