//! Pending batches and their debounce timers.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, trace};

use tabgrouper_config::BatchScope;
use tabgrouper_protocols::{Tab, TabId, WindowId};

use super::is_processable;

/// Identity of a pending batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchKey {
    Window(WindowId),
    Process,
}

/// A debounce timer fired for `key`.
///
/// `epoch` identifies the timer; a firing whose epoch no longer matches the
/// batch was superseded and is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushSignal {
    pub key: BatchKey,
    pub epoch: u64,
}

#[derive(Debug)]
struct PendingBatch {
    /// Insertion order is kept; a re-scheduled tab replaces its snapshot.
    tabs: Vec<Tab>,
    timer: Option<JoinHandle<()>>,
    epoch: u64,
}

impl PendingBatch {
    fn upsert(&mut self, tab: Tab) {
        match self.tabs.iter_mut().find(|t| t.id == tab.id) {
            Some(existing) => *existing = tab,
            None => self.tabs.push(tab),
        }
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

/// Accumulates tabs and debounces their flush.
///
/// Every schedule resets the batch's timer, so a batch flushes `delay`
/// after its last tab arrived. Timer firings are delivered on the flush
/// channel and redeemed with [`BatchScheduler::take`].
#[derive(Debug)]
pub struct BatchScheduler {
    delay: Duration,
    scope: BatchScope,
    batches: HashMap<BatchKey, PendingBatch>,
    flush_tx: UnboundedSender<FlushSignal>,
    next_epoch: u64,
}

impl BatchScheduler {
    pub fn new(delay: Duration, scope: BatchScope, flush_tx: UnboundedSender<FlushSignal>) -> Self {
        Self {
            delay,
            scope,
            batches: HashMap::new(),
            flush_tx,
            next_epoch: 0,
        }
    }

    fn key_for(&self, tab: &Tab) -> BatchKey {
        match self.scope {
            BatchScope::Window => BatchKey::Window(tab.window_id),
            BatchScope::Process => BatchKey::Process,
        }
    }

    /// Add a tab to its batch and restart the batch's timer.
    ///
    /// A tab that moved since it was last scheduled leaves its old batch,
    /// so only the newest snapshot is ever flushed. Returns `false` when
    /// the tab is not processable and was ignored.
    pub fn schedule(&mut self, tab: Tab) -> bool {
        if !is_processable(&tab) {
            trace!("Ignoring unprocessable tab {}", tab.id);
            return false;
        }

        let key = self.key_for(&tab);
        if let Some(previous) = self.key_holding(tab.id).filter(|k| *k != key) {
            debug!("Tab {} moved from {:?} to {:?}", tab.id, previous, key);
            self.remove_from(previous, tab.id);
        }
        self.next_epoch += 1;
        let epoch = self.next_epoch;

        let timer = {
            let tx = self.flush_tx.clone();
            let deadline = Instant::now() + self.delay;
            tokio::spawn(async move {
                sleep_until(deadline).await;
                let _ = tx.send(FlushSignal { key, epoch });
            })
        };

        let batch = self.batches.entry(key).or_insert_with(|| PendingBatch {
            tabs: Vec::new(),
            timer: None,
            epoch,
        });
        batch.cancel_timer();
        let tab_id = tab.id;
        batch.upsert(tab);
        debug!("Scheduled tab {} into {:?} ({} pending)", tab_id, key, batch.tabs.len());
        batch.timer = Some(timer);
        batch.epoch = epoch;
        true
    }

    /// Drop a tab from whichever batch holds it.
    pub fn evict(&mut self, tab_id: TabId) -> bool {
        let Some(key) = self.key_holding(tab_id) else {
            return false;
        };
        self.remove_from(key, tab_id);
        debug!("Evicted tab {} from {:?}", tab_id, key);
        true
    }

    fn key_holding(&self, tab_id: TabId) -> Option<BatchKey> {
        self.batches
            .iter()
            .find(|(_, batch)| batch.tabs.iter().any(|t| t.id == tab_id))
            .map(|(key, _)| *key)
    }

    /// Remove a tab from one batch, dropping the batch once it is empty.
    fn remove_from(&mut self, key: BatchKey, tab_id: TabId) {
        let Some(batch) = self.batches.get_mut(&key) else {
            return;
        };
        batch.tabs.retain(|t| t.id != tab_id);
        if batch.tabs.is_empty() {
            batch.cancel_timer();
            self.batches.remove(&key);
        }
    }

    /// Take the batch a timer fired for, unless the firing is stale.
    pub fn take(&mut self, signal: FlushSignal) -> Option<Vec<Tab>> {
        match self.batches.get(&signal.key) {
            Some(batch) if batch.epoch == signal.epoch => {}
            _ => {
                trace!("Ignoring stale flush for {:?}", signal.key);
                return None;
            }
        }
        self.batches.remove(&signal.key).map(|batch| batch.tabs)
    }

    /// Take every pending batch now, cancelling their timers.
    pub fn take_all(&mut self) -> Vec<Vec<Tab>> {
        self.batches
            .drain()
            .map(|(_, mut batch)| {
                batch.cancel_timer();
                batch.tabs
            })
            .collect()
    }

    pub fn pending_count(&self) -> usize {
        self.batches.values().map(|b| b.tabs.len()).sum()
    }

    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }
}

impl Drop for BatchScheduler {
    fn drop(&mut self) {
        for batch in self.batches.values_mut() {
            batch.cancel_timer();
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
