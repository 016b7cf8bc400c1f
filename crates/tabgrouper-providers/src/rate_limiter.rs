//! Sliding-window call budget.

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::{Instant, sleep};
use tracing::debug;

use tabgrouper_config::RateLimitSettings;

const WINDOW: Duration = Duration::from_secs(60);

/// Slack added when waiting for the oldest call to leave the window.
const SAFETY_MARGIN: Duration = Duration::from_millis(100);

/// Timestamps of recent calls, bounded to a trailing 60 second window.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    max_calls: usize,
    min_spacing: Duration,
    calls: VecDeque<Instant>,
}

impl RateLimiter {
    pub fn new(max_calls_per_minute: u32, min_spacing: Duration) -> Self {
        Self {
            max_calls: (max_calls_per_minute as usize).max(1),
            min_spacing,
            calls: VecDeque::new(),
        }
    }

    pub fn from_settings(settings: &RateLimitSettings) -> Self {
        Self::new(
            settings.max_calls_per_minute,
            Duration::from_millis(settings.min_delay_ms),
        )
    }

    fn prune(&mut self, now: Instant) {
        while let Some(&oldest) = self.calls.front() {
            if oldest + WINDOW <= now {
                self.calls.pop_front();
            } else {
                break;
            }
        }
    }

    /// How long a caller must wait before the next call, if at all.
    pub fn wait_time(&mut self, now: Instant) -> Option<Duration> {
        self.prune(now);

        if self.calls.len() >= self.max_calls {
            let oldest = self.calls.front().copied()?;
            return Some((oldest + WINDOW + SAFETY_MARGIN).saturating_duration_since(now));
        }

        let last = self.calls.back().copied()?;
        let since = now.saturating_duration_since(last);
        (since < self.min_spacing).then(|| self.min_spacing - since)
    }

    /// Record a call at `now` and return its timestamp.
    pub fn record(&mut self, now: Instant) -> Instant {
        self.calls.push_back(now);
        now
    }

    /// Record a call if the budget allows, otherwise report the wait.
    pub fn try_acquire(&mut self, now: Instant) -> Result<Instant, Duration> {
        match self.wait_time(now) {
            Some(wait) => Err(wait),
            None => Ok(self.record(now)),
        }
    }

    /// Remove a recorded call so it no longer counts against the budget.
    pub fn retract(&mut self, at: Instant) -> bool {
        match self.calls.iter().rposition(|t| *t == at) {
            Some(pos) => {
                self.calls.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn calls_in_window(&mut self, now: Instant) -> usize {
        self.prune(now);
        self.calls.len()
    }
}

/// Wait for a slot and record it.
///
/// The lock is never held across the sleep, so other callers can keep
/// checking the budget while one waits.
pub async fn acquire(limiter: &Mutex<RateLimiter>) -> Instant {
    loop {
        let wait = {
            let mut guard = limiter.lock();
            match guard.try_acquire(Instant::now()) {
                Ok(at) => return at,
                Err(wait) => wait,
            }
        };
        debug!("Rate limit reached, waiting {:?}", wait);
        sleep(wait).await;
    }
}
