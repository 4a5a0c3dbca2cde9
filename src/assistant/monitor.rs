//! Availability polling
//!
//! Repeating liveness probe of the completion service, the same simple
//! heuristic the chat view uses: ask every 30 seconds, remember the last
//! answer. The poll is a tokio task tied to the monitor's lifetime and is
//! aborted when the monitor is dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use super::client::CompletionClient;

/// How often the completion service is probed
pub const POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Repeating availability poll with a last-known-state snapshot
pub struct AvailabilityMonitor {
    task: JoinHandle<()>,
    state: watch::Receiver<bool>,
}

impl AvailabilityMonitor {
    /// Start polling at the default 30-second interval
    pub fn start(client: Arc<dyn CompletionClient>) -> Self {
        Self::with_interval(client, POLL_INTERVAL)
    }

    /// Start polling at a custom interval; the first probe fires immediately
    pub fn with_interval(client: Arc<dyn CompletionClient>, interval: Duration) -> Self {
        let (tx, state) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let up = client.is_available().await;
                debug!(available = up, "completion service poll");
                if tx.send(up).is_err() {
                    break;
                }
            }
        });

        Self { task, state }
    }

    /// Last known availability of the completion service
    pub fn is_available(&self) -> bool {
        *self.state.borrow()
    }

    /// Subscribe to availability changes
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.clone()
    }
}

impl Drop for AvailabilityMonitor {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::client::MockCompletionClient;

    #[tokio::test]
    async fn test_monitor_reports_available_service() {
        let client = Arc::new(MockCompletionClient::replying("hello"));
        let monitor = AvailabilityMonitor::with_interval(client, Duration::from_millis(10));

        let mut state = monitor.subscribe();
        state.changed().await.unwrap();
        assert!(monitor.is_available());
    }

    #[tokio::test]
    async fn test_monitor_reports_down_service() {
        let client = Arc::new(MockCompletionClient::unavailable());
        let monitor = AvailabilityMonitor::with_interval(client, Duration::from_millis(10));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!monitor.is_available());
    }

    #[tokio::test]
    async fn test_poll_stops_on_drop() {
        let client = Arc::new(MockCompletionClient::replying("hello"));
        let monitor = AvailabilityMonitor::with_interval(client, Duration::from_millis(10));
        let mut state = monitor.subscribe();

        drop(monitor);

        // Aborting the poll task drops the sender, which ends the stream.
        let closed = tokio::time::timeout(Duration::from_secs(1), async {
            while state.changed().await.is_ok() {}
        })
        .await;
        assert!(closed.is_ok());
    }
}
