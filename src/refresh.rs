use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::RefreshInterval;
use crate::state::{AppState, WeakAppState};

/// Handle to a running auto-refresh loop
///
/// The loop holds only a weak reference to the state. It ends when the handle
/// is stopped or dropped, or once every `AppState` clone is gone.
pub struct AutoRefresh {
    interval: RefreshInterval,
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl AutoRefresh {
    /// Spawn a loop that re-fetches the project list every `interval`
    pub fn spawn(state: &AppState, interval: RefreshInterval) -> Self {
        let (cancel, cancelled) = watch::channel(false);

        tracing::info!(interval_secs = interval.as_secs(), "Auto-refresh started");
        let task = tokio::spawn(run(state.downgrade(), interval, cancelled));

        Self {
            interval,
            cancel,
            task,
        }
    }

    pub fn interval(&self) -> RefreshInterval {
        self.interval
    }

    /// Cancel the pending wait or fetch and wait for the loop to exit
    pub async fn stop(self) {
        let _ = self.cancel.send(true);

        if let Err(e) = self.task.await {
            if e.is_panic() {
                tracing::error!(error = %e, "Auto-refresh task panicked");
            }
        }
        tracing::info!(interval_secs = self.interval.as_secs(), "Auto-refresh stopped");
    }
}

async fn run(
    weak: WeakAppState,
    interval: RefreshInterval,
    mut cancelled: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancelled.changed() => break,
            _ = tokio::time::sleep(interval.as_duration()) => {}
        }

        // Strong only for this tick
        let Some(state) = weak.upgrade() else {
            tracing::debug!("Auto-refresh owner dropped");
            break;
        };

        if !state.config().is_complete() {
            tracing::debug!("Skipping auto-refresh tick, configuration incomplete");
            continue;
        }

        tokio::select! {
            biased;
            _ = cancelled.changed() => break,
            result = state.fetch_projects() => {
                if let Err(e) = result {
                    tracing::warn!(error = %e, "Auto-refresh fetch failed");
                }
            }
        }
    }
}
