use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::dispatcher::{DispatchOutcome, ReportDispatcher};

/// Bounds applied to the requested period
pub const MIN_PERIOD: Duration = Duration::from_millis(1);
pub const MAX_PERIOD: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Fires a dispatch cycle every `period`. Cycles run inline in the timer
/// task, so a slow cycle delays the next tick instead of overlapping it.
pub struct ReportScheduler;

impl ReportScheduler {
    /// `period` is clamped to `MIN_PERIOD..=MAX_PERIOD`
    pub fn spawn(dispatcher: Arc<ReportDispatcher>, period: Duration) -> SchedulerHandle {
        let period = period.clamp(MIN_PERIOD, MAX_PERIOD);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::info!(period_secs = period.as_secs(), "report scheduler started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match dispatcher.dispatch(Utc::now()).await {
                            DispatchOutcome::Sent { day, total_changes, .. } => {
                                tracing::info!(%day, total_changes, "report cycle sent");
                            }
                            DispatchOutcome::Skipped { day } => {
                                tracing::debug!(%day, "report cycle skipped");
                            }
                            DispatchOutcome::Failed { day, reason } => {
                                tracing::error!(%day, %reason, "report cycle failed");
                            }
                        }
                    }
                    // Fires on the shutdown signal or when the handle is dropped
                    _ = shutdown_rx.changed() => break,
                }
            }

            tracing::info!("report scheduler stopped");
        });

        SchedulerHandle { shutdown_tx, task }
    }
}

pub struct SchedulerHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stop the timer and wait for an in-flight cycle to finish
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            tracing::error!("report scheduler task panicked: {}", e);
        }
    }
}
