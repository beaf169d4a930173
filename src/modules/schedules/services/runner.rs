use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::trigger::ScheduleTrigger;

/// Background loop that sweeps due schedules on a fixed interval.
///
/// Spawned from `main`; stops when its shutdown token is cancelled. A sweep in progress
/// finishes before the loop exits.
pub struct ScheduleRunner {
    trigger: Arc<ScheduleTrigger>,
    period: Duration,
    shutdown: CancellationToken,
}

impl ScheduleRunner {
    pub fn new(trigger: Arc<ScheduleTrigger>, period: Duration) -> Self {
        Self {
            trigger,
            period,
            shutdown: CancellationToken::new(),
        }
    }

    /// Token that stops the loop when cancelled
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub async fn run(self) {
        info!(interval_secs = self.period.as_secs(), "Starting schedule runner");

        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("Schedule runner shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.trigger.sweep(Utc::now()).await {
                        error!(error = %e, "Schedule sweep failed");
                    }
                }
            }
        }
    }
}
