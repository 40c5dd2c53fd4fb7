//! Per-user cycle scheduling.
//!
//! The scheduler ticks on a fixed interval and starts a cycle for every
//! configured user whose next-run timestamp is due (or unset). Users run
//! sequentially within a tick; the cycle itself already isolates per-item
//! failures, and a fatal cycle for one user never blocks the others.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};

use crate::config::{CycleOptions, SchedulerConfig};
use crate::cycle::{CycleOutcome, CycleRunner};
use crate::ports::SettingsStore;

pub struct Scheduler {
    runner: CycleRunner,
    settings: Arc<dyn SettingsStore>,
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(runner: CycleRunner, settings: Arc<dyn SettingsStore>, config: SchedulerConfig) -> Self {
        Self { runner, settings, config }
    }

    /// Run until shutdown is signalled (or after one pass in run-once mode).
    pub async fn run(&self, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        info!(
            users = self.config.user_ids.len(),
            tick_secs = self.config.tick.as_secs(),
            "Scheduler started"
        );

        loop {
            self.tick(self.config.options).await;

            if self.config.run_once {
                info!("Run-once pass finished, exiting");
                return;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.tick) => {}
                _ = shutdown.changed() => {
                    info!("Shutdown signal received, scheduler stopping");
                    return;
                }
            }
        }
    }

    /// One pass over all configured users.
    async fn tick(&self, options: CycleOptions) {
        for user_id in &self.config.user_ids {
            if !options.force {
                match self.due(user_id).await {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(err) => {
                        error!(user_id, error = %err, "Due check failed, skipping user this tick");
                        continue;
                    }
                }
            }

            let report = self.runner.run_cycle(user_id, options).await;
            match report.outcome {
                CycleOutcome::Completed => {
                    info!(
                        user_id,
                        items = report.items.len(),
                        published = report.published(),
                        "Cycle completed"
                    );
                }
                CycleOutcome::AutomationDisabled => {}
                CycleOutcome::Fatal => {
                    error!(user_id, "Cycle ended fatally");
                }
            }
        }
    }

    async fn due(&self, user_id: &str) -> anyhow::Result<bool> {
        let settings = self.settings.get(user_id).await?;
        Ok(is_due(&settings, Utc::now()))
    }
}

/// A user is due when automation has never run or the next-run timestamp
/// has passed.
fn is_due(settings: &cpilot_models::AutomationSettings, now: chrono::DateTime<Utc>) -> bool {
    match settings.next_run {
        Some(next_run) => next_run <= now,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use cpilot_models::AutomationSettings;

    fn settings(next_run: Option<chrono::DateTime<Utc>>) -> AutomationSettings {
        AutomationSettings { enabled: true, last_run: None, next_run }
    }

    #[test]
    fn test_user_without_schedule_is_due() {
        assert!(is_due(&settings(None), Utc::now()));
    }

    #[test]
    fn test_future_next_run_is_not_due() {
        let now = Utc::now();
        assert!(!is_due(&settings(Some(now + ChronoDuration::minutes(30))), now));
    }

    #[test]
    fn test_past_next_run_is_due() {
        let now = Utc::now();
        assert!(is_due(&settings(Some(now - ChronoDuration::minutes(1))), now));
        assert!(is_due(&settings(Some(now)), now));
    }
}
