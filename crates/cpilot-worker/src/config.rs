//! Worker configuration loaded from environment variables.

use std::time::Duration;

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_bool(key: &str) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Tunables for one production cycle.
#[derive(Debug, Clone)]
pub struct CycleConfig {
    /// Wait between video-job polls.
    pub poll_interval: Duration,

    /// Maximum poll attempts before a running job is abandoned.
    pub max_poll_attempts: u32,

    /// How many recently persisted topics the dedup filter looks back over.
    pub dedup_window: u32,

    /// Gap between one cycle and the next scheduled run.
    pub schedule_interval: chrono::Duration,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            max_poll_attempts: 20,
            dedup_window: 20,
            schedule_interval: chrono::Duration::hours(1),
        }
    }
}

impl CycleConfig {
    pub fn from_env() -> Self {
        Self {
            poll_interval: Duration::from_secs(env_u64("CYCLE_POLL_INTERVAL_SECS", 5)),
            max_poll_attempts: env_u32("CYCLE_MAX_POLL_ATTEMPTS", 20),
            dedup_window: env_u32("CYCLE_DEDUP_WINDOW", 20),
            schedule_interval: chrono::Duration::minutes(env_u64(
                "CYCLE_SCHEDULE_INTERVAL_MINS",
                60,
            ) as i64),
        }
    }
}

/// Per-invocation flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleOptions {
    /// Run even when automation is disabled for the user.
    pub force: bool,

    /// Stop each item after asset generation and persistence.
    pub dry_run: bool,
}

/// Scheduler configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Users the scheduler drives cycles for.
    pub user_ids: Vec<String>,

    /// How often the scheduler checks for due runs.
    pub tick: Duration,

    /// Exit after one pass over all users.
    pub run_once: bool,

    /// Options applied to every cycle the scheduler starts.
    pub options: CycleOptions,
}

impl SchedulerConfig {
    pub fn from_env() -> Self {
        let user_ids = std::env::var("CYCLE_USER_IDS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            user_ids,
            tick: Duration::from_secs(env_u64("CYCLE_TICK_SECS", 60)),
            run_once: env_bool("CYCLE_RUN_ONCE"),
            options: CycleOptions {
                force: env_bool("CYCLE_FORCE"),
                dry_run: env_bool("CYCLE_DRY_RUN"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = CycleConfig::default();
        assert_eq!(cfg.poll_interval, Duration::from_secs(5));
        assert_eq!(cfg.max_poll_attempts, 20);
        assert_eq!(cfg.dedup_window, 20);
        assert_eq!(cfg.schedule_interval, chrono::Duration::hours(1));
    }
}
