//! Collaborator traits the orchestrator is written against.
//!
//! Each trait covers one external concern (persistence, planning, media
//! generation, publishing). Production implementations live in
//! [`crate::collaborators`]; tests substitute in-memory fakes.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

use cpilot_models::{
    ActionPlan, AnalyticsSummary, AutomationSettings, ContentAssets, ContentDocument, ContentItem,
    GlobalConfig, ItemId, LogEvent, StrategyProfile, Trend, VeoJob, VoiceOptions,
};

/// Reads the shared global configuration.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn get_global(&self) -> Result<GlobalConfig>;
}

/// Per-user automation settings and run bookkeeping.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<AutomationSettings>;

    async fn record_run(
        &self,
        user_id: &str,
        last_run: DateTime<Utc>,
        next_run: DateTime<Utc>,
    ) -> Result<()>;
}

/// Per-user strategy profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<StrategyProfile>;
}

/// Recent channel performance.
#[async_trait]
pub trait AnalyticsSource: Send + Sync {
    async fn summary(&self, user_id: &str) -> Result<AnalyticsSummary>;
}

/// Current trend candidates for planning.
#[async_trait]
pub trait TrendSource: Send + Sync {
    async fn trends(&self, user_id: &str) -> Result<Vec<Trend>>;
}

/// Turns profile, trends and analytics into an action plan.
#[async_trait]
pub trait PlanningService: Send + Sync {
    async fn plan(
        &self,
        profile: &StrategyProfile,
        trends: &[Trend],
        analytics: &AnalyticsSummary,
    ) -> Result<ActionPlan>;
}

/// Generates production assets for one planned item.
#[async_trait]
pub trait ScriptingService: Send + Sync {
    async fn assets(&self, profile: &StrategyProfile, item: &ContentItem)
        -> Result<ContentAssets>;
}

/// Submits and polls asynchronous video-generation jobs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoGenerator: Send + Sync {
    async fn submit(&self, prompt: &str, aspect_ratio: &str) -> Result<VeoJob>;

    async fn poll(&self, job_id: &str) -> Result<VeoJob>;
}

/// Synthesizes a voiceover and stores it, returning its public URL.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(
        &self,
        user_id: &str,
        script: &str,
        options: &VoiceOptions,
    ) -> Result<String>;
}

/// Uploads finished content privately and returns the external video ID.
#[async_trait]
pub trait PublishService: Send + Sync {
    async fn publish(&self, user_id: &str, assets: &ContentAssets) -> Result<String>;
}

/// Per-user content-document persistence.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn create_generated(&self, user_id: &str, doc: &ContentDocument) -> Result<()>;

    async fn attach_veo_job(&self, user_id: &str, item_id: &ItemId, job: &VeoJob) -> Result<()>;

    async fn update_assets(
        &self,
        user_id: &str,
        item_id: &ItemId,
        assets: &ContentAssets,
    ) -> Result<()>;

    async fn mark_published(
        &self,
        user_id: &str,
        item_id: &ItemId,
        youtube_video_id: &str,
    ) -> Result<()>;

    async fn recent_topics(&self, user_id: &str, limit: u32) -> Result<Vec<String>>;
}

/// Append-only activity log. Logging never fails a cycle, so the sink
/// swallows its own persistence errors.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn log(&self, event: LogEvent);
}

/// Injectable delay so tests can run the poll loop without waiting.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer.
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
