//! Production wiring of the orchestrator ports to Firestore repositories
//! and external service clients.
//!
//! Clients that need the generation API key or model name read global
//! config per call, so key rotation and model changes take effect without
//! a restart.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::warn;

use cpilot_firestore::{
    AutomationSettingsRepository, ContentItemRepository, EventLogRepository, FirestoreClient,
    GlobalConfigRepository, StrategyProfileRepository,
};
use cpilot_models::{
    ActionPlan, AnalyticsSummary, AutomationSettings, ContentAssets, ContentDocument, ContentItem,
    GlobalConfig, ItemId, LogEvent, StrategyProfile, Trend, VeoJob, VoiceOptions,
};
use cpilot_services::{
    AnalyticsClient, GeminiClient, MediaStorage, PublishClient, SpeechClient, TrendClient,
    VeoClient,
};

use crate::cycle::Collaborators;
use crate::ports::{
    AnalyticsSource, ConfigStore, ContentStore, EventSink, PlanningService, ProfileStore,
    PublishService, ScriptingService, SettingsStore, SpeechSynthesizer, TokioSleeper, TrendSource,
    VideoGenerator,
};

pub struct FirestoreConfigStore {
    repo: GlobalConfigRepository,
}

#[async_trait]
impl ConfigStore for FirestoreConfigStore {
    async fn get_global(&self) -> Result<GlobalConfig> {
        Ok(self.repo.get_or_seed().await?)
    }
}

pub struct FirestoreSettingsStore {
    repo: AutomationSettingsRepository,
}

#[async_trait]
impl SettingsStore for FirestoreSettingsStore {
    async fn get(&self, user_id: &str) -> Result<AutomationSettings> {
        Ok(self.repo.get(user_id).await?)
    }

    async fn record_run(
        &self,
        user_id: &str,
        last_run: DateTime<Utc>,
        next_run: DateTime<Utc>,
    ) -> Result<()> {
        Ok(self.repo.record_run(user_id, last_run, next_run).await?)
    }
}

pub struct FirestoreProfileStore {
    repo: StrategyProfileRepository,
}

#[async_trait]
impl ProfileStore for FirestoreProfileStore {
    async fn get(&self, user_id: &str) -> Result<StrategyProfile> {
        Ok(self.repo.get_or_seed(user_id).await?)
    }
}

pub struct FirestoreContentStore {
    client: FirestoreClient,
}

impl FirestoreContentStore {
    fn repo(&self, user_id: &str) -> ContentItemRepository {
        ContentItemRepository::new(self.client.clone(), user_id)
    }
}

#[async_trait]
impl ContentStore for FirestoreContentStore {
    async fn create_generated(&self, user_id: &str, doc: &ContentDocument) -> Result<()> {
        Ok(self.repo(user_id).create_generated(doc).await?)
    }

    async fn attach_veo_job(&self, user_id: &str, item_id: &ItemId, job: &VeoJob) -> Result<()> {
        Ok(self.repo(user_id).attach_veo_job(item_id, job).await?)
    }

    async fn update_assets(
        &self,
        user_id: &str,
        item_id: &ItemId,
        assets: &ContentAssets,
    ) -> Result<()> {
        Ok(self.repo(user_id).update_assets(item_id, assets).await?)
    }

    async fn mark_published(
        &self,
        user_id: &str,
        item_id: &ItemId,
        youtube_video_id: &str,
    ) -> Result<()> {
        Ok(self
            .repo(user_id)
            .mark_published(item_id, youtube_video_id)
            .await?)
    }

    async fn recent_topics(&self, user_id: &str, limit: u32) -> Result<Vec<String>> {
        Ok(self.repo(user_id).recent_topics(limit).await?)
    }
}

pub struct FirestoreEventSink {
    repo: EventLogRepository,
}

#[async_trait]
impl EventSink for FirestoreEventSink {
    async fn log(&self, event: LogEvent) {
        // Activity logging is best effort and must never fail a cycle.
        if let Err(err) = self.repo.append(&event).await {
            warn!(user_id = %event.user_id, error = %err, "Event log append failed");
        }
    }
}

/// Plans and scripts through Gemini, resolving the API key per call.
pub struct GeminiGeneration {
    config: GlobalConfigRepository,
}

impl GeminiGeneration {
    async fn client(&self) -> Result<GeminiClient> {
        let config = self.config.get_or_seed().await?;
        let key = config
            .gemini_api_key
            .context("generation API key missing from global config")?;
        Ok(GeminiClient::new(key))
    }
}

#[async_trait]
impl PlanningService for GeminiGeneration {
    async fn plan(
        &self,
        profile: &StrategyProfile,
        trends: &[Trend],
        analytics: &AnalyticsSummary,
    ) -> Result<ActionPlan> {
        Ok(self
            .client()
            .await?
            .generate_action_plan(profile, trends, analytics)
            .await?)
    }
}

#[async_trait]
impl ScriptingService for GeminiGeneration {
    async fn assets(
        &self,
        profile: &StrategyProfile,
        item: &ContentItem,
    ) -> Result<ContentAssets> {
        Ok(self
            .client()
            .await?
            .generate_scripts_and_prompts(profile, item)
            .await?)
    }
}

/// Video generation through Veo, model name taken from global config.
pub struct VeoVideoGenerator {
    config: GlobalConfigRepository,
}

impl VeoVideoGenerator {
    async fn client(&self) -> Result<(VeoClient, String)> {
        let config = self.config.get_or_seed().await?;
        let key = config
            .gemini_api_key
            .clone()
            .context("generation API key missing from global config")?;
        Ok((VeoClient::new(key), config.veo_model().to_string()))
    }
}

#[async_trait]
impl VideoGenerator for VeoVideoGenerator {
    async fn submit(&self, prompt: &str, aspect_ratio: &str) -> Result<VeoJob> {
        let (client, model) = self.client().await?;
        Ok(client.submit(prompt, aspect_ratio, &model).await?)
    }

    async fn poll(&self, job_id: &str) -> Result<VeoJob> {
        let (client, _) = self.client().await?;
        Ok(client.poll(job_id).await)
    }
}

/// Synthesizes narration and stores it in the media bucket.
pub struct StoredSpeechSynthesizer {
    config: GlobalConfigRepository,
    storage: MediaStorage,
}

#[async_trait]
impl SpeechSynthesizer for StoredSpeechSynthesizer {
    async fn synthesize(
        &self,
        user_id: &str,
        script: &str,
        options: &VoiceOptions,
    ) -> Result<String> {
        let config = self.config.get_or_seed().await?;
        let key = config
            .gemini_api_key
            .clone()
            .context("generation API key missing from global config")?;
        let audio = SpeechClient::new(key).synthesize(script, options).await?;
        let url = self
            .storage
            .store_voiceover(config.bucket(), user_id, audio)
            .await?;
        Ok(url)
    }
}

/// Trend scanning through the YouTube Data API.
pub struct YoutubeTrendSource {
    client: TrendClient,
}

#[async_trait]
impl TrendSource for YoutubeTrendSource {
    async fn trends(&self, _user_id: &str) -> Result<Vec<Trend>> {
        Ok(self.client.fetch_trends().await?)
    }
}

/// Channel analytics through the YouTube Analytics API.
pub struct YoutubeAnalyticsSource {
    client: AnalyticsClient,
}

#[async_trait]
impl AnalyticsSource for YoutubeAnalyticsSource {
    async fn summary(&self, _user_id: &str) -> Result<AnalyticsSummary> {
        Ok(self.client.fetch_summary().await?)
    }
}

/// Private uploads through the YouTube Data API.
pub struct YoutubePublishService {
    client: PublishClient,
}

#[async_trait]
impl PublishService for YoutubePublishService {
    async fn publish(&self, _user_id: &str, assets: &ContentAssets) -> Result<String> {
        Ok(self.client.publish(assets).await?)
    }
}

/// Build the full production collaborator set from the environment.
///
/// `YOUTUBE_API_KEY` feeds trend scanning and `YOUTUBE_ACCESS_TOKEN` the
/// analytics and upload calls; everything else comes from Firestore global
/// config or the `MEDIA_*` variables.
pub async fn build_from_env() -> Result<Collaborators> {
    let firestore = FirestoreClient::from_env()
        .await
        .context("Firestore client init failed")?;
    let global = GlobalConfigRepository::new(firestore.clone());

    let youtube_api_key = std::env::var("YOUTUBE_API_KEY").unwrap_or_default();
    let youtube_access_token = std::env::var("YOUTUBE_ACCESS_TOKEN").unwrap_or_default();
    let storage = MediaStorage::from_env().context("media storage init failed")?;

    let generation = Arc::new(GeminiGeneration { config: global.clone() });

    Ok(Collaborators {
        config_store: Arc::new(FirestoreConfigStore { repo: global.clone() }),
        settings: Arc::new(FirestoreSettingsStore {
            repo: AutomationSettingsRepository::new(firestore.clone()),
        }),
        profiles: Arc::new(FirestoreProfileStore {
            repo: StrategyProfileRepository::new(firestore.clone()),
        }),
        analytics: Arc::new(YoutubeAnalyticsSource {
            client: AnalyticsClient::new(youtube_access_token.clone()),
        }),
        trends: Arc::new(YoutubeTrendSource {
            client: TrendClient::new(youtube_api_key),
        }),
        planner: generation.clone(),
        scripter: generation,
        video: Arc::new(VeoVideoGenerator { config: global.clone() }),
        speech: Arc::new(StoredSpeechSynthesizer { config: global, storage }),
        publisher: Arc::new(YoutubePublishService {
            client: PublishClient::new(youtube_access_token),
        }),
        content: Arc::new(FirestoreContentStore { client: firestore.clone() }),
        events: Arc::new(FirestoreEventSink {
            repo: EventLogRepository::new(firestore),
        }),
        sleeper: Arc::new(TokioSleeper),
    })
}
