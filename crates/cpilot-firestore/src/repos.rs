//! Typed repositories over the Firestore client.
//!
//! Collection layout, partitioned by user:
//! - `contentPlans/{user}/items/{itemId}`: per-item content documents
//! - `automationSettings/{user}`: cycle enable flag and run timestamps
//! - `strategyProfiles/{user}`: channel strategy
//! - `adminConfig/global`: process-wide generation config

use chrono::{DateTime, Utc};
use tracing::info;

use cpilot_models::{
    AutomationSettings, ContentAssets, ContentDocument, ContentStatus, GlobalConfig, ItemId,
    StrategyProfile, VeoJob,
};

use crate::client::FirestoreClient;
use crate::error::{FirestoreError, FirestoreResult};
use crate::value::json_to_fields;

/// Repository for per-item content documents.
#[derive(Clone)]
pub struct ContentItemRepository {
    client: FirestoreClient,
    user_id: String,
}

impl ContentItemRepository {
    pub fn new(client: FirestoreClient, user_id: impl Into<String>) -> Self {
        Self {
            client,
            user_id: user_id.into(),
        }
    }

    fn parent(&self) -> String {
        format!("contentPlans/{}", self.user_id)
    }

    fn collection(&self) -> String {
        format!("contentPlans/{}/items", self.user_id)
    }

    /// Write the full document in its initial `Generated` state.
    ///
    /// Keyed by item ID, so re-running a cycle over the same plan is
    /// idempotent rather than duplicating records.
    pub async fn create_generated(&self, doc: &ContentDocument) -> FirestoreResult<()> {
        let fields = json_to_fields(&serde_json::to_value(doc)?);
        self.client
            .patch_document(&self.collection(), doc.item.id.as_str(), fields, None)
            .await?;
        info!(user_id = %self.user_id, item_id = %doc.item.id, "Persisted content document");
        Ok(())
    }

    /// Attach the terminal video-generation job result.
    pub async fn attach_veo_job(&self, item_id: &ItemId, job: &VeoJob) -> FirestoreResult<()> {
        let fields = json_to_fields(&serde_json::json!({
            "veoJob": serde_json::to_value(job)?,
        }));
        self.client
            .patch_document(
                &self.collection(),
                item_id.as_str(),
                fields,
                Some(vec!["veoJob".to_string()]),
            )
            .await?;
        Ok(())
    }

    /// Replace the stored assets after media locations are filled in.
    pub async fn update_assets(
        &self,
        item_id: &ItemId,
        assets: &ContentAssets,
    ) -> FirestoreResult<()> {
        let fields = json_to_fields(&serde_json::json!({
            "assets": serde_json::to_value(assets)?,
        }));
        self.client
            .patch_document(
                &self.collection(),
                item_id.as_str(),
                fields,
                Some(vec!["assets".to_string()]),
            )
            .await?;
        Ok(())
    }

    /// Mark the document published with its external video ID.
    pub async fn mark_published(
        &self,
        item_id: &ItemId,
        youtube_video_id: &str,
    ) -> FirestoreResult<()> {
        let fields = json_to_fields(&serde_json::json!({
            "status": ContentStatus::Published.as_str(),
            "publishedAt": Utc::now(),
            "youtubeVideoId": youtube_video_id,
        }));
        self.client
            .patch_document(
                &self.collection(),
                item_id.as_str(),
                fields,
                Some(vec![
                    "status".to_string(),
                    "publishedAt".to_string(),
                    "youtubeVideoId".to_string(),
                ]),
            )
            .await?;
        Ok(())
    }

    /// Topics of the most recently persisted documents, newest first.
    ///
    /// This is the dedup window: candidate items whose topic matches one of
    /// these byte-exactly are dropped before any asset generation.
    pub async fn recent_topics(&self, limit: u32) -> FirestoreResult<Vec<String>> {
        let docs = self
            .client
            .query_recent(&self.parent(), "items", "createdAt", limit)
            .await?;

        Ok(docs
            .iter()
            .filter_map(|d| {
                d.to_json()
                    .pointer("/item/topic")
                    .and_then(|t| t.as_str())
                    .map(str::to_string)
            })
            .collect())
    }
}

/// Repository for per-user automation settings.
#[derive(Clone)]
pub struct AutomationSettingsRepository {
    client: FirestoreClient,
}

impl AutomationSettingsRepository {
    const COLLECTION: &'static str = "automationSettings";

    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Get settings, defaulting to disabled when the user has none.
    pub async fn get(&self, user_id: &str) -> FirestoreResult<AutomationSettings> {
        match self.client.get_document(Self::COLLECTION, user_id).await? {
            Some(doc) => Ok(serde_json::from_value(doc.to_json())?),
            None => Ok(AutomationSettings::default()),
        }
    }

    /// Merge run timestamps after a completed cycle.
    pub async fn record_run(
        &self,
        user_id: &str,
        last_run: DateTime<Utc>,
        next_run: DateTime<Utc>,
    ) -> FirestoreResult<()> {
        let fields = json_to_fields(&serde_json::json!({
            "lastRun": last_run,
            "nextRun": next_run,
        }));
        self.client
            .patch_document(
                Self::COLLECTION,
                user_id,
                fields,
                Some(vec!["lastRun".to_string(), "nextRun".to_string()]),
            )
            .await?;
        Ok(())
    }

    /// Replace the full settings document.
    pub async fn set(&self, user_id: &str, settings: &AutomationSettings) -> FirestoreResult<()> {
        let fields = json_to_fields(&serde_json::to_value(settings)?);
        self.client
            .patch_document(Self::COLLECTION, user_id, fields, None)
            .await?;
        Ok(())
    }
}

/// Repository for per-user strategy profiles.
#[derive(Clone)]
pub struct StrategyProfileRepository {
    client: FirestoreClient,
}

impl StrategyProfileRepository {
    const COLLECTION: &'static str = "strategyProfiles";

    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Get the user's profile, seeding the default profile when absent.
    pub async fn get_or_seed(&self, user_id: &str) -> FirestoreResult<StrategyProfile> {
        if let Some(doc) = self.client.get_document(Self::COLLECTION, user_id).await? {
            return Ok(serde_json::from_value(doc.to_json())?);
        }

        let profile = StrategyProfile::default();
        let fields = json_to_fields(&serde_json::to_value(&profile)?);
        self.client
            .create_document(Self::COLLECTION, user_id, fields)
            .await?;
        info!(user_id = %user_id, "Seeded default strategy profile");
        Ok(profile)
    }
}

/// Repository for the single global config document.
#[derive(Clone)]
pub struct GlobalConfigRepository {
    client: FirestoreClient,
}

impl GlobalConfigRepository {
    const COLLECTION: &'static str = "adminConfig";
    const DOC_ID: &'static str = "global";

    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Get the global config, seeding defaults when absent.
    pub async fn get_or_seed(&self) -> FirestoreResult<GlobalConfig> {
        if let Some(doc) = self
            .client
            .get_document(Self::COLLECTION, Self::DOC_ID)
            .await?
        {
            return Ok(serde_json::from_value(doc.to_json())?);
        }

        let config = GlobalConfig::default();
        let fields = json_to_fields(&serde_json::to_value(&config)?);
        match self
            .client
            .create_document(Self::COLLECTION, Self::DOC_ID, fields)
            .await
        {
            Ok(_) | Err(FirestoreError::AlreadyExists(_)) => Ok(config),
            Err(e) => Err(e),
        }
    }
}
