//! Persisted per-item content documents and item outcomes.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{ContentAssets, ContentItem, VeoJob};

/// Lifecycle stage of a persisted content document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentStatus {
    /// Assets generated; video, audio and publish stages not yet complete
    Generated,
    /// Published to the external platform
    Published,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Generated => "GENERATED",
            ContentStatus::Published => "PUBLISHED",
        }
    }
}

impl fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The long-lived record for one produced item.
///
/// Written in `Generated` state before the video stage runs, then updated
/// through partial writes as later stages complete. Document ID is the
/// item ID, which makes re-writes idempotent.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContentDocument {
    /// The planned item this document records
    pub item: ContentItem,

    /// Generated assets
    pub assets: ContentAssets,

    /// Lifecycle stage
    pub status: ContentStatus,

    /// Creation timestamp (dedup ordering key)
    pub created_at: DateTime<Utc>,

    /// Terminal video-generation job result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub veo_job: Option<VeoJob>,

    /// Publish timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,

    /// External content ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube_video_id: Option<String>,
}

impl ContentDocument {
    /// Create a fresh document in the `Generated` state.
    pub fn generated(item: ContentItem, assets: ContentAssets) -> Self {
        Self {
            item,
            assets,
            status: ContentStatus::Generated,
            created_at: Utc::now(),
            veo_job: None,
            published_at: None,
            youtube_video_id: None,
        }
    }
}

/// Outcome of one item's trip through the production pipeline.
///
/// The item loop folds every item into one of these; failures are data,
/// not control flow, and never abort the surrounding cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ItemOutcome {
    /// Fully produced and uploaded
    Published { topic: String, video_id: String },
    /// Deliberately not produced (dry run)
    Skipped { topic: String, reason: String },
    /// Pipeline stage failed; later items still ran
    Failed { topic: String, reason: String },
}

impl ItemOutcome {
    pub fn topic(&self) -> &str {
        match self {
            ItemOutcome::Published { topic, .. }
            | ItemOutcome::Skipped { topic, .. }
            | ItemOutcome::Failed { topic, .. } => topic,
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, ItemOutcome::Published { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ContentItemType, ContentMetadata, ItemId, Priority};

    #[test]
    fn test_generated_document_defaults() {
        let item = ContentItem {
            id: ItemId::new(),
            item_type: ContentItemType::Short,
            topic: "Topic".to_string(),
            angle: "Angle".to_string(),
            target_duration_sec: 45,
            target_audience: String::new(),
            priority: Priority::Medium,
            is_news: true,
            use_cases_required: false,
            trend_id: None,
        };
        let assets = ContentAssets {
            veo_prompt: "prompt".to_string(),
            voiceover_script: "script".to_string(),
            metadata: ContentMetadata {
                title: "t".to_string(),
                description: "d".to_string(),
                tags: vec![],
                thumbnail_concept: String::new(),
            },
            video_url: None,
            audio_url: None,
            youtube_video_id: None,
        };

        let doc = ContentDocument::generated(item, assets);
        assert_eq!(doc.status, ContentStatus::Generated);
        assert!(doc.veo_job.is_none());
        assert!(doc.published_at.is_none());
    }
}
