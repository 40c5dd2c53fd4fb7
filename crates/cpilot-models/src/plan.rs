//! Planned content items and the per-cycle action plan.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a planned content item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    /// Generate a new random item ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Format of a planned piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentItemType {
    /// Long-form landscape video
    Longform,
    /// Vertical short
    Short,
}

impl ContentItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentItemType::Longform => "LONGFORM",
            ContentItemType::Short => "SHORT",
        }
    }

    /// Aspect ratio submitted to the video-generation service.
    pub fn aspect_ratio(&self) -> &'static str {
        match self {
            ContentItemType::Longform => "16:9",
            ContentItemType::Short => "9:16",
        }
    }
}

impl fmt::Display for ContentItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Production priority assigned by the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// A single planned topic with targeting metadata.
///
/// Created once by the planner and immutable for the rest of the cycle.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    /// Unique item ID (unique within one plan)
    pub id: ItemId,

    /// Content format
    #[serde(rename = "type")]
    pub item_type: ContentItemType,

    /// Candidate topic (unique string, dedup key)
    pub topic: String,

    /// The specific perspective or hook
    pub angle: String,

    /// Target duration in seconds
    pub target_duration_sec: u32,

    /// Target audience description
    #[serde(default)]
    pub target_audience: String,

    /// Production priority
    #[serde(default)]
    pub priority: Priority,

    /// Breaking-news items are produced first
    #[serde(default)]
    pub is_news: bool,

    /// Whether the script must include concrete use cases
    #[serde(default)]
    pub use_cases_required: bool,

    /// Trend that sourced this item, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend_id: Option<String>,
}

/// Planner output grouping long-form and short candidates.
///
/// Produced once per cycle and consumed immediately by deduplication.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActionPlan {
    /// Long-form candidates, in planner order
    pub longform: Vec<ContentItem>,

    /// Short candidates, in planner order
    pub shorts: Vec<ContentItem>,

    /// When the plan was generated
    pub generated_at: DateTime<Utc>,
}

impl ActionPlan {
    /// Total number of candidate items in the plan.
    pub fn len(&self) -> usize {
        self.longform.len() + self.shorts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.longform.is_empty() && self.shorts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(topic: &str, item_type: ContentItemType) -> ContentItem {
        ContentItem {
            id: ItemId::new(),
            item_type,
            topic: topic.to_string(),
            angle: "Why it matters".to_string(),
            target_duration_sec: 60,
            target_audience: "AI enthusiasts".to_string(),
            priority: Priority::High,
            is_news: false,
            use_cases_required: true,
            trend_id: None,
        }
    }

    #[test]
    fn test_aspect_ratio_by_type() {
        assert_eq!(ContentItemType::Longform.aspect_ratio(), "16:9");
        assert_eq!(ContentItemType::Short.aspect_ratio(), "9:16");
    }

    #[test]
    fn test_item_serializes_camel_case() {
        let json = serde_json::to_value(item("Gemini 3 launch", ContentItemType::Short)).unwrap();
        assert_eq!(json["type"], "SHORT");
        assert!(json["targetDurationSec"].is_number());
        assert!(json.get("target_duration_sec").is_none());
    }

    #[test]
    fn test_plan_roundtrip_with_missing_optionals() {
        let json = serde_json::json!({
            "longform": [{
                "id": "a1",
                "type": "LONGFORM",
                "topic": "New model drop",
                "angle": "First look",
                "targetDurationSec": 480,
                "priority": "HIGH"
            }],
            "shorts": [],
            "generatedAt": "2026-08-30T12:00:00Z"
        });

        let plan: ActionPlan = serde_json::from_value(json).unwrap();
        assert_eq!(plan.len(), 1);
        assert!(!plan.longform[0].is_news);
        assert!(plan.longform[0].trend_id.is_none());
    }
}
