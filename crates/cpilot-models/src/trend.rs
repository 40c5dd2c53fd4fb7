//! Candidate topics from the trend scan.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Estimated growth potential of a trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub enum GrowthPotential {
    Low,
    #[default]
    Medium,
    High,
}

/// A candidate topic surfaced by the trend provider.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Trend {
    /// Provider identifier (source video ID for YouTube trends)
    pub id: String,

    /// Candidate topic text
    pub topic: String,

    /// Relevance score, 0-100
    pub relevance: u32,

    /// Trend category ("News", "Deep Dive", ...)
    pub category: String,

    /// Estimated growth potential
    #[serde(default)]
    pub growth_potential: GrowthPotential,

    /// Source video backing the trend, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_video_id: Option<String>,

    /// True for breaking news found in the last-24h scan
    #[serde(default)]
    pub is_breaking: bool,

    /// Source video view count, when known
    #[serde(default)]
    pub view_count: u64,
}

impl Trend {
    /// A trend is usable for planning only with both a topic and an ID.
    pub fn is_valid(&self) -> bool {
        !self.topic.trim().is_empty() && !self.id.trim().is_empty()
    }
}
