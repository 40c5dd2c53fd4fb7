//! Per-user strategy profile.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A recurring window in which uploads should land.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostingWindow {
    pub day_of_week: String,
    pub start: String,
    pub end: String,
}

/// The channel strategy that steers planning, scripting and narration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StrategyProfile {
    /// Channel niche description
    pub niche: String,

    /// Output language code ("en" or "de")
    pub language: String,

    /// Long-form videos per day the planner should select
    pub videos_per_day: u32,

    /// Shorts per day the planner should select
    pub shorts_per_day: u32,

    /// Tone description; also drives the narration speaking style
    pub tone: String,

    /// IANA timezone of the channel
    pub timezone: String,

    /// Preferred posting windows
    #[serde(default)]
    pub posting_windows: Vec<PostingWindow>,

    /// Recurring content themes
    #[serde(default)]
    pub content_pillars: Vec<String>,

    /// Target view-through rate percentage
    #[serde(default)]
    pub target_vtr: u32,

    /// Subscriber goal
    #[serde(default)]
    pub subs_goal: u64,
}

impl Default for StrategyProfile {
    /// Seed profile written for users without one.
    fn default() -> Self {
        Self {
            niche: "Artificial Intelligence / Künstliche Intelligenz".to_string(),
            language: "de".to_string(),
            videos_per_day: 2,
            shorts_per_day: 4,
            tone: "authoritative, friendly, high-value".to_string(),
            timezone: "Europe/Berlin".to_string(),
            posting_windows: vec![
                PostingWindow {
                    day_of_week: "Mon-Fri".to_string(),
                    start: "18:00".to_string(),
                    end: "21:00".to_string(),
                },
                PostingWindow {
                    day_of_week: "Sat-Sun".to_string(),
                    start: "10:00".to_string(),
                    end: "13:00".to_string(),
                },
            ],
            content_pillars: vec![
                "AI News".to_string(),
                "Use Cases".to_string(),
                "Tutorials".to_string(),
                "Tool Reviews".to_string(),
            ],
            target_vtr: 80,
            subs_goal: 100_000,
        }
    }
}
