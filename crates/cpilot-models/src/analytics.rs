//! Rolling-window channel analytics summary.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Aggregated 28-day channel performance.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    /// Total views over the window
    pub views: u64,

    /// Total minutes watched
    pub watch_time_minutes: u64,

    /// Average view duration in seconds
    pub avg_view_duration_seconds: u32,

    /// View-through rate percentage (heuristic)
    pub vtr: f64,

    /// Impression click-through rate percentage
    pub ctr: f64,

    /// Net subscribers gained minus lost
    pub subscriber_delta: i64,
}
