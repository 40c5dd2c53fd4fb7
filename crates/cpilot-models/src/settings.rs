//! Automation settings and process-wide configuration.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Per-user automation state.
///
/// The only state besides content documents that survives across cycles.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AutomationSettings {
    /// Whether the hourly cycle runs for this user
    pub enabled: bool,

    /// When the last cycle ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run: Option<DateTime<Utc>>,

    /// When the next cycle is scheduled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_run: Option<DateTime<Utc>>,
}

/// Process-wide generation configuration, stored as a single admin document.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfig {
    /// Generation-service API key; its absence gates the whole cycle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,

    /// Media storage bucket for synthesized narration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_bucket: Option<String>,

    /// Video-generation model override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub veo_model_name: Option<String>,

    /// Default output language
    pub default_language: String,

    /// Default timezone
    pub default_timezone: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            media_bucket: None,
            veo_model_name: None,
            default_language: "de".to_string(),
            default_timezone: "Europe/Berlin".to_string(),
        }
    }
}

impl GlobalConfig {
    pub const DEFAULT_VEO_MODEL: &'static str = "veo-3.1-fast-generate-preview";
    pub const DEFAULT_MEDIA_BUCKET: &'static str = "ai-channel-assets";

    /// Video model to use, falling back to the preview default.
    pub fn veo_model(&self) -> &str {
        self.veo_model_name
            .as_deref()
            .unwrap_or(Self::DEFAULT_VEO_MODEL)
    }

    /// Media bucket to use, falling back to the shared assets bucket.
    pub fn bucket(&self) -> &str {
        self.media_bucket
            .as_deref()
            .unwrap_or(Self::DEFAULT_MEDIA_BUCKET)
    }
}
