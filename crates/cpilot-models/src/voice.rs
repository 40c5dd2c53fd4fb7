//! Narration voice configuration.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Voice configuration passed to the speech-synthesis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoiceOptions {
    /// BCP-47 language code, e.g. "de-DE"
    pub language_code: String,

    /// Provider voice name, e.g. "de-DE-Neural2-B"
    pub voice_name: String,

    /// Speaking rate, 0.75-1.25
    #[serde(default = "default_rate")]
    pub speaking_rate: f64,

    /// Pitch adjustment, -10.0 to 10.0
    #[serde(default)]
    pub pitch: f64,

    /// Speaking style hint ("friendly" or "authoritative")
    pub style: String,
}

fn default_rate() -> f64 {
    1.0
}
