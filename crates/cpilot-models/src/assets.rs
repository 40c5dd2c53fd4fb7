//! Generated production assets for a content item.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// SEO metadata produced alongside the scripts.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContentMetadata {
    /// Upload title
    pub title: String,

    /// Upload description
    pub description: String,

    /// Upload tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// Thumbnail concept description
    #[serde(default)]
    pub thumbnail_concept: String,
}

/// Production assets for one item, filled incrementally as stages complete.
///
/// The scripting service produces `veo_prompt`, `voiceover_script` and
/// `metadata`; the video, audio and publish stages attach their results.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContentAssets {
    /// Visual-only prompt for the video-generation service
    pub veo_prompt: String,

    /// Full spoken script for text-to-speech
    pub voiceover_script: String,

    /// Upload metadata
    pub metadata: ContentMetadata,

    /// Generated video location (set after the Veo job succeeds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,

    /// Synthesized narration location (set after TTS + storage)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,

    /// External content ID (set after publishing)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube_video_id: Option<String>,
}

impl ContentAssets {
    /// True when both generated scripts are present and non-empty.
    ///
    /// The scripting service occasionally returns partial output; such
    /// assets must be rejected rather than silently accepted.
    pub fn is_complete(&self) -> bool {
        !self.veo_prompt.trim().is_empty() && !self.voiceover_script.trim().is_empty()
    }

    /// True once both media locations required for publishing are present.
    pub fn ready_to_publish(&self) -> bool {
        self.video_url.is_some() && self.audio_url.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assets() -> ContentAssets {
        ContentAssets {
            veo_prompt: "Cinematic dolly shot of a server room".to_string(),
            voiceover_script: "[Excited] Here is why this matters.".to_string(),
            metadata: ContentMetadata {
                title: "Title".to_string(),
                description: "Description".to_string(),
                tags: vec!["ai".to_string()],
                thumbnail_concept: "Closeup of a GPU".to_string(),
            },
            video_url: None,
            audio_url: None,
            youtube_video_id: None,
        }
    }

    #[test]
    fn test_incomplete_when_script_blank() {
        let mut a = assets();
        assert!(a.is_complete());
        a.voiceover_script = "   ".to_string();
        assert!(!a.is_complete());
    }

    #[test]
    fn test_ready_to_publish_requires_both_urls() {
        let mut a = assets();
        assert!(!a.ready_to_publish());
        a.video_url = Some("https://cdn.example/video.mp4".to_string());
        assert!(!a.ready_to_publish());
        a.audio_url = Some("https://cdn.example/audio.mp3".to_string());
        assert!(a.ready_to_publish());
    }
}
