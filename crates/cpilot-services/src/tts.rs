//! Cloud Text-to-Speech client.

use base64::Engine;
use reqwest::Client;
use serde_json::json;
use tracing::info;

use cpilot_models::VoiceOptions;

use crate::error::{ServiceError, ServiceResult};

const DEFAULT_BASE_URL: &str = "https://texttospeech.googleapis.com/v1";

/// Text-to-Speech API client.
pub struct SpeechClient {
    api_key: String,
    base_url: String,
    client: Client,
}

impl SpeechClient {
    /// Create a new speech client.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: Client::new(),
        }
    }

    /// Override the API base URL (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Synthesize MP3 narration from a voiceover script.
    pub async fn synthesize(&self, script: &str, options: &VoiceOptions) -> ServiceResult<Vec<u8>> {
        let url = format!("{}/text:synthesize?key={}", self.base_url, self.api_key);

        let body = json!({
            "input": { "text": script },
            "voice": {
                "languageCode": options.language_code,
                "name": options.voice_name,
            },
            "audioConfig": {
                "audioEncoding": "MP3",
                "speakingRate": options.speaking_rate,
                "pitch": options.pitch,
            }
        });

        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = response.text().await.unwrap_or_default();
            return Err(ServiceError::api_status("tts", status, detail));
        }

        let payload: serde_json::Value = response.json().await?;
        let audio_content = payload
            .get("audioContent")
            .and_then(|a| a.as_str())
            .unwrap_or_default();

        if audio_content.is_empty() {
            return Err(ServiceError::invalid_response(
                "tts",
                "TTS returned empty content",
            ));
        }

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(audio_content)
            .map_err(|e| ServiceError::invalid_response("tts", format!("bad audio base64: {}", e)))?;

        info!(
            script_chars = script.len(),
            audio_bytes = bytes.len(),
            language = %options.language_code,
            "Synthesized voiceover"
        );
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn options() -> VoiceOptions {
        VoiceOptions {
            language_code: "en-US".to_string(),
            voice_name: "en-US-Neural2-D".to_string(),
            speaking_rate: 1.0,
            pitch: 0.0,
            style: "authoritative".to_string(),
        }
    }

    #[tokio::test]
    async fn test_synthesize_decodes_audio() {
        let server = MockServer::start().await;
        let audio = base64::engine::general_purpose::STANDARD.encode(b"mp3-bytes");

        Mock::given(method("POST"))
            .and(path("/text:synthesize"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "audioContent": audio
            })))
            .mount(&server)
            .await;

        let client = SpeechClient::new("key").with_base_url(server.uri());
        let bytes = client.synthesize("Hello world", &options()).await.unwrap();
        assert_eq!(bytes, b"mp3-bytes");
    }

    #[tokio::test]
    async fn test_synthesize_rejects_empty_content() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "audioContent": ""
            })))
            .mount(&server)
            .await;

        let client = SpeechClient::new("key").with_base_url(server.uri());
        let err = client.synthesize("Hello", &options()).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidResponse { .. }));
    }
}
