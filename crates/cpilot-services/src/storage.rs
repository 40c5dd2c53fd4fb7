//! S3-compatible media storage for synthesized narration.

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use chrono::Utc;
use tracing::{debug, info};

use crate::error::{ServiceError, ServiceResult};

/// Configuration for the media storage client.
#[derive(Debug, Clone)]
pub struct MediaStorageConfig {
    /// S3 API endpoint
    pub endpoint_url: String,
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Region (usually "auto" for S3-compatible stores)
    pub region: String,
    /// Public base URL objects are served from
    pub public_base_url: String,
}

impl MediaStorageConfig {
    /// Create config from environment variables.
    pub fn from_env() -> ServiceResult<Self> {
        Ok(Self {
            endpoint_url: std::env::var("MEDIA_ENDPOINT_URL")
                .map_err(|_| ServiceError::config_error("MEDIA_ENDPOINT_URL not set"))?,
            access_key_id: std::env::var("MEDIA_ACCESS_KEY_ID")
                .map_err(|_| ServiceError::config_error("MEDIA_ACCESS_KEY_ID not set"))?,
            secret_access_key: std::env::var("MEDIA_SECRET_ACCESS_KEY")
                .map_err(|_| ServiceError::config_error("MEDIA_SECRET_ACCESS_KEY not set"))?,
            region: std::env::var("MEDIA_REGION").unwrap_or_else(|_| "auto".to_string()),
            public_base_url: std::env::var("MEDIA_PUBLIC_BASE_URL")
                .map_err(|_| ServiceError::config_error("MEDIA_PUBLIC_BASE_URL not set"))?,
        })
    }
}

/// Media storage client for narration audio.
#[derive(Clone)]
pub struct MediaStorage {
    client: Client,
    public_base_url: String,
}

impl MediaStorage {
    /// Create a new storage client from configuration.
    pub fn new(config: MediaStorageConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "media",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint_url)
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(sdk_config),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> ServiceResult<Self> {
        Ok(Self::new(MediaStorageConfig::from_env()?))
    }

    /// Store voiceover audio and return its retrievable URL.
    ///
    /// Keys are timestamped per user so repeated syntheses of the same item
    /// never overwrite each other.
    pub async fn store_voiceover(
        &self,
        bucket: &str,
        user_id: &str,
        audio: Vec<u8>,
    ) -> ServiceResult<String> {
        let key = format!("voiceovers/{}/{}.mp3", user_id, Utc::now().timestamp_millis());
        debug!(bucket = %bucket, key = %key, bytes = audio.len(), "Uploading voiceover");

        self.client
            .put_object()
            .bucket(bucket)
            .key(&key)
            .body(ByteStream::from(audio))
            .content_type("audio/mpeg")
            .send()
            .await
            .map_err(|e| ServiceError::upload_failed(e.to_string()))?;

        let url = format!("{}/{}/{}", self.public_base_url, bucket, key);
        info!(url = %url, "Stored voiceover");
        Ok(url)
    }
}
