//! Veo video-generation client.
//!
//! Submission starts a long-running operation; the returned operation name
//! is the job ID used for polling. Polling maps the operation state onto the
//! monotonic `VeoJobStatus` machine; everything non-terminal stays RUNNING.

use reqwest::Client;
use serde_json::json;
use tracing::{info, warn};

use cpilot_models::{VeoJob, VeoJobStatus};

use crate::error::{ServiceError, ServiceResult};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Veo preview clips come back around this length when the API omits it.
const DEFAULT_CLIP_SECONDS: u32 = 5;

/// Veo API client.
pub struct VeoClient {
    api_key: String,
    base_url: String,
    client: Client,
}

impl VeoClient {
    /// Create a new Veo client.
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

    /// Submit a video-generation job.
    ///
    /// The aspect ratio is fixed at submission: 16:9 for long-form,
    /// 9:16 for shorts.
    pub async fn submit(
        &self,
        prompt: &str,
        aspect_ratio: &str,
        model: &str,
    ) -> ServiceResult<VeoJob> {
        let url = format!(
            "{}/models/{}:predictLongRunning?key={}",
            self.base_url, model, self.api_key
        );

        let body = json!({
            "instances": [{ "prompt": prompt }],
            "parameters": {
                "sampleCount": 1,
                "aspectRatio": aspect_ratio
            }
        });

        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = response.text().await.unwrap_or_default();
            return Err(ServiceError::api_status("veo", status, detail));
        }

        let operation: serde_json::Value = response.json().await?;
        let job_id = operation
            .get("name")
            .and_then(|n| n.as_str())
            .ok_or_else(|| ServiceError::invalid_response("veo", "operation has no name"))?;

        info!(
            job_id = %job_id,
            model = %model,
            aspect_ratio = %aspect_ratio,
            "Submitted Veo job"
        );

        Ok(VeoJob::running(job_id))
    }

    /// Poll a job by operation name.
    ///
    /// Poll errors resolve to a FAILED job rather than propagating: the
    /// caller's state machine treats any poll response uniformly.
    pub async fn poll(&self, job_id: &str) -> VeoJob {
        match self.poll_inner(job_id).await {
            Ok(job) => job,
            Err(e) => {
                warn!(job_id = %job_id, "Veo poll failed: {}", e);
                VeoJob::failed(job_id, e.to_string())
            }
        }
    }

    async fn poll_inner(&self, job_id: &str) -> ServiceResult<VeoJob> {
        let url = format!("{}/{}?key={}", self.base_url, job_id, self.api_key);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = response.text().await.unwrap_or_default();
            return Err(ServiceError::api_status("veo", status, detail));
        }

        let operation: serde_json::Value = response.json().await?;
        let done = operation
            .get("done")
            .and_then(|d| d.as_bool())
            .unwrap_or(false);

        if !done {
            return Ok(VeoJob {
                job_id: job_id.to_string(),
                status: VeoJobStatus::Running,
                video_url: None,
                duration_sec: None,
                error: None,
            });
        }

        if let Some(error) = operation.get("error") {
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown provider error");
            return Ok(VeoJob::failed(job_id, message));
        }

        // Operation result shapes differ between API revisions; accept both.
        let uri = operation
            .pointer("/response/generateVideoResponse/generatedSamples/0/video/uri")
            .or_else(|| operation.pointer("/response/generatedVideos/0/video/uri"))
            .and_then(|u| u.as_str());

        match uri {
            Some(uri) => {
                // The video URI needs the API key appended to be fetchable.
                let separator = if uri.contains('?') { '&' } else { '?' };
                Ok(VeoJob {
                    job_id: job_id.to_string(),
                    status: VeoJobStatus::Succeeded,
                    video_url: Some(format!("{}{}key={}", uri, separator, self.api_key)),
                    duration_sec: Some(DEFAULT_CLIP_SECONDS),
                    error: None,
                })
            }
            // Done without a video is itself a failure condition.
            None => Ok(VeoJob::failed(job_id, "operation finished without a video")),
        }
    }
}
