//! Veo video-generation job handles.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of an asynchronous video-generation job.
///
/// Transitions are monotonic: `Pending -> Running -> {Succeeded, Failed}`.
/// Once terminal, a job never changes status again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VeoJobStatus {
    #[default]
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl VeoJobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VeoJobStatus::Pending => "PENDING",
            VeoJobStatus::Running => "RUNNING",
            VeoJobStatus::Succeeded => "SUCCEEDED",
            VeoJobStatus::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, VeoJobStatus::Succeeded | VeoJobStatus::Failed)
    }
}

impl fmt::Display for VeoJobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Handle and current state of an external video-generation job.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VeoJob {
    /// Operation name returned at submission, used for polling
    pub job_id: String,

    /// Current job status
    pub status: VeoJobStatus,

    /// Generated video location (present only on success)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,

    /// Generated clip duration in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_sec: Option<u32>,

    /// Provider error message (present only on failure)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VeoJob {
    /// A freshly submitted job in the running state.
    pub fn running(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: VeoJobStatus::Running,
            video_url: None,
            duration_sec: None,
            error: None,
        }
    }

    /// A locally failed job (submission error or polling budget exhausted).
    pub fn failed(job_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: VeoJobStatus::Failed,
            video_url: None,
            duration_sec: None,
            error: Some(error.into()),
        }
    }
}
