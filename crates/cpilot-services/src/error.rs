//! Service client error types.

use thiserror::Error;

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors that can occur calling external services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Service misconfigured: {0}")]
    ConfigError(String),

    #[error("No valid trends available for planning")]
    NoValidTrends,

    #[error("Generation incomplete: {0}")]
    IncompleteGeneration(String),

    #[error("{service} returned {status}: {detail}")]
    ApiStatus {
        service: &'static str,
        status: u16,
        detail: String,
    },

    #[error("Invalid response from {service}: {detail}")]
    InvalidResponse {
        service: &'static str,
        detail: String,
    },

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ServiceError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn incomplete(msg: impl Into<String>) -> Self {
        Self::IncompleteGeneration(msg.into())
    }

    pub fn api_status(service: &'static str, status: u16, detail: impl Into<String>) -> Self {
        Self::ApiStatus {
            service,
            status,
            detail: detail.into(),
        }
    }

    pub fn invalid_response(service: &'static str, detail: impl Into<String>) -> Self {
        Self::InvalidResponse {
            service,
            detail: detail.into(),
        }
    }

    pub fn upload_failed(msg: impl Into<String>) -> Self {
        Self::UploadFailed(msg.into())
    }
}
