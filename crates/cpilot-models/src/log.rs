//! Event-log entries persisted per user.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline stage a log event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogCategory {
    System,
    Strategy,
    Trend,
    Script,
    Veo,
    #[serde(rename = "NATIVE_AUDIO")]
    Audio,
    Upload,
    Analytics,
}

impl LogCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogCategory::System => "SYSTEM",
            LogCategory::Strategy => "STRATEGY",
            LogCategory::Trend => "TREND",
            LogCategory::Script => "SCRIPT",
            LogCategory::Veo => "VEO",
            LogCategory::Audio => "NATIVE_AUDIO",
            LogCategory::Upload => "UPLOAD",
            LogCategory::Analytics => "ANALYTICS",
        }
    }
}

impl fmt::Display for LogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Severity of a log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogStatus {
    #[default]
    Info,
    Success,
    Error,
}

impl LogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogStatus::Info => "INFO",
            LogStatus::Success => "SUCCESS",
            LogStatus::Error => "ERROR",
        }
    }
}

/// Write shape accepted by the event-log sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    pub user_id: String,
    pub category: LogCategory,
    pub message: String,

    /// Explicit severity; inferred from category and message when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LogStatus>,

    /// Free-form structured payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl LogEvent {
    pub fn new(user_id: impl Into<String>, category: LogCategory, message: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            category,
            message: message.into(),
            status: None,
            payload: None,
        }
    }

    pub fn with_status(mut self, status: LogStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Resolve the effective severity.
    ///
    /// Uploads and success-sounding messages are promoted to SUCCESS;
    /// failure-sounding messages to ERROR.
    pub fn effective_status(&self) -> LogStatus {
        if let Some(status) = self.status {
            return status;
        }
        let lower = self.message.to_lowercase();
        if self.category == LogCategory::Upload || lower.contains("success") {
            LogStatus::Success
        } else if lower.contains("fail") || lower.contains("error") {
            LogStatus::Error
        } else {
            LogStatus::Info
        }
    }
}

/// Read shape returned by the event-log query path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub category: LogCategory,
    pub message: String,
    pub status: LogStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
