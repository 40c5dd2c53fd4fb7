//! Append-only per-user event log.
//!
//! Events land in `logs/{user}/events` and are mirrored to tracing so the
//! process log carries the same record as the persisted one.

use chrono::Utc;
use tracing::{error, info};

use cpilot_models::{LogEntry, LogEvent, LogStatus};

use crate::client::FirestoreClient;
use crate::error::FirestoreResult;
use crate::value::json_to_fields;

/// Repository for the per-user event log.
#[derive(Clone)]
pub struct EventLogRepository {
    client: FirestoreClient,
}

impl EventLogRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    fn parent(user_id: &str) -> String {
        format!("logs/{}", user_id)
    }

    fn collection(user_id: &str) -> String {
        format!("logs/{}/events", user_id)
    }

    /// Append an event.
    ///
    /// Persistence failures are reported to the caller but the tracing
    /// mirror always fires, so an unavailable log store never hides what
    /// the cycle did.
    pub async fn append(&self, event: &LogEvent) -> FirestoreResult<()> {
        let status = event.effective_status();

        match status {
            LogStatus::Error => error!(
                user_id = %event.user_id,
                category = %event.category,
                "{}", event.message
            ),
            _ => info!(
                user_id = %event.user_id,
                category = %event.category,
                status = status.as_str(),
                "{}", event.message
            ),
        }

        let fields = json_to_fields(&serde_json::json!({
            "timestamp": Utc::now(),
            "category": event.category.as_str(),
            "message": event.message,
            "status": status.as_str(),
            "details": event.payload.as_ref().map(|p| p.to_string()),
        }));

        self.client
            .add_document(&Self::collection(&event.user_id), fields)
            .await?;
        Ok(())
    }

    /// Most recent entries for a user, newest first, bounded by `limit`.
    pub async fn recent(&self, user_id: &str, limit: u32) -> FirestoreResult<Vec<LogEntry>> {
        let docs = self
            .client
            .query_recent(&Self::parent(user_id), "events", "timestamp", limit)
            .await?;

        let mut entries = Vec::with_capacity(docs.len());
        for doc in docs {
            let mut json = doc.to_json();
            if let serde_json::Value::Object(map) = &mut json {
                map.insert(
                    "id".to_string(),
                    serde_json::Value::String(doc.id().unwrap_or_default().to_string()),
                );
            }
            entries.push(serde_json::from_value(json)?);
        }
        Ok(entries)
    }
}
