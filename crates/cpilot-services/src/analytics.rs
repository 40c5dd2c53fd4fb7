//! YouTube Analytics summary client.
//!
//! Queries a 28-day daily report and aggregates it into a single
//! `AnalyticsSummary`. Authentication is a caller-supplied OAuth bearer
//! token; token exchange lives outside this crate.

use chrono::{Duration, Utc};
use reqwest::Client;
use tracing::info;

use cpilot_models::AnalyticsSummary;

use crate::error::{ServiceError, ServiceResult};

const DEFAULT_BASE_URL: &str = "https://youtubeanalytics.googleapis.com/v2";

/// Rolling analytics window in days.
const WINDOW_DAYS: i64 = 28;

/// YouTube Analytics API client.
pub struct AnalyticsClient {
    access_token: String,
    base_url: String,
    client: Client,
}

impl AnalyticsClient {
    /// Create a client around an OAuth access token.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: Client::new(),
        }
    }

    /// Override the API base URL (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch and aggregate the 28-day channel summary.
    pub async fn fetch_summary(&self) -> ServiceResult<AnalyticsSummary> {
        let end = Utc::now().date_naive();
        let start = end - Duration::days(WINDOW_DAYS);

        let url = format!(
            "{}/reports?ids=channel%3D%3DMINE&startDate={}&endDate={}&metrics={}&dimensions=day&sort=day",
            self.base_url,
            start,
            end,
            "views,estimatedMinutesWatched,averageViewDuration,impressions,annotationClickThroughRate,subscribersGained,subscribersLost"
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = response.text().await.unwrap_or_default();
            return Err(ServiceError::api_status("youtube-analytics", status, detail));
        }

        let payload: serde_json::Value = response.json().await?;
        let rows = payload
            .pointer("/rows")
            .and_then(|r| r.as_array())
            .cloned()
            .unwrap_or_default();

        // Zeroed stats for a new or empty channel
        if rows.is_empty() {
            return Ok(AnalyticsSummary::default());
        }

        let mut views = 0u64;
        let mut watch_time = 0u64;
        let mut duration_sum = 0.0f64;
        let mut ctr_sum = 0.0f64;
        let mut subs_gained = 0i64;
        let mut subs_lost = 0i64;

        // Row indices match the metrics order: day, views, minutes,
        // avgDuration, impressions, CTR, subsGained, subsLost.
        for row in &rows {
            let col = |i: usize| row.get(i).and_then(|v| v.as_f64()).unwrap_or(0.0);
            views += col(1) as u64;
            watch_time += col(2) as u64;
            duration_sum += col(3);
            ctr_sum += col(5);
            subs_gained += col(6) as i64;
            subs_lost += col(7) as i64;
        }

        let row_count = rows.len() as f64;
        let avg_view_duration = if views > 0 { duration_sum / row_count } else { 0.0 };

        // VTR is a heuristic normalized to a one-minute watch
        let vtr = ((avg_view_duration / 60.0) * 100.0).clamp(0.0, 100.0);

        let summary = AnalyticsSummary {
            views,
            watch_time_minutes: watch_time,
            avg_view_duration_seconds: avg_view_duration.round() as u32,
            vtr: (vtr * 10.0).round() / 10.0,
            ctr: (ctr_sum / row_count * 10.0).round() / 10.0,
            subscriber_delta: subs_gained - subs_lost,
        };

        info!(views = summary.views, vtr = summary.vtr, "Fetched analytics summary");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_empty_channel_yields_zeroed_summary() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reports"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "rows": []
            })))
            .mount(&server)
            .await;

        let client = AnalyticsClient::new("token").with_base_url(server.uri());
        let summary = client.fetch_summary().await.unwrap();
        assert_eq!(summary.views, 0);
        assert_eq!(summary.subscriber_delta, 0);
    }

    #[tokio::test]
    async fn test_rows_aggregate() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "rows": [
                    ["2026-08-01", 100, 50, 30.0, 1000, 4.0, 10, 2],
                    ["2026-08-02", 300, 150, 60.0, 3000, 6.0, 20, 3]
                ]
            })))
            .mount(&server)
            .await;

        let client = AnalyticsClient::new("token").with_base_url(server.uri());
        let summary = client.fetch_summary().await.unwrap();

        assert_eq!(summary.views, 400);
        assert_eq!(summary.watch_time_minutes, 200);
        assert_eq!(summary.avg_view_duration_seconds, 45);
        assert_eq!(summary.ctr, 5.0);
        assert_eq!(summary.subscriber_delta, 25);
    }
}
