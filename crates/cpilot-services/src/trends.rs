//! YouTube trend scanning.
//!
//! Two passes against the Data API: a last-24h search on a rotating AI query
//! for breaking news, then the mostPopular science-and-tech chart filtered
//! locally to AI-related titles. Results are merged and de-duplicated by
//! source video ID.

use chrono::{Duration, Timelike, Utc};
use reqwest::Client;
use std::collections::HashSet;
use tracing::info;

use cpilot_models::{GrowthPotential, Trend};

use crate::error::{ServiceError, ServiceResult};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Queries rotated hourly to spread Data API quota.
const AI_QUERIES: &[&str] = &[
    "Artificial Intelligence",
    "AI News",
    "Künstliche Intelligenz",
    "ChatGPT",
    "Google Veo",
    "OpenAI",
    "AI Tools",
    "Generative AI",
];

/// YouTube Data API trend client.
pub struct TrendClient {
    api_key: String,
    base_url: String,
    client: Client,
}

impl TrendClient {
    /// Create a new trend client.
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

    /// Fetch current candidate topics.
    pub async fn fetch_trends(&self) -> ServiceResult<Vec<Trend>> {
        let query = AI_QUERIES[(Utc::now().hour() as usize) % AI_QUERIES.len()];
        let mut trends = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        self.collect_breaking(query, &mut trends, &mut seen).await?;
        self.collect_popular(&mut trends, &mut seen).await?;

        info!(query = %query, count = trends.len(), "Trend scan complete");
        Ok(trends)
    }

    /// Breaking/recent news via the search endpoint.
    async fn collect_breaking(
        &self,
        query: &str,
        trends: &mut Vec<Trend>,
        seen: &mut HashSet<String>,
    ) -> ServiceResult<()> {
        let published_after = (Utc::now() - Duration::hours(24)).to_rfc3339();
        let url = format!(
            "{}/search?part=snippet&q={}&order=date&type=video&videoDuration=medium&maxResults=5&publishedAfter={}&key={}",
            self.base_url,
            urlencoding::encode(query),
            urlencoding::encode(&published_after),
            self.api_key
        );

        let payload = self.get_json(&url, "youtube-search").await?;

        let items = payload.pointer("/items").and_then(|i| i.as_array());
        for item in items.map(|a| a.as_slice()).unwrap_or_default() {
            let video_id = item.pointer("/id/videoId").and_then(|v| v.as_str());
            let title = item.pointer("/snippet/title").and_then(|t| t.as_str());
            if let (Some(video_id), Some(title)) = (video_id, title) {
                if seen.insert(video_id.to_string()) {
                    trends.push(Trend {
                        id: video_id.to_string(),
                        topic: title.to_string(),
                        // High because it matches the query and is recent
                        relevance: 95,
                        category: "News".to_string(),
                        growth_potential: GrowthPotential::High,
                        source_video_id: Some(video_id.to_string()),
                        is_breaking: true,
                        view_count: 0,
                    });
                }
            }
        }
        Ok(())
    }

    /// Popular tech videos, filtered locally to AI-related titles.
    async fn collect_popular(
        &self,
        trends: &mut Vec<Trend>,
        seen: &mut HashSet<String>,
    ) -> ServiceResult<()> {
        let url = format!(
            "{}/videos?part=snippet%2Cstatistics&chart=mostPopular&regionCode=US&videoCategoryId=28&maxResults=10&key={}",
            self.base_url, self.api_key
        );

        let payload = self.get_json(&url, "youtube-videos").await?;

        let items = payload.pointer("/items").and_then(|i| i.as_array());
        for item in items.map(|a| a.as_slice()).unwrap_or_default() {
            let video_id = item.pointer("/id").and_then(|v| v.as_str());
            let title = item
                .pointer("/snippet/title")
                .and_then(|t| t.as_str())
                .unwrap_or("");

            let is_ai_related = AI_QUERIES
                .iter()
                .any(|q| title.to_lowercase().contains(&q.to_lowercase()));

            if let Some(video_id) = video_id {
                if is_ai_related && seen.insert(video_id.to_string()) {
                    let views = item
                        .pointer("/statistics/viewCount")
                        .and_then(|v| v.as_str())
                        .and_then(|v| v.parse::<u64>().ok())
                        .unwrap_or(0);

                    trends.push(Trend {
                        id: video_id.to_string(),
                        topic: title.to_string(),
                        relevance: 85,
                        category: "Deep Dive".to_string(),
                        growth_potential: if views > 100_000 {
                            GrowthPotential::High
                        } else {
                            GrowthPotential::Medium
                        },
                        source_video_id: Some(video_id.to_string()),
                        is_breaking: false,
                        view_count: views,
                    });
                }
            }
        }
        Ok(())
    }

    async fn get_json(
        &self,
        url: &str,
        service: &'static str,
    ) -> ServiceResult<serde_json::Value> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = response.text().await.unwrap_or_default();
            return Err(ServiceError::api_status(service, status, detail));
        }

        Ok(response.json().await?)
    }
}
