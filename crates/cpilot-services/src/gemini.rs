//! Gemini client for planning and script generation.
//!
//! Both calls use structured JSON output: a response schema is sent with the
//! request and the reply is parsed straight into the model types. Markdown
//! code fences are stripped defensively before parsing.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use cpilot_models::{
    ActionPlan, AnalyticsSummary, ContentAssets, ContentItem, ContentItemType, StrategyProfile,
    Trend,
};

use crate::error::{ServiceError, ServiceResult};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const PLANNING_MODEL: &str = "gemini-2.5-flash";

/// Planning keeps the most relevant 15 trends; more dilutes the context.
const MAX_PLANNING_TRENDS: usize = 15;

/// Gemini API client.
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
    #[serde(rename = "responseSchema")]
    response_schema: serde_json::Value,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: String,
}

impl GeminiClient {
    /// Create a new Gemini client.
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

    /// Generate the cycle's action plan from profile, trends and analytics.
    ///
    /// Planning must not fabricate topics: trends without both a topic and
    /// an ID are discarded, and an empty candidate list is an error rather
    /// than an invitation to hallucinate.
    pub async fn generate_action_plan(
        &self,
        profile: &StrategyProfile,
        trends: &[Trend],
        analytics: &AnalyticsSummary,
    ) -> ServiceResult<ActionPlan> {
        let mut valid: Vec<&Trend> = trends.iter().filter(|t| t.is_valid()).collect();
        valid.sort_by(|a, b| b.relevance.cmp(&a.relevance));
        valid.truncate(MAX_PLANNING_TRENDS);

        if valid.is_empty() {
            return Err(ServiceError::NoValidTrends);
        }

        let trends_context: String = valid
            .iter()
            .map(|t| {
                format!(
                    "- Topic: {} (Source ID: {}, Category: {})\n",
                    t.topic,
                    t.source_video_id.as_deref().unwrap_or(&t.id),
                    t.category
                )
            })
            .collect();

        let prompt = format!(
            r#"You are an autonomous YouTube growth strategist for an AI channel.

STRATEGY PROFILE:
Niche: {niche}
Language: {language} (Output must be in this language)
Videos/Day: {videos_per_day}
Shorts/Day: {shorts_per_day}

REAL-TIME TRENDS (YouTube Data):
{trends_context}
CHANNEL PERFORMANCE:
Views (28d): {views}
VTR: {vtr}%
Avg Duration: {avg_duration}s

TASK:
Generate a daily content action plan based ONLY on the provided trends.
DO NOT hallucinate new AI models or releases. Use the provided topics.

1. Select {videos_per_day} LONGFORM topics.
2. Select {shorts_per_day} SHORTS topics.
3. Priority: prioritize 'breaking' news or high-growth topics.
4. For each item, you must identify a clear angle (e.g. "How to use X", "Why X matters").

RETURN JSON ONLY."#,
            niche = profile.niche,
            language = profile.language,
            videos_per_day = profile.videos_per_day,
            shorts_per_day = profile.shorts_per_day,
            trends_context = trends_context,
            views = analytics.views,
            vtr = analytics.vtr,
            avg_duration = analytics.avg_view_duration_seconds,
        );

        let text = self
            .generate(PLANNING_MODEL, &prompt, action_plan_schema(), 0.5)
            .await?;

        let plan: ActionPlan = serde_json::from_str(clean_json(&text))
            .map_err(|e| ServiceError::invalid_response("gemini", format!("action plan: {}", e)))?;

        info!(
            longform = plan.longform.len(),
            shorts = plan.shorts.len(),
            "Generated action plan"
        );
        Ok(plan)
    }

    /// Generate production assets (visual prompt, voiceover script, metadata)
    /// for one planned item.
    pub async fn generate_scripts_and_prompts(
        &self,
        profile: &StrategyProfile,
        item: &ContentItem,
    ) -> ServiceResult<ContentAssets> {
        let language_instruction = if profile.language == "de" {
            "OUTPUT MUST BE IN GERMAN (Deutsch). The Voiceover script must be naturally spoken German."
        } else {
            "OUTPUT MUST BE IN ENGLISH."
        };

        let style_guide = match item.item_type {
            ContentItemType::Longform => {
                "Professional cinematography: slow dolly and crane moves, volumetric \
                 lighting, high-end tech aesthetic, 16:9 composition."
            }
            ContentItemType::Short => {
                "Fast-paced vertical framing: punchy cuts, macro closeups, bold \
                 contrast, 9:16 composition with a visual hook in the first second."
            }
        };

        let prompt = format!(
            r#"You are a professional AI Content Creator and Director.
Create production assets for a {item_type} video.

CONTEXT:
Topic: {topic}
Angle: {angle}
Language: {language}
Tone: {tone}

INSTRUCTIONS:
{language_instruction}

1. veoPrompt:
   - Describe VISUALS ONLY. No spoken words, no text overlays description in this field.
   - Focus on camera movement, lighting, style (Cinematic/Tech), and objects.
   - Use this style guide: {style_guide}

2. voiceoverScript:
   - Full spoken script for Text-to-Speech.
   - Must contain a strong HOOK (0-5s).
   - Must include concrete VALUE/USE CASES (no fluff).
   - Clear CTA at the end.
   - Add tone annotations like [Excited], [Serious] for the TTS engine.

3. metadata:
   - YouTube SEO title, description, tags.
   - Thumbnail concept description.

RETURN JSON ONLY."#,
            item_type = item.item_type,
            topic = item.topic,
            angle = item.angle,
            language = profile.language,
            tone = profile.tone,
            language_instruction = language_instruction,
            style_guide = style_guide,
        );

        let text = self
            .generate(PLANNING_MODEL, &prompt, content_assets_schema(), 0.7)
            .await?;

        let assets: ContentAssets = serde_json::from_str(clean_json(&text))
            .map_err(|e| ServiceError::invalid_response("gemini", format!("assets: {}", e)))?;

        if !assets.is_complete() {
            return Err(ServiceError::incomplete(
                "missing veoPrompt or voiceoverScript",
            ));
        }

        Ok(assets)
    }

    /// Call the generateContent endpoint and return the first candidate text.
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        response_schema: serde_json::Value,
        temperature: f64,
    ) -> ServiceResult<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        );

        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema,
                temperature,
            },
        };

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = response.text().await.unwrap_or_default();
            return Err(ServiceError::api_status("gemini", status, detail));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::invalid_response("gemini", e.to_string()))?;

        gemini_response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or_else(|| ServiceError::invalid_response("gemini", "no content in response"))
    }
}

/// Strip markdown code fences a model sometimes wraps around JSON.
fn clean_json(text: &str) -> &str {
    let text = text.trim();
    let text = text.strip_prefix("```json").unwrap_or(text);
    let text = text.strip_prefix("```").unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}

fn content_item_schema(item_type: &str) -> serde_json::Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "id": { "type": "STRING" },
                "type": { "type": "STRING", "enum": [item_type] },
                "topic": { "type": "STRING" },
                "angle": { "type": "STRING" },
                "targetDurationSec": { "type": "NUMBER" },
                "targetAudience": { "type": "STRING" },
                "priority": { "type": "STRING", "enum": ["LOW", "MEDIUM", "HIGH"] },
                "isNews": { "type": "BOOLEAN" },
                "useCasesRequired": { "type": "BOOLEAN" },
                "trendId": { "type": "STRING" }
            },
            "required": ["id", "type", "topic", "angle", "targetDurationSec", "priority"]
        }
    })
}

fn action_plan_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "longform": content_item_schema("LONGFORM"),
            "shorts": content_item_schema("SHORT"),
            "generatedAt": { "type": "STRING" }
        },
        "required": ["longform", "shorts", "generatedAt"]
    })
}

fn content_assets_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "veoPrompt": { "type": "STRING" },
            "voiceoverScript": { "type": "STRING" },
            "metadata": {
                "type": "OBJECT",
                "properties": {
                    "title": { "type": "STRING" },
                    "description": { "type": "STRING" },
                    "tags": { "type": "ARRAY", "items": { "type": "STRING" } },
                    "thumbnailConcept": { "type": "STRING" }
                },
                "required": ["title", "description", "tags", "thumbnailConcept"]
            }
        },
        "required": ["veoPrompt", "voiceoverScript", "metadata"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cpilot_models::GrowthPotential;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn trend(id: &str, topic: &str, relevance: u32) -> Trend {
        Trend {
            id: id.to_string(),
            topic: topic.to_string(),
            relevance,
            category: "News".to_string(),
            growth_potential: GrowthPotential::High,
            source_video_id: Some(id.to_string()),
            is_breaking: true,
            view_count: 0,
        }
    }

    #[test]
    fn test_clean_json_strips_fences() {
        assert_eq!(clean_json("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(clean_json("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(clean_json("```\n{}\n```"), "{}");
    }

    #[tokio::test]
    async fn test_plan_fails_without_valid_trends() {
        let client = GeminiClient::new("test-key");
        let trends = vec![trend("", "topicless id", 90), trend("id1", "  ", 80)];

        let err = client
            .generate_action_plan(
                &StrategyProfile::default(),
                &trends,
                &AnalyticsSummary::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::NoValidTrends));
    }

    #[tokio::test]
    async fn test_plan_parses_structured_response() {
        let server = MockServer::start().await;

        let body = serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [{
                        "text": "```json\n{\"longform\":[],\"shorts\":[{\"id\":\"s1\",\"type\":\"SHORT\",\"topic\":\"Gemini agents\",\"angle\":\"Why it matters\",\"targetDurationSec\":45,\"priority\":\"HIGH\",\"isNews\":true}],\"generatedAt\":\"2026-08-30T10:00:00Z\"}\n```"
                    }]
                }
            }]
        });

        Mock::given(method("POST"))
            .and(path(format!(
                "/models/{}:generateContent",
                PLANNING_MODEL
            )))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let client = GeminiClient::new("test-key").with_base_url(server.uri());
        let plan = client
            .generate_action_plan(
                &StrategyProfile::default(),
                &[trend("abc", "Gemini agents", 95)],
                &AnalyticsSummary::default(),
            )
            .await
            .unwrap();

        assert_eq!(plan.shorts.len(), 1);
        assert_eq!(plan.shorts[0].topic, "Gemini agents");
        assert!(plan.shorts[0].is_news);
    }

    #[tokio::test]
    async fn test_assets_rejects_incomplete_generation() {
        let server = MockServer::start().await;

        let body = serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [{
                        "text": "{\"veoPrompt\":\"a shot\",\"voiceoverScript\":\"\",\"metadata\":{\"title\":\"t\",\"description\":\"d\",\"tags\":[],\"thumbnailConcept\":\"c\"}}"
                    }]
                }
            }]
        });

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let client = GeminiClient::new("test-key").with_base_url(server.uri());
        let item = ContentItem {
            id: "i1".into(),
            item_type: ContentItemType::Short,
            topic: "Topic".to_string(),
            angle: "Angle".to_string(),
            target_duration_sec: 45,
            target_audience: String::new(),
            priority: Default::default(),
            is_news: false,
            use_cases_required: false,
            trend_id: None,
        };

        let err = client
            .generate_scripts_and_prompts(&StrategyProfile::default(), &item)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::IncompleteGeneration(_)));
    }
}
