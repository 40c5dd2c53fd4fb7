//! The hourly production cycle.
//!
//! One cycle for one user: gate on config and automation settings, load
//! planning context, generate an action plan, drop topics produced recently,
//! then run the surviving items strictly in sequence. A failed item is
//! logged and skipped; the batch always continues. Every non-fatal
//! completion reschedules the next run.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{error, info, warn};

use cpilot_models::{
    ActionPlan, ContentDocument, ContentItem, ItemOutcome, LogCategory, LogEvent, LogStatus,
    StrategyProfile,
};

use crate::config::{CycleConfig, CycleOptions};
use crate::error::{CycleError, ItemError};
use crate::ports::{
    AnalyticsSource, ConfigStore, ContentStore, EventSink, PlanningService, ProfileStore,
    PublishService, ScriptingService, SettingsStore, Sleeper, SpeechSynthesizer, TrendSource,
    VideoGenerator,
};
use crate::video_job;
use crate::voice;

/// Everything the orchestrator talks to, behind trait objects.
pub struct Collaborators {
    pub config_store: Arc<dyn ConfigStore>,
    pub settings: Arc<dyn SettingsStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub analytics: Arc<dyn AnalyticsSource>,
    pub trends: Arc<dyn TrendSource>,
    pub planner: Arc<dyn PlanningService>,
    pub scripter: Arc<dyn ScriptingService>,
    pub video: Arc<dyn VideoGenerator>,
    pub speech: Arc<dyn SpeechSynthesizer>,
    pub publisher: Arc<dyn PublishService>,
    pub content: Arc<dyn ContentStore>,
    pub events: Arc<dyn EventSink>,
    pub sleeper: Arc<dyn Sleeper>,
}

/// How a cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The cycle ran to the end (possibly with zero items).
    Completed,
    /// Automation is disabled for the user and the run was not forced.
    AutomationDisabled,
    /// A fatal error aborted the cycle before completion.
    Fatal,
}

/// Summary of one cycle, used for logging and scheduling decisions.
#[derive(Debug)]
pub struct CycleReport {
    pub outcome: CycleOutcome,
    pub items: Vec<ItemOutcome>,
}

impl CycleReport {
    fn completed(items: Vec<ItemOutcome>) -> Self {
        Self { outcome: CycleOutcome::Completed, items }
    }

    pub fn published(&self) -> usize {
        self.items.iter().filter(|o| o.is_published()).count()
    }
}

/// Drives production cycles against a set of collaborators.
pub struct CycleRunner {
    config: CycleConfig,
    collab: Collaborators,
}

impl CycleRunner {
    pub fn new(config: CycleConfig, collab: Collaborators) -> Self {
        Self { config, collab }
    }

    /// Run one cycle for one user. Never returns an error: fatal failures
    /// are logged to the user's event feed and folded into the report.
    pub async fn run_cycle(&self, user_id: &str, options: CycleOptions) -> CycleReport {
        match self.execute(user_id, options).await {
            Ok(report) => report,
            Err(err) => {
                error!(user_id, error = %err, "Production cycle aborted");
                let message = match &err {
                    CycleError::MissingGenerationKey => {
                        "Skipping cycle: generation API key is not configured.".to_string()
                    }
                    other => format!("Production cycle failed: {other}"),
                };
                self.collab
                    .events
                    .log(
                        LogEvent::new(user_id, LogCategory::System, message)
                            .with_status(LogStatus::Error),
                    )
                    .await;
                CycleReport { outcome: CycleOutcome::Fatal, items: Vec::new() }
            }
        }
    }

    async fn execute(
        &self,
        user_id: &str,
        options: CycleOptions,
    ) -> Result<CycleReport, CycleError> {
        let global = self
            .collab
            .config_store
            .get_global()
            .await
            .map_err(CycleError::store)?;
        if global
            .gemini_api_key
            .as_deref()
            .map(str::trim)
            .unwrap_or("")
            .is_empty()
        {
            return Err(CycleError::MissingGenerationKey);
        }

        let settings = self
            .collab
            .settings
            .get(user_id)
            .await
            .map_err(CycleError::store)?;
        if !settings.enabled && !options.force {
            info!(user_id, "Automation disabled, skipping cycle");
            return Ok(CycleReport {
                outcome: CycleOutcome::AutomationDisabled,
                items: Vec::new(),
            });
        }

        let banner = if options.dry_run {
            "Starting autonomous production cycle (DRY RUN)."
        } else {
            "Starting autonomous production cycle."
        };
        self.log(user_id, LogCategory::System, banner).await;

        let (profile, analytics) = tokio::try_join!(
            self.collab.profiles.get(user_id),
            self.collab.analytics.summary(user_id)
        )
        .map_err(CycleError::context_load)?;

        // A trend outage degrades to an empty list; the planner decides
        // whether it can still work with that.
        let trends = match self.collab.trends.trends(user_id).await {
            Ok(trends) => trends,
            Err(err) => {
                warn!(user_id, error = %err, "Trend fetch failed, planning without trends");
                Vec::new()
            }
        };

        let plan = self
            .collab
            .planner
            .plan(&profile, &trends, &analytics)
            .await
            .map_err(CycleError::planning)?;

        let recent = self
            .collab
            .content
            .recent_topics(user_id, self.config.dedup_window)
            .await
            .map_err(CycleError::store)?;
        let batch = merge_and_dedup(plan, &recent);

        if batch.is_empty() {
            self.log(
                user_id,
                LogCategory::Strategy,
                "No new unique topics to produce this cycle.",
            )
            .await;
            self.finish_run(user_id).await?;
            return Ok(CycleReport::completed(Vec::new()));
        }

        info!(user_id, items = batch.len(), "Producing batch");
        let mut outcomes = Vec::with_capacity(batch.len());
        for item in batch {
            let topic = item.topic.clone();
            let outcome = match self
                .produce_item(user_id, &profile, &item, options.dry_run)
                .await
            {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!(user_id, topic = %topic, error = %err, "Item failed, continuing batch");
                    self.collab
                        .events
                        .log(
                            LogEvent::new(
                                user_id,
                                LogCategory::System,
                                format!("Skipping \"{topic}\": {err}"),
                            )
                            .with_status(LogStatus::Error),
                        )
                        .await;
                    ItemOutcome::Failed { topic, reason: err.to_string() }
                }
            };
            outcomes.push(outcome);
        }

        self.finish_run(user_id).await?;

        let published = outcomes.iter().filter(|o| o.is_published()).count();
        let summary = if options.dry_run {
            format!("Production cycle completed (dry run): {} items staged.", outcomes.len())
        } else {
            format!(
                "Production cycle completed: {published} published, {} skipped.",
                outcomes.len() - published
            )
        };
        self.log(user_id, LogCategory::System, summary).await;

        Ok(CycleReport::completed(outcomes))
    }

    /// Run one item through the full pipeline.
    async fn produce_item(
        &self,
        user_id: &str,
        profile: &StrategyProfile,
        item: &ContentItem,
        dry_run: bool,
    ) -> Result<ItemOutcome, ItemError> {
        self.log(
            user_id,
            LogCategory::Script,
            format!("Producing: \"{}\"", item.topic),
        )
        .await;

        let assets = self
            .collab
            .scripter
            .assets(profile, item)
            .await
            .map_err(ItemError::assets)?;
        if !assets.is_complete() {
            return Err(ItemError::Assets(
                "generated assets are missing a prompt or voiceover script".to_string(),
            ));
        }

        let doc = ContentDocument::generated(item.clone(), assets.clone());
        self.collab
            .content
            .create_generated(user_id, &doc)
            .await
            .map_err(ItemError::store)?;

        if dry_run {
            self.collab
                .events
                .log(
                    LogEvent::new(
                        user_id,
                        LogCategory::System,
                        format!(
                            "[DRY RUN] Assets generated. Skipping video and upload for \"{}\".",
                            item.topic
                        ),
                    )
                    .with_status(LogStatus::Success),
                )
                .await;
            return Ok(ItemOutcome::Skipped {
                topic: item.topic.clone(),
                reason: "dry run".to_string(),
            });
        }

        let job = video_job::run_to_terminal(
            self.collab.video.as_ref(),
            self.collab.sleeper.as_ref(),
            self.config.poll_interval,
            self.config.max_poll_attempts,
            &assets.veo_prompt,
            item.item_type.aspect_ratio(),
        )
        .await?;
        self.collab
            .content
            .attach_veo_job(user_id, &item.id, &job)
            .await
            .map_err(ItemError::store)?;
        self.log(
            user_id,
            LogCategory::Veo,
            format!("Video ready for \"{}\"", item.topic),
        )
        .await;

        let voice = voice::voice_options_for(profile);
        let audio_url = self
            .collab
            .speech
            .synthesize(user_id, &assets.voiceover_script, &voice)
            .await
            .map_err(ItemError::audio)?;
        self.log(
            user_id,
            LogCategory::Audio,
            format!("Voiceover synthesized for \"{}\"", item.topic),
        )
        .await;

        let mut final_assets = assets;
        final_assets.video_url = job.video_url.clone();
        final_assets.audio_url = Some(audio_url);
        self.collab
            .content
            .update_assets(user_id, &item.id, &final_assets)
            .await
            .map_err(ItemError::store)?;

        let video_id = self
            .collab
            .publisher
            .publish(user_id, &final_assets)
            .await
            .map_err(ItemError::publish)?;
        self.collab
            .events
            .log(
                LogEvent::new(
                    user_id,
                    LogCategory::Upload,
                    format!("Published: {}", final_assets.metadata.title),
                )
                .with_payload(json!({ "videoId": video_id })),
            )
            .await;
        self.collab
            .content
            .mark_published(user_id, &item.id, &video_id)
            .await
            .map_err(ItemError::store)?;

        Ok(ItemOutcome::Published { topic: item.topic.clone(), video_id })
    }

    /// Record the run and schedule the next one exactly one interval out.
    async fn finish_run(&self, user_id: &str) -> Result<(), CycleError> {
        let now = Utc::now();
        let next = now + self.config.schedule_interval;
        self.collab
            .settings
            .record_run(user_id, now, next)
            .await
            .map_err(CycleError::store)?;
        info!(user_id, next_run = %next, "Cycle recorded");
        Ok(())
    }

    async fn log(&self, user_id: &str, category: LogCategory, message: impl Into<String>) {
        self.collab
            .events
            .log(LogEvent::new(user_id, category, message))
            .await;
    }
}

/// Merge the plan into a single batch, news first, and drop topics the
/// user already produced recently.
///
/// The sort is stable, so planner order is preserved inside the news and
/// non-news groups. Dedup is an exact string match against the recent
/// window.
pub fn merge_and_dedup(plan: ActionPlan, recent: &[String]) -> Vec<ContentItem> {
    let seen: HashSet<&str> = recent.iter().map(String::as_str).collect();

    let mut items: Vec<ContentItem> = plan
        .longform
        .into_iter()
        .chain(plan.shorts)
        .collect();
    items.sort_by_key(|item| !item.is_news);
    items.retain(|item| !seen.contains(item.topic.as_str()));
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration as ChronoDuration, Utc};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use cpilot_models::{
        AnalyticsSummary, AutomationSettings, ContentAssets, ContentItemType, ContentMetadata,
        ContentStatus, GlobalConfig, ItemId, Trend, VeoJob, VoiceOptions,
    };

    fn item(topic: &str, item_type: ContentItemType, is_news: bool) -> ContentItem {
        ContentItem {
            id: ItemId::new(),
            item_type,
            topic: topic.to_string(),
            angle: "angle".to_string(),
            target_duration_sec: 60,
            target_audience: "devs".to_string(),
            priority: Default::default(),
            is_news,
            use_cases_required: false,
            trend_id: None,
        }
    }

    fn plan_of(items: Vec<ContentItem>) -> ActionPlan {
        let (longform, shorts): (Vec<_>, Vec<_>) = items
            .into_iter()
            .partition(|i| i.item_type == ContentItemType::Longform);
        ActionPlan { longform, shorts, generated_at: Utc::now() }
    }

    fn complete_assets(topic: &str) -> ContentAssets {
        ContentAssets {
            veo_prompt: format!("prompt for {topic}"),
            voiceover_script: format!("script for {topic}"),
            metadata: ContentMetadata {
                title: format!("Title: {topic}"),
                description: "desc".to_string(),
                tags: vec!["ai".to_string()],
                thumbnail_concept: "bold".to_string(),
            },
            video_url: None,
            audio_url: None,
            youtube_video_id: None,
        }
    }

    struct FakeConfigStore {
        config: GlobalConfig,
    }

    #[async_trait]
    impl ConfigStore for FakeConfigStore {
        async fn get_global(&self) -> Result<GlobalConfig> {
            Ok(self.config.clone())
        }
    }

    struct FakeSettings {
        enabled: bool,
        recorded: Mutex<Option<(DateTime<Utc>, DateTime<Utc>)>>,
    }

    #[async_trait]
    impl SettingsStore for FakeSettings {
        async fn get(&self, _user_id: &str) -> Result<AutomationSettings> {
            Ok(AutomationSettings {
                enabled: self.enabled,
                last_run: None,
                next_run: None,
            })
        }

        async fn record_run(
            &self,
            _user_id: &str,
            last_run: DateTime<Utc>,
            next_run: DateTime<Utc>,
        ) -> Result<()> {
            *self.recorded.lock().unwrap() = Some((last_run, next_run));
            Ok(())
        }
    }

    struct FakeProfiles;

    #[async_trait]
    impl ProfileStore for FakeProfiles {
        async fn get(&self, _user_id: &str) -> Result<StrategyProfile> {
            Ok(StrategyProfile::default())
        }
    }

    struct FakeAnalytics;

    #[async_trait]
    impl AnalyticsSource for FakeAnalytics {
        async fn summary(&self, _user_id: &str) -> Result<AnalyticsSummary> {
            Ok(AnalyticsSummary::default())
        }
    }

    struct FakeTrends;

    #[async_trait]
    impl TrendSource for FakeTrends {
        async fn trends(&self, _user_id: &str) -> Result<Vec<Trend>> {
            Ok(Vec::new())
        }
    }

    struct FakePlanner {
        plan: Mutex<Option<ActionPlan>>,
        fail: bool,
    }

    #[async_trait]
    impl PlanningService for FakePlanner {
        async fn plan(
            &self,
            _profile: &StrategyProfile,
            _trends: &[Trend],
            _analytics: &AnalyticsSummary,
        ) -> Result<ActionPlan> {
            if self.fail {
                anyhow::bail!("no valid trends to plan from");
            }
            Ok(self.plan.lock().unwrap().take().expect("plan consumed twice"))
        }
    }

    struct FakeScripter {
        incomplete_topics: Vec<String>,
    }

    #[async_trait]
    impl ScriptingService for FakeScripter {
        async fn assets(
            &self,
            _profile: &StrategyProfile,
            item: &ContentItem,
        ) -> Result<ContentAssets> {
            let mut assets = complete_assets(&item.topic);
            if self.incomplete_topics.contains(&item.topic) {
                assets.voiceover_script = String::new();
            }
            Ok(assets)
        }
    }

    /// Submits jobs and succeeds on the first poll, except for prompts in
    /// the hang list which stay running forever.
    struct FakeVideo {
        hang_prompts: Vec<String>,
        prompts_by_job: Mutex<HashMap<String, String>>,
        submissions: AtomicU32,
    }

    impl FakeVideo {
        fn new(hang_prompts: Vec<String>) -> Self {
            Self {
                hang_prompts,
                prompts_by_job: Mutex::new(HashMap::new()),
                submissions: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl VideoGenerator for FakeVideo {
        async fn submit(&self, prompt: &str, _aspect_ratio: &str) -> Result<VeoJob> {
            let n = self.submissions.fetch_add(1, Ordering::SeqCst) + 1;
            let job_id = format!("operations/op-{n}");
            self.prompts_by_job
                .lock()
                .unwrap()
                .insert(job_id.clone(), prompt.to_string());
            Ok(VeoJob::running(job_id))
        }

        async fn poll(&self, job_id: &str) -> Result<VeoJob> {
            let prompt = self
                .prompts_by_job
                .lock()
                .unwrap()
                .get(job_id)
                .cloned()
                .unwrap_or_default();
            if self.hang_prompts.contains(&prompt) {
                return Ok(VeoJob::running(job_id));
            }
            Ok(VeoJob {
                job_id: job_id.to_string(),
                status: cpilot_models::VeoJobStatus::Succeeded,
                video_url: Some(format!("https://cdn.example/{job_id}.mp4")),
                duration_sec: Some(5),
                error: None,
            })
        }
    }

    struct FakeSpeech {
        calls: AtomicU32,
    }

    #[async_trait]
    impl SpeechSynthesizer for FakeSpeech {
        async fn synthesize(
            &self,
            user_id: &str,
            _script: &str,
            _options: &VoiceOptions,
        ) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("https://media.example/voiceovers/{user_id}/1.mp3"))
        }
    }

    struct FakePublisher {
        calls: AtomicU32,
    }

    #[async_trait]
    impl PublishService for FakePublisher {
        async fn publish(&self, _user_id: &str, _assets: &ContentAssets) -> Result<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("yt-{n}"))
        }
    }

    #[derive(Default)]
    struct FakeContent {
        recent: Vec<String>,
        created: Mutex<Vec<ContentDocument>>,
        published: Mutex<Vec<(ItemId, String)>>,
    }

    #[async_trait]
    impl ContentStore for FakeContent {
        async fn create_generated(&self, _user_id: &str, doc: &ContentDocument) -> Result<()> {
            self.created.lock().unwrap().push(doc.clone());
            Ok(())
        }

        async fn attach_veo_job(
            &self,
            _user_id: &str,
            _item_id: &ItemId,
            _job: &VeoJob,
        ) -> Result<()> {
            Ok(())
        }

        async fn update_assets(
            &self,
            _user_id: &str,
            _item_id: &ItemId,
            _assets: &ContentAssets,
        ) -> Result<()> {
            Ok(())
        }

        async fn mark_published(
            &self,
            _user_id: &str,
            item_id: &ItemId,
            youtube_video_id: &str,
        ) -> Result<()> {
            self.published
                .lock()
                .unwrap()
                .push((item_id.clone(), youtube_video_id.to_string()));
            Ok(())
        }

        async fn recent_topics(&self, _user_id: &str, _limit: u32) -> Result<Vec<String>> {
            Ok(self.recent.clone())
        }
    }

    #[derive(Default)]
    struct FakeEvents {
        entries: Mutex<Vec<LogEvent>>,
    }

    impl FakeEvents {
        fn messages(&self) -> Vec<String> {
            self.entries
                .lock()
                .unwrap()
                .iter()
                .map(|e| e.message.clone())
                .collect()
        }
    }

    #[async_trait]
    impl EventSink for FakeEvents {
        async fn log(&self, event: LogEvent) {
            self.entries.lock().unwrap().push(event);
        }
    }

    struct InstantSleeper;

    #[async_trait]
    impl Sleeper for InstantSleeper {
        async fn sleep(&self, _duration: Duration) {}
    }

    struct Harness {
        runner: CycleRunner,
        settings: Arc<FakeSettings>,
        content: Arc<FakeContent>,
        events: Arc<FakeEvents>,
        publisher: Arc<FakePublisher>,
        speech: Arc<FakeSpeech>,
        video: Arc<FakeVideo>,
    }

    struct HarnessBuilder {
        plan: ActionPlan,
        recent: Vec<String>,
        enabled: bool,
        api_key: Option<String>,
        incomplete_topics: Vec<String>,
        hang_prompts: Vec<String>,
        planner_fails: bool,
    }

    impl HarnessBuilder {
        fn new(plan: ActionPlan) -> Self {
            Self {
                plan,
                recent: Vec::new(),
                enabled: true,
                api_key: Some("test-key".to_string()),
                incomplete_topics: Vec::new(),
                hang_prompts: Vec::new(),
                planner_fails: false,
            }
        }

        fn recent(mut self, topics: &[&str]) -> Self {
            self.recent = topics.iter().map(|t| t.to_string()).collect();
            self
        }

        fn disabled(mut self) -> Self {
            self.enabled = false;
            self
        }

        fn without_api_key(mut self) -> Self {
            self.api_key = None;
            self
        }

        fn incomplete_assets_for(mut self, topic: &str) -> Self {
            self.incomplete_topics.push(topic.to_string());
            self
        }

        fn hang_video_for(mut self, topic: &str) -> Self {
            self.hang_prompts.push(format!("prompt for {topic}"));
            self
        }

        fn planner_fails(mut self) -> Self {
            self.planner_fails = true;
            self
        }

        fn build(self) -> Harness {
            let settings = Arc::new(FakeSettings {
                enabled: self.enabled,
                recorded: Mutex::new(None),
            });
            let content = Arc::new(FakeContent {
                recent: self.recent,
                ..FakeContent::default()
            });
            let events = Arc::new(FakeEvents::default());
            let publisher = Arc::new(FakePublisher { calls: AtomicU32::new(0) });
            let speech = Arc::new(FakeSpeech { calls: AtomicU32::new(0) });
            let video = Arc::new(FakeVideo::new(self.hang_prompts));

            let collab = Collaborators {
                config_store: Arc::new(FakeConfigStore {
                    config: GlobalConfig {
                        gemini_api_key: self.api_key,
                        ..GlobalConfig::default()
                    },
                }),
                settings: settings.clone(),
                profiles: Arc::new(FakeProfiles),
                analytics: Arc::new(FakeAnalytics),
                trends: Arc::new(FakeTrends),
                planner: Arc::new(FakePlanner {
                    plan: Mutex::new(Some(self.plan)),
                    fail: self.planner_fails,
                }),
                scripter: Arc::new(FakeScripter {
                    incomplete_topics: self.incomplete_topics,
                }),
                video: video.clone(),
                speech: speech.clone(),
                publisher: publisher.clone(),
                content: content.clone(),
                events: events.clone(),
                sleeper: Arc::new(InstantSleeper),
            };

            Harness {
                runner: CycleRunner::new(CycleConfig::default(), collab),
                settings,
                content,
                events,
                publisher,
                speech,
                video,
            }
        }
    }

    #[test]
    fn test_merge_is_news_first_and_stable() {
        let plan = plan_of(vec![
            item("Evergreen A", ContentItemType::Longform, false),
            item("Breaking B", ContentItemType::Short, true),
            item("Evergreen C", ContentItemType::Short, false),
            item("Breaking D", ContentItemType::Short, true),
        ]);

        let topics: Vec<String> = merge_and_dedup(plan, &[])
            .into_iter()
            .map(|i| i.topic)
            .collect();

        // News first; within each group, longform before shorts in planner order.
        assert_eq!(topics, vec!["Breaking B", "Breaking D", "Evergreen A", "Evergreen C"]);
    }

    #[test]
    fn test_dedup_drops_recent_topics_only() {
        let plan = plan_of(vec![
            item("Fresh", ContentItemType::Longform, false),
            item("Stale", ContentItemType::Short, false),
        ]);

        let batch = merge_and_dedup(plan, &["Stale".to_string(), "Other".to_string()]);

        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].topic, "Fresh");
    }

    #[tokio::test]
    async fn test_recently_produced_topic_is_not_published_again() {
        let h = HarnessBuilder::new(plan_of(vec![
            item("New topic", ContentItemType::Longform, false),
            item("Old topic", ContentItemType::Short, false),
        ]))
        .recent(&["Old topic"])
        .build();

        let report = h.runner.run_cycle("u1", CycleOptions::default()).await;

        assert_eq!(report.outcome, CycleOutcome::Completed);
        assert_eq!(report.published(), 1);
        assert_eq!(report.items[0].topic(), "New topic");
        assert_eq!(h.publisher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_batch_completes_and_reschedules() {
        let h = HarnessBuilder::new(plan_of(vec![item(
            "Seen",
            ContentItemType::Short,
            false,
        )]))
        .recent(&["Seen"])
        .build();

        let report = h.runner.run_cycle("u1", CycleOptions::default()).await;

        assert_eq!(report.outcome, CycleOutcome::Completed);
        assert!(report.items.is_empty());
        assert!(h.content.created.lock().unwrap().is_empty());
        assert!(h.settings.recorded.lock().unwrap().is_some());
        assert!(h
            .events
            .messages()
            .iter()
            .any(|m| m.contains("No new unique topics")));
    }

    #[tokio::test]
    async fn test_video_timeout_skips_item_and_batch_continues() {
        let h = HarnessBuilder::new(plan_of(vec![
            item("Hung topic", ContentItemType::Longform, true),
            item("Good topic", ContentItemType::Short, false),
        ]))
        .hang_video_for("Hung topic")
        .build();

        let report = h.runner.run_cycle("u1", CycleOptions::default()).await;

        assert_eq!(report.outcome, CycleOutcome::Completed);
        assert_eq!(report.items.len(), 2);
        assert!(matches!(report.items[0], ItemOutcome::Failed { .. }));
        assert!(report.items[1].is_published());
        assert_eq!(h.publisher.calls.load(Ordering::SeqCst), 1);
        assert!(h.settings.recorded.lock().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_incomplete_assets_fail_only_their_item() {
        let h = HarnessBuilder::new(plan_of(vec![
            item("Broken topic", ContentItemType::Longform, false),
            item("Good topic", ContentItemType::Short, false),
        ]))
        .incomplete_assets_for("Broken topic")
        .build();

        let report = h.runner.run_cycle("u1", CycleOptions::default()).await;

        assert!(matches!(report.items[0], ItemOutcome::Failed { .. }));
        assert!(report.items[1].is_published());
        // Nothing persisted for the item that never produced complete assets.
        let created = h.content.created.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].item.topic, "Good topic");
    }

    #[tokio::test]
    async fn test_dry_run_persists_but_never_publishes() {
        let h = HarnessBuilder::new(plan_of(vec![item(
            "Dry topic",
            ContentItemType::Short,
            false,
        )]))
        .build();

        let report = h
            .runner
            .run_cycle("u1", CycleOptions { force: false, dry_run: true })
            .await;

        assert_eq!(report.outcome, CycleOutcome::Completed);
        assert!(matches!(report.items[0], ItemOutcome::Skipped { .. }));

        let created = h.content.created.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].status, ContentStatus::Generated);

        assert_eq!(h.video.submissions.load(Ordering::SeqCst), 0);
        assert_eq!(h.speech.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.publisher.calls.load(Ordering::SeqCst), 0);
        assert!(h.settings.recorded.lock().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_disabled_automation_skips_silently() {
        let h = HarnessBuilder::new(plan_of(vec![item(
            "Topic",
            ContentItemType::Short,
            false,
        )]))
        .disabled()
        .build();

        let report = h.runner.run_cycle("u1", CycleOptions::default()).await;

        assert_eq!(report.outcome, CycleOutcome::AutomationDisabled);
        assert!(h.events.messages().is_empty());
        assert!(h.settings.recorded.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_force_overrides_disabled_automation() {
        let h = HarnessBuilder::new(plan_of(vec![item(
            "Topic",
            ContentItemType::Short,
            false,
        )]))
        .disabled()
        .build();

        let report = h
            .runner
            .run_cycle("u1", CycleOptions { force: true, dry_run: false })
            .await;

        assert_eq!(report.outcome, CycleOutcome::Completed);
        assert_eq!(report.published(), 1);
    }

    #[tokio::test]
    async fn test_missing_api_key_is_fatal_and_logged() {
        let h = HarnessBuilder::new(plan_of(vec![item(
            "Topic",
            ContentItemType::Short,
            false,
        )]))
        .without_api_key()
        .build();

        let report = h.runner.run_cycle("u1", CycleOptions::default()).await;

        assert_eq!(report.outcome, CycleOutcome::Fatal);
        assert!(h
            .events
            .messages()
            .iter()
            .any(|m| m.contains("generation API key is not configured")));
        assert!(h.settings.recorded.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_planner_failure_is_fatal_without_reschedule() {
        let h = HarnessBuilder::new(plan_of(Vec::new())).planner_fails().build();

        let report = h.runner.run_cycle("u1", CycleOptions::default()).await;

        assert_eq!(report.outcome, CycleOutcome::Fatal);
        assert!(h.settings.recorded.lock().unwrap().is_none());
        assert_eq!(h.publisher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_next_run_is_exactly_one_interval_after_last() {
        let h = HarnessBuilder::new(plan_of(vec![item(
            "Topic",
            ContentItemType::Short,
            false,
        )]))
        .build();

        h.runner.run_cycle("u1", CycleOptions::default()).await;

        let (last, next) = h.settings.recorded.lock().unwrap().expect("run recorded");
        assert_eq!(next - last, ChronoDuration::hours(1));
    }

    #[tokio::test]
    async fn test_published_item_records_video_id() {
        let h = HarnessBuilder::new(plan_of(vec![item(
            "Topic",
            ContentItemType::Longform,
            false,
        )]))
        .build();

        let report = h.runner.run_cycle("u1", CycleOptions::default()).await;

        match &report.items[0] {
            ItemOutcome::Published { video_id, .. } => assert_eq!(video_id, "yt-1"),
            other => panic!("unexpected outcome: {other:?}"),
        }
        let published = h.content.published.lock().unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].1, "yt-1");
        assert!(h
            .events
            .messages()
            .iter()
            .any(|m| m.starts_with("Published: Title: Topic")));
    }
}
