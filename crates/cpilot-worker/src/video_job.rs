//! Bounded state machine for asynchronous video-generation jobs.

use std::time::Duration;

use tracing::{debug, info};

use cpilot_models::{VeoJob, VeoJobStatus};

use crate::error::ItemError;
use crate::ports::{Sleeper, VideoGenerator};

/// Submit a generation job and poll it to a terminal state.
///
/// After submission the job is treated as running. Each cycle waits for
/// `poll_interval`, polls once and counts one attempt. A job still running
/// when `max_attempts` is exhausted is abandoned as a timeout, never waited
/// on indefinitely.
///
/// Only a succeeded job carrying a video URL resolves to `Ok`. Success
/// without a URL and provider-reported failure both become errors.
pub async fn run_to_terminal(
    video: &dyn VideoGenerator,
    sleeper: &dyn Sleeper,
    poll_interval: Duration,
    max_attempts: u32,
    prompt: &str,
    aspect_ratio: &str,
) -> Result<VeoJob, ItemError> {
    let mut job = video
        .submit(prompt, aspect_ratio)
        .await
        .map_err(ItemError::video)?;
    info!(job_id = %job.job_id, "Video job submitted");

    let mut attempts = 0u32;
    while job.status == VeoJobStatus::Running && attempts < max_attempts {
        sleeper.sleep(poll_interval).await;
        job = video.poll(&job.job_id).await.map_err(ItemError::video)?;
        attempts += 1;
        debug!(job_id = %job.job_id, attempt = attempts, status = %job.status, "Video job polled");
    }

    match job.status {
        VeoJobStatus::Succeeded => {
            if job.video_url.is_some() {
                info!(job_id = %job.job_id, attempts, "Video job succeeded");
                Ok(job)
            } else {
                Err(ItemError::video("job succeeded without a video URL"))
            }
        }
        VeoJobStatus::Failed => Err(ItemError::video(
            job.error.as_deref().unwrap_or("provider reported failure"),
        )),
        VeoJobStatus::Running | VeoJobStatus::Pending => {
            Err(ItemError::VideoJobTimeout { attempts })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MockVideoGenerator;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    struct CountingSleeper {
        count: AtomicU32,
    }

    impl CountingSleeper {
        fn new() -> Self {
            Self { count: AtomicU32::new(0) }
        }

        fn sleeps(&self) -> u32 {
            self.count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Sleeper for CountingSleeper {
        async fn sleep(&self, _duration: Duration) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn scripted_generator(responses: Vec<VeoJob>) -> MockVideoGenerator {
        let queue = Arc::new(Mutex::new(VecDeque::from(responses)));
        let mut video = MockVideoGenerator::new();
        video
            .expect_submit()
            .returning(|_, _| Ok(VeoJob::running("operations/op-1")));
        video.expect_poll().returning(move |_| {
            let next = queue
                .lock()
                .unwrap()
                .pop_front()
                .expect("poll past scripted responses");
            Ok(next)
        });
        video
    }

    fn succeeded(url: &str) -> VeoJob {
        VeoJob {
            job_id: "operations/op-1".to_string(),
            status: VeoJobStatus::Succeeded,
            video_url: Some(url.to_string()),
            duration_sec: Some(5),
            error: None,
        }
    }

    #[tokio::test]
    async fn test_success_after_three_waits() {
        let video = scripted_generator(vec![
            VeoJob::running("operations/op-1"),
            VeoJob::running("operations/op-1"),
            succeeded("https://cdn.example/video.mp4"),
        ]);
        let sleeper = CountingSleeper::new();

        let job = run_to_terminal(&video, &sleeper, Duration::from_secs(5), 20, "prompt", "16:9")
            .await
            .unwrap();

        assert_eq!(job.status, VeoJobStatus::Succeeded);
        assert_eq!(job.video_url.as_deref(), Some("https://cdn.example/video.mp4"));
        assert_eq!(sleeper.sleeps(), 3);
    }

    #[tokio::test]
    async fn test_budget_exhaustion_is_timeout() {
        let video = scripted_generator(vec![VeoJob::running("operations/op-1"); 20]);
        let sleeper = CountingSleeper::new();

        let err = run_to_terminal(&video, &sleeper, Duration::from_secs(5), 20, "prompt", "9:16")
            .await
            .unwrap_err();

        assert!(matches!(err, ItemError::VideoJobTimeout { attempts: 20 }));
        assert_eq!(sleeper.sleeps(), 20);
    }

    #[tokio::test]
    async fn test_provider_failure_surfaces_error() {
        let video = scripted_generator(vec![VeoJob::failed("operations/op-1", "safety block")]);
        let sleeper = CountingSleeper::new();

        let err = run_to_terminal(&video, &sleeper, Duration::from_secs(5), 20, "prompt", "16:9")
            .await
            .unwrap_err();

        match err {
            ItemError::VideoJob(msg) => assert!(msg.contains("safety block")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_success_without_url_is_failure() {
        let mut job = succeeded("ignored");
        job.video_url = None;
        let video = scripted_generator(vec![job]);
        let sleeper = CountingSleeper::new();

        let err = run_to_terminal(&video, &sleeper, Duration::from_secs(5), 20, "prompt", "16:9")
            .await
            .unwrap_err();

        assert!(matches!(err, ItemError::VideoJob(_)));
    }

    #[tokio::test]
    async fn test_immediate_submission_error() {
        let mut video = MockVideoGenerator::new();
        video
            .expect_submit()
            .returning(|_, _| Err(anyhow::anyhow!("quota exceeded")));
        let sleeper = CountingSleeper::new();

        let err = run_to_terminal(&video, &sleeper, Duration::from_secs(5), 20, "prompt", "16:9")
            .await
            .unwrap_err();

        assert!(matches!(err, ItemError::VideoJob(_)));
        assert_eq!(sleeper.sleeps(), 0);
    }
}
