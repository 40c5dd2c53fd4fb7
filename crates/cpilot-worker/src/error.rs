//! Error taxonomy for the production cycle.
//!
//! Two tiers: a [`CycleError`] aborts the whole cycle for a user, while an
//! [`ItemError`] fails one planned item and lets the batch continue with the
//! next one.

use thiserror::Error;

/// Fatal cycle-level failure. Nothing after the failing step runs and the
/// next-run timestamp is not advanced.
#[derive(Debug, Error)]
pub enum CycleError {
    /// The generation API key is absent from global config.
    #[error("generation API key is not configured")]
    MissingGenerationKey,

    /// Strategy profile or analytics could not be loaded.
    #[error("context load failed: {0}")]
    ContextLoad(String),

    /// The planner produced no usable plan.
    #[error("planning failed: {0}")]
    Planning(String),

    /// A persistence operation outside the per-item loop failed.
    #[error("store operation failed: {0}")]
    Store(String),
}

impl CycleError {
    pub fn context_load(err: impl std::fmt::Display) -> Self {
        Self::ContextLoad(err.to_string())
    }

    pub fn planning(err: impl std::fmt::Display) -> Self {
        Self::Planning(err.to_string())
    }

    pub fn store(err: impl std::fmt::Display) -> Self {
        Self::Store(err.to_string())
    }
}

/// Recoverable per-item failure. The item is logged and skipped.
#[derive(Debug, Error)]
pub enum ItemError {
    /// Script/prompt/metadata generation failed or came back incomplete.
    #[error("asset generation failed: {0}")]
    Assets(String),

    /// Writing the item's document failed.
    #[error("content store write failed: {0}")]
    Store(String),

    /// Video generation failed at submission or terminally during polling.
    #[error("video generation failed: {0}")]
    VideoJob(String),

    /// The polling budget ran out while the job was still running.
    #[error("video generation still running after {attempts} polls")]
    VideoJobTimeout { attempts: u32 },

    /// Voiceover synthesis or upload failed.
    #[error("audio synthesis failed: {0}")]
    Audio(String),

    /// The final publish call failed.
    #[error("publish failed: {0}")]
    Publish(String),
}

impl ItemError {
    pub fn assets(err: impl std::fmt::Display) -> Self {
        Self::Assets(err.to_string())
    }

    pub fn store(err: impl std::fmt::Display) -> Self {
        Self::Store(err.to_string())
    }

    pub fn video(err: impl std::fmt::Display) -> Self {
        Self::VideoJob(err.to_string())
    }

    pub fn audio(err: impl std::fmt::Display) -> Self {
        Self::Audio(err.to_string())
    }

    pub fn publish(err: impl std::fmt::Display) -> Self {
        Self::Publish(err.to_string())
    }
}
