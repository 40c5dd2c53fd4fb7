//! External service clients for the ChannelPilot backend.
//!
//! This crate provides:
//! - Gemini planning and scripting with structured JSON output
//! - Veo video-generation submit/poll
//! - Cloud Text-to-Speech synthesis
//! - S3-compatible media storage for narration audio
//! - YouTube trend scanning, analytics summaries and publishing

pub mod analytics;
pub mod error;
pub mod gemini;
pub mod publish;
pub mod storage;
pub mod trends;
pub mod tts;
pub mod veo;

pub use analytics::AnalyticsClient;
pub use error::{ServiceError, ServiceResult};
pub use gemini::GeminiClient;
pub use publish::PublishClient;
pub use storage::{MediaStorage, MediaStorageConfig};
pub use trends::TrendClient;
pub use tts::SpeechClient;
pub use veo::VeoClient;
