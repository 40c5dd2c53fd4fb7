//! Shared data models for the ChannelPilot backend.
//!
//! This crate provides Serde-serializable types for:
//! - Planned content items and action plans
//! - Generated content assets and persisted content documents
//! - Veo video-generation job handles
//! - Strategy profiles, analytics summaries and trends
//! - Automation settings, global config and the event log

pub mod analytics;
pub mod assets;
pub mod document;
pub mod log;
pub mod plan;
pub mod profile;
pub mod settings;
pub mod trend;
pub mod veo;
pub mod voice;

// Re-export common types
pub use analytics::AnalyticsSummary;
pub use assets::{ContentAssets, ContentMetadata};
pub use document::{ContentDocument, ContentStatus, ItemOutcome};
pub use log::{LogCategory, LogEntry, LogEvent, LogStatus};
pub use plan::{ActionPlan, ContentItem, ContentItemType, ItemId, Priority};
pub use profile::{PostingWindow, StrategyProfile};
pub use settings::{AutomationSettings, GlobalConfig};
pub use trend::{GrowthPotential, Trend};
pub use veo::{VeoJob, VeoJobStatus};
pub use voice::VoiceOptions;
