//! Firestore REST persistence for ChannelPilot.
//!
//! This crate provides:
//! - A REST client with service-account authentication and token caching
//! - A serde_json <-> Firestore value bridge
//! - Typed repositories for content items, automation settings, strategy
//!   profiles, global config and the per-user event log

pub mod client;
pub mod error;
pub mod event_log;
pub mod repos;
pub mod value;

pub use client::{FirestoreClient, FirestoreConfig};
pub use error::{FirestoreError, FirestoreResult};
pub use event_log::EventLogRepository;
pub use repos::{
    AutomationSettingsRepository, ContentItemRepository, GlobalConfigRepository,
    StrategyProfileRepository,
};
pub use value::{Document, Value};
