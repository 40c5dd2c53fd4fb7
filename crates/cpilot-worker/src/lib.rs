//! Production-cycle orchestration for ChannelPilot.
//!
//! This crate provides:
//! - The hourly per-user production cycle (plan, dedup, produce, publish)
//! - A bounded state machine for asynchronous video-generation jobs
//! - Collaborator traits with Firestore/Gemini/YouTube implementations
//! - A tick-based scheduler driving cycles for configured users

pub mod collaborators;
pub mod config;
pub mod cycle;
pub mod error;
pub mod ports;
pub mod scheduler;
pub mod video_job;
pub mod voice;

pub use config::{CycleConfig, CycleOptions, SchedulerConfig};
pub use cycle::{Collaborators, CycleOutcome, CycleReport, CycleRunner};
pub use error::{CycleError, ItemError};
pub use scheduler::Scheduler;
