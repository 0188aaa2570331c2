//! Shared data models for the ReelForge pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Probed clip descriptors and normalized clips
//! - Duration budgets for clip selection
//! - Subtitle cues and SubRip formatting
//! - Generation job requests, responses and state

pub mod budget;
pub mod descriptor;
pub mod job;
pub mod request;
pub mod subtitle;
pub mod timestamp;

// Re-export common types
pub use budget::{CapOrder, DurationBudget};
pub use descriptor::{ClipDescriptor, NormalizedClip};
pub use job::JobState;
pub use request::{GenerateRequest, GenerateResponse, ResponseStatus};
pub use subtitle::{srt_timestamp, SubtitleCue};
pub use timestamp::{format_seconds, parse_timestamp, TimeSpec, TimestampError};
