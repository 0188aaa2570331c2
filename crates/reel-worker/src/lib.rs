//! Video generation pipeline.
//!
//! Assembles a short vertical video from stock clips, a synthesized
//! narration track and generated subtitles. The final output's length
//! matches the narration.

pub mod collaborators;
pub mod combine;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod generate;
pub mod narration;
pub mod subtitles;

pub use collaborators::{Collaborators, ScriptWriter, SpeechSynthesizer, StockSearch, Transcriber};
pub use combine::{combine_videos, CombineOutcome};
pub use config::PipelineConfig;
pub use coordinator::{cancel_pair, CancelHandle, CancelToken, JobCoordinator};
pub use error::{WorkerError, WorkerResult};
pub use generate::GenerationPipeline;
