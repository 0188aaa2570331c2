//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("another generation job is already running")]
    Busy,

    #[error("generation was cancelled")]
    Cancelled,

    #[error("script generation failed: {0}")]
    ScriptFailed(String),

    #[error("stock search failed: {0}")]
    SearchFailed(String),

    #[error("speech synthesis failed: {0}")]
    SynthesisFailed(String),

    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("stage failed: {0}")]
    StageFailed(String),

    #[error("media error: {0}")]
    Media(#[from] reel_media::MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn stage_failed(msg: impl Into<String>) -> Self {
        Self::StageFailed(msg.into())
    }

    /// Whether this is the deliberate early-exit outcome rather than a
    /// real failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, WorkerError::Cancelled)
    }
}
