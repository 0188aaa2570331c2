//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur during media processing.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("no decodable stream in {0}")]
    Unreadable(PathBuf),

    #[error("probe report is missing the {0} field")]
    MissingField(&'static str),

    #[error("transcode failed: {message}")]
    TranscodeFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("download failed: {message}")]
    DownloadFailed { message: String },

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(#[from] reel_models::TimestampError),

    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("frame crop failed: {0}")]
    FrameCrop(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Create a transcode failure error.
    pub fn transcode_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::TranscodeFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create a download failure error.
    pub fn download_failed(message: impl Into<String>) -> Self {
        Self::DownloadFailed {
            message: message.into(),
        }
    }
}
