//! Probed clip metadata.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Attributes of a media file as reported by the transcoder's
/// inspection mode. Immutable once probed; transforms that change any
/// of these produce a new file which is probed again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipDescriptor {
    /// Path of the probed file
    pub locator: PathBuf,
    /// Duration in seconds
    pub duration: f64,
    /// Frame rate (fps)
    pub fps: f64,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Whether an audio stream is present
    pub has_audio: bool,
}

/// A clip that has been brought to the pipeline's target frame rate
/// and resolution. Owned by the job that created it; the backing file
/// lives in the job's scratch directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedClip {
    /// Descriptor of the normalized output file
    pub descriptor: ClipDescriptor,
    /// Path of the normalized output file
    pub output: PathBuf,
}

impl NormalizedClip {
    pub fn duration(&self) -> f64 {
        self.descriptor.duration
    }
}
