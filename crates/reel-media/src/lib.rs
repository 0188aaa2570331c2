#![deny(unreachable_patterns)]
//! FFmpeg CLI wrapper for video assembly.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building (argument vectors, never shell strings)
//! - Read-only media probing from the tool's textual report
//! - The `Transcoder` capability trait and its FFmpeg implementation
//! - Concat graph construction for mixed-audio clip lists
//! - The frame-by-frame crop fallback pipeline
//! - Stock clip and song downloads

pub mod command;
pub mod concat;
pub mod download;
pub mod error;
pub mod frame_crop;
pub mod fs_utils;
pub mod probe;
pub mod transcode;

pub use command::{check_ffmpeg, FfmpegCommand, FfmpegRunner};
pub use concat::{audio_concat_args, ConcatGraph, ConcatInput};
pub use download::{choose_random_song, fetch_songs, save_clip};
pub use error::{MediaError, MediaResult};
pub use frame_crop::{FrameCropPipeline, FrameFormat};
pub use fs_utils::clean_dir;
pub use probe::parse_probe_report;
pub use transcode::{resolve_trim_range, FfmpegTranscoder, Transcoder};
