//! The `Transcoder` capability trait and its FFmpeg implementation.
//!
//! Everything the pipeline needs from the external transcoding tool
//! goes through this seam, which keeps the pipeline logic testable
//! without the tool installed and keeps every invocation on a
//! validated argument vector.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

use reel_models::{format_seconds, ClipDescriptor, TimeSpec};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::concat::{audio_concat_args, ConcatGraph, ConcatInput};
use crate::error::MediaResult;
use crate::probe;

/// Capabilities of the external transcoding tool.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Inspect a media file. Read-only.
    async fn probe(&self, input: &Path) -> MediaResult<ClipDescriptor>;

    /// Duration of an audio-only file, in seconds.
    async fn audio_duration(&self, input: &Path) -> MediaResult<f64>;

    /// Whether the file carries an audio stream.
    async fn has_audio_stream(&self, input: &Path) -> MediaResult<bool> {
        Ok(self.probe(input).await?.has_audio)
    }

    /// Re-encode to the target frame rate, preserving existing audio.
    async fn set_frame_rate(&self, input: &Path, output: &Path, fps: u32) -> MediaResult<()>;

    /// Copy the video stream and drop the audio stream.
    async fn remove_audio(&self, input: &Path, output: &Path) -> MediaResult<()>;

    /// Extract `[start, end)` of a clip, clamping to source duration.
    ///
    /// `end` defaults to the full probed duration; a negative `end` is
    /// an offset from the end of the clip. A degenerate range
    /// (`end <= start - 1`) writes nothing and returns the input path
    /// unchanged; otherwise the output path is returned.
    async fn trim(
        &self,
        input: &Path,
        output: &Path,
        start: TimeSpec,
        end: Option<TimeSpec>,
    ) -> MediaResult<PathBuf>;

    /// Crop/scale to the target resolution.
    async fn crop_scale(&self, input: &Path, output: &Path, width: u32, height: u32)
        -> MediaResult<()>;

    /// Concatenate normalized clips into one file.
    async fn concatenate(&self, inputs: &[ConcatInput], output: &Path) -> MediaResult<()>;

    /// Concatenate audio segments in the given order.
    async fn concat_audio(&self, inputs: &[PathBuf], output: &Path) -> MediaResult<()>;

    /// Final mux: narration audio (optionally mixed with music) over
    /// the combined video, subtitles burned in when present.
    async fn render_final(
        &self,
        video: &Path,
        narration: &Path,
        subtitles: Option<&Path>,
        music: Option<&Path>,
        output: &Path,
    ) -> MediaResult<()>;
}

/// Resolve a trim request against the source duration.
///
/// A missing end means the full duration; a negative end is an offset
/// from the end of the source; a too-large end is clamped. `None`
/// marks a degenerate range (`end <= start - 1`) whose source should
/// pass through untrimmed.
pub fn resolve_trim_range(
    total: f64,
    start: TimeSpec,
    end: Option<TimeSpec>,
) -> MediaResult<Option<(f64, f64)>> {
    let start_sec = start.to_seconds()?;
    let end_sec = match end {
        Some(spec) => {
            let sec = spec.to_seconds()?;
            if sec < 0.0 {
                total + sec
            } else {
                sec.min(total)
            }
        }
        None => total,
    };

    if end_sec <= start_sec - 1.0 {
        return Ok(None);
    }
    Ok(Some((start_sec, end_sec)))
}

/// Quote a path for use as a `subtitles=` filter argument.
///
/// The filter argument parser strips one level of backslash escapes
/// and treats `:` as an option separator, and the filtergraph parser
/// above it honors single quotes. Without this, any scratch path
/// containing `:` or `'` breaks the graph.
fn escape_subtitles_path(path: &Path) -> String {
    let escaped = path
        .to_string_lossy()
        .replace('\\', "\\\\")
        .replace(':', "\\:")
        .replace('\'', "'\\''");
    format!("'{}'", escaped)
}

/// `Transcoder` backed by the ffmpeg binary.
#[derive(Debug, Default, Clone)]
pub struct FfmpegTranscoder;

impl FfmpegTranscoder {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn probe(&self, input: &Path) -> MediaResult<ClipDescriptor> {
        probe::probe(input).await
    }

    async fn audio_duration(&self, input: &Path) -> MediaResult<f64> {
        probe::probe_audio_duration(input).await
    }

    async fn set_frame_rate(&self, input: &Path, output: &Path, fps: u32) -> MediaResult<()> {
        let cmd = FfmpegCommand::new(input, output)
            .video_filter(format!("fps={}", fps))
            .audio_codec("copy");

        FfmpegRunner::new().run(&cmd).await
    }

    async fn remove_audio(&self, input: &Path, output: &Path) -> MediaResult<()> {
        let cmd = FfmpegCommand::new(input, output).video_codec("copy").no_audio();

        FfmpegRunner::new().run(&cmd).await
    }

    async fn trim(
        &self,
        input: &Path,
        output: &Path,
        start: TimeSpec,
        end: Option<TimeSpec>,
    ) -> MediaResult<PathBuf> {
        let total = self.probe(input).await?.duration;

        let (start_sec, end_sec) = match resolve_trim_range(total, start, end)? {
            Some(range) => range,
            // A zero/negative-length output file helps no one; hand
            // back the untrimmed source instead.
            None => {
                info!(
                    "Degenerate trim range on {}, returning source unchanged",
                    input.display()
                );
                return Ok(input.to_path_buf());
            }
        };

        info!(
            "Trimming {} to [{} -> {}]",
            input.display(),
            format_seconds(start_sec),
            format_seconds(end_sec)
        );
        let cmd = FfmpegCommand::new(input, output)
            .start_at(start_sec)
            .end_at(end_sec)
            .codec_copy();

        FfmpegRunner::new().run(&cmd).await?;
        Ok(output.to_path_buf())
    }

    async fn crop_scale(
        &self,
        input: &Path,
        output: &Path,
        width: u32,
        height: u32,
    ) -> MediaResult<()> {
        // Scale up to cover the target box, then crop the overflow.
        let filter = format!(
            "scale={w}:{h}:force_original_aspect_ratio=increase,crop={w}:{h}",
            w = width,
            h = height
        );

        let cmd = FfmpegCommand::new(input, output)
            .video_filter(filter)
            .video_codec("libx264")
            .preset("veryfast")
            .audio_codec("copy");

        FfmpegRunner::new().run(&cmd).await
    }

    async fn concatenate(&self, inputs: &[ConcatInput], output: &Path) -> MediaResult<()> {
        info!("Concatenating {} clips -> {}", inputs.len(), output.display());

        let graph = ConcatGraph::new(inputs.to_vec());
        FfmpegRunner::new().run_args(&graph.build_args(output)).await
    }

    async fn concat_audio(&self, inputs: &[PathBuf], output: &Path) -> MediaResult<()> {
        info!(
            "Concatenating {} audio segments -> {}",
            inputs.len(),
            output.display()
        );

        FfmpegRunner::new()
            .run_args(&audio_concat_args(inputs, output))
            .await
    }

    async fn render_final(
        &self,
        video: &Path,
        narration: &Path,
        subtitles: Option<&Path>,
        music: Option<&Path>,
        output: &Path,
    ) -> MediaResult<()> {
        info!("Rendering final video -> {}", output.display());

        let mut args = vec!["-y".to_string(), "-hide_banner".to_string()];

        args.push("-i".to_string());
        args.push(video.to_string_lossy().to_string());
        args.push("-i".to_string());
        args.push(narration.to_string_lossy().to_string());
        if let Some(song) = music {
            args.push("-i".to_string());
            args.push(song.to_string_lossy().to_string());
        }

        let mut chains = Vec::new();
        if let Some(subs) = subtitles {
            chains.push(format!(
                "[0:v]subtitles={}[vout]",
                escape_subtitles_path(subs)
            ));
        }
        if music.is_some() {
            chains.push("[1:a:0][2:a:0]amix=inputs=2:duration=first[aout]".to_string());
        }
        if !chains.is_empty() {
            args.push("-filter_complex".to_string());
            args.push(chains.join(";"));
        }

        args.push("-map".to_string());
        args.push(if subtitles.is_some() { "[vout]" } else { "0:v:0" }.to_string());
        args.push("-map".to_string());
        args.push(if music.is_some() { "[aout]" } else { "1:a:0" }.to_string());

        if subtitles.is_some() {
            args.push("-c:v".to_string());
            args.push("libx264".to_string());
            args.push("-preset".to_string());
            args.push("veryfast".to_string());
        } else {
            args.push("-c:v".to_string());
            args.push("copy".to_string());
        }
        args.push("-c:a".to_string());
        args.push("aac".to_string());
        args.push("-shortest".to_string());

        args.push(output.to_string_lossy().to_string());

        FfmpegRunner::new().run_args(&args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_omitted_end_covers_full_duration() {
        let range = resolve_trim_range(12.5, TimeSpec::Seconds(0.0), None).unwrap();
        assert_eq!(range, Some((0.0, 12.5)));
    }

    #[test]
    fn test_negative_end_offsets_from_clip_end() {
        let range =
            resolve_trim_range(10.0, TimeSpec::Seconds(2.0), Some(TimeSpec::Seconds(-3.0)))
                .unwrap();
        assert_eq!(range, Some((2.0, 7.0)));
    }

    #[test]
    fn test_end_clamped_to_duration() {
        let range =
            resolve_trim_range(4.0, TimeSpec::Seconds(1.0), Some(TimeSpec::Seconds(99.0)))
                .unwrap();
        assert_eq!(range, Some((1.0, 4.0)));
    }

    #[test]
    fn test_degenerate_range_is_a_pass_through() {
        let range =
            resolve_trim_range(10.0, TimeSpec::Seconds(5.0), Some(TimeSpec::Seconds(4.0)))
                .unwrap();
        assert_eq!(range, None);
    }

    #[test]
    fn test_barely_inverted_range_still_trims() {
        // The pass-through threshold is a full second, not zero.
        let range =
            resolve_trim_range(10.0, TimeSpec::Seconds(5.0), Some(TimeSpec::Seconds(4.5)))
                .unwrap();
        assert_eq!(range, Some((5.0, 4.5)));
    }

    #[test]
    fn test_subtitles_path_quoted_for_filter_graph() {
        assert_eq!(
            escape_subtitles_path(Path::new("subtitles/abc.srt")),
            "'subtitles/abc.srt'"
        );
        assert_eq!(
            escape_subtitles_path(Path::new("C:/tmp/it's.srt")),
            "'C\\:/tmp/it'\\''s.srt'"
        );
    }

    #[test]
    fn test_clock_string_boundaries() {
        let range = resolve_trim_range(
            120.0,
            TimeSpec::Clock("0:00:30".to_string()),
            Some(TimeSpec::Clock("0:01:30".to_string())),
        )
        .unwrap();
        assert_eq!(range, Some((30.0, 90.0)));
    }
}
