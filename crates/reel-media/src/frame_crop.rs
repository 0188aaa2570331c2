//! Frame-by-frame crop fallback.
//!
//! The direct `crop` filter is preferred; this path exists for inputs
//! where filter-based cropping is unreliable. It is far more
//! expensive: full decode to still frames, per-frame crop, re-encode.
//! Steps are separately invocable; decode and encode failures abort
//! the whole operation, and so does any single frame failing to crop.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::fs_utils::clean_dir;

/// Still-frame image format used for the staging area.
#[derive(Debug, Clone, Copy, Default)]
pub enum FrameFormat {
    #[default]
    Png,
    Jpg,
    Bmp,
}

impl FrameFormat {
    fn extension(self) -> &'static str {
        match self {
            FrameFormat::Png => "png",
            FrameFormat::Jpg => "jpg",
            FrameFormat::Bmp => "bmp",
        }
    }
}

/// Decode / crop / re-encode pipeline for one clip.
#[derive(Debug)]
pub struct FrameCropPipeline {
    input: PathBuf,
    output: PathBuf,
    staging_dir: PathBuf,
    format: FrameFormat,
}

impl FrameCropPipeline {
    pub fn new(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        staging_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            staging_dir: staging_dir.into(),
            format: FrameFormat::default(),
        }
    }

    pub fn with_format(mut self, format: FrameFormat) -> Self {
        self.format = format;
        self
    }

    /// Run the full pipeline: clear staging, decode, crop every frame
    /// to `(width, height)` anchored at the top-left origin, re-encode
    /// at `fps`, clear staging again.
    pub async fn run(&self, width: u32, height: u32, fps: u32) -> MediaResult<()> {
        info!(
            "Frame-crop fallback: {} -> {} ({}x{} @ {} fps)",
            self.input.display(),
            self.output.display(),
            width,
            height,
            fps
        );

        clean_dir(&self.staging_dir).await?;
        self.extract_frames().await?;
        self.crop_frames(width, height).await?;
        self.encode_frames(fps).await?;
        clean_dir(&self.staging_dir).await?;

        Ok(())
    }

    /// Decode the source into numbered still frames. The zero-padded
    /// index preserves ordering on re-assembly.
    async fn extract_frames(&self) -> MediaResult<()> {
        let pattern = self.frame_pattern();

        // Pass frames through without drops or duplicates.
        let cmd = FfmpegCommand::new(&self.input, &pattern)
            .input_arg("-vsync")
            .input_arg("0")
            .output_arg("-f")
            .output_arg("image2");

        FfmpegRunner::new().run(&cmd).await
    }

    /// Crop every staged frame in place. The first failing frame
    /// aborts the batch.
    async fn crop_frames(&self, width: u32, height: u32) -> MediaResult<()> {
        let staging = self.staging_dir.clone();

        tokio::task::spawn_blocking(move || -> MediaResult<()> {
            let mut frames: Vec<PathBuf> = std::fs::read_dir(&staging)?
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_file())
                .collect();
            frames.sort();

            if frames.is_empty() {
                return Err(MediaError::FrameCrop(format!(
                    "no frames staged in {}",
                    staging.display()
                )));
            }

            for frame in frames {
                let image = image::open(&frame).map_err(|e| {
                    MediaError::FrameCrop(format!("decode {}: {}", frame.display(), e))
                })?;
                let cropped = image.crop_imm(0, 0, width, height);
                cropped.save(&frame).map_err(|e| {
                    MediaError::FrameCrop(format!("save {}: {}", frame.display(), e))
                })?;
            }

            Ok(())
        })
        .await
        .map_err(|e| MediaError::FrameCrop(format!("crop task panicked: {}", e)))?
    }

    /// Re-encode the ordered frame sequence into a video.
    async fn encode_frames(&self, fps: u32) -> MediaResult<()> {
        let cmd = FfmpegCommand::new(self.frame_pattern(), &self.output)
            .input_arg("-framerate")
            .input_arg(fps.to_string())
            .video_codec("libx264");

        if let Err(e) = FfmpegRunner::new().run(&cmd).await {
            warn!("Frame re-assembly failed for {}", self.output.display());
            return Err(e);
        }
        Ok(())
    }

    fn frame_pattern(&self) -> PathBuf {
        self.staging_dir
            .join(format!("frame-%04d.{}", self.format.extension()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_crop_frames_without_staged_frames_fails() {
        let dir = TempDir::new().unwrap();
        let staging = dir.path().join("frames");
        clean_dir(&staging).await.unwrap();

        let pipeline = FrameCropPipeline::new(
            dir.path().join("in.mp4"),
            dir.path().join("out.mp4"),
            &staging,
        );

        let err = pipeline.crop_frames(100, 100).await.unwrap_err();
        assert!(matches!(err, MediaError::FrameCrop(_)));
    }

    #[tokio::test]
    async fn test_crop_frames_crops_to_origin_anchored_box() {
        let dir = TempDir::new().unwrap();
        let staging = dir.path().join("frames");
        clean_dir(&staging).await.unwrap();

        for i in 1..=3 {
            let img = image::RgbImage::from_pixel(64, 48, image::Rgb([10, 20, 30]));
            img.save(staging.join(format!("frame-{:04}.png", i))).unwrap();
        }

        let pipeline = FrameCropPipeline::new(
            dir.path().join("in.mp4"),
            dir.path().join("out.mp4"),
            &staging,
        );
        pipeline.crop_frames(32, 24).await.unwrap();

        let reloaded = image::open(staging.join("frame-0001.png")).unwrap();
        assert_eq!(reloaded.width(), 32);
        assert_eq!(reloaded.height(), 24);
    }

    #[tokio::test]
    async fn test_corrupt_frame_aborts_batch() {
        let dir = TempDir::new().unwrap();
        let staging = dir.path().join("frames");
        clean_dir(&staging).await.unwrap();

        let img = image::RgbImage::from_pixel(64, 48, image::Rgb([0, 0, 0]));
        img.save(staging.join("frame-0001.png")).unwrap();
        tokio::fs::write(staging.join("frame-0002.png"), b"not an image")
            .await
            .unwrap();

        let pipeline = FrameCropPipeline::new(
            dir.path().join("in.mp4"),
            dir.path().join("out.mp4"),
            &staging,
        );

        let err = pipeline.crop_frames(32, 24).await.unwrap_err();
        assert!(matches!(err, MediaError::FrameCrop(_)));
    }
}
