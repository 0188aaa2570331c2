//! Media inspection from FFmpeg's textual report.
//!
//! The boundary format is the human-readable report FFmpeg writes to
//! stderr: a `Duration: H:MM:SS.ss` line, an `NN fps` token and a
//! `WIDTHxHEIGHT` token on the video stream line, and an `Audio:`
//! stream line when an audio track is present. Absence of a required
//! field is a probe failure.

use std::path::Path;

use reel_models::{parse_timestamp, ClipDescriptor};

use crate::command::FfmpegRunner;
use crate::error::{MediaError, MediaResult};

/// Probe a media file. Read-only: the inspection invocation writes
/// nothing.
pub async fn probe(path: impl AsRef<Path>) -> MediaResult<ClipDescriptor> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    let args = vec![
        "-hide_banner".to_string(),
        "-i".to_string(),
        path.to_string_lossy().to_string(),
        "-f".to_string(),
        "null".to_string(),
        "-".to_string(),
    ];

    let output = FfmpegRunner::new().capture(&args).await?;
    let report = String::from_utf8_lossy(&output.stderr);

    parse_probe_report(path, &report)
}

/// Probe an audio file for its duration only.
///
/// Audio files carry no frame rate or resolution, so the full clip
/// probe would reject them.
pub async fn probe_audio_duration(path: impl AsRef<Path>) -> MediaResult<f64> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    let args = vec![
        "-hide_banner".to_string(),
        "-i".to_string(),
        path.to_string_lossy().to_string(),
        "-f".to_string(),
        "null".to_string(),
        "-".to_string(),
    ];

    let output = FfmpegRunner::new().capture(&args).await?;
    let report = String::from_utf8_lossy(&output.stderr);

    if report.contains("Invalid data found") {
        return Err(MediaError::Unreadable(path.to_path_buf()));
    }

    parse_duration(&report).ok_or(MediaError::MissingField("duration"))
}

/// Parse the textual inspection report into a descriptor.
pub fn parse_probe_report(path: &Path, report: &str) -> MediaResult<ClipDescriptor> {
    if report.contains("Invalid data found") || !report.contains("Duration") {
        return Err(MediaError::Unreadable(path.to_path_buf()));
    }

    let duration = parse_duration(report).ok_or(MediaError::MissingField("duration"))?;
    let fps = parse_fps(report).ok_or(MediaError::MissingField("fps"))?;
    let (width, height) = parse_dimensions(report).ok_or(MediaError::MissingField("resolution"))?;
    let has_audio = report.lines().any(|l| l.contains("Audio:"));

    Ok(ClipDescriptor {
        locator: path.to_path_buf(),
        duration,
        fps,
        width,
        height,
        has_audio,
    })
}

/// Extract total duration from the `Duration: H:MM:SS.ss` line.
fn parse_duration(report: &str) -> Option<f64> {
    let line = report.lines().find(|l| l.contains("Duration:"))?;
    let rest = line.split("Duration:").nth(1)?;
    let clock = rest.split(',').next()?.trim();
    if clock == "N/A" {
        return None;
    }
    parse_timestamp(clock).ok()
}

/// Extract the frame rate from the `NN fps` token.
fn parse_fps(report: &str) -> Option<f64> {
    let line = report.lines().find(|l| l.contains(" fps"))?;
    for part in line.split(',') {
        let part = part.trim();
        if let Some(value) = part.strip_suffix(" fps") {
            return value.trim().parse().ok();
        }
    }
    None
}

/// Extract `WIDTHxHEIGHT` from the video stream line.
fn parse_dimensions(report: &str) -> Option<(u32, u32)> {
    let line = report.lines().find(|l| l.contains("Video:"))?;
    for token in line.split(|c: char| c == ',' || c == ' ') {
        if let Some((w, h)) = token.split_once('x') {
            if let (Ok(w), Ok(h)) = (w.parse::<u32>(), h.parse::<u32>()) {
                if w > 0 && h > 0 {
                    return Some((w, h));
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const REPORT_WITH_AUDIO: &str = "\
Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'clip.mp4':
  Duration: 00:00:12.48, start: 0.000000, bitrate: 5414 kb/s
  Stream #0:0[0x1](und): Video: h264 (High) (avc1 / 0x31637661), yuv420p(progressive), 1920x1080 [SAR 1:1 DAR 16:9], 5281 kb/s, 29.97 fps, 29.97 tbr, 30k tbn (default)
  Stream #0:1[0x2](und): Audio: aac (LC) (mp4a / 0x6134706D), 44100 Hz, stereo, fltp, 128 kb/s (default)";

    const REPORT_NO_AUDIO: &str = "\
Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'clip.mp4':
  Duration: 00:01:05.20, start: 0.000000, bitrate: 2100 kb/s
  Stream #0:0[0x1](und): Video: h264 (Main), yuv420p, 1280x720, 2000 kb/s, 25 fps, 25 tbr, 12800 tbn (default)";

    #[test]
    fn test_parse_full_report() {
        let desc = parse_probe_report(&PathBuf::from("clip.mp4"), REPORT_WITH_AUDIO).unwrap();
        assert!((desc.duration - 12.48).abs() < 0.001);
        assert!((desc.fps - 29.97).abs() < 0.001);
        assert_eq!((desc.width, desc.height), (1920, 1080));
        assert!(desc.has_audio);
    }

    #[test]
    fn test_parse_report_without_audio() {
        let desc = parse_probe_report(&PathBuf::from("clip.mp4"), REPORT_NO_AUDIO).unwrap();
        assert!((desc.duration - 65.2).abs() < 0.001);
        assert_eq!((desc.width, desc.height), (1280, 720));
        assert!(!desc.has_audio);
    }

    #[test]
    fn test_unreadable_report() {
        let err = parse_probe_report(
            &PathBuf::from("bad.mp4"),
            "bad.mp4: Invalid data found when processing input",
        )
        .unwrap_err();
        assert!(matches!(err, MediaError::Unreadable(_)));
    }

    #[test]
    fn test_missing_fps_is_a_probe_failure() {
        let report = "\
Input #0, mov, from 'clip.mp4':
  Duration: 00:00:10.00, start: 0.000000, bitrate: 1000 kb/s
  Stream #0:0: Video: h264, yuv420p, 640x480, 900 kb/s";
        let err = parse_probe_report(&PathBuf::from("clip.mp4"), report).unwrap_err();
        assert!(matches!(err, MediaError::MissingField("fps")));
    }
}
