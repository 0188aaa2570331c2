//! Subtitle generation.
//!
//! The local timeline derives cue timestamps from per-sentence
//! narration durations; a remote transcriber, when configured, takes
//! precedence and returns SubRip text directly.

use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

use reel_models::subtitle::{render_srt, SubtitleCue};

use crate::collaborators::Transcriber;
use crate::error::{WorkerError, WorkerResult};

/// Derive contiguous cues from per-sentence audio durations.
///
/// Cue `i` starts where cue `i - 1` ended; the first cue starts at
/// zero. Requires one duration per sentence.
pub fn timeline_from_durations(
    sentences: &[String],
    durations: &[f64],
) -> WorkerResult<Vec<SubtitleCue>> {
    if sentences.len() != durations.len() {
        return Err(WorkerError::config_error(format!(
            "sentence/duration count mismatch: {} vs {}",
            sentences.len(),
            durations.len()
        )));
    }

    let mut cues = Vec::with_capacity(sentences.len());
    let mut start = 0.0;

    for (i, (sentence, duration)) in sentences.iter().zip(durations).enumerate() {
        let end = start + duration;
        cues.push(SubtitleCue {
            index: i as u32 + 1,
            start,
            end,
            text: sentence.clone(),
        });
        start = end;
    }

    Ok(cues)
}

/// Generate the subtitle file for a narration track.
///
/// Uses the remote transcriber when one is configured, the local
/// timeline otherwise. Overwrites any previous file at the target
/// path.
pub async fn generate_subtitles(
    transcriber: Option<&dyn Transcriber>,
    narration_path: &Path,
    sentences: &[String],
    durations: &[f64],
    subtitles_dir: &Path,
) -> WorkerResult<PathBuf> {
    let srt = match transcriber {
        Some(remote) => {
            info!("Creating subtitles via remote transcription");
            match remote.transcribe(narration_path).await {
                Ok(srt) => srt,
                Err(e) => {
                    warn!("Remote transcription failed, falling back to local timing: {}", e);
                    render_srt(&timeline_from_durations(sentences, durations)?)
                }
            }
        }
        None => {
            info!("Creating subtitles locally");
            render_srt(&timeline_from_durations(sentences, durations)?)
        }
    };

    tokio::fs::create_dir_all(subtitles_dir).await?;
    let path = subtitles_dir.join(format!("{}.srt", Uuid::new_v4()));
    tokio::fs::write(&path, srt).await?;

    info!("Subtitles written to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentences(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_two_sentence_timeline() {
        let cues =
            timeline_from_durations(&sentences(&["Hello.", "World."]), &[1.2, 0.8]).unwrap();

        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].start, 0.0);
        assert!((cues[0].end - 1.2).abs() < 1e-9);
        assert_eq!(cues[0].text, "Hello.");
        assert!((cues[1].start - 1.2).abs() < 1e-9);
        assert!((cues[1].end - 2.0).abs() < 1e-9);
        assert_eq!(cues[1].text, "World.");
    }

    #[test]
    fn test_cues_are_contiguous() {
        let durations = [0.7, 1.3, 2.2, 0.4];
        let texts = sentences(&["a", "b", "c", "d"]);
        let cues = timeline_from_durations(&texts, &durations).unwrap();

        assert_eq!(cues[0].start, 0.0);
        for pair in cues.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert_eq!(cues.last().unwrap().index, 4);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = timeline_from_durations(&sentences(&["a", "b"]), &[1.0]).unwrap_err();
        assert!(matches!(err, WorkerError::ConfigError(_)));
    }

    #[tokio::test]
    async fn test_generate_subtitles_locally_writes_srt() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = generate_subtitles(
            None,
            Path::new("narration.mp3"),
            &sentences(&["Hello."]),
            &[1.2],
            dir.path(),
        )
        .await
        .unwrap();

        assert_eq!(path.extension().unwrap(), "srt");
        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(contents.starts_with("1\n0:00:00,0 --> 00:00:01,200\nHello.\n"));
    }
}
