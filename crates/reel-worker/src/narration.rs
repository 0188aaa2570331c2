//! Narration synthesis and assembly.
//!
//! Every sentence of the script is synthesized as its own audio
//! segment. Synthesis tasks run as a bounded concurrent set, but the
//! segments are always assembled in original sentence order, and the
//! subtitle timeline sees that same order.

use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, warn};
use uuid::Uuid;

use reel_media::Transcoder;

use crate::collaborators::SpeechSynthesizer;
use crate::coordinator::CancelToken;
use crate::error::{WorkerError, WorkerResult};

/// One synthesized narration segment.
#[derive(Debug, Clone)]
pub struct NarrationSegment {
    /// The sentence spoken in this segment
    pub sentence: String,
    /// Path of the segment's audio file
    pub path: PathBuf,
    /// Probed duration in seconds
    pub duration: f64,
}

/// Split a script into sentences, dropping empties.
pub fn split_sentences(script: &str) -> Vec<String> {
    script
        .split(". ")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split text into chunks of at most `max_bytes`, breaking on word
/// boundaries.
pub fn chunk_text(text: &str, max_bytes: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split(' ') {
        if current.is_empty() {
            current.push_str(word);
        } else if current.len() + word.len() + 1 <= max_bytes {
            current.push(' ');
            current.push_str(word);
        } else {
            chunks.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Synthesize every sentence as an ordered segment list.
///
/// A failed sentence is logged and dropped from both the narration
/// and the returned sentence list, keeping the two paired. A
/// cancellation observed before a segment starts unwinds the whole
/// stage.
pub async fn synthesize_narration(
    synthesizer: Arc<dyn SpeechSynthesizer>,
    transcoder: Arc<dyn Transcoder>,
    sentences: &[String],
    voice: &str,
    scratch_dir: &Path,
    max_parallel: usize,
    cancel: &CancelToken,
) -> WorkerResult<Vec<NarrationSegment>> {
    let semaphore = Arc::new(Semaphore::new(max_parallel.max(1)));
    let mut handles = Vec::with_capacity(sentences.len());

    for (index, sentence) in sentences.iter().enumerate() {
        let synthesizer = Arc::clone(&synthesizer);
        let transcoder = Arc::clone(&transcoder);
        let semaphore = Arc::clone(&semaphore);
        let sentence = sentence.clone();
        let voice = voice.to_string();
        let scratch = scratch_dir.to_path_buf();
        let cancel = cancel.clone();

        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire().await.expect("semaphore closed");
            cancel.check()?;

            match synthesize_sentence(&*synthesizer, &*transcoder, &sentence, &voice, &scratch)
                .await
            {
                Ok(segment) => Ok::<_, WorkerError>(Some((index, segment))),
                Err(e) if e.is_cancelled() => Err(e),
                Err(e) => {
                    warn!("Skipping sentence {}: {}", index, e);
                    Ok(None)
                }
            }
        }));
    }

    let mut indexed = Vec::new();
    for joined in join_all(handles).await {
        let result = joined
            .map_err(|e| WorkerError::stage_failed(format!("synthesis task panicked: {}", e)))?;
        if let Some(entry) = result? {
            indexed.push(entry);
        }
    }

    // Completion order is arbitrary; sentence order is not.
    indexed.sort_by_key(|(index, _)| *index);

    if indexed.is_empty() {
        return Err(WorkerError::SynthesisFailed(
            "no sentence could be synthesized".to_string(),
        ));
    }

    Ok(indexed.into_iter().map(|(_, segment)| segment).collect())
}

/// Synthesize one sentence, chunking it when it exceeds the
/// synthesizer's byte limit.
async fn synthesize_sentence(
    synthesizer: &dyn SpeechSynthesizer,
    transcoder: &dyn Transcoder,
    sentence: &str,
    voice: &str,
    scratch_dir: &Path,
) -> WorkerResult<NarrationSegment> {
    let limit = synthesizer.max_chunk_bytes();
    let path = scratch_dir.join(format!("{}.mp3", Uuid::new_v4()));

    if sentence.len() < limit {
        let audio = synthesizer.synthesize(sentence, voice).await?;
        tokio::fs::write(&path, &audio).await?;
    } else {
        let mut chunk_paths = Vec::new();
        for chunk in chunk_text(sentence, limit.saturating_sub(1)) {
            let chunk_path = scratch_dir.join(format!("{}.mp3", Uuid::new_v4()));
            let audio = synthesizer.synthesize(&chunk, voice).await?;
            tokio::fs::write(&chunk_path, &audio).await?;
            chunk_paths.push(chunk_path);
        }
        transcoder.concat_audio(&chunk_paths, &path).await?;
    }

    let duration = transcoder.audio_duration(&path).await?;

    Ok(NarrationSegment {
        sentence: sentence.to_string(),
        path,
        duration,
    })
}

/// Join the ordered segments into the narration track and report its
/// probed duration, which becomes the planner's target total.
pub async fn concat_narration(
    transcoder: &dyn Transcoder,
    segments: &[NarrationSegment],
    scratch_dir: &Path,
) -> WorkerResult<(PathBuf, f64)> {
    let paths: Vec<PathBuf> = segments.iter().map(|s| s.path.clone()).collect();
    let output = scratch_dir.join(format!("{}.mp3", Uuid::new_v4()));

    transcoder
        .concat_audio(&paths, &output)
        .await
        .map_err(|e| WorkerError::stage_failed(format!("narration concat failed: {}", e)))?;

    let duration = transcoder.audio_duration(&output).await?;
    info!("Narration track: {} ({:.2}s)", output.display(), duration);

    Ok((output, duration))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sentences_drops_empties() {
        let sentences = split_sentences("First thing. Second thing.  . Third.");
        assert_eq!(sentences, vec!["First thing", "Second thing", "Third."]);
    }

    #[test]
    fn test_chunk_text_respects_limit() {
        let text = "one two three four five six seven eight nine ten";
        let chunks = chunk_text(text, 12);

        for chunk in &chunks {
            assert!(chunk.len() <= 12, "chunk too long: {:?}", chunk);
        }
        assert_eq!(chunks.join(" "), text);
    }

    #[test]
    fn test_chunk_text_short_input_is_one_chunk() {
        assert_eq!(chunk_text("hello world", 299), vec!["hello world"]);
    }
}
