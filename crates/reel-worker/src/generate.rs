//! End-to-end generation job.
//!
//! Sequences search, download, narration, subtitles, clip combination
//! and the final render for one job. Per-item failures (one clip, one
//! sentence) are logged and the item excluded; stage-level failures
//! abort the job. The outermost boundary always resolves to a
//! `{status, message, data}` response.

use futures::future::join_all;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, warn};
use uuid::Uuid;

use reel_media::{choose_random_song, clean_dir, fetch_songs, save_clip, Transcoder};
use reel_models::{GenerateRequest, GenerateResponse};

use crate::collaborators::Collaborators;
use crate::combine::combine_videos;
use crate::config::PipelineConfig;
use crate::coordinator::{CancelToken, JobCoordinator};
use crate::error::{WorkerError, WorkerResult};
use crate::narration::{concat_narration, split_sentences, synthesize_narration};
use crate::subtitles::generate_subtitles;

/// The generation pipeline with its collaborators and transcoder.
#[derive(Clone)]
pub struct GenerationPipeline {
    config: PipelineConfig,
    transcoder: Arc<dyn Transcoder>,
    collaborators: Collaborators,
    coordinator: JobCoordinator,
    http: reqwest::Client,
}

impl GenerationPipeline {
    pub fn new(
        config: PipelineConfig,
        transcoder: Arc<dyn Transcoder>,
        collaborators: Collaborators,
    ) -> Self {
        Self {
            config,
            transcoder,
            collaborators,
            coordinator: JobCoordinator::new(),
            http: reqwest::Client::new(),
        }
    }

    /// The coordinator owning the job slot; exposes state and the
    /// cancel request entry point.
    pub fn coordinator(&self) -> &JobCoordinator {
        &self.coordinator
    }

    /// Run one generation job. Never panics the host: every failure
    /// resolves to an error response.
    pub async fn generate(&self, request: GenerateRequest) -> GenerateResponse {
        match self.run_job(&request).await {
            Ok(path) => GenerateResponse::success(
                "Video generated.",
                path.to_string_lossy().to_string(),
            ),
            Err(e) if e.is_cancelled() => {
                info!("Generation cancelled");
                GenerateResponse::error("Video generation was cancelled.")
            }
            Err(e) => {
                warn!("Generation failed: {}", e);
                GenerateResponse::error(e.to_string())
            }
        }
    }

    async fn run_job(&self, request: &GenerateRequest) -> WorkerResult<PathBuf> {
        let guard = self.coordinator.try_start()?;
        let cancel = guard.token();

        // Scratch is cleared at job start, not job end, to bound disk
        // growth across repeated runs.
        clean_dir(&self.config.scratch_dir).await?;
        clean_dir(&self.config.subtitles_dir).await?;

        info!(
            subject = %request.video_subject,
            model = %request.ai_model,
            "Starting generation job"
        );

        if request.use_music {
            if let Err(e) = fetch_songs(&self.http, &request.zip_url, &self.config.songs_dir).await
            {
                warn!("Could not fetch songs, continuing without music: {}", e);
            }
        }

        cancel.check()?;
        let script = self
            .collaborators
            .script
            .generate_script(
                &request.video_subject,
                request.paragraph_number,
                &request.ai_model,
                &request.voice,
            )
            .await?;
        let terms = self
            .collaborators
            .script
            .search_terms(
                &request.video_subject,
                self.config.stock_video_count,
                &script,
                &request.ai_model,
            )
            .await?;

        let urls = self.search_stage(&terms, &cancel).await?;
        let clip_paths = self.download_stage(&urls, &cancel).await?;
        if clip_paths.is_empty() {
            return Err(WorkerError::stage_failed(
                "no stock clips could be downloaded",
            ));
        }
        info!("Downloaded {} of {} clips", clip_paths.len(), urls.len());

        let sentences = split_sentences(&script);
        if sentences.is_empty() {
            return Err(WorkerError::config_error("generated script is empty"));
        }

        let segments = synthesize_narration(
            Arc::clone(&self.collaborators.synthesizer),
            Arc::clone(&self.transcoder),
            &sentences,
            &request.voice,
            &self.config.scratch_dir,
            self.config.max_synthesis_parallel,
            &cancel,
        )
        .await?;
        let (narration_path, narration_duration) =
            concat_narration(&*self.transcoder, &segments, &self.config.scratch_dir).await?;

        // Sentences that failed synthesis were dropped from the
        // narration, so time the subtitles against what survived.
        let spoken: Vec<String> = segments.iter().map(|s| s.sentence.clone()).collect();
        let durations: Vec<f64> = segments.iter().map(|s| s.duration).collect();
        let subtitles = match generate_subtitles(
            self.collaborators.transcriber.as_deref(),
            &narration_path,
            &spoken,
            &durations,
            &self.config.subtitles_dir,
        )
        .await
        {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Subtitle generation failed, rendering without: {}", e);
                None
            }
        };

        cancel.check()?;
        let combined = combine_videos(
            &*self.transcoder,
            &clip_paths,
            narration_duration,
            self.config.max_clip_duration,
            &self.config,
        )
        .await?;

        let song = if request.use_music {
            choose_random_song(&self.config.songs_dir).ok()
        } else {
            None
        };

        let output = self
            .config
            .scratch_dir
            .join(format!("{}-final.mp4", Uuid::new_v4()));
        self.transcoder
            .render_final(
                &combined.output,
                &narration_path,
                subtitles.as_deref(),
                song.as_deref(),
                &output,
            )
            .await
            .map_err(|e| WorkerError::stage_failed(format!("final render failed: {}", e)))?;

        info!(
            "Final video rendered: {} ({:.2}s of clips)",
            output.display(),
            combined.total_duration
        );
        Ok(output)
    }

    /// Search every term, keeping the first not-yet-seen URL per term.
    async fn search_stage(
        &self,
        terms: &[String],
        cancel: &CancelToken,
    ) -> WorkerResult<Vec<String>> {
        let mut urls: Vec<String> = Vec::new();

        for term in terms {
            cancel.check()?;
            match self
                .collaborators
                .search
                .search(
                    term,
                    self.config.search_results_per_term,
                    self.config.min_clip_duration,
                )
                .await
            {
                Ok(found) => {
                    for url in found {
                        if !urls.contains(&url) {
                            urls.push(url);
                            break;
                        }
                    }
                }
                Err(e) => warn!("Search failed for term {:?}: {}", term, e),
            }
        }

        Ok(urls)
    }

    /// Download clips as a bounded concurrent set, joined before the
    /// next stage. Failed downloads are skipped; completion order does
    /// not disturb input order.
    async fn download_stage(
        &self,
        urls: &[String],
        cancel: &CancelToken,
    ) -> WorkerResult<Vec<PathBuf>> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_download_parallel.max(1)));
        let mut handles = Vec::with_capacity(urls.len());

        for url in urls {
            let semaphore = Arc::clone(&semaphore);
            let client = self.http.clone();
            let url = url.clone();
            let dir = self.config.scratch_dir.clone();
            let cancel = cancel.clone();

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire().await.expect("semaphore closed");
                cancel.check()?;

                match save_clip(&client, &url, &dir).await {
                    Ok(path) => Ok::<_, WorkerError>(Some(path)),
                    Err(e) => {
                        warn!("Could not download clip {}: {}", url, e);
                        Ok(None)
                    }
                }
            }));
        }

        let mut paths = Vec::new();
        for joined in join_all(handles).await {
            let result = joined
                .map_err(|e| WorkerError::stage_failed(format!("download task panicked: {}", e)))?;
            if let Some(path) = result? {
                paths.push(path);
            }
        }

        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{
        MockScriptWriter, MockSpeechSynthesizer, MockStockSearch,
    };
    use reel_media::FfmpegTranscoder;
    use tempfile::TempDir;

    fn pipeline_with(script: MockScriptWriter, dir: &TempDir) -> GenerationPipeline {
        let config = PipelineConfig {
            scratch_dir: dir.path().join("temp"),
            subtitles_dir: dir.path().join("subtitles"),
            songs_dir: dir.path().join("songs"),
            ..PipelineConfig::default()
        };

        GenerationPipeline::new(
            config,
            Arc::new(FfmpegTranscoder::new()),
            Collaborators {
                script: Arc::new(script),
                search: Arc::new(MockStockSearch::new()),
                synthesizer: Arc::new(MockSpeechSynthesizer::new()),
                transcriber: None,
            },
        )
    }

    fn request() -> GenerateRequest {
        serde_json::from_str(r#"{"videoSubject": "test"}"#).unwrap()
    }

    #[tokio::test]
    async fn test_failure_resolves_to_error_response() {
        let mut script = MockScriptWriter::new();
        script
            .expect_generate_script()
            .returning(|_, _, _, _| Err(WorkerError::ScriptFailed("model unavailable".into())));

        let dir = TempDir::new().unwrap();
        let pipeline = pipeline_with(script, &dir);

        let response = pipeline.generate(request()).await;
        assert_eq!(response.status, reel_models::ResponseStatus::Error);
        assert!(response.message.contains("model unavailable"));
        assert!(response.data.is_empty());

        // Slot is released after the failure.
        assert_eq!(pipeline.coordinator().state(), reel_models::JobState::Idle);
    }

    #[tokio::test]
    async fn test_busy_slot_rejects_request() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline_with(MockScriptWriter::new(), &dir);

        let _guard = pipeline.coordinator().try_start().unwrap();
        let response = pipeline.generate(request()).await;

        assert_eq!(response.status, reel_models::ResponseStatus::Error);
        assert!(response.message.contains("already running"));
    }
}
