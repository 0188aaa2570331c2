//! External collaborator seams.
//!
//! Script generation, stock search, speech synthesis and remote
//! transcription are remote services; the pipeline depends on these
//! traits only and is tested against mocks.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::error::WorkerResult;

/// Generates the narration script and its stock search terms.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScriptWriter: Send + Sync {
    async fn generate_script(
        &self,
        subject: &str,
        paragraphs: u32,
        model: &str,
        voice: &str,
    ) -> WorkerResult<String>;

    async fn search_terms(
        &self,
        subject: &str,
        count: usize,
        script: &str,
        model: &str,
    ) -> WorkerResult<Vec<String>>;
}

/// Finds candidate stock clip download URLs for a search term.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StockSearch: Send + Sync {
    async fn search(
        &self,
        term: &str,
        limit: usize,
        min_duration: f64,
    ) -> WorkerResult<Vec<String>>;
}

/// Synthesizes speech for one piece of text.
///
/// Implementations accept text up to `max_chunk_bytes` per request;
/// longer sentences are chunked by the caller and the resulting audio
/// concatenated.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, voice: &str) -> WorkerResult<Vec<u8>>;

    fn max_chunk_bytes(&self) -> usize {
        300
    }
}

/// Transcribes a narration track into SubRip text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio_path: &Path) -> WorkerResult<String>;
}

/// The set of collaborators a pipeline runs against.
#[derive(Clone)]
pub struct Collaborators {
    pub script: Arc<dyn ScriptWriter>,
    pub search: Arc<dyn StockSearch>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    /// Remote transcription, preferred over local subtitle timing
    /// when configured
    pub transcriber: Option<Arc<dyn Transcriber>>,
}
