//! Pipeline configuration.

use std::path::PathBuf;

use reel_models::CapOrder;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Target frame rate for normalized clips
    pub target_fps: u32,
    /// Target width for normalized clips
    pub target_width: u32,
    /// Target height for normalized clips
    pub target_height: u32,
    /// Hard ceiling on any single selected clip, in seconds
    pub max_clip_duration: f64,
    /// Number of stock clips to look for
    pub stock_video_count: usize,
    /// How many search results to query per term
    pub search_results_per_term: usize,
    /// Minimum duration of a candidate stock clip, in seconds
    pub min_clip_duration: f64,
    /// Maximum concurrent clip downloads
    pub max_download_parallel: usize,
    /// Maximum concurrent narration synthesis tasks
    pub max_synthesis_parallel: usize,
    /// Which cap wins when both could apply in the planner
    pub cap_order: CapOrder,
    /// Scratch directory for per-job media files
    pub scratch_dir: PathBuf,
    /// Directory for generated subtitle files
    pub subtitles_dir: PathBuf,
    /// Directory songs are picked from
    pub songs_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_fps: 30,
            target_width: 1920,
            target_height: 1080,
            max_clip_duration: 5.0,
            stock_video_count: 5,
            search_results_per_term: 15,
            min_clip_duration: 10.0,
            max_download_parallel: 2,
            max_synthesis_parallel: 4,
            cap_order: CapOrder::default(),
            scratch_dir: PathBuf::from("temp"),
            subtitles_dir: PathBuf::from("subtitles"),
            songs_dir: PathBuf::from("songs"),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            target_fps: env_parse("REEL_TARGET_FPS", defaults.target_fps),
            target_width: env_parse("REEL_TARGET_WIDTH", defaults.target_width),
            target_height: env_parse("REEL_TARGET_HEIGHT", defaults.target_height),
            max_clip_duration: env_parse("REEL_MAX_CLIP_DURATION", defaults.max_clip_duration),
            stock_video_count: env_parse("REEL_STOCK_VIDEO_COUNT", defaults.stock_video_count),
            search_results_per_term: env_parse(
                "REEL_SEARCH_RESULTS_PER_TERM",
                defaults.search_results_per_term,
            ),
            min_clip_duration: env_parse("REEL_MIN_CLIP_DURATION", defaults.min_clip_duration),
            max_download_parallel: env_parse(
                "REEL_MAX_DOWNLOAD_PARALLEL",
                defaults.max_download_parallel,
            ),
            max_synthesis_parallel: env_parse(
                "REEL_MAX_SYNTHESIS_PARALLEL",
                defaults.max_synthesis_parallel,
            ),
            cap_order: match std::env::var("REEL_CAP_ORDER").ok().as_deref() {
                Some("per_clip_first") => CapOrder::PerClipFirst,
                _ => CapOrder::RemainingBudgetFirst,
            },
            scratch_dir: std::env::var("REEL_SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.scratch_dir),
            subtitles_dir: std::env::var("REEL_SUBTITLES_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.subtitles_dir),
            songs_dir: std::env::var("REEL_SONGS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.songs_dir),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
