//! Generation worker binary.
//!
//! Performs environment preflight: loads configuration, verifies the
//! ffmpeg toolchain and prepares the scratch directories. Collaborator
//! backends (script generation, stock search, speech synthesis) are
//! wired in by the embedding application.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reel_media::{check_ffmpeg, clean_dir};
use reel_worker::PipelineConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("reel=info".parse().unwrap())
        .add_directive("hyper=warn".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting reel-worker");

    // Load configuration
    let config = PipelineConfig::from_env();
    info!("Pipeline config: {:?}", config);

    // Verify the ffmpeg toolchain before accepting any work
    let ffmpeg = check_ffmpeg().context("ffmpeg preflight failed")?;
    info!("Found ffmpeg at {}", ffmpeg.display());

    // Prepare working directories
    for dir in [&config.scratch_dir, &config.subtitles_dir] {
        clean_dir(dir)
            .await
            .with_context(|| format!("could not prepare directory {}", dir.display()))?;
    }

    info!("Preflight complete; pipeline ready");
    Ok(())
}
