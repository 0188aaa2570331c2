//! Duration-budgeted clip selection and concatenation.
//!
//! Cycles through the source clips, normalizing and trimming each,
//! until the accumulated selected duration reaches the target, then
//! concatenates the selection into one file. The combined track's
//! audio comes solely from the narration, so every clip is silenced.

use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

use reel_media::{ConcatInput, Transcoder};
use reel_models::{CapOrder, DurationBudget, NormalizedClip, TimeSpec};

use crate::config::PipelineConfig;
use crate::error::{WorkerError, WorkerResult};

/// Result of the selection loop plus the concatenated output.
#[derive(Debug)]
pub struct CombineOutcome {
    /// Selected clips, in playback order
    pub clips: Vec<NormalizedClip>,
    /// Path of the concatenated file
    pub output: PathBuf,
    /// Total duration of the selection, in seconds
    pub total_duration: f64,
}

/// Combine source clips into one file of roughly `target_total`
/// seconds, no single clip longer than `per_clip_cap`.
pub async fn combine_videos(
    transcoder: &dyn Transcoder,
    clip_paths: &[PathBuf],
    target_total: f64,
    per_clip_cap: f64,
    config: &PipelineConfig,
) -> WorkerResult<CombineOutcome> {
    if clip_paths.is_empty() {
        return Err(WorkerError::config_error("no source clips to combine"));
    }
    if target_total <= 0.0 {
        return Err(WorkerError::config_error(
            "target duration must be positive",
        ));
    }

    let per_clip = target_total / clip_paths.len() as f64;
    let mut budget = DurationBudget::new(target_total, per_clip_cap);
    let mut selected: Vec<NormalizedClip> = Vec::new();

    info!(
        "Combining {} clips: target {:.2}s, per-clip target {:.2}s, cap {:.2}s",
        clip_paths.len(),
        target_total,
        per_clip,
        per_clip_cap
    );

    while !budget.is_met() {
        let accumulated_before_pass = budget.accumulated;

        for path in clip_paths {
            if budget.is_met() {
                break;
            }

            match prepare_clip(transcoder, path, per_clip, &budget, config).await {
                Ok(clip) => {
                    budget.add(clip.duration());
                    selected.push(clip);
                }
                // One bad source clip never aborts the whole job.
                Err(e) => {
                    warn!("Excluding clip {}: {}", path.display(), e);
                }
            }
        }

        // The accumulated total must grow every full pass; a pass that
        // adds nothing means no clip can make progress and the loop
        // would never terminate.
        if budget.accumulated <= accumulated_before_pass {
            return Err(WorkerError::stage_failed(
                "no source clip survived normalization",
            ));
        }
    }

    let inputs: Vec<ConcatInput> = selected
        .iter()
        .map(|c| ConcatInput::new(c.output.clone(), c.descriptor.has_audio))
        .collect();
    let output = stage_path(&config.scratch_dir, "combined");

    transcoder
        .concatenate(&inputs, &output)
        .await
        .map_err(|e| WorkerError::stage_failed(format!("concatenation failed: {}", e)))?;

    Ok(CombineOutcome {
        total_duration: budget.accumulated,
        clips: selected,
        output,
    })
}

/// Normalize one source clip: silence it, cap its length, force the
/// target frame rate and resolution, then re-probe the result.
async fn prepare_clip(
    transcoder: &dyn Transcoder,
    source: &Path,
    per_clip: f64,
    budget: &DurationBudget,
    config: &PipelineConfig,
) -> WorkerResult<NormalizedClip> {
    let probed = transcoder.probe(source).await?;
    // A truncated download can still probe cleanly with a zero
    // duration; such a clip can never advance the budget.
    if probed.duration <= 0.0 {
        return Err(WorkerError::stage_failed(
            "probed duration is not positive",
        ));
    }
    let scratch = &config.scratch_dir;

    let silent = stage_path(scratch, "silent");
    transcoder.remove_audio(source, &silent).await?;
    let mut current = silent;
    let mut duration = probed.duration;

    let remaining = budget.remaining();
    let cap = match config.cap_order {
        // Remaining budget wins: never select more than is still needed.
        CapOrder::RemainingBudgetFirst => {
            if remaining < duration {
                Some(remaining)
            } else if per_clip < duration {
                Some(per_clip)
            } else {
                None
            }
        }
        // Per-clip target wins: keep one long clip from dominating.
        CapOrder::PerClipFirst => {
            if per_clip < duration {
                Some(per_clip)
            } else if remaining < duration {
                Some(remaining)
            } else {
                None
            }
        }
    };

    if let Some(limit) = cap {
        let trimmed = stage_path(scratch, "trimmed");
        current = transcoder
            .trim(
                &current,
                &trimmed,
                TimeSpec::Seconds(0.0),
                Some(TimeSpec::Seconds(limit)),
            )
            .await?;
        duration = duration.min(limit);
    }

    let paced = stage_path(scratch, "fps");
    transcoder
        .set_frame_rate(&current, &paced, config.target_fps)
        .await?;
    current = paced;

    let scaled = stage_path(scratch, "scaled");
    transcoder
        .crop_scale(&current, &scaled, config.target_width, config.target_height)
        .await?;
    current = scaled;

    // Hard ceiling regardless of how the caps above played out.
    if duration > budget.per_clip_cap {
        let capped = stage_path(scratch, "capped");
        current = transcoder
            .trim(
                &current,
                &capped,
                TimeSpec::Seconds(0.0),
                Some(TimeSpec::Seconds(budget.per_clip_cap)),
            )
            .await?;
    }

    // Re-probe: trims and re-encodes above changed every attribute
    // the descriptor reports.
    let descriptor = transcoder.probe(&current).await?;

    Ok(NormalizedClip {
        descriptor,
        output: current,
    })
}

fn stage_path(scratch: &Path, tag: &str) -> PathBuf {
    scratch.join(format!("{}-{}.mp4", tag, Uuid::new_v4()))
}
