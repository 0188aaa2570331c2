//! Duration budget driving clip selection.

use serde::{Deserialize, Serialize};

/// Which cap wins when both could apply to a clip.
///
/// The remaining-budget cap keeps the output total on target; the
/// per-clip cap keeps a single long clip from dominating. The exact
/// precedence between them is configurable; remaining-budget-first is
/// the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapOrder {
    #[default]
    RemainingBudgetFirst,
    PerClipFirst,
}

/// Running duration budget for the clip selection loop.
///
/// `accumulated` only ever grows, and only by amounts that have
/// already been capped, so it never exceeds `target_total` by more
/// than one clip's pre-trim duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DurationBudget {
    /// Target total output duration in seconds
    pub target_total: f64,
    /// Hard ceiling on any single selected clip, in seconds
    pub per_clip_cap: f64,
    /// Total duration selected so far, in seconds
    pub accumulated: f64,
}

impl DurationBudget {
    pub fn new(target_total: f64, per_clip_cap: f64) -> Self {
        Self {
            target_total,
            per_clip_cap,
            accumulated: 0.0,
        }
    }

    /// Seconds still needed to reach the target.
    pub fn remaining(&self) -> f64 {
        (self.target_total - self.accumulated).max(0.0)
    }

    /// Whether the accumulated duration has reached the target.
    pub fn is_met(&self) -> bool {
        self.accumulated >= self.target_total
    }

    /// Record a selected clip's duration.
    pub fn add(&mut self, duration: f64) {
        self.accumulated += duration;
    }
}
