//! Trend smoothing via exponential moving average.
//!
//! The recurrence is a fold: day `t` depends only on day `t`'s raw score and
//! day `t-1`'s smoothed score. Callers must feed days oldest first.

use crate::score::config::ScoreConfig;

/// Smooths one day against the previous day's smoothed score.
///
/// - No previous value: returns the clamped raw score (seed).
/// - Otherwise: `clamp(alpha * raw + (1 - alpha) * previous)`.
///
/// `ema_alpha` is guaranteed in `[0, 1]` by `ScoreConfig` construction.
pub fn ema_score(today_raw: f64, yesterday_smoothed: Option<f64>, config: &ScoreConfig) -> f64 {
    match yesterday_smoothed {
        None => config.clamp_score(today_raw),
        Some(previous) => {
            let alpha = config.ema_alpha();
            config.clamp_score(alpha * today_raw + (1.0 - alpha) * previous)
        }
    }
}

/// Replays [`ema_score`] over a chronological series of raw scores.
pub fn smooth_series(raw_scores: &[f64], config: &ScoreConfig) -> Vec<f64> {
    let mut smoothed = Vec::with_capacity(raw_scores.len());
    let mut previous = None;
    for &raw in raw_scores {
        let current = ema_score(raw, previous, config);
        smoothed.push(current);
        previous = Some(current);
    }
    smoothed
}
