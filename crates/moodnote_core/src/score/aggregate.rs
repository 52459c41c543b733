//! Day aggregation: folds one day's note values into a bounded raw score.
//!
//! # Invariants
//! - `positive_sum >= 0` and `negative_sum >= 0`.
//! - `raw_score` lies in `[score_floor, score_ceiling]`.
//! - An empty day scores exactly the sigmoid midpoint (50 by default).
//! - Masses saturate at `f64::MAX`, so any finite input yields a finite score.

use crate::score::config::ScoreConfig;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Aggregation errors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreError {
    /// A NaN or infinite value reached the aggregator.
    NonFiniteValue { index: usize, value: f64 },
}

impl Display for ScoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFiniteValue { index, value } => {
                write!(f, "non-finite note value {value} at position {index}")
            }
        }
    }
}

impl Error for ScoreError {}

/// Single-day aggregation result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayTotals {
    pub positive_sum: f64,
    pub negative_sum: f64,
    pub raw_score: f64,
}

/// Logistic function `1 / (1 + e^-z)`.
pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Computes positive/negative mass and the loss-averse sigmoid score.
///
/// ```text
/// p = Σ max(0, v)
/// n = Σ max(0, -v)
/// raw = clamp(100 * sigmoid((p - lambda * n) / scale))
/// ```
///
/// Both masses saturate at `f64::MAX` instead of overflowing. When `p` and
/// `lambda * n` are both saturated the negative side wins, so `z` is `-inf`
/// rather than `inf - inf`.
///
/// # Errors
/// - `ScoreError::NonFiniteValue` for the first NaN/infinite value.
pub fn score_day_from_values<I>(values: I, config: &ScoreConfig) -> Result<DayTotals, ScoreError>
where
    I: IntoIterator<Item = f64>,
{
    let mut positive_sum = 0.0;
    let mut negative_sum = 0.0;

    for (index, value) in values.into_iter().enumerate() {
        if !value.is_finite() {
            return Err(ScoreError::NonFiniteValue { index, value });
        }
        positive_sum = saturating_add(positive_sum, value.max(0.0));
        negative_sum = saturating_add(negative_sum, (-value).max(0.0));
    }

    let z = (positive_sum - config.lambda() * negative_sum) / config.scale();
    let raw_score = config.clamp_score(100.0 * sigmoid(z));

    Ok(DayTotals {
        positive_sum,
        negative_sum,
        raw_score,
    })
}

fn saturating_add(mass: f64, amount: f64) -> f64 {
    (mass + amount).min(f64::MAX)
}

#[cfg(test)]
mod tests {
    use super::{score_day_from_values, sigmoid, ScoreError};
    use crate::score::config::ScoreConfig;

    #[test]
    fn sigmoid_is_centered_at_half() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(40.0) > 0.999_999);
        assert!(sigmoid(-40.0) < 0.000_001);
    }

    #[test]
    fn mixed_day_applies_loss_aversion() {
        let totals = score_day_from_values([4.0, 3.0, -3.0], &ScoreConfig::default()).unwrap();
        assert_eq!(totals.positive_sum, 7.0);
        assert_eq!(totals.negative_sum, 3.0);
        // z = (7 - 1.8 * 3) / 6 = 0.2667
        assert!((totals.raw_score - 56.63).abs() < 0.01);
    }

    #[test]
    fn empty_day_is_neutral() {
        let totals = score_day_from_values(Vec::<f64>::new(), &ScoreConfig::default()).unwrap();
        assert_eq!(totals.positive_sum, 0.0);
        assert_eq!(totals.negative_sum, 0.0);
        assert_eq!(totals.raw_score, 50.0);
    }

    #[test]
    fn equal_positive_and_negative_mass_scores_below_midpoint() {
        let totals = score_day_from_values([3.0, -3.0], &ScoreConfig::default()).unwrap();
        assert!(totals.raw_score < 50.0);
    }

    #[test]
    fn custom_bounds_clamp_saturated_scores() {
        let config = ScoreConfig::with_bounds(1.8, 6.0, 0.3, 10.0, 90.0).unwrap();
        let high = score_day_from_values([10.0; 20], &config).unwrap();
        let low = score_day_from_values([-5.0; 20], &config).unwrap();
        assert_eq!(high.raw_score, 90.0);
        assert_eq!(low.raw_score, 10.0);
    }

    #[test]
    fn overflowing_masses_saturate_instead_of_producing_nan() {
        let config = ScoreConfig::default();

        let mixed = score_day_from_values([f64::MAX, f64::MAX, -f64::MAX], &config).unwrap();
        assert_eq!(mixed.positive_sum, f64::MAX);
        assert_eq!(mixed.negative_sum, f64::MAX);
        assert_eq!(mixed.raw_score, 0.0);

        let positive = score_day_from_values([f64::MAX, f64::MAX], &config).unwrap();
        assert_eq!(positive.positive_sum, f64::MAX);
        assert_eq!(positive.raw_score, 100.0);

        let negative = score_day_from_values([-f64::MAX, -f64::MAX], &config).unwrap();
        assert_eq!(negative.negative_sum, f64::MAX);
        assert_eq!(negative.raw_score, 0.0);
    }

    #[test]
    fn non_finite_values_are_rejected_with_position() {
        let error =
            score_day_from_values([1.0, f64::INFINITY], &ScoreConfig::default()).unwrap_err();
        assert!(matches!(error, ScoreError::NonFiniteValue { index: 1, .. }));

        assert!(score_day_from_values([f64::NAN], &ScoreConfig::default()).is_err());
    }
}
