//! Scoring configuration.
//!
//! # Responsibility
//! - Hold the tunables shared by aggregation and smoothing.
//! - Reject malformed values at construction, before any score is computed.
//!
//! # Invariants
//! - `lambda > 1`, `scale > 0`, `0 <= ema_alpha <= 1`.
//! - `score_floor < score_ceiling`, all fields finite.
//! - A constructed config is immutable; fields are read through getters.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub const DEFAULT_LAMBDA: f64 = 1.8;
pub const DEFAULT_SCALE: f64 = 6.0;
pub const DEFAULT_EMA_ALPHA: f64 = 0.3;
pub const DEFAULT_SCORE_FLOOR: f64 = 0.0;
pub const DEFAULT_SCORE_CEILING: f64 = 100.0;

/// Configuration validation/loading errors.
#[derive(Debug)]
pub enum ScoreConfigError {
    InvalidValue { field: &'static str, message: String },
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl Display for ScoreConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { field, message } => {
                write!(f, "invalid score config `{field}`: {message}")
            }
            Self::Io(err) => write!(f, "failed to read score config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse score config: {err}"),
        }
    }
}

impl Error for ScoreConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidValue { .. } => None,
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ScoreConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ScoreConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Validated scoring parameters.
///
/// Deserialization goes through [`ScoreConfigFile`], so a config read from
/// JSON is validated exactly like one built with [`ScoreConfig::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScoreConfigFile", into = "ScoreConfigFile")]
pub struct ScoreConfig {
    lambda: f64,
    scale: f64,
    ema_alpha: f64,
    score_floor: f64,
    score_ceiling: f64,
}

/// On-disk shape of a score config. Missing fields take defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfigFile {
    pub lambda: f64,
    pub scale: f64,
    pub ema_alpha: f64,
    pub score_floor: f64,
    pub score_ceiling: f64,
}

impl Default for ScoreConfigFile {
    fn default() -> Self {
        Self {
            lambda: DEFAULT_LAMBDA,
            scale: DEFAULT_SCALE,
            ema_alpha: DEFAULT_EMA_ALPHA,
            score_floor: DEFAULT_SCORE_FLOOR,
            score_ceiling: DEFAULT_SCORE_CEILING,
        }
    }
}

impl TryFrom<ScoreConfigFile> for ScoreConfig {
    type Error = ScoreConfigError;

    fn try_from(value: ScoreConfigFile) -> Result<Self, Self::Error> {
        Self::with_bounds(
            value.lambda,
            value.scale,
            value.ema_alpha,
            value.score_floor,
            value.score_ceiling,
        )
    }
}

impl From<ScoreConfig> for ScoreConfigFile {
    fn from(value: ScoreConfig) -> Self {
        Self {
            lambda: value.lambda,
            scale: value.scale,
            ema_alpha: value.ema_alpha,
            score_floor: value.score_floor,
            score_ceiling: value.score_ceiling,
        }
    }
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            lambda: DEFAULT_LAMBDA,
            scale: DEFAULT_SCALE,
            ema_alpha: DEFAULT_EMA_ALPHA,
            score_floor: DEFAULT_SCORE_FLOOR,
            score_ceiling: DEFAULT_SCORE_CEILING,
        }
    }
}

impl ScoreConfig {
    /// Builds a config with the default `[0, 100]` clamp bounds.
    ///
    /// # Errors
    /// - `InvalidValue` when any field violates the module invariants.
    pub fn new(lambda: f64, scale: f64, ema_alpha: f64) -> Result<Self, ScoreConfigError> {
        Self::with_bounds(
            lambda,
            scale,
            ema_alpha,
            DEFAULT_SCORE_FLOOR,
            DEFAULT_SCORE_CEILING,
        )
    }

    /// Builds a config with custom clamp bounds.
    pub fn with_bounds(
        lambda: f64,
        scale: f64,
        ema_alpha: f64,
        score_floor: f64,
        score_ceiling: f64,
    ) -> Result<Self, ScoreConfigError> {
        require_finite("lambda", lambda)?;
        require_finite("scale", scale)?;
        require_finite("ema_alpha", ema_alpha)?;
        require_finite("score_floor", score_floor)?;
        require_finite("score_ceiling", score_ceiling)?;

        if lambda <= 1.0 {
            return Err(invalid("lambda", format!("must be > 1, got {lambda}")));
        }
        if scale <= 0.0 {
            return Err(invalid("scale", format!("must be > 0, got {scale}")));
        }
        if !(0.0..=1.0).contains(&ema_alpha) {
            return Err(invalid(
                "ema_alpha",
                format!("must be in [0, 1], got {ema_alpha}"),
            ));
        }
        if score_floor >= score_ceiling {
            return Err(invalid(
                "score_floor",
                format!("must be below score_ceiling ({score_floor} >= {score_ceiling})"),
            ));
        }

        Ok(Self {
            lambda,
            scale,
            ema_alpha,
            score_floor,
            score_ceiling,
        })
    }

    /// Parses and validates a JSON config document.
    pub fn from_json_str(json: &str) -> Result<Self, ScoreConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScoreConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Loss-aversion multiplier applied to negative mass.
    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Divisor controlling how much mass moves the score.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// EMA weight of the newest raw score.
    pub fn ema_alpha(&self) -> f64 {
        self.ema_alpha
    }

    pub fn score_floor(&self) -> f64 {
        self.score_floor
    }

    pub fn score_ceiling(&self) -> f64 {
        self.score_ceiling
    }

    /// Clamps a score into `[score_floor, score_ceiling]`.
    ///
    /// NaN passes through unchanged; callers keep NaN out upstream.
    pub fn clamp_score(&self, score: f64) -> f64 {
        score.clamp(self.score_floor, self.score_ceiling)
    }
}

fn require_finite(field: &'static str, value: f64) -> Result<(), ScoreConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, format!("must be finite, got {value}")))
    }
}

fn invalid(field: &'static str, message: String) -> ScoreConfigError {
    ScoreConfigError::InvalidValue { field, message }
}
