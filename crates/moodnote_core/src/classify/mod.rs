//! Note classification capability.
//!
//! # Responsibility
//! - Define the `Classifier` contract: text in, `(category, value)` out.
//! - Provide the keyword rule-table classifier and a model-backed adapter.
//!
//! # Invariants
//! - Successful classifications carry a finite value in `[-5, 10]`.
//! - Failures are surfaced as `ClassifyError`, never defaulted to `Other`.
//! - Callers depend on the trait only, never on a concrete rule table.

use crate::model::note::{Category, NOTE_VALUE_MAX, NOTE_VALUE_MIN};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod keyword;
pub mod model;

pub use keyword::{KeywordClassifier, KeywordRule};
pub use model::{BackendFailure, ModelBackend, ModelClassifier, ModelOutput, UnavailableBackend};

pub type ClassifyResult<T> = Result<T, ClassifyError>;

/// Category and value assigned to one note text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub category: Category,
    pub value: f64,
}

impl Classification {
    pub const NEUTRAL: Classification = Classification {
        category: Category::Other,
        value: 0.0,
    };

    /// Builds a classification, rejecting values outside `[-5, 10]`.
    pub fn new(category: Category, value: f64) -> ClassifyResult<Self> {
        check_value(value)?;
        Ok(Self { category, value })
    }
}

/// Classification failures.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifyError {
    /// The backing model or service failed.
    Backend {
        classifier_id: String,
        message: String,
        retryable: bool,
    },
    /// Backend returned a label outside the category set.
    UnknownCategory(String),
    /// Value is NaN or infinite.
    NonFiniteValue(f64),
    /// Value is finite but outside `[-5, 10]`.
    ValueOutOfRange(f64),
}

impl Display for ClassifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backend {
                classifier_id,
                message,
                retryable,
            } => write!(
                f,
                "classifier `{classifier_id}` failed (retryable={retryable}): {message}"
            ),
            Self::UnknownCategory(label) => write!(f, "unknown category label `{label}`"),
            Self::NonFiniteValue(value) => write!(f, "classifier value must be finite, got {value}"),
            Self::ValueOutOfRange(value) => write!(
                f,
                "classifier value {value} outside [{NOTE_VALUE_MIN}, {NOTE_VALUE_MAX}]"
            ),
        }
    }
}

impl Error for ClassifyError {}

/// Capability of turning free text into a category and value.
///
/// Implementations may perform I/O and may fail. `Send + Sync` lets callers
/// classify a day's notes on worker threads before aggregating.
pub trait Classifier: Send + Sync {
    /// Short stable identifier used in logs and errors.
    fn classifier_id(&self) -> &str;

    /// Classifies one note text.
    fn classify(&self, text: &str) -> ClassifyResult<Classification>;
}

impl<C: Classifier + ?Sized> Classifier for &C {
    fn classifier_id(&self) -> &str {
        (**self).classifier_id()
    }

    fn classify(&self, text: &str) -> ClassifyResult<Classification> {
        (**self).classify(text)
    }
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn classifier_id(&self) -> &str {
        (**self).classifier_id()
    }

    fn classify(&self, text: &str) -> ClassifyResult<Classification> {
        (**self).classify(text)
    }
}

/// Trims and lowercases note text before rule matching.
pub fn normalize_text(text: &str) -> String {
    text.trim().to_lowercase()
}

pub(crate) fn check_value(value: f64) -> ClassifyResult<f64> {
    if !value.is_finite() {
        return Err(ClassifyError::NonFiniteValue(value));
    }
    if !(NOTE_VALUE_MIN..=NOTE_VALUE_MAX).contains(&value) {
        return Err(ClassifyError::ValueOutOfRange(value));
    }
    Ok(value)
}
