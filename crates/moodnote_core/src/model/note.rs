//! Journal note domain model.
//!
//! # Responsibility
//! - Define the raw note record read by the scoring pipeline.
//! - Define the closed behavioral `Category` set.
//! - Define `ValuedNote`, the classified projection consumed by aggregation.
//!
//! # Invariants
//! - `id` is stable and never reused for another note.
//! - A manual `value` is finite; it is NOT clamped to the nominal range.
//! - Every `ValuedNote` carries exactly one category and a finite value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every journal note.
pub type NoteId = Uuid;

/// Lower bound of the documented note value range.
pub const NOTE_VALUE_MIN: f64 = -5.0;
/// Upper bound of the documented note value range.
pub const NOTE_VALUE_MAX: f64 = 10.0;

/// Closed set of behavioral domains a note can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Physical,
    Social,
    Focus,
    EmotionRegulation,
    Avoidance,
    Impulse,
    Sleep,
    /// Fallback when nothing more specific applies.
    Other,
}

impl Category {
    /// Every category, in declaration order.
    pub const ALL: [Category; 8] = [
        Category::Physical,
        Category::Social,
        Category::Focus,
        Category::EmotionRegulation,
        Category::Avoidance,
        Category::Impulse,
        Category::Sleep,
        Category::Other,
    ];

    /// Stable snake_case label used by storage, CLI and model backends.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Physical => "physical",
            Self::Social => "social",
            Self::Focus => "focus",
            Self::EmotionRegulation => "emotion_regulation",
            Self::Avoidance => "avoidance",
            Self::Impulse => "impulse",
            Self::Sleep => "sleep",
            Self::Other => "other",
        }
    }

    /// Parses a label case-insensitively. Accepts `-` in place of `_`.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejection reasons for manual note values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoteValueError {
    NonFinite(f64),
}

impl Display for NoteValueError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFinite(value) => write!(f, "note value must be finite, got {value}"),
        }
    }
}

impl Error for NoteValueError {}

/// One timestamped free-text journal entry.
///
/// `category` and `value` are optional manual overrides. When `value` is
/// present the classifier is skipped for this note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub category: Option<Category>,
    pub value: Option<f64>,
}

impl Note {
    /// Creates a note with a generated id and no overrides.
    pub fn new(text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self::with_id(Uuid::new_v4(), text, created_at)
    }

    /// Creates a note with a caller-provided id.
    ///
    /// Used by storage read-back where identity already exists.
    pub fn with_id(id: NoteId, text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            text: text.into(),
            created_at,
            category: None,
            value: None,
        }
    }

    /// Attaches a manual category/value override.
    ///
    /// # Errors
    /// - `NoteValueError::NonFinite` for NaN or infinite values.
    pub fn with_override(
        mut self,
        category: Option<Category>,
        value: Option<f64>,
    ) -> Result<Self, NoteValueError> {
        if let Some(value) = value {
            validate_note_value(value)?;
        }
        self.category = category;
        self.value = value;
        Ok(self)
    }

    /// Returns whether this note bypasses classification.
    pub fn has_manual_value(&self) -> bool {
        self.value.is_some()
    }
}

/// Checks that a note value can safely enter aggregation.
pub fn validate_note_value(value: f64) -> Result<f64, NoteValueError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(NoteValueError::NonFinite(value))
    }
}

/// A note with a resolved category and value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuedNote {
    pub note: Note,
    pub category: Category,
    pub value: f64,
}
