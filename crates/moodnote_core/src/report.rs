//! Day and trend report builder.
//!
//! # Responsibility
//! - Resolve each note into a `ValuedNote` (manual override or classifier).
//! - Bucket notes by local calendar day and aggregate each bucket.
//! - Smooth the per-day scores of a trailing window into a trend.
//!
//! # Invariants
//! - A note with a manual value never reaches the classifier.
//! - All notes of a day are valued before that day is aggregated.
//! - Trend days are produced and smoothed oldest first; empty days score 50.
//! - Reports are derived views; nothing here is persisted.

use crate::calendar::{local_date_key, trailing_days, DateKey};
use crate::classify::{Classifier, ClassifyError};
use crate::model::note::{validate_note_value, Category, Note, NoteId, NoteValueError, ValuedNote};
use crate::score::aggregate::{score_day_from_values, DayTotals, ScoreError};
use crate::score::config::ScoreConfig;
use crate::score::smooth::ema_score;
use chrono::TimeZone;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Longest trend window, roughly ten years of days.
pub const MAX_TREND_DAYS: u32 = 3660;

/// Report building errors.
#[derive(Debug)]
pub enum ReportError {
    /// Classifier failed for one note; the whole report is abandoned.
    Classification { note_id: NoteId, source: ClassifyError },
    /// A manual override value is not usable.
    InvalidNoteValue { note_id: NoteId, source: NoteValueError },
    Score { date_key: DateKey, source: ScoreError },
    /// Requested trend window exceeds `MAX_TREND_DAYS`.
    WindowTooLong { days: u32 },
}

impl Display for ReportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Classification { note_id, source } => {
                write!(f, "failed to classify note {note_id}: {source}")
            }
            Self::InvalidNoteValue { note_id, source } => {
                write!(f, "invalid value on note {note_id}: {source}")
            }
            Self::Score { date_key, source } => {
                write!(f, "failed to score day {date_key}: {source}")
            }
            Self::WindowTooLong { days } => {
                write!(f, "trend window of {days} days exceeds {MAX_TREND_DAYS}")
            }
        }
    }
}

impl Error for ReportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Classification { source, .. } => Some(source),
            Self::InvalidNoteValue { source, .. } => Some(source),
            Self::Score { source, .. } => Some(source),
            Self::WindowTooLong { .. } => None,
        }
    }
}

/// Per-day derived score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayScore {
    pub date_key: DateKey,
    /// Valued notes of the day, oldest first.
    pub entries: Vec<ValuedNote>,
    pub positive_sum: f64,
    pub negative_sum: f64,
    pub raw_score: f64,
    pub smoothed_score: f64,
}

/// Resolves one note into a valued note.
///
/// A manual `value` is used verbatim (no clamping) and its category
/// defaults to `Other`. Otherwise the classifier decides; a manual category
/// without a value is kept and only the value comes from the classifier.
pub fn value_note<C: Classifier + ?Sized>(
    note: &Note,
    classifier: &C,
) -> Result<ValuedNote, ReportError> {
    if let Some(value) = note.value {
        let value = validate_note_value(value).map_err(|source| ReportError::InvalidNoteValue {
            note_id: note.id,
            source,
        })?;
        return Ok(ValuedNote {
            note: note.clone(),
            category: note.category.unwrap_or(Category::Other),
            value,
        });
    }

    let classified =
        classifier
            .classify(&note.text)
            .map_err(|source| ReportError::Classification {
                note_id: note.id,
                source,
            })?;

    Ok(ValuedNote {
        note: note.clone(),
        category: note.category.unwrap_or(classified.category),
        value: classified.value,
    })
}

/// Values every note in order, failing on the first error.
pub fn value_notes<'a, C, I>(notes: I, classifier: &C) -> Result<Vec<ValuedNote>, ReportError>
where
    C: Classifier + ?Sized,
    I: IntoIterator<Item = &'a Note>,
{
    notes
        .into_iter()
        .map(|note| value_note(note, classifier))
        .collect()
}

/// Aggregates one day's valued notes and smooths against the previous day.
pub fn score_day(
    date_key: DateKey,
    entries: Vec<ValuedNote>,
    previous_smoothed: Option<f64>,
    config: &ScoreConfig,
) -> Result<DayScore, ReportError> {
    let totals = score_day_from_values(entries.iter().map(|entry| entry.value), config)
        .map_err(|source| ReportError::Score { date_key, source })?;
    let smoothed_score = ema_score(totals.raw_score, previous_smoothed, config);

    Ok(DayScore {
        date_key,
        entries,
        positive_sum: totals.positive_sum,
        negative_sum: totals.negative_sum,
        raw_score: totals.raw_score,
        smoothed_score,
    })
}

/// Buckets notes by local calendar day, each bucket oldest first.
pub fn group_by_day<'a, Tz: TimeZone>(
    notes: &'a [Note],
    tz: &Tz,
) -> BTreeMap<DateKey, Vec<&'a Note>> {
    let mut days: BTreeMap<DateKey, Vec<&Note>> = BTreeMap::new();
    for note in notes {
        days.entry(local_date_key(&note.created_at, tz))
            .or_default()
            .push(note);
    }
    for bucket in days.values_mut() {
        bucket.sort_by(|left, right| {
            left.created_at
                .cmp(&right.created_at)
                .then_with(|| left.id.cmp(&right.id))
        });
    }
    days
}

/// Single-day query: totals for the notes falling on `day` in `tz`.
pub fn day_report<C, Tz>(
    notes: &[Note],
    day: DateKey,
    tz: &Tz,
    classifier: &C,
    config: &ScoreConfig,
) -> Result<DayTotals, ReportError>
where
    C: Classifier + ?Sized,
    Tz: TimeZone,
{
    let mut grouped = group_by_day(notes, tz);
    let bucket = grouped.remove(&day).unwrap_or_default();
    let entries = value_notes(bucket, classifier)?;
    let day_score = score_day(day, entries, None, config)?;
    Ok(DayTotals {
        positive_sum: day_score.positive_sum,
        negative_sum: day_score.negative_sum,
        raw_score: day_score.raw_score,
    })
}

/// Trend query over the `days` calendar days ending at `today`, oldest first.
///
/// Notes outside the window are ignored. The first day of the window seeds
/// the EMA; every following day blends with its predecessor.
pub fn trend_report<C, Tz>(
    notes: &[Note],
    today: DateKey,
    days: u32,
    tz: &Tz,
    classifier: &C,
    config: &ScoreConfig,
) -> Result<Vec<DayScore>, ReportError>
where
    C: Classifier + ?Sized,
    Tz: TimeZone,
{
    check_trend_window(days)?;
    let mut grouped = group_by_day(notes, tz);
    let window = trailing_days(today, days);
    let mut report = Vec::with_capacity(window.len());
    let mut previous_smoothed = None;

    for date_key in window {
        let bucket = grouped.remove(&date_key).unwrap_or_default();
        let entries = value_notes(bucket, classifier)?;
        let day_score = score_day(date_key, entries, previous_smoothed, config)?;
        previous_smoothed = Some(day_score.smoothed_score);
        report.push(day_score);
    }

    Ok(report)
}

/// Rejects windows longer than `MAX_TREND_DAYS`.
pub fn check_trend_window(days: u32) -> Result<(), ReportError> {
    if days > MAX_TREND_DAYS {
        return Err(ReportError::WindowTooLong { days });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        day_report, group_by_day, trend_report, value_note, ReportError, MAX_TREND_DAYS,
    };
    use crate::calendar::DateKey;
    use crate::classify::{
        Classification, Classifier, ClassifyError, ClassifyResult, KeywordClassifier,
    };
    use crate::model::note::{Category, Note};
    use crate::score::config::ScoreConfig;
    use chrono::{FixedOffset, TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingClassifier {
        calls: AtomicUsize,
    }

    impl Classifier for CountingClassifier {
        fn classifier_id(&self) -> &str {
            "counting"
        }

        fn classify(&self, _text: &str) -> ClassifyResult<Classification> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Classification {
                category: Category::Focus,
                value: 2.0,
            })
        }
    }

    struct FailingClassifier;

    impl Classifier for FailingClassifier {
        fn classifier_id(&self) -> &str {
            "failing"
        }

        fn classify(&self, _text: &str) -> ClassifyResult<Classification> {
            Err(ClassifyError::Backend {
                classifier_id: "failing".to_string(),
                message: "offline".to_string(),
                retryable: true,
            })
        }
    }

    fn note_at(text: &str, y: i32, m: u32, d: u32, h: u32) -> Note {
        Note::new(text, Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap())
    }

    #[test]
    fn manual_value_skips_classifier_and_is_not_clamped() {
        let classifier = CountingClassifier {
            calls: AtomicUsize::new(0),
        };
        let note = note_at("walk", 2026, 5, 1, 8)
            .with_override(None, Some(25.0))
            .unwrap();

        let valued = value_note(&note, &classifier).unwrap();
        assert_eq!(valued.value, 25.0);
        assert_eq!(valued.category, Category::Other);
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn manual_category_without_value_keeps_category() {
        let note = note_at("went for a walk", 2026, 5, 1, 8)
            .with_override(Some(Category::Social), None)
            .unwrap();
        let valued = value_note(&note, &KeywordClassifier::new()).unwrap();
        assert_eq!(valued.category, Category::Social);
        assert_eq!(valued.value, 4.0);
    }

    #[test]
    fn classifier_failure_names_the_note() {
        let note = note_at("walk", 2026, 5, 1, 8);
        let error = value_note(&note, &FailingClassifier).unwrap_err();
        match error {
            ReportError::Classification { note_id, .. } => assert_eq!(note_id, note.id),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn grouping_uses_local_dates_and_sorts_each_bucket() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let late = note_at("late", 2026, 5, 1, 21);
        let early = note_at("early", 2026, 5, 1, 6);
        let notes = vec![late.clone(), early.clone()];

        let grouped = group_by_day(&notes, &tz);
        assert_eq!(grouped.len(), 1);
        let bucket = &grouped[&DateKey::from_ymd(2026, 5, 1).unwrap()];
        assert_eq!(bucket[0].id, early.id);
        assert_eq!(bucket[1].id, late.id);

        // 22:00 UTC is already the next day at UTC+2.
        let after_midnight = vec![note_at("x", 2026, 5, 1, 22)];
        let grouped = group_by_day(&after_midnight, &tz);
        assert!(grouped.contains_key(&DateKey::from_ymd(2026, 5, 2).unwrap()));
    }

    #[test]
    fn day_report_with_no_notes_is_neutral() {
        let totals = day_report(
            &[],
            DateKey::from_ymd(2026, 5, 1).unwrap(),
            &Utc,
            &KeywordClassifier::new(),
            &ScoreConfig::default(),
        )
        .unwrap();
        assert_eq!(totals.raw_score, 50.0);
        assert_eq!(totals.positive_sum, 0.0);
        assert_eq!(totals.negative_sum, 0.0);
    }

    #[test]
    fn trend_fills_empty_days_and_ignores_notes_outside_window() {
        let notes = vec![
            note_at("went for a walk", 2026, 5, 3, 9),
            note_at("walk long ago", 2026, 4, 1, 9),
        ];
        let report = trend_report(
            &notes,
            DateKey::from_ymd(2026, 5, 3).unwrap(),
            3,
            &Utc,
            &KeywordClassifier::new(),
            &ScoreConfig::default(),
        )
        .unwrap();

        assert_eq!(report.len(), 3);
        assert_eq!(report[0].date_key.to_string(), "2026-05-01");
        assert_eq!(report[0].raw_score, 50.0);
        assert_eq!(report[0].smoothed_score, 50.0);
        assert!(report[1].entries.is_empty());
        assert_eq!(report[1].smoothed_score, 50.0);
        assert_eq!(report[2].entries.len(), 1);
        assert!(report[2].raw_score > 50.0);
        let expected = 0.3 * report[2].raw_score + 0.7 * 50.0;
        assert!((report[2].smoothed_score - expected).abs() < 1e-9);
    }

    #[test]
    fn extreme_overrides_saturate_and_later_days_stay_finite() {
        let notes: Vec<Note> = [f64::MAX, f64::MAX, -f64::MAX]
            .into_iter()
            .map(|value| {
                note_at("override", 2026, 5, 1, 9)
                    .with_override(None, Some(value))
                    .unwrap()
            })
            .collect();
        let report = trend_report(
            &notes,
            DateKey::from_ymd(2026, 5, 3).unwrap(),
            3,
            &Utc,
            &KeywordClassifier::new(),
            &ScoreConfig::default(),
        )
        .unwrap();

        assert_eq!(report[0].raw_score, 0.0);
        assert_eq!(report[0].positive_sum, f64::MAX);
        for day in &report {
            assert!((0.0..=100.0).contains(&day.raw_score));
            assert!((0.0..=100.0).contains(&day.smoothed_score));
        }
        assert!(report[2].smoothed_score > report[1].smoothed_score);
    }

    #[test]
    fn overlong_trend_window_is_rejected_before_enumerating() {
        let today = DateKey::from_ymd(2026, 5, 3).unwrap();
        let run = |days| {
            trend_report(
                &[],
                today,
                days,
                &Utc,
                &KeywordClassifier::new(),
                &ScoreConfig::default(),
            )
        };

        assert_eq!(run(MAX_TREND_DAYS).unwrap().len(), MAX_TREND_DAYS as usize);
        assert!(matches!(
            run(4_000_000_000),
            Err(ReportError::WindowTooLong { days: 4_000_000_000 })
        ));
    }
}
