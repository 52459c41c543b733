//! Journal use-case service.
//!
//! # Responsibility
//! - Provide note append/delete/list entry points for callers.
//! - Run day and trend reports over stored notes.
//!
//! # Invariants
//! - Note text must be non-empty after trimming.
//! - Reports read notes once per call and never write anything back.
//! - Log events carry ids, counts and scores only, never note text.

use crate::calendar::{trailing_days, DateKey};
use crate::classify::{Classification, Classifier, ClassifyResult};
use crate::model::note::{Category, Note, NoteId, NoteValueError};
use crate::report::{self, DayScore, ReportError};
use crate::repo::note_repo::{NoteRepository, RepoError, RepoResult};
use crate::score::aggregate::DayTotals;
use crate::score::config::ScoreConfig;
use chrono::{DateTime, TimeZone, Utc};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Service error for journal use-cases.
#[derive(Debug)]
pub enum JournalError {
    /// Note text is empty or whitespace only.
    EmptyText,
    /// Manual override value is unusable.
    InvalidValue(NoteValueError),
    NoteNotFound(NoteId),
    Repo(RepoError),
    Report(ReportError),
    /// Requested day lies outside the representable calendar.
    InvalidWindow(DateKey),
}

impl Display for JournalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "note text cannot be empty"),
            Self::InvalidValue(err) => write!(f, "{err}"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Report(err) => write!(f, "{err}"),
            Self::InvalidWindow(day) => write!(f, "cannot resolve report window at {day}"),
        }
    }
}

impl Error for JournalError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidValue(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Report(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for JournalError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NoteNotFound(id),
            RepoError::Validation(err) => Self::InvalidValue(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ReportError> for JournalError {
    fn from(value: ReportError) -> Self {
        Self::Report(value)
    }
}

impl From<NoteValueError> for JournalError {
    fn from(value: NoteValueError) -> Self {
        Self::InvalidValue(value)
    }
}

/// Journal facade over a note repository and a classifier.
pub struct JournalService<R: NoteRepository, C: Classifier> {
    repo: R,
    classifier: C,
    config: ScoreConfig,
}

impl<R: NoteRepository, C: Classifier> JournalService<R, C> {
    pub fn new(repo: R, classifier: C, config: ScoreConfig) -> Self {
        Self {
            repo,
            classifier,
            config,
        }
    }

    /// Appends a note timestamped now.
    pub fn add_note(&self, text: impl Into<String>) -> Result<Note, JournalError> {
        self.add_note_at(text, Utc::now(), None, None)
    }

    /// Appends a note timestamped now with a manual category/value.
    pub fn add_note_with_override(
        &self,
        text: impl Into<String>,
        category: Option<Category>,
        value: Option<f64>,
    ) -> Result<Note, JournalError> {
        self.add_note_at(text, Utc::now(), category, value)
    }

    /// Appends a note with an explicit timestamp.
    ///
    /// Used by imports and tests where `created_at` is already known.
    pub fn add_note_at(
        &self,
        text: impl Into<String>,
        created_at: DateTime<Utc>,
        category: Option<Category>,
        value: Option<f64>,
    ) -> Result<Note, JournalError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(JournalError::EmptyText);
        }

        let note = Note::new(text, created_at).with_override(category, value)?;
        self.repo.append_note(&note)?;
        info!(
            "event=note_add module=service status=ok note_id={} manual_value={}",
            note.id,
            note.has_manual_value()
        );
        Ok(note)
    }

    pub fn delete_note(&self, id: NoteId) -> Result<(), JournalError> {
        self.repo.delete_note(id)?;
        info!("event=note_delete module=service status=ok note_id={id}");
        Ok(())
    }

    pub fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        self.repo.get_note(id)
    }

    /// All stored notes, oldest first.
    pub fn list_notes(&self) -> RepoResult<Vec<Note>> {
        self.repo.list_notes()
    }

    /// Classifies text without storing anything.
    pub fn classify_text(&self, text: &str) -> ClassifyResult<Classification> {
        self.classifier.classify(text)
    }

    /// Totals for one local calendar day.
    pub fn day_report<Tz: TimeZone>(
        &self,
        day: DateKey,
        tz: &Tz,
    ) -> Result<DayTotals, JournalError> {
        let started_at = Instant::now();
        let (start, end) = day.utc_bounds(tz).ok_or(JournalError::InvalidWindow(day))?;
        let notes = self.repo.list_notes_between(start, end)?;

        let totals = report::day_report(&notes, day, tz, &self.classifier, &self.config)
            .map_err(|err| log_report_failure("day_report", err))?;

        info!(
            "event=day_report module=service status=ok date={} notes={} raw_score={:.2} duration_ms={}",
            day,
            notes.len(),
            totals.raw_score,
            started_at.elapsed().as_millis()
        );
        Ok(totals)
    }

    /// Trend over the `days` calendar days ending at `today`, oldest first.
    pub fn trend_report<Tz: TimeZone>(
        &self,
        today: DateKey,
        days: u32,
        tz: &Tz,
    ) -> Result<Vec<DayScore>, JournalError> {
        let started_at = Instant::now();
        report::check_trend_window(days).map_err(|err| log_report_failure("trend_report", err))?;
        let notes = match trailing_days(today, days).next() {
            Some(first) => {
                let (start, _) = first
                    .utc_bounds(tz)
                    .ok_or(JournalError::InvalidWindow(first))?;
                let (_, end) = today
                    .utc_bounds(tz)
                    .ok_or(JournalError::InvalidWindow(today))?;
                self.repo.list_notes_between(start, end)?
            }
            None => Vec::new(),
        };
        debug!(
            "event=trend_report module=service status=loaded notes={} days={}",
            notes.len(),
            days
        );

        let trend = report::trend_report(&notes, today, days, tz, &self.classifier, &self.config)
            .map_err(|err| log_report_failure("trend_report", err))?;

        info!(
            "event=trend_report module=service status=ok today={} days={} notes={} duration_ms={}",
            today,
            days,
            notes.len(),
            started_at.elapsed().as_millis()
        );
        Ok(trend)
    }
}

fn log_report_failure(event: &str, err: ReportError) -> ReportError {
    warn!("event={event} module=service status=error error={err}");
    err
}
