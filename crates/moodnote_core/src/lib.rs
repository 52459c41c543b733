//! Core domain logic for MoodNote.
//! Turns free-text journal notes into daily well-being scores and trends.

pub mod calendar;
pub mod classify;
pub mod db;
pub mod logging;
pub mod model;
pub mod report;
pub mod repo;
pub mod score;
pub mod service;

pub use calendar::{local_date_key, today_key, trailing_days, DateKey, TrailingDays};
pub use classify::{
    Classification, Classifier, ClassifyError, ClassifyResult, KeywordClassifier, KeywordRule,
    ModelBackend, ModelClassifier, UnavailableBackend,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{Category, Note, NoteId, NoteValueError, ValuedNote};
pub use report::{
    day_report, trend_report, value_note, DayScore, ReportError, MAX_TREND_DAYS,
};
pub use repo::note_repo::{NoteRepository, RepoError, RepoResult, SqliteNoteRepository};
pub use score::aggregate::{score_day_from_values, DayTotals, ScoreError};
pub use score::config::{ScoreConfig, ScoreConfigError};
pub use score::smooth::{ema_score, smooth_series};
pub use service::journal_service::{JournalError, JournalService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
