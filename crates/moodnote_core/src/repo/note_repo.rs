//! Note repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Append, delete and list journal notes.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Listing order is always `created_at ASC, uuid ASC`.
//! - Manual values are finite before they are written.
//! - Rows that cannot be parsed are rejected, not skipped.

use crate::db::DbError;
use crate::model::note::{validate_note_value, Category, Note, NoteId, NoteValueError};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const NOTE_SELECT_SQL: &str = "SELECT
    uuid,
    text,
    created_at,
    category,
    value
FROM notes";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for note persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    Validation(NoteValueError),
    Db(DbError),
    NotFound(NoteId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<NoteValueError> for RepoError {
    fn from(value: NoteValueError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Read/write access to stored notes.
pub trait NoteRepository {
    /// Stores one note and returns its id.
    fn append_note(&self, note: &Note) -> RepoResult<NoteId>;
    /// Removes one note permanently.
    fn delete_note(&self, id: NoteId) -> RepoResult<()>;
    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>>;
    /// All notes, oldest first.
    fn list_notes(&self) -> RepoResult<Vec<Note>>;
    /// Notes with `start <= created_at < end`, oldest first.
    fn list_notes_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepoResult<Vec<Note>>;
}

/// SQLite-backed note repository over a migrated connection.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_notes(&self, sql: &str, params: impl rusqlite::Params) -> RepoResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn append_note(&self, note: &Note) -> RepoResult<NoteId> {
        if let Some(value) = note.value {
            validate_note_value(value)?;
        }

        self.conn.execute(
            "INSERT INTO notes (uuid, text, created_at, category, value)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                note.id.to_string(),
                note.text.as_str(),
                note.created_at.timestamp_millis(),
                note.category.map(Category::as_str),
                note.value,
            ],
        )?;

        Ok(note.id)
    }

    fn delete_note(&self, id: NoteId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let notes = self.query_notes(
            &format!("{NOTE_SELECT_SQL} WHERE uuid = ?1;"),
            [id.to_string()],
        )?;
        Ok(notes.into_iter().next())
    }

    fn list_notes(&self) -> RepoResult<Vec<Note>> {
        self.query_notes(
            &format!("{NOTE_SELECT_SQL} ORDER BY created_at ASC, uuid ASC;"),
            [],
        )
    }

    fn list_notes_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepoResult<Vec<Note>> {
        self.query_notes(
            &format!(
                "{NOTE_SELECT_SQL}
                 WHERE created_at >= ?1 AND created_at < ?2
                 ORDER BY created_at ASC, uuid ASC;"
            ),
            params![start.timestamp_millis(), end.timestamp_millis()],
        )
    }
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in notes.uuid"))
    })?;

    let created_ms: i64 = row.get("created_at")?;
    let created_at = DateTime::<Utc>::from_timestamp_millis(created_ms).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid timestamp `{created_ms}` in notes.created_at"
        ))
    })?;

    let category = match row.get::<_, Option<String>>("category")? {
        Some(label) => Some(parse_category(&label).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid category `{label}` in notes.category"))
        })?),
        None => None,
    };

    let value = match row.get::<_, Option<f64>>("value")? {
        Some(value) => Some(validate_note_value(value).map_err(|err| {
            RepoError::InvalidData(format!("{err} in notes.value"))
        })?),
        None => None,
    };

    Ok(Note {
        id,
        text: row.get("text")?,
        created_at,
        category,
        value,
    })
}

fn parse_category(label: &str) -> Option<Category> {
    Category::ALL
        .into_iter()
        .find(|category| category.as_str() == label)
}
