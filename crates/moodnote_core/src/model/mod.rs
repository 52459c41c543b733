//! Journal domain model.
//!
//! # Responsibility
//! - Define the note records read by the scoring pipeline.
//! - Keep raw notes and their classified projection as separate types.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - Classified notes always carry exactly one `Category`.

pub mod note;
