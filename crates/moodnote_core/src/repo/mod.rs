//! Repository layer for stored journal notes.
//!
//! # Responsibility
//! - Define the note data access contract the service layer depends on.
//! - Isolate SQLite query details from scoring and orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `InvalidData`) in
//!   addition to DB transport errors.

pub mod note_repo;
