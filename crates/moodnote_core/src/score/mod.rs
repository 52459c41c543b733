//! Pure scoring math: configuration, day aggregation and trend smoothing.
//!
//! # Responsibility
//! - Turn note values into a bounded per-day score.
//! - Smooth per-day scores into a trend.
//!
//! # Invariants
//! - No function here performs I/O or holds state between calls.
//! - Every function takes the `ScoreConfig` explicitly.

pub mod aggregate;
pub mod config;
pub mod smooth;
