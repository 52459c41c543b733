//! Service layer for journal use-cases.
//!
//! # Responsibility
//! - Compose repository, classifier and score config into use-case APIs.
//! - Keep storage and classification details behind their traits.

pub mod journal_service;
