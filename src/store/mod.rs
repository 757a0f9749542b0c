//! Phrase storage
//!
//! The scheduler talks to storage through the [`PhraseStore`] trait so the
//! service can run against either the in-memory store (the default) or the
//! SQLite store, without the callers caring which.

mod memory;
mod sqlite;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::srs::algorithm::ReviewResult;
use crate::srs::models::Phrase;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("phrase not found: {0}")]
    NotFound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("invalid stored timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Storage contract for the phrase pool.
///
/// Implementations must apply `update_review` atomically per id: a reader
/// never observes a row with some review fields updated and others not.
pub trait PhraseStore: Send + Sync {
    /// Fetch a phrase by id.
    fn get(&self, id: i64) -> Result<Phrase>;

    /// Phrases whose `next_review` is set and at or before `now`, ordered
    /// ascending by `(next_review, id)`, most overdue first.
    fn list_overdue(&self, now: DateTime<Utc>) -> Result<Vec<Phrase>>;

    /// Never-reviewed phrases, ordered ascending by `(difficulty, id)`.
    fn list_new(&self) -> Result<Vec<Phrase>>;

    /// Every phrase in the pool, in id order.
    fn all(&self) -> Result<Vec<Phrase>>;

    /// Number of phrases in the pool.
    fn count(&self) -> Result<usize>;

    /// Insert a phrase. Seeding-time only; ids come from the content source.
    fn insert(&self, phrase: Phrase) -> Result<()>;

    /// Write the outcome of one answer to a single phrase and return the
    /// updated row. Atomic per id.
    fn update_review(&self, id: i64, outcome: &ReviewResult) -> Result<Phrase>;
}
