//! Spaced repetition for Hindi phrases
//!
//! This module provides:
//! - The phrase data model and review statistics
//! - The interval table and mastery update rule
//! - The review scheduler (due selection, answer recording, stats)

pub mod algorithm;
pub mod models;
pub mod scheduler;

pub use models::{Phrase, PhraseSeed, ReviewStats};
pub use scheduler::{ReviewScheduler, SchedulerError, DEFAULT_LIMIT};
