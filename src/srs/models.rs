//! Data models for the phrase review system

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Hindi phrase with its spaced repetition state.
///
/// The content fields (`hindi`, `english`, `context`) are opaque to the
/// scheduler; only the review fields drive scheduling decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Phrase {
    pub id: i64,
    pub hindi: String,
    pub english: String,
    pub context: String,
    /// Authoring-time difficulty in [0,1], used only to rank phrases that
    /// have never been reviewed.
    #[serde(default = "default_difficulty")]
    pub difficulty: f64,
    /// Index into the review interval table.
    #[serde(default)]
    pub repetition_index: usize,
    /// Smoothed retention estimate in [0,1].
    #[serde(default)]
    pub mastery_level: f64,
    #[serde(default)]
    pub last_reviewed: Option<DateTime<Utc>>,
    /// When the phrase should next be shown. `None` means it has never
    /// been answered and is only eligible as new material.
    #[serde(default)]
    pub next_review: Option<DateTime<Utc>>,
}

fn default_difficulty() -> f64 {
    0.5
}

impl Phrase {
    pub fn new(id: i64, hindi: String, english: String, context: String, difficulty: f64) -> Self {
        Self {
            id,
            hindi,
            english,
            context,
            difficulty,
            repetition_index: 0,
            mastery_level: 0.0,
            last_reviewed: None,
            next_review: None,
        }
    }

    /// Check whether the phrase is due for review at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.next_review {
            Some(next) => next <= now,
            None => false,
        }
    }

    /// A phrase that has never been answered.
    pub fn is_new(&self) -> bool {
        self.next_review.is_none()
    }
}

/// Seed record for content loading: phrase text plus authoring difficulty.
/// Review state always starts zeroed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhraseSeed {
    pub id: i64,
    pub hindi: String,
    pub english: String,
    pub context: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: f64,
}

impl From<PhraseSeed> for Phrase {
    fn from(seed: PhraseSeed) -> Self {
        Phrase::new(seed.id, seed.hindi, seed.english, seed.context, seed.difficulty)
    }
}

/// Aggregate learning statistics over the whole phrase pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewStats {
    pub total_phrases: usize,
    pub mastered_phrases: usize,
    pub average_mastery: f64,
}

impl Default for ReviewStats {
    fn default() -> Self {
        Self {
            total_phrases: 0,
            mastered_phrases: 0,
            average_mastery: 0.0,
        }
    }
}
