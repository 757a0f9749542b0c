//! Review scheduling over the phrase store
//!
//! The scheduler is the only component with decision logic: it picks which
//! phrases to surface and applies answer outcomes. Every review endpoint
//! routes through [`ReviewScheduler::record_answer`]; the update rule lives
//! in [`super::algorithm`] and is not duplicated anywhere else.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::algorithm::{apply_review, MASTERY_THRESHOLD};
use super::models::{Phrase, ReviewStats};
use crate::store::{PhraseStore, StoreError};

/// Default batch size for due-phrase selection.
pub const DEFAULT_LIMIT: i64 = 10;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("invalid limit {0}: must be a positive integer")]
    InvalidLimit(i64),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;

pub struct ReviewScheduler {
    store: Arc<dyn PhraseStore>,
    /// Serializes the read-modify-write in `record_answer` so two
    /// concurrent answers for the same phrase cannot interleave.
    answer_lock: Mutex<()>,
}

impl ReviewScheduler {
    pub fn new(store: Arc<dyn PhraseStore>) -> Self {
        Self { store, answer_lock: Mutex::new(()) }
    }

    /// Select up to `limit` phrases for review at `now`.
    ///
    /// Overdue phrases come first, most overdue leading; if fewer than
    /// `limit` are overdue the remainder is filled with never-reviewed
    /// phrases, easiest first. The ordering is deterministic for a fixed
    /// store snapshot. Read-only.
    pub fn select_due(&self, limit: i64, now: DateTime<Utc>) -> Result<Vec<Phrase>> {
        if limit <= 0 {
            return Err(SchedulerError::InvalidLimit(limit));
        }
        let limit = limit as usize;

        let mut batch = self.store.list_overdue(now)?;
        batch.truncate(limit);

        if batch.len() < limit {
            let fill = limit - batch.len();
            let fresh = self.store.list_new()?;
            batch.extend(fresh.into_iter().take(fill));
        }

        Ok(batch)
    }

    /// Apply the learner's answer to one phrase and return its new state.
    ///
    /// Fails with `NotFound` for an unknown id. The whole
    /// get-compute-update sequence runs under the answer lock, and the
    /// store write is atomic per id, so a concurrent `select_due` sees
    /// either the old state or the new one, never a mix.
    pub fn record_answer(&self, phrase_id: i64, correct: bool, now: DateTime<Utc>) -> Result<Phrase> {
        let _guard = self.answer_lock.lock().unwrap();

        let phrase = self.store.get(phrase_id)?;
        let outcome = apply_review(&phrase, correct, now);
        let updated = self.store.update_review(phrase_id, &outcome)?;

        log::debug!(
            "phrase {} answered {}: step {} -> {}, mastery {:.3} -> {:.3}, next review {}",
            phrase_id,
            if correct { "correct" } else { "incorrect" },
            phrase.repetition_index,
            outcome.repetition_index,
            phrase.mastery_level,
            outcome.mastery_level,
            outcome.next_review,
        );

        Ok(updated)
    }

    /// Aggregate mastery statistics over the whole pool.
    pub fn stats(&self) -> Result<ReviewStats> {
        let phrases = self.store.all()?;
        if phrases.is_empty() {
            return Ok(ReviewStats::default());
        }

        let mastered = phrases.iter().filter(|p| p.mastery_level >= MASTERY_THRESHOLD).count();
        let total_mastery: f64 = phrases.iter().map(|p| p.mastery_level).sum();

        Ok(ReviewStats {
            total_phrases: phrases.len(),
            mastered_phrases: mastered,
            average_mastery: total_mastery / phrases.len() as f64,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::srs::algorithm::INTERVALS;
    use crate::store::InMemoryStore;

    fn scheduler_with(phrases: Vec<Phrase>) -> ReviewScheduler {
        let store = Arc::new(InMemoryStore::new());
        for phrase in phrases {
            store.insert(phrase).unwrap();
        }
        ReviewScheduler::new(store)
    }

    fn phrase(id: i64, difficulty: f64) -> Phrase {
        Phrase::new(id, format!("hindi-{id}"), format!("english-{id}"), String::new(), difficulty)
    }

    fn overdue(id: i64, now: DateTime<Utc>, days_ago: i64) -> Phrase {
        let mut p = phrase(id, 0.5);
        p.last_reviewed = Some(now - Duration::days(days_ago + 1));
        p.next_review = Some(now - Duration::days(days_ago));
        p
    }

    #[test]
    fn rejects_non_positive_limit() {
        let scheduler = scheduler_with(vec![]);
        let now = Utc::now();
        assert!(matches!(scheduler.select_due(0, now), Err(SchedulerError::InvalidLimit(0))));
        assert!(matches!(scheduler.select_due(-3, now), Err(SchedulerError::InvalidLimit(-3))));
    }

    #[test]
    fn overdue_first_then_new_fill() {
        let now = Utc::now();
        let scheduler = scheduler_with(vec![
            overdue(1, now, 2),
            overdue(2, now, 5),
            phrase(3, 0.8),
            phrase(4, 0.1),
        ]);

        let batch = scheduler.select_due(10, now).unwrap();
        let ids: Vec<i64> = batch.iter().map(|p| p.id).collect();
        // Most overdue first, then new phrases easiest first.
        assert_eq!(ids, vec![2, 1, 4, 3]);
    }

    #[test]
    fn limit_caps_the_batch() {
        let now = Utc::now();
        let scheduler = scheduler_with(vec![
            overdue(1, now, 1),
            overdue(2, now, 2),
            overdue(3, now, 3),
            phrase(4, 0.5),
        ]);

        let batch = scheduler.select_due(2, now).unwrap();
        let ids: Vec<i64> = batch.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn future_phrases_are_never_selected() {
        let now = Utc::now();
        let mut scheduled = phrase(1, 0.5);
        scheduled.next_review = Some(now + Duration::hours(1));
        let scheduler = scheduler_with(vec![scheduled, phrase(2, 0.5)]);

        let batch = scheduler.select_due(10, now).unwrap();
        let ids: Vec<i64> = batch.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn selection_is_deterministic() {
        let now = Utc::now();
        let scheduler = scheduler_with(vec![
            overdue(1, now, 1),
            overdue(2, now, 4),
            phrase(3, 0.3),
            phrase(4, 0.3),
        ]);

        let first: Vec<i64> =
            scheduler.select_due(3, now).unwrap().iter().map(|p| p.id).collect();
        let second: Vec<i64> =
            scheduler.select_due(3, now).unwrap().iter().map(|p| p.id).collect();
        assert_eq!(first, second);
        // Prefix-stable: a smaller limit yields a prefix of the larger batch.
        let smaller: Vec<i64> =
            scheduler.select_due(2, now).unwrap().iter().map(|p| p.id).collect();
        assert_eq!(smaller[..], first[..2]);
    }

    #[test]
    fn record_answer_unknown_id_is_not_found() {
        let scheduler = scheduler_with(vec![phrase(1, 0.5)]);
        let result = scheduler.record_answer(99, true, Utc::now());
        assert!(matches!(result, Err(SchedulerError::Store(StoreError::NotFound(99)))));
    }

    #[test]
    fn correct_answer_advances_schedule() {
        let now = Utc::now();
        let scheduler = scheduler_with(vec![phrase(1, 0.5)]);

        let updated = scheduler.record_answer(1, true, now).unwrap();
        assert_eq!(updated.repetition_index, 1);
        assert!((updated.mastery_level - 0.1).abs() < 1e-9);
        assert_eq!(updated.next_review, Some(now + Duration::days(INTERVALS[1])));

        // The phrase is no longer selectable as new material.
        let batch = scheduler.select_due(10, now).unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn incorrect_answer_resets_to_one_day() {
        let now = Utc::now();
        let mut p = phrase(1, 0.5);
        p.repetition_index = 4;
        p.mastery_level = 0.6;
        let scheduler = scheduler_with(vec![p]);

        let updated = scheduler.record_answer(1, false, now).unwrap();
        assert_eq!(updated.repetition_index, 0);
        assert_eq!(updated.next_review, Some(now + Duration::days(1)));
        assert!((updated.mastery_level - 0.48).abs() < 1e-9);
    }

    #[test]
    fn invariants_hold_over_answer_sequences() {
        let now = Utc::now();
        let scheduler = scheduler_with(vec![phrase(1, 0.5)]);

        for i in 0..100 {
            let t = now + Duration::days(i);
            let updated = scheduler.record_answer(1, i % 4 != 0, t).unwrap();
            assert!(updated.repetition_index < INTERVALS.len());
            assert!((0.0..=1.0).contains(&updated.mastery_level));
            assert!(updated.next_review.unwrap() >= t + Duration::days(INTERVALS[0]));
        }
    }

    #[test]
    fn stats_on_empty_store() {
        let scheduler = scheduler_with(vec![]);
        let stats = scheduler.stats().unwrap();
        assert_eq!(stats.total_phrases, 0);
        assert_eq!(stats.mastered_phrases, 0);
        assert_eq!(stats.average_mastery, 0.0);
    }

    #[test]
    fn stats_counts_mastered_and_averages() {
        let mut a = phrase(1, 0.5);
        a.mastery_level = 0.9;
        let mut b = phrase(2, 0.5);
        b.mastery_level = 0.8;
        let mut c = phrase(3, 0.5);
        c.mastery_level = 0.1;
        let scheduler = scheduler_with(vec![a, b, c]);

        let stats = scheduler.stats().unwrap();
        assert_eq!(stats.total_phrases, 3);
        assert_eq!(stats.mastered_phrases, 2);
        assert!((stats.average_mastery - 0.6).abs() < 1e-9);
    }
}
