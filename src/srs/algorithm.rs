//! Spaced repetition update rule
//!
//! Each phrase carries an index into a fixed table of day-intervals and a
//! smoothed mastery score in [0,1]. Answering correctly advances the index
//! one step (capped at the last interval) and raises mastery with
//! diminishing returns as it approaches 1. Answering incorrectly resets the
//! index to the shortest interval and knocks mastery down proportionally to
//! its current value, so a miss costs more the further along the phrase is.

use chrono::{DateTime, Duration, Utc};

use super::models::Phrase;

/// Review intervals in days, indexed by a phrase's repetition step.
pub const INTERVALS: [i64; 9] = [1, 2, 4, 7, 13, 21, 34, 55, 89];

/// Mastery level at or above which a phrase counts as mastered.
pub const MASTERY_THRESHOLD: f64 = 0.8;

/// Fraction of the remaining headroom gained on a correct answer.
const MASTERY_GAIN: f64 = 0.1;

/// Fraction of current mastery lost on an incorrect answer.
const MASTERY_PENALTY: f64 = 0.2;

/// Result of applying one answer to a phrase's review state.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewResult {
    pub repetition_index: usize,
    pub mastery_level: f64,
    pub last_reviewed: DateTime<Utc>,
    pub next_review: DateTime<Utc>,
}

/// Compute the next review state for `phrase` given the learner's answer.
///
/// Pure function of the phrase's current state, the answer, and `now`; the
/// caller is responsible for persisting the result atomically.
pub fn apply_review(phrase: &Phrase, correct: bool, now: DateTime<Utc>) -> ReviewResult {
    let (repetition_index, mastery_level) = if correct {
        let index = (phrase.repetition_index + 1).min(INTERVALS.len() - 1);
        let mastery = phrase.mastery_level + MASTERY_GAIN * (1.0 - phrase.mastery_level);
        (index, mastery.clamp(0.0, 1.0))
    } else {
        let mastery = phrase.mastery_level - MASTERY_PENALTY * phrase.mastery_level;
        (0, mastery.clamp(0.0, 1.0))
    };

    ReviewResult {
        repetition_index,
        mastery_level,
        last_reviewed: now,
        next_review: now + Duration::days(INTERVALS[repetition_index]),
    }
}
