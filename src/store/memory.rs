//! In-memory phrase store
//!
//! A single map from id to phrase guarded by one mutation lock. This is the
//! default store and mirrors what the service needs when run without a
//! database path: everything lives for the process lifetime and seeding
//! repopulates it on the next start.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use super::{PhraseStore, Result, StoreError};
use crate::srs::algorithm::ReviewResult;
use crate::srs::models::Phrase;

#[derive(Default)]
pub struct InMemoryStore {
    phrases: Mutex<BTreeMap<i64, Phrase>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PhraseStore for InMemoryStore {
    fn get(&self, id: i64) -> Result<Phrase> {
        let phrases = self.phrases.lock().unwrap();
        phrases.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    fn list_overdue(&self, now: DateTime<Utc>) -> Result<Vec<Phrase>> {
        let phrases = self.phrases.lock().unwrap();
        let mut due: Vec<Phrase> =
            phrases.values().filter(|p| p.is_due(now)).cloned().collect();
        // BTreeMap iteration is id-ordered, so a stable sort on next_review
        // keeps the id tie-break.
        due.sort_by_key(|p| p.next_review);
        Ok(due)
    }

    fn list_new(&self) -> Result<Vec<Phrase>> {
        let phrases = self.phrases.lock().unwrap();
        let mut fresh: Vec<Phrase> =
            phrases.values().filter(|p| p.is_new()).cloned().collect();
        fresh.sort_by(|a, b| a.difficulty.total_cmp(&b.difficulty).then(a.id.cmp(&b.id)));
        Ok(fresh)
    }

    fn all(&self) -> Result<Vec<Phrase>> {
        let phrases = self.phrases.lock().unwrap();
        Ok(phrases.values().cloned().collect())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.phrases.lock().unwrap().len())
    }

    fn insert(&self, phrase: Phrase) -> Result<()> {
        let mut phrases = self.phrases.lock().unwrap();
        phrases.insert(phrase.id, phrase);
        Ok(())
    }

    fn update_review(&self, id: i64, outcome: &ReviewResult) -> Result<Phrase> {
        let mut phrases = self.phrases.lock().unwrap();
        let phrase = phrases.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        phrase.repetition_index = outcome.repetition_index;
        phrase.mastery_level = outcome.mastery_level;
        phrase.last_reviewed = Some(outcome.last_reviewed);
        phrase.next_review = Some(outcome.next_review);
        Ok(phrase.clone())
    }
}
