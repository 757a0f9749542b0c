//! SQLite phrase store
//!
//! Persistent implementation of [`PhraseStore`] on a single-file database.
//! Timestamps are stored as fixed-width RFC 3339 text so `ORDER BY
//! next_review` is chronological; review updates are a single UPDATE
//! statement, which gives the per-row atomicity the scheduler relies on.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, Row};

use super::{PhraseStore, Result, StoreError};
use crate::srs::algorithm::ReviewResult;
use crate::srs::models::Phrase;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (creating if necessary) the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS phrases (
                id INTEGER PRIMARY KEY,
                hindi TEXT NOT NULL,
                english TEXT NOT NULL,
                context TEXT NOT NULL DEFAULT '',
                difficulty REAL NOT NULL DEFAULT 0.5,
                repetition_index INTEGER NOT NULL DEFAULT 0,
                mastery_level REAL NOT NULL DEFAULT 0.0,
                last_reviewed TEXT,
                next_review TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_phrases_next_review ON phrases(next_review);
            CREATE INDEX IF NOT EXISTS idx_phrases_difficulty ON phrases(difficulty);",
        )?;
        Ok(Self { conn: Mutex::new(conn) })
    }
}

const PHRASE_COLUMNS: &str = "id, hindi, english, context, difficulty, \
     repetition_index, mastery_level, last_reviewed, next_review";

fn timestamp_to_sql(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn timestamp_from_sql(text: Option<String>) -> Result<Option<DateTime<Utc>>> {
    match text {
        Some(text) => {
            let parsed = DateTime::parse_from_rfc3339(&text)?;
            Ok(Some(parsed.with_timezone(&Utc)))
        }
        None => Ok(None),
    }
}

fn phrase_from_row(row: &Row) -> rusqlite::Result<(Phrase, Option<String>, Option<String>)> {
    let phrase = Phrase {
        id: row.get(0)?,
        hindi: row.get(1)?,
        english: row.get(2)?,
        context: row.get(3)?,
        difficulty: row.get(4)?,
        repetition_index: row.get::<_, i64>(5)? as usize,
        mastery_level: row.get(6)?,
        last_reviewed: None,
        next_review: None,
    };
    Ok((phrase, row.get(7)?, row.get(8)?))
}

fn finish_phrase(parts: (Phrase, Option<String>, Option<String>)) -> Result<Phrase> {
    let (mut phrase, last_reviewed, next_review) = parts;
    phrase.last_reviewed = timestamp_from_sql(last_reviewed)?;
    phrase.next_review = timestamp_from_sql(next_review)?;
    Ok(phrase)
}

impl SqliteStore {
    fn query_phrases(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<Phrase>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, phrase_from_row)?;

        let mut phrases = Vec::new();
        for row in rows {
            phrases.push(finish_phrase(row?)?);
        }
        Ok(phrases)
    }
}

impl PhraseStore for SqliteStore {
    fn get(&self, id: i64) -> Result<Phrase> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare(&format!("SELECT {PHRASE_COLUMNS} FROM phrases WHERE id = ?1"))?;
        let mut rows = stmt.query_map(params![id], phrase_from_row)?;
        match rows.next() {
            Some(row) => finish_phrase(row?),
            None => Err(StoreError::NotFound(id)),
        }
    }

    fn list_overdue(&self, now: DateTime<Utc>) -> Result<Vec<Phrase>> {
        self.query_phrases(
            &format!(
                "SELECT {PHRASE_COLUMNS} FROM phrases \
                 WHERE next_review IS NOT NULL AND next_review <= ?1 \
                 ORDER BY next_review ASC, id ASC"
            ),
            &[&timestamp_to_sql(now)],
        )
    }

    fn list_new(&self) -> Result<Vec<Phrase>> {
        self.query_phrases(
            &format!(
                "SELECT {PHRASE_COLUMNS} FROM phrases \
                 WHERE next_review IS NULL \
                 ORDER BY difficulty ASC, id ASC"
            ),
            &[],
        )
    }

    fn all(&self) -> Result<Vec<Phrase>> {
        self.query_phrases(
            &format!("SELECT {PHRASE_COLUMNS} FROM phrases ORDER BY id ASC"),
            &[],
        )
    }

    fn count(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM phrases", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn insert(&self, phrase: Phrase) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO phrases \
             (id, hindi, english, context, difficulty, repetition_index, \
              mastery_level, last_reviewed, next_review) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                phrase.id,
                phrase.hindi,
                phrase.english,
                phrase.context,
                phrase.difficulty,
                phrase.repetition_index as i64,
                phrase.mastery_level,
                phrase.last_reviewed.map(timestamp_to_sql),
                phrase.next_review.map(timestamp_to_sql),
            ],
        )?;
        Ok(())
    }

    fn update_review(&self, id: i64, outcome: &ReviewResult) -> Result<Phrase> {
        {
            let conn = self.conn.lock().unwrap();
            let changed = conn.execute(
                "UPDATE phrases SET repetition_index = ?1, mastery_level = ?2, \
                 last_reviewed = ?3, next_review = ?4 WHERE id = ?5",
                params![
                    outcome.repetition_index as i64,
                    outcome.mastery_level,
                    timestamp_to_sql(outcome.last_reviewed),
                    timestamp_to_sql(outcome.next_review),
                    id,
                ],
            )?;
            if changed == 0 {
                return Err(StoreError::NotFound(id));
            }
        }
        self.get(id)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use tempfile::tempdir;

    use super::*;

    fn open_temp() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("phrases.sqlite3")).unwrap();
        (dir, store)
    }

    fn phrase(id: i64, difficulty: f64) -> Phrase {
        Phrase::new(id, format!("hindi-{id}"), format!("english-{id}"), String::new(), difficulty)
    }

    #[test]
    fn round_trips_a_phrase() {
        let (_dir, store) = open_temp();
        let mut p = phrase(1, 0.3);
        p.mastery_level = 0.5;
        p.repetition_index = 2;
        let now = Utc::now();
        p.last_reviewed = Some(now);
        p.next_review = Some(now + Duration::days(4));

        store.insert(p).unwrap();
        let loaded = store.get(1).unwrap();
        assert_eq!(loaded.hindi, "hindi-1");
        assert_eq!(loaded.repetition_index, 2);
        assert_eq!(loaded.mastery_level, 0.5);
        assert_eq!(loaded.last_reviewed.unwrap().timestamp_micros(), now.timestamp_micros());
    }

    #[test]
    fn get_unknown_id_is_not_found() {
        let (_dir, store) = open_temp();
        assert!(matches!(store.get(42), Err(StoreError::NotFound(42))));
    }

    #[test]
    fn overdue_and_new_partition_and_order() {
        let (_dir, store) = open_temp();
        let now = Utc::now();

        let mut overdue_late = phrase(1, 0.5);
        overdue_late.next_review = Some(now - Duration::days(1));
        let mut overdue_early = phrase(2, 0.5);
        overdue_early.next_review = Some(now - Duration::days(5));
        let mut future = phrase(3, 0.5);
        future.next_review = Some(now + Duration::days(2));
        let fresh_hard = phrase(4, 0.9);
        let fresh_easy = phrase(5, 0.1);

        for p in [overdue_late, overdue_early, future, fresh_hard, fresh_easy] {
            store.insert(p).unwrap();
        }

        let due: Vec<i64> = store.list_overdue(now).unwrap().iter().map(|p| p.id).collect();
        assert_eq!(due, vec![2, 1]);

        let fresh: Vec<i64> = store.list_new().unwrap().iter().map(|p| p.id).collect();
        assert_eq!(fresh, vec![5, 4]);
    }

    #[test]
    fn update_review_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("phrases.sqlite3");
        let now = Utc::now();

        {
            let store = SqliteStore::open(&path).unwrap();
            store.insert(phrase(7, 0.5)).unwrap();
            let outcome = ReviewResult {
                repetition_index: 1,
                mastery_level: 0.1,
                last_reviewed: now,
                next_review: now + Duration::days(2),
            };
            let updated = store.update_review(7, &outcome).unwrap();
            assert_eq!(updated.repetition_index, 1);
        }

        let store = SqliteStore::open(&path).unwrap();
        let loaded = store.get(7).unwrap();
        assert_eq!(loaded.repetition_index, 1);
        assert!((loaded.mastery_level - 0.1).abs() < 1e-9);
        assert!(loaded.next_review.is_some());
    }

    #[test]
    fn update_review_unknown_id_is_not_found() {
        let (_dir, store) = open_temp();
        let now = Utc::now();
        let outcome = ReviewResult {
            repetition_index: 0,
            mastery_level: 0.0,
            last_reviewed: now,
            next_review: now,
        };
        assert!(matches!(store.update_review(1, &outcome), Err(StoreError::NotFound(1))));
    }
}
