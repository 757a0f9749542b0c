//! Phrase content seeding
//!
//! Phrases are authored outside the service as a JSON array of seed records
//! and loaded once into an empty store at startup. When no seed file exists
//! a small built-in starter set is used so the service works out of the box.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::srs::models::PhraseSeed;
use crate::store::{PhraseStore, StoreError};

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed seed file: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Starter phrases used when no seed file is present.
pub fn builtin_phrases() -> Vec<PhraseSeed> {
    vec![
        PhraseSeed {
            id: 1,
            hindi: "नमस्ते".to_string(),
            english: "Hello".to_string(),
            context: "Greeting".to_string(),
            difficulty: 0.1,
        },
        PhraseSeed {
            id: 2,
            hindi: "धन्यवाद".to_string(),
            english: "Thank you".to_string(),
            context: "Gratitude".to_string(),
            difficulty: 0.1,
        },
    ]
}

/// Parse a seed file into phrase seeds.
pub fn load_seed_file(path: &Path) -> Result<Vec<PhraseSeed>, SeedError> {
    let content = fs::read_to_string(path)?;
    let seeds: Vec<PhraseSeed> = serde_json::from_str(&content)?;
    Ok(seeds)
}

/// Populate an empty store from `seed_path`, or from the built-in set when
/// the file does not exist. A store that already has phrases is left alone.
///
/// Returns the number of phrases inserted.
pub fn seed_if_empty(store: &dyn PhraseStore, seed_path: &Path) -> Result<usize, SeedError> {
    if store.count()? > 0 {
        log::debug!("phrase store already populated, skipping seeding");
        return Ok(0);
    }

    let seeds = if seed_path.exists() {
        let seeds = load_seed_file(seed_path)?;
        log::info!("seeding {} phrases from {}", seeds.len(), seed_path.display());
        seeds
    } else {
        let seeds = builtin_phrases();
        log::info!(
            "seed file {} not found, using {} built-in phrases",
            seed_path.display(),
            seeds.len()
        );
        seeds
    };

    let count = seeds.len();
    for seed in seeds {
        store.insert(seed.into())?;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    #[test]
    fn parses_seed_records_with_default_difficulty() {
        let json = r#"[
            {"id": 1, "hindi": "पानी", "english": "Water", "context": "Essentials", "difficulty": 0.2},
            {"id": 2, "hindi": "खाना", "english": "Food", "context": "Essentials"}
        ]"#;
        let seeds: Vec<PhraseSeed> = serde_json::from_str(json).unwrap();
        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[0].difficulty, 0.2);
        assert_eq!(seeds[1].difficulty, 0.5);
    }

    #[test]
    fn builtin_set_has_unique_ids() {
        let seeds = builtin_phrases();
        assert!(!seeds.is_empty());
        let mut ids: Vec<i64> = seeds.iter().map(|s| s.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), seeds.len());
    }

    #[test]
    fn seeds_empty_store_and_skips_populated_one() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("phrases.json");

        let store = InMemoryStore::new();
        let inserted = seed_if_empty(&store, &missing).unwrap();
        assert_eq!(inserted, builtin_phrases().len());
        assert_eq!(store.count().unwrap(), inserted);

        // Second run must not touch the populated store.
        let inserted = seed_if_empty(&store, &missing).unwrap();
        assert_eq!(inserted, 0);
    }

    #[test]
    fn seeds_from_file_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phrases.json");
        std::fs::write(
            &path,
            r#"[{"id": 10, "hindi": "अच्छा", "english": "Good", "context": "Reactions", "difficulty": 0.3}]"#,
        )
        .unwrap();

        let store = InMemoryStore::new();
        let inserted = seed_if_empty(&store, &path).unwrap();
        assert_eq!(inserted, 1);

        let phrase = store.get(10).unwrap();
        assert_eq!(phrase.english, "Good");
        assert!(phrase.is_new());
        assert_eq!(phrase.mastery_level, 0.0);
    }

    #[test]
    fn malformed_seed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phrases.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = InMemoryStore::new();
        assert!(matches!(seed_if_empty(&store, &path), Err(SeedError::Json(_))));
    }
}
