use std::sync::Arc;

use anyhow::Result;

use abhyas::config::ServerConfig;
use abhyas::srs::ReviewScheduler;
use abhyas::store::{InMemoryStore, PhraseStore, SqliteStore};
use abhyas::{seed, server};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let config = ServerConfig::load();

    let store: Arc<dyn PhraseStore> = match &config.db {
        Some(path) => {
            log::info!("opening phrase database at {}", path.display());
            Arc::new(SqliteStore::open(path)?)
        }
        None => {
            log::info!("no database configured, keeping phrases in memory");
            Arc::new(InMemoryStore::new())
        }
    };

    let seeded = seed::seed_if_empty(store.as_ref(), &config.seed)?;
    if seeded > 0 {
        log::info!("loaded {seeded} phrases into the store");
    }

    if config.api_key.is_none() {
        log::warn!("OPENAI_API_KEY not set; the /ws speech relay will be unavailable");
    }

    let scheduler = Arc::new(ReviewScheduler::new(store));
    server::serve(config, scheduler).await?;
    Ok(())
}
