pub mod config;
pub mod seed;
pub mod server;
pub mod srs;
pub mod store;

pub use config::ServerConfig;
pub use srs::{Phrase, ReviewScheduler, ReviewStats};
pub use store::{InMemoryStore, PhraseStore, SqliteStore};
