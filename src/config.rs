//! Server configuration
//!
//! Everything routable comes from CLI flags; credentials come from the
//! environment only (`OPENAI_API_KEY`, optionally `REALTIME_API_URL`) so
//! they never show up in process listings.

use std::env;
use std::path::PathBuf;

use clap::Parser;

/// Realtime speech endpoint used when none is configured.
pub const DEFAULT_REALTIME_URL: &str = "wss://api.openai.com/v1/realtime";

#[derive(Parser, Debug, Clone)]
#[command(name = "abhyas", about = "Hindi phrase practice backend", version)]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 8000)]
    pub port: u16,

    /// SQLite database path; phrases are kept in memory when omitted
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// JSON file with starter phrases, loaded into an empty store
    #[arg(long, default_value = "data/phrases.json")]
    pub seed: PathBuf,

    /// Directory of web client assets served under /static
    #[arg(long, default_value = "static")]
    pub static_dir: PathBuf,

    /// Realtime speech endpoint the relay dials (env: REALTIME_API_URL)
    #[arg(long)]
    pub realtime_url: Option<String>,

    /// API key for the realtime speech service (env: OPENAI_API_KEY)
    #[arg(skip)]
    pub api_key: Option<String>,
}

impl ServerConfig {
    /// Parse CLI arguments and fill in environment-backed settings.
    pub fn load() -> Self {
        let mut config = Self::parse();
        config.api_key = env::var("OPENAI_API_KEY").ok().filter(|key| !key.is_empty());
        if config.realtime_url.is_none() {
            config.realtime_url = env::var("REALTIME_API_URL").ok().filter(|url| !url.is_empty());
        }
        config
    }

    pub fn realtime_url(&self) -> &str {
        self.realtime_url.as_deref().unwrap_or(DEFAULT_REALTIME_URL)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
