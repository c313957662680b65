use std::{env, path::Path};

use anyhow::{Context, Result};

pub const DEFAULT_MONGO_URI: &str = "mongodb://localhost:27017/";
pub const DEFAULT_MONGO_DB_NAME: &str = "salary_db";
pub const DEFAULT_MONGO_COLLECTION_NAME: &str = "salaries";
pub const DEFAULT_API_BIND: &str = "127.0.0.1:8000";
pub const DEFAULT_AGGREGATION_API_URL: &str = "http://127.0.0.1:8000/aggregate";

/// In debug builds, read `.env` next to the calling crate's manifest if present.
fn load_dotenv(manifest_dir: &Path) -> Result<()> {
    if cfg!(debug_assertions) {
        if let Err(err) = dotenvy::from_path(manifest_dir.join(".env")) {
            if !err.not_found() {
                return Err(err).context("Can't read .env file");
            }
        }
    }
    Ok(())
}

fn env_lookup(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

pub struct ServerConfig {
    pub mongo_uri: String,
    pub mongo_db_name: String,
    pub mongo_collection_name: String,
    /// Address the HTTP listener binds to
    pub bind: String,
}

impl ServerConfig {
    pub fn load(manifest_dir: &Path) -> Result<Self> {
        load_dotenv(manifest_dir)?;
        Ok(Self::from_lookup(env_lookup))
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());
        Self {
            mongo_uri: var("MONGO_URI", DEFAULT_MONGO_URI),
            mongo_db_name: var("MONGO_DB_NAME", DEFAULT_MONGO_DB_NAME),
            mongo_collection_name: var("MONGO_COLLECTION_NAME", DEFAULT_MONGO_COLLECTION_NAME),
            bind: var("API_BIND", DEFAULT_API_BIND),
        }
    }
}

pub struct BotConfig {
    /// Token allowing bot to connect bot to Discord
    pub discord_token: String,
    /// Full URL of the `POST /aggregate` endpoint
    pub api_url: String,
}

impl BotConfig {
    pub fn load(manifest_dir: &Path) -> Result<Self> {
        load_dotenv(manifest_dir)?;
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            discord_token: lookup("DISCORD_TOKEN")
                .context("Expected DISCORD_TOKEN in environment")?,
            api_url: lookup("AGGREGATION_API_URL")
                .unwrap_or_else(|| DEFAULT_AGGREGATION_API_URL.to_owned()),
        })
    }
}

/// Load bot config using the calling crate's manifest directory.
#[macro_export]
macro_rules! load_bot_config {
    () => {
        $crate::config::BotConfig::load(std::path::Path::new(env!("CARGO_MANIFEST_DIR")))
    };
}

/// Load server config using the calling crate's manifest directory.
#[macro_export]
macro_rules! load_server_config {
    () => {
        $crate::config::ServerConfig::load(std::path::Path::new(env!("CARGO_MANIFEST_DIR")))
    };
}
