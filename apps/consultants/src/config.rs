use anyhow::Result;
use portal_common::config::{env_or, env_string_or, load_dotenv, require_env};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        load_dotenv();

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            port: env_or("PORT", 8087)?,
            rust_log: env_string_or("RUST_LOG", "info"),
        })
    }
}
