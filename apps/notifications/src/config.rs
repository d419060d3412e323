use anyhow::Result;
use portal_common::config::{env_or, env_string_or, load_dotenv, require_env};
use portal_common::pagination::DEFAULT_MAX_PAGE_SIZE;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub mail_from: String,
    pub consumer_retry_secs: u64,
    pub max_page_size: i64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        load_dotenv();

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            mail_from: env_string_or("MAIL_FROM", "noreply@elowen.com"),
            consumer_retry_secs: env_or("CONSUMER_RETRY_SECS", 5)?,
            max_page_size: env_or("MAX_PAGE_SIZE", DEFAULT_MAX_PAGE_SIZE)?,
            port: env_or("PORT", 8085)?,
            rust_log: env_string_or("RUST_LOG", "info"),
        })
    }
}
