use anyhow::Result;
use portal_common::config::{env_or, env_string_or, load_dotenv, require_env};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_ms: i64,
    pub otp_validity_minutes: i64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        load_dotenv();

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            jwt_secret: require_env("JWT_SECRET")?,
            jwt_expiration_ms: env_or("JWT_EXPIRATION_MS", 86_400_000)?,
            otp_validity_minutes: env_or("OTP_VALIDITY_MINUTES", 10)?,
            port: env_or("PORT", 8081)?,
            rust_log: env_string_or("RUST_LOG", "info"),
        })
    }
}
