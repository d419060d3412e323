use anyhow::Result;
use portal_common::config::{env_or, env_string_or, load_dotenv, require_env};

/// Gateway configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub upstreams: Upstreams,
    pub upstream_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

/// Base URLs of the services behind the gateway.
#[derive(Debug, Clone)]
pub struct Upstreams {
    pub auth: String,
    pub user: String,
    pub job: String,
    pub application: String,
    pub notification: String,
    pub search: String,
    pub consultant: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        load_dotenv();

        Ok(Config {
            jwt_secret: require_env("JWT_SECRET")?,
            upstreams: Upstreams {
                auth: env_string_or("AUTH_SERVICE_URL", "http://localhost:8081"),
                user: env_string_or("USER_SERVICE_URL", "http://localhost:8082"),
                job: env_string_or("JOB_SERVICE_URL", "http://localhost:8083"),
                application: env_string_or("APPLICATION_SERVICE_URL", "http://localhost:8084"),
                notification: env_string_or("NOTIFICATION_SERVICE_URL", "http://localhost:8085"),
                search: env_string_or("SEARCH_SERVICE_URL", "http://localhost:8086"),
                consultant: env_string_or("CONSULTANT_SERVICE_URL", "http://localhost:8087"),
            },
            upstream_timeout_secs: env_or("UPSTREAM_TIMEOUT_SECS", 30)?,
            port: env_or("PORT", 8080)?,
            rust_log: env_string_or("RUST_LOG", "info"),
        })
    }
}
