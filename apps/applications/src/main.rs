mod applications;
mod config;
mod handlers;
mod job_client;
mod models;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use portal_common::events::RedisEventBus;
use portal_common::{db::create_pool, telemetry::init_tracing};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::applications::PgApplicationStore;
use crate::config::Config;
use crate::job_client::HttpJobStatusClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    init_tracing(env!("CARGO_PKG_NAME"), &config.rust_log);

    info!("Starting application-service v{}", env!("CARGO_PKG_VERSION"));

    let db = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let redis = redis::Client::open(config.redis_url.as_str())?;

    let state = AppState {
        store: Arc::new(PgApplicationStore::new(db)),
        events: Arc::new(RedisEventBus::new(redis)),
        jobs: Arc::new(HttpJobStatusClient::new(
            &config.job_service_url,
            config.client_timeout_secs,
        )?),
        max_page_size: config.max_page_size,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
