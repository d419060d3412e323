mod config;
mod documents;
mod handlers;
mod listener;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use portal_common::events::RedisEventBus;
use portal_common::{db::create_pool, telemetry::init_tracing};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::config::Config;
use crate::listener::JobIndexer;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    init_tracing(env!("CARGO_PKG_NAME"), &config.rust_log);

    info!("Starting search-service v{}", env!("CARGO_PKG_VERSION"));

    let db = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let bus = RedisEventBus::new(redis::Client::open(config.redis_url.as_str())?);
    let indexer = Arc::new(JobIndexer::new(db.clone()));
    let retry = Duration::from_secs(config.consumer_retry_secs);
    tokio::spawn(async move {
        bus.consume_with_retry(listener::bindings(), indexer, retry)
            .await
    });

    let app = build_router(AppState {
        db,
        max_page_size: config.max_page_size,
    })
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
