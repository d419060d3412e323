mod config;
mod handlers;
mod models;
mod routes;
mod state;
mod store;
mod workflows;

use std::net::SocketAddr;

use anyhow::Result;
use portal_common::{db::create_pool, telemetry::init_tracing};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    init_tracing(env!("CARGO_PKG_NAME"), &config.rust_log);

    info!("Starting consultant-service v{}", env!("CARGO_PKG_VERSION"));

    let db = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let app = build_router(AppState { db })
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
