mod accounts;
mod config;
mod handlers;
mod jwt;
mod models;
mod otp;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use portal_common::{db::create_pool, telemetry::init_tracing};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::config::Config;
use crate::jwt::TokenIssuer;
use crate::otp::OtpPolicy;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    init_tracing(env!("CARGO_PKG_NAME"), &config.rust_log);

    info!("Starting auth-service v{}", env!("CARGO_PKG_VERSION"));

    let db = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let state = AppState {
        db,
        tokens: Arc::new(TokenIssuer::new(&config.jwt_secret, config.jwt_expiration_ms)),
        otp: OtpPolicy::new(config.otp_validity_minutes),
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
