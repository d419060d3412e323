mod auth;
mod config;
mod middleware;
mod proxy;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use portal_common::telemetry::init_tracing;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::auth::JwtVerifier;
use crate::config::Config;
use crate::proxy::ServiceClient;
use crate::routes::build_router;
use crate::state::GatewayState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    init_tracing(env!("CARGO_PKG_NAME"), &config.rust_log);

    info!("Starting Elowen API Gateway v{}", env!("CARGO_PKG_VERSION"));

    let state = GatewayState {
        verifier: Arc::new(JwtVerifier::new(&config.jwt_secret)),
        upstreams: Arc::new(config.upstreams.clone()),
        client: ServiceClient::new(config.upstream_timeout_secs)?,
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
