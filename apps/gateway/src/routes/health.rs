use axum::Json;
use portal_common::health::health_response;
use serde_json::Value;

/// GET /health
pub async fn health_handler() -> Json<Value> {
    health_response("api-gateway", env!("CARGO_PKG_VERSION"))
}
